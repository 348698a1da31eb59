//! Edge implementation for property graph
//!
//! Edges are directed and carry single-valued properties only.

use super::property::{Cardinality, PropertyMap, PropertyValue};
use super::store::{GraphError, GraphResult};
use super::types::{Direction, EdgeId, Label, VertexId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Edges have:
/// - A unique ID
/// - A source vertex (the edge goes FROM it)
/// - A target vertex
/// - A label
/// - Single-valued properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source vertex (edge goes FROM this vertex)
    pub source: VertexId,

    /// Target vertex (edge goes TO this vertex)
    pub target: VertexId,

    /// Relationship label (e.g., "works", "knows")
    pub label: Label,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(id: EdgeId, source: VertexId, target: VertexId, label: impl Into<Label>) -> Self {
        Edge {
            id,
            source,
            target,
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Create a new edge with properties.
    ///
    /// Fails if `properties` holds a list-cardinality key.
    pub fn new_with_properties(
        id: EdgeId,
        source: VertexId,
        target: VertexId,
        label: impl Into<Label>,
        properties: PropertyMap,
    ) -> GraphResult<Self> {
        Self::check_single(&properties)?;
        Ok(Edge {
            id,
            source,
            target,
            label: label.into(),
            properties,
        })
    }

    /// Reject any list-cardinality key in `properties`
    pub(crate) fn check_single(properties: &PropertyMap) -> GraphResult<()> {
        match properties
            .iter()
            .find(|(_, entry)| entry.cardinality() == Cardinality::List)
        {
            Some((key, _)) => Err(GraphError::InvalidCardinality {
                key: key.to_string(),
                existing: Cardinality::Single,
                requested: Cardinality::List,
            }),
            None => Ok(()),
        }
    }

    /// Set a property value, replacing any previous one.
    ///
    /// `Cardinality::List` is rejected.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        if cardinality == Cardinality::List {
            return Err(GraphError::InvalidCardinality {
                key: key.into(),
                existing: Cardinality::Single,
                requested: Cardinality::List,
            });
        }
        self.properties.set(key, value, Cardinality::Single)
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.value(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties
            .remove(key)
            .and_then(|entry| entry.into_values().into_iter().next())
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Vertex at the given end: `Out` is the source, `In` the target
    pub fn vertex(&self, direction: Direction) -> VertexId {
        match direction {
            Direction::Out => self.source,
            Direction::In => self.target,
        }
    }

    /// Vertex at the opposite end from `direction` as seen by a walker
    /// leaving along this edge
    pub fn other_end(&self, direction: Direction) -> VertexId {
        match direction {
            Direction::Out => self.target,
            Direction::In => self.source,
        }
    }

    /// Check if this edge starts and ends at the same vertex
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(EdgeId::new(1), VertexId::new(1), VertexId::new(2), "works");

        assert_eq!(edge.id, EdgeId::new(1));
        assert_eq!(edge.source, VertexId::new(1));
        assert_eq!(edge.target, VertexId::new(2));
        assert_eq!(edge.label.as_str(), "works");
    }

    #[test]
    fn test_edge_direction() {
        let edge = Edge::new(EdgeId::new(2), VertexId::new(10), VertexId::new(20), "follows");

        assert_eq!(edge.vertex(Direction::Out), VertexId::new(10));
        assert_eq!(edge.vertex(Direction::In), VertexId::new(20));
        assert_eq!(edge.other_end(Direction::Out), VertexId::new(20));
        assert_eq!(edge.other_end(Direction::In), VertexId::new(10));
        assert!(!edge.is_self_loop());
    }

    #[test]
    fn test_edge_properties_are_single_valued() {
        let mut edge = Edge::new(EdgeId::new(3), VertexId::new(1), VertexId::new(2), "knows");

        edge.set_property("since", 2019i64, Cardinality::Single).unwrap();
        edge.set_property("since", 2020i64, Cardinality::Single).unwrap();
        assert_eq!(edge.property("since").unwrap().as_integer(), Some(2020));

        let err = edge.set_property("tags", "a", Cardinality::List).unwrap_err();
        assert!(matches!(err, GraphError::InvalidCardinality { .. }));
        assert!(!edge.has_property("tags"));
    }

    #[test]
    fn test_edge_with_list_properties_is_rejected() {
        let props = PropertyMap::new().with_list("tags", vec!["a", "b"]);
        let result = Edge::new_with_properties(
            EdgeId::new(4),
            VertexId::new(5),
            VertexId::new(6),
            "related",
            props,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_property() {
        let mut edge = Edge::new(EdgeId::new(6), VertexId::new(1), VertexId::new(2), "test");

        edge.set_property("weight", 0.5, Cardinality::Single).unwrap();
        let removed = edge.remove_property("weight");
        assert_eq!(removed, Some(PropertyValue::Float(0.5)));
        assert!(!edge.has_property("weight"));
    }
}
