//! Vertex implementation for property graph

use super::property::{Cardinality, PropertyMap, PropertyValue};
use super::store::GraphResult;
use super::types::{Label, VertexId};
use serde::{Deserialize, Serialize};

/// A vertex in the property graph
///
/// Vertices have:
/// - A unique ID, fixed at creation
/// - A single label
/// - Properties, each key holding one or many values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique identifier for this vertex
    pub id: VertexId,

    /// Label of this vertex
    pub label: Label,

    /// Properties associated with this vertex
    pub properties: PropertyMap,
}

impl Vertex {
    /// Create a new vertex without properties
    pub fn new(id: VertexId, label: impl Into<Label>) -> Self {
        Vertex {
            id,
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Create a new vertex with properties
    pub fn new_with_properties(id: VertexId, label: impl Into<Label>, properties: PropertyMap) -> Self {
        Vertex {
            id,
            label: label.into(),
            properties,
        }
    }

    /// Write a property value following `cardinality`
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        self.properties.set(key, value, cardinality)
    }

    /// First value stored under `key`
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.value(key)
    }

    /// Every value stored under `key`, in write order
    pub fn values(&self, key: &str) -> &[PropertyValue] {
        self.properties.values(key)
    }

    /// Remove all values under `key`
    pub fn remove_property(&mut self, key: &str) -> Vec<PropertyValue> {
        self.properties
            .remove(key)
            .map(|entry| entry.into_values())
            .unwrap_or_default()
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Check if the vertex carries `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_str() == label
    }

    /// Get number of property keys
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&Vertex> for VertexId {
    fn from(vertex: &Vertex) -> Self {
        vertex.id
    }
}

impl From<Vertex> for VertexId {
    fn from(vertex: Vertex) -> Self {
        vertex.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vertex() {
        let vertex = Vertex::new(VertexId::new(1), "person");
        assert_eq!(vertex.id, VertexId::new(1));
        assert!(vertex.has_label("person"));
        assert_eq!(vertex.property_count(), 0);
    }

    #[test]
    fn test_vertex_properties() {
        let mut vertex = Vertex::new(VertexId::new(4), "person");

        vertex.set_property("name", "marko", Cardinality::Single).unwrap();
        vertex.set_property("age", 29i64, Cardinality::Single).unwrap();
        vertex.set_property("age", 30i64, Cardinality::Single).unwrap();

        assert_eq!(vertex.property("name").unwrap().as_string(), Some("marko"));
        assert_eq!(vertex.property("age").unwrap().as_integer(), Some(30));
        assert_eq!(vertex.property_count(), 2);

        let removed = vertex.remove_property("age");
        assert_eq!(removed, vec![PropertyValue::Integer(30)]);
        assert!(!vertex.has_property("age"));
    }

    #[test]
    fn test_vertex_list_property() {
        let mut vertex = Vertex::new(VertexId::new(5), "person");
        vertex.set_property("hobbies", "chess", Cardinality::List).unwrap();
        vertex.set_property("hobbies", "go", Cardinality::List).unwrap();

        assert_eq!(vertex.values("hobbies").len(), 2);
        assert_eq!(vertex.property("hobbies").unwrap().as_string(), Some("chess"));
    }

    #[test]
    fn test_vertex_equality() {
        let v1 = Vertex::new(VertexId::new(7), "person");
        let v2 = Vertex::new(VertexId::new(7), "job");
        let v3 = Vertex::new(VertexId::new(8), "person");

        assert_eq!(v1, v2); // Same ID
        assert_ne!(v1, v3); // Different ID
    }
}
