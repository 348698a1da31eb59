//! Traversal entry points

use super::pipeline::Traversal;
use super::step::{AddVertexStep, EdgeScan, VertexScan};
use super::{TraversalError, TraversalResult, Traverser};
use crate::graph::{EdgeId, GraphHandle, Label, PropertyMap, PropertyValue, VertexId};

/// Starts traversals over one graph (`g` in traversal examples)
#[derive(Debug, Clone)]
pub struct GraphTraversalSource {
    graph: GraphHandle,
}

impl GraphTraversalSource {
    pub fn new(graph: GraphHandle) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &GraphHandle {
        &self.graph
    }

    /// All vertices, in insertion order
    pub fn v(&self) -> Traversal {
        Traversal::new(self.graph.clone(), Box::new(VertexScan::all()))
    }

    /// The given vertices, in the given order; missing ids are skipped
    pub fn v_ids<I>(&self, ids: I) -> Traversal
    where
        I: IntoIterator,
        I::Item: Into<VertexId>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        Traversal::new(self.graph.clone(), Box::new(VertexScan::with_ids(ids)))
    }

    /// All edges, in insertion order
    pub fn e(&self) -> Traversal {
        Traversal::new(self.graph.clone(), Box::new(EdgeScan::all()))
    }

    /// The given edges, in the given order; missing ids are skipped
    pub fn e_ids(&self, ids: impl IntoIterator<Item = EdgeId>) -> Traversal {
        let ids = ids.into_iter().collect();
        Traversal::new(self.graph.clone(), Box::new(EdgeScan::with_ids(ids)))
    }

    /// A traversal that creates one vertex when it runs
    pub fn add_v(&self, label: impl Into<Label>) -> Traversal {
        Traversal::new(self.graph.clone(), Box::new(AddVertexStep::new(label.into())))
    }

    /// Start building an edge; it is created by `next()` or `iterate()`
    pub fn add_e(&self, label: impl Into<Label>) -> AddEdgeBuilder {
        AddEdgeBuilder {
            graph: self.graph.clone(),
            label: label.into(),
            from: None,
            to: None,
            properties: PropertyMap::new(),
        }
    }
}

/// addE(label).from(v).to(v2)
#[derive(Debug, Clone)]
pub struct AddEdgeBuilder {
    graph: GraphHandle,
    label: Label,
    from: Option<VertexId>,
    to: Option<VertexId>,
    properties: PropertyMap,
}

impl AddEdgeBuilder {
    pub fn from(mut self, vertex: impl Into<VertexId>) -> Self {
        self.from = Some(vertex.into());
        self
    }

    pub fn to(mut self, vertex: impl Into<VertexId>) -> Self {
        self.to = Some(vertex.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties = self.properties.with(key, value);
        self
    }

    /// Create the edge and return it
    #[allow(clippy::should_implement_trait)]
    pub fn next(self) -> TraversalResult<Traverser> {
        let (Some(from), Some(to)) = (self.from, self.to) else {
            return Err(TraversalError::MissingEndpoint);
        };
        let edge = self.graph.add_edge(self.label, from, to, self.properties)?;
        Ok(Traverser::Edge(edge))
    }

    /// Create the edge, discarding it
    pub fn iterate(self) -> TraversalResult<()> {
        self.next().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{open_graph, GraphError};

    #[test]
    fn test_add_edge_between_vertices() {
        let graph = open_graph();
        let g = graph.traversal();
        let marko = g.add_v("person").property("name", "marko").next().unwrap();
        let job = g.add_v("job").next().unwrap().into_vertex().unwrap();

        let edge = g
            .add_e("works")
            .from(marko.as_vertex().unwrap())
            .to(&job)
            .property("since", 2020)
            .next()
            .unwrap()
            .into_edge()
            .unwrap();

        assert_eq!(edge.target, job.id);
        assert_eq!(edge.property("since"), Some(&PropertyValue::Integer(2020)));
        assert_eq!(g.e_ids([edge.id]).count().unwrap(), 1);
    }

    #[test]
    fn test_add_edge_without_endpoint() {
        let graph = open_graph();
        let g = graph.traversal();
        let only = graph.add_vertex("person", PropertyMap::new());

        let err = g.add_e("knows").from(&only).iterate().unwrap_err();
        assert_eq!(err, TraversalError::MissingEndpoint);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_to_missing_vertex() {
        let graph = open_graph();
        let only = graph.add_vertex("person", PropertyMap::new());

        let err = graph
            .traversal()
            .add_e("knows")
            .from(&only)
            .to(VertexId::new(42))
            .iterate()
            .unwrap_err();
        assert_eq!(err, TraversalError::Graph(GraphError::DanglingTarget(VertexId::new(42))));
    }
}
