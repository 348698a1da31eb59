//! Traversal engine
//!
//! A traversal is a chain of [steps](step::Step) pulled one element at a time
//! (Volcano iterator model). Building a traversal touches nothing; work
//! happens only when a terminal such as [`Traversal::to_list`] or
//! [`Traversal::next`] pulls from it.
//!
//! ```
//! use vertexa::graph::{open_graph, PropertyMap};
//!
//! let graph = open_graph();
//! let marko = graph.add_vertex("person", PropertyMap::new().with("name", "marko"));
//! let job = graph.add_vertex("job", PropertyMap::new().with("name", "Software Engineer"));
//! graph.add_edge("works", &marko, &job, PropertyMap::new()).unwrap();
//!
//! let g = graph.traversal();
//! let jobs = g.v().has("name", "marko").out(&["works"]).values("name").to_list().unwrap();
//! assert_eq!(jobs[0].as_value().and_then(|v| v.as_string()), Some("Software Engineer"));
//! ```

mod pipeline;
mod source;
mod step;

pub use pipeline::{Traversal, TraversalStream};
pub use source::{AddEdgeBuilder, GraphTraversalSource};

use crate::graph::{Edge, GraphError, PropertyValue, Vertex};
use std::fmt;
use thiserror::Error;

/// Traversal errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraversalError {
    /// `next()` on an exhausted traversal
    #[error("No such element: the traversal is exhausted")]
    NoSuchElement,

    /// A step received an element kind it cannot handle
    #[error("Step {step}() cannot take a {found}")]
    UnexpectedElement {
        step: &'static str,
        found: &'static str,
    },

    /// addE() without both endpoints
    #[error("addE() needs both a from() and a to() vertex")]
    MissingEndpoint,

    /// A mutating step was pulled under a read lock
    #[error("Step needs write access to the graph")]
    ReadOnly,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type TraversalResult<T> = Result<T, TraversalError>;

/// An element emitted by a traversal terminal
///
/// Vertices and edges are copies taken at the moment they were emitted and
/// compare by identity; values compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Traverser {
    Vertex(Vertex),
    Edge(Edge),
    Value(PropertyValue),
}

impl Traverser {
    pub fn kind(&self) -> &'static str {
        match self {
            Traverser::Vertex(_) => "vertex",
            Traverser::Edge(_) => "edge",
            Traverser::Value(_) => "value",
        }
    }

    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Traverser::Vertex(vertex) => Some(vertex),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Traverser::Edge(edge) => Some(edge),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&PropertyValue> {
        match self {
            Traverser::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_vertex(self) -> TraversalResult<Vertex> {
        match self {
            Traverser::Vertex(vertex) => Ok(vertex),
            other => Err(other.unexpected("into_vertex")),
        }
    }

    pub fn into_edge(self) -> TraversalResult<Edge> {
        match self {
            Traverser::Edge(edge) => Ok(edge),
            other => Err(other.unexpected("into_edge")),
        }
    }

    pub fn into_value(self) -> TraversalResult<PropertyValue> {
        match self {
            Traverser::Value(value) => Ok(value),
            other => Err(other.unexpected("into_value")),
        }
    }

    fn unexpected(&self, step: &'static str) -> TraversalError {
        TraversalError::UnexpectedElement {
            step,
            found: self.kind(),
        }
    }
}

impl fmt::Display for Traverser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traverser::Vertex(vertex) => write!(f, "{}", vertex.id),
            Traverser::Edge(edge) => write!(
                f,
                "{}[{}-{}->{}]",
                edge.id,
                edge.source.as_u64(),
                edge.label,
                edge.target.as_u64()
            ),
            Traverser::Value(value) => write!(f, "{}", value),
        }
    }
}
