//! Property graph data model
//!
//! - Vertices with one label and multi-valued properties
//! - Directed edges with one label and single-valued properties
//! - Adjacency index per vertex, in insertion order and grouped by label
//! - [`GraphHandle`], the shared entry point that guards a [`GraphStore`]

pub mod adjacency;
pub mod edge;
pub mod handle;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use adjacency::{Adjacency, EdgeList};
pub use edge::Edge;
pub use handle::{open_graph, open_graph_with, GraphHandle};
pub use property::{Cardinality, PropertyEntry, PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{Direction, EdgeId, IdAllocator, Label, VertexId, MAX_ID};
pub use vertex::Vertex;
