//! Vertexa Graph Engine
//!
//! An embeddable, in-memory property graph with lazy Gremlin-style
//! traversals.
//!
//! # Architecture
//!
//! - [`graph`]: vertices, edges, multi-valued properties and the adjacency
//!   index, behind a shared [`GraphHandle`]
//! - [`traversal`]: pull-based traversal steps and terminal operations
//! - [`persistence`]: whole-graph snapshots through pluggable codecs
//! - [`config`]: YAML-loadable engine settings
//!
//! ## Example Usage
//!
//! ```rust
//! use vertexa::{open_graph, Cardinality};
//!
//! let graph = open_graph();
//! let g = graph.traversal();
//!
//! // Create vertices and an edge
//! let marko = g.add_v("person").property("name", "marko").property("age", 30).next().unwrap();
//! let job = g.add_v("job").property("name", "Software Engineer").next().unwrap();
//! g.add_e("works")
//!     .from(marko.as_vertex().unwrap())
//!     .to(job.as_vertex().unwrap())
//!     .iterate()
//!     .unwrap();
//!
//! // List properties keep every value in write order
//! let id = marko.as_vertex().unwrap().id;
//! graph.set_vertex_property(id, "hobbies", "Reading books", Cardinality::List).unwrap();
//! graph.set_vertex_property(id, "hobbies", "Playing Video Games", Cardinality::List).unwrap();
//!
//! // Query
//! let jobs = g.v().has("name", "marko").out(&["works"]).values("name").to_list().unwrap();
//! assert_eq!(jobs.len(), 1);
//! assert_eq!(g.v().has("name", "marko").values("hobbies").count().unwrap(), 2);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod persistence;
pub mod traversal;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, GraphConfig, SnapshotConfig};

pub use graph::{
    open_graph, open_graph_with, Cardinality, Direction, Edge, EdgeId, GraphError, GraphHandle, GraphResult,
    GraphStatistics, GraphStore, Label, PropertyMap, PropertyValue, Vertex, VertexId,
};

pub use persistence::{
    BinaryCodec, GraphSnapshot, JsonCodec, PersistenceError, PersistenceGateway, PersistenceResult, SnapshotCodec,
    SnapshotFormat,
};

pub use traversal::{
    AddEdgeBuilder, GraphTraversalSource, Traversal, TraversalError, TraversalResult, TraversalStream, Traverser,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
