//! Persistence gateway
//!
//! A graph is exported as a [`GraphSnapshot`], a plain record of every
//! vertex, edge, property and id counter, and turned into bytes by a
//! [`SnapshotCodec`]. Identifiers are part of the snapshot, so an import
//! reproduces the exported graph id for id.

pub mod codec;

pub use codec::{BinaryCodec, JsonCodec, SnapshotCodec, SnapshotFormat};

use crate::graph::{Edge, EdgeId, GraphError, GraphStore, Label, PropertyMap, Vertex, VertexId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Snapshot bytes could not be read back into a graph
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Import target already holds elements
    #[error("Cannot import into a non-empty graph ({vertices} vertices, {edges} edges)")]
    NonEmptyGraph { vertices: usize, edges: usize },

    /// Snapshot could not be encoded
    #[error("Encoding error: {0}")]
    Encode(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serialized vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: u64,
    pub label: String,
    pub properties: PropertyMap,
}

/// Serialized edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub label: String,
    pub properties: PropertyMap,
}

/// Full content of a graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Next vertex id the exporting store would have handed out
    pub next_vertex_id: u64,
    /// Next edge id the exporting store would have handed out
    pub next_edge_id: u64,
    /// Vertices in insertion order
    pub vertices: Vec<VertexRecord>,
    /// Edges in insertion order
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Record the full content of `store`
    pub fn capture(store: &GraphStore) -> Self {
        let (next_vertex_id, next_edge_id) = store.next_ids();
        GraphSnapshot {
            next_vertex_id,
            next_edge_id,
            vertices: store
                .all_vertices()
                .map(|v| VertexRecord {
                    id: v.id.as_u64(),
                    label: v.label.as_str().to_string(),
                    properties: v.properties.clone(),
                })
                .collect(),
            edges: store
                .all_edges()
                .map(|e| EdgeRecord {
                    id: e.id.as_u64(),
                    source: e.source.as_u64(),
                    target: e.target.as_u64(),
                    label: e.label.as_str().to_string(),
                    properties: e.properties.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a store from this snapshot.
    ///
    /// Duplicate or out-of-range ids, dangling edge endpoints, property
    /// entries no write could produce and list-valued edge properties are
    /// reported as `CorruptSnapshot`.
    pub fn rebuild(self) -> PersistenceResult<GraphStore> {
        let corrupt = |e: GraphError| PersistenceError::CorruptSnapshot(e.to_string());
        let mut store = GraphStore::with_capacity(self.vertices.len());

        for record in self.vertices {
            check_properties("vertex", record.id, &record.properties)?;
            let vertex = Vertex::new_with_properties(
                VertexId::new(record.id),
                Label::new(record.label),
                record.properties,
            );
            store.insert_recovered_vertex(vertex).map_err(corrupt)?;
        }

        for record in self.edges {
            check_properties("edge", record.id, &record.properties)?;
            let edge = Edge {
                id: EdgeId::new(record.id),
                source: VertexId::new(record.source),
                target: VertexId::new(record.target),
                label: Label::new(record.label),
                properties: record.properties,
            };
            store.insert_recovered_edge(edge).map_err(corrupt)?;
        }

        store
            .reserve_ids(self.next_vertex_id, self.next_edge_id)
            .map_err(corrupt)?;
        Ok(store)
    }
}

fn check_properties(kind: &str, id: u64, properties: &PropertyMap) -> PersistenceResult<()> {
    match properties.malformed_key() {
        Some(key) => Err(PersistenceError::CorruptSnapshot(format!(
            "{} {} has a malformed '{}' property",
            kind, id, key
        ))),
        None => Ok(()),
    }
}

impl GraphStore {
    /// Encode the full content of this store with `codec`
    pub fn export_snapshot(&self, codec: &dyn SnapshotCodec) -> PersistenceResult<Vec<u8>> {
        let snapshot = GraphSnapshot::capture(self);
        let bytes = codec.encode(&snapshot)?;
        info!(
            vertices = snapshot.vertices.len(),
            edges = snapshot.edges.len(),
            bytes = bytes.len(),
            "snapshot exported"
        );
        Ok(bytes)
    }

    /// Populate this empty store from snapshot bytes.
    ///
    /// On any failure the store is left exactly as it was.
    pub fn import_snapshot(&mut self, codec: &dyn SnapshotCodec, bytes: &[u8]) -> PersistenceResult<()> {
        if !self.is_empty() {
            return Err(PersistenceError::NonEmptyGraph {
                vertices: self.vertex_count(),
                edges: self.edge_count(),
            });
        }

        let snapshot = codec.decode(bytes).inspect_err(|e| {
            warn!(error = %e, "snapshot rejected");
        })?;
        let (vertices, edges) = (snapshot.vertices.len(), snapshot.edges.len());
        let mut rebuilt = snapshot.rebuild().inspect_err(|e| {
            warn!(error = %e, "snapshot rejected");
        })?;

        // Identifiers already spent by this store stay spent
        let (next_vertex, next_edge) = self.next_ids();
        rebuilt
            .reserve_ids(next_vertex, next_edge)
            .map_err(|e| PersistenceError::CorruptSnapshot(e.to_string()))?;
        *self = rebuilt;

        info!(vertices, edges, "snapshot imported");
        Ok(())
    }
}

/// Snapshot boundary of a graph backend
pub trait PersistenceGateway {
    /// Encode the whole graph
    fn export_snapshot(&self) -> PersistenceResult<Vec<u8>>;

    /// Load a snapshot into an empty graph
    fn import_snapshot(&self, bytes: &[u8]) -> PersistenceResult<()>;
}
