//! GraphHandle, the shared entry point to one in-memory graph
//!
//! The store sits behind an `Arc<RwLock<..>>`: any number of readers or one
//! writer at a time. Clones of a handle share the same graph.

use super::edge::Edge;
use super::property::{Cardinality, PropertyMap, PropertyValue};
use super::store::{GraphResult, GraphStatistics, GraphStore};
use super::types::{EdgeId, Label, VertexId};
use super::vertex::Vertex;
use crate::config::GraphConfig;
use crate::persistence::{BinaryCodec, PersistenceGateway, PersistenceResult, SnapshotCodec};
use crate::traversal::GraphTraversalSource;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Open an empty graph with the default configuration
pub fn open_graph() -> GraphHandle {
    open_graph_with(GraphConfig::default())
}

/// Open an empty graph
pub fn open_graph_with(config: GraphConfig) -> GraphHandle {
    info!(vertex_capacity = config.vertex_capacity, "opening graph");
    let store = GraphStore::with_capacity(config.vertex_capacity);
    GraphHandle::with_store(store, config)
}

/// Shared handle to a graph store
#[derive(Debug, Clone)]
pub struct GraphHandle {
    store: Arc<RwLock<GraphStore>>,
    config: Arc<GraphConfig>,
}

impl GraphHandle {
    /// Wrap an existing store
    pub fn with_store(store: GraphStore, config: GraphConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Start building a traversal over this graph
    pub fn traversal(&self) -> GraphTraversalSource {
        GraphTraversalSource::new(self.clone())
    }

    /// Acquire the read lock.
    ///
    /// Use for direct read-only access (lookups, iteration over the store).
    pub fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.store.read()
    }

    /// Acquire the write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.store.write()
    }

    /// Add a vertex and return a copy of it
    pub fn add_vertex(&self, label: impl Into<Label>, properties: PropertyMap) -> Vertex {
        self.store.write().add_vertex_ref(label, properties).clone()
    }

    /// Add a directed edge `from -> to` and return a copy of it
    pub fn add_edge(
        &self,
        label: impl Into<Label>,
        from: impl Into<VertexId>,
        to: impl Into<VertexId>,
        properties: PropertyMap,
    ) -> GraphResult<Edge> {
        let mut store = self.store.write();
        let id = store.add_edge(label, from.into(), to.into(), properties)?;
        store.get_edge(id).cloned()
    }

    /// Remove a vertex together with its incident edges
    pub fn remove_vertex(&self, id: impl Into<VertexId>) -> GraphResult<Vertex> {
        self.store.write().remove_vertex(id.into())
    }

    pub fn remove_edge(&self, id: EdgeId) -> GraphResult<Edge> {
        self.store.write().remove_edge(id)
    }

    /// Current copy of a vertex
    pub fn vertex(&self, id: impl Into<VertexId>) -> GraphResult<Vertex> {
        self.store.read().get_vertex(id.into()).cloned()
    }

    /// Current copy of an edge
    pub fn edge(&self, id: EdgeId) -> GraphResult<Edge> {
        self.store.read().get_edge(id).cloned()
    }

    pub fn set_vertex_property(
        &self,
        id: impl Into<VertexId>,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        self.store
            .write()
            .set_vertex_property(id.into(), key, value, cardinality)
    }

    pub fn set_edge_property(
        &self,
        id: EdgeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        self.store
            .write()
            .set_edge_property(id, key, value, Cardinality::Single)
    }

    /// Every value stored under `key` on a vertex
    pub fn vertex_properties(&self, id: impl Into<VertexId>, key: &str) -> GraphResult<Vec<PropertyValue>> {
        Ok(self.store.read().vertex_properties(id.into(), key)?.to_vec())
    }

    pub fn remove_vertex_property(&self, id: impl Into<VertexId>, key: &str) -> GraphResult<Vec<PropertyValue>> {
        self.store.write().remove_vertex_property(id.into(), key)
    }

    pub fn remove_edge_property(&self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.store.write().remove_edge_property(id, key)
    }

    pub fn vertex_count(&self) -> usize {
        self.store.read().vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.store.read().edge_count()
    }

    pub fn statistics(&self) -> GraphStatistics {
        self.store.read().statistics()
    }

    /// Remove every element. Identifiers are not reused afterwards.
    pub fn clear(&self) {
        self.store.write().clear();
        info!("graph cleared");
    }

    /// Export with an explicit codec instead of the configured one
    pub fn export_snapshot_with(&self, codec: &dyn SnapshotCodec) -> PersistenceResult<Vec<u8>> {
        self.store.read().export_snapshot(codec)
    }

    /// Import with an explicit codec instead of the configured one
    pub fn import_snapshot_with(&self, codec: &dyn SnapshotCodec, bytes: &[u8]) -> PersistenceResult<()> {
        self.store.write().import_snapshot(codec, bytes)
    }

    /// Write a snapshot to `path`.
    ///
    /// The bytes go to a sibling temporary file first and are renamed into
    /// place, so `path` never holds a half-written snapshot.
    pub fn write_snapshot(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        let bytes = self.export_snapshot()?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, path)?;

        info!(path = %path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    /// Load the snapshot at `path` into this (empty) graph
    pub fn read_snapshot(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.import_snapshot(&bytes)?;
        info!(path = %path.display(), "snapshot read");
        Ok(())
    }

    fn codec(&self) -> BinaryCodec {
        BinaryCodec::from_config(&self.config.snapshot)
    }
}

impl PersistenceGateway for GraphHandle {
    fn export_snapshot(&self) -> PersistenceResult<Vec<u8>> {
        self.export_snapshot_with(&self.codec())
    }

    fn import_snapshot(&self, bytes: &[u8]) -> PersistenceResult<()> {
        self.import_snapshot_with(&self.codec(), bytes)
    }
}
