//! In-memory graph storage implementation
//!
//! Vertices and edges live in ordered maps keyed by their identifier.
//! Identifiers are handed out by a monotonic counter and never reused, so
//! key order is insertion order.

use super::adjacency::{ids_after, Adjacency};
use super::edge::Edge;
use super::property::{Cardinality, PropertyMap, PropertyValue};
use super::types::{Direction, EdgeId, IdAllocator, Label, VertexId};
use super::vertex::Vertex;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Vertex {0} already exists")]
    VertexAlreadyExists(VertexId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Dangling reference: source vertex {0} does not exist")]
    DanglingSource(VertexId),

    #[error("Dangling reference: target vertex {0} does not exist")]
    DanglingTarget(VertexId),

    #[error("Identifier {0} is out of range")]
    IdOutOfRange(u64),

    #[error("Property '{key}' has {existing} cardinality, cannot write it as {requested}")]
    InvalidCardinality {
        key: String,
        existing: Cardinality,
        requested: Cardinality,
    },
}

impl GraphError {
    /// The referenced element does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::VertexNotFound(_) | GraphError::EdgeNotFound(_))
    }

    /// An edge endpoint was missing at creation time
    pub fn is_dangling_reference(&self) -> bool {
        matches!(self, GraphError::DanglingSource(_) | GraphError::DanglingTarget(_))
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Element counts for a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStatistics {
    pub vertex_count: usize,
    pub edge_count: usize,
    /// Vertices per label, in order of first appearance
    pub vertices_by_label: IndexMap<Label, usize>,
    /// Edges per label, in order of first appearance
    pub edges_by_label: IndexMap<Label, usize>,
}

/// Inverse of one store mutation
#[derive(Debug, Clone)]
enum Undo {
    VertexAdded(VertexId),
    VertexRemoved(Vertex),
    EdgeAdded(EdgeId),
    EdgeRemoved(Edge),
    VertexProperties(VertexId, PropertyMap),
    EdgeProperties(EdgeId, PropertyMap),
}

/// In-memory graph storage
///
/// - vertices: VertexId -> Vertex (ordered)
/// - edges: EdgeId -> Edge (ordered)
/// - adjacency: VertexId -> outgoing/incoming edge ids, also grouped by label
#[derive(Debug, Clone)]
pub struct GraphStore {
    /// Vertex storage
    vertices: BTreeMap<VertexId, Vertex>,

    /// Edge storage
    edges: BTreeMap<EdgeId, Edge>,

    /// Adjacency index for each live vertex
    adjacency: FxHashMap<VertexId, Adjacency>,

    /// Vertex id source
    vertex_ids: IdAllocator,

    /// Edge id source
    edge_ids: IdAllocator,

    /// Undo log while a journal is open
    journal: Option<Vec<Undo>>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new empty graph store with room for `vertices` adjacency entries
    pub fn with_capacity(vertices: usize) -> Self {
        GraphStore {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            adjacency: FxHashMap::with_capacity_and_hasher(vertices, Default::default()),
            vertex_ids: IdAllocator::new(),
            edge_ids: IdAllocator::new(),
            journal: None,
        }
    }

    /// Add a vertex with a label and initial properties.
    ///
    /// Always succeeds; uniqueness is up to the caller.
    pub fn add_vertex(&mut self, label: impl Into<Label>, properties: PropertyMap) -> VertexId {
        self.add_vertex_ref(label, properties).id
    }

    /// `add_vertex`, handing back the stored vertex
    pub(crate) fn add_vertex_ref(&mut self, label: impl Into<Label>, properties: PropertyMap) -> &Vertex {
        let id = VertexId::new(self.vertex_ids.allocate());
        let vertex = Vertex::new_with_properties(id, label, properties);
        debug!(vertex = %id, label = %vertex.label, "vertex added");
        self.record(Undo::VertexAdded(id));
        self.place_vertex(vertex)
    }

    /// Add a directed edge `from -> to`.
    ///
    /// Fails without touching the store if an endpoint is missing or the
    /// properties hold a list-cardinality key.
    pub fn add_edge(
        &mut self,
        label: impl Into<Label>,
        from: VertexId,
        to: VertexId,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        if !self.has_vertex(from) {
            return Err(GraphError::DanglingSource(from));
        }
        if !self.has_vertex(to) {
            return Err(GraphError::DanglingTarget(to));
        }
        Edge::check_single(&properties)?;

        let id = EdgeId::new(self.edge_ids.allocate());
        let edge = Edge::new_with_properties(id, from, to, label, properties)?;
        debug!(edge = %id, label = %edge.label, source = %from, target = %to, "edge added");
        self.record(Undo::EdgeAdded(id));
        self.place_edge(edge);
        Ok(id)
    }

    /// Remove a vertex, removing its incident edges first
    pub fn remove_vertex(&mut self, id: VertexId) -> GraphResult<Vertex> {
        let incident: Vec<EdgeId> = match self.adjacency.get(&id) {
            Some(adj) if self.vertices.contains_key(&id) => adj.incident().collect(),
            _ => return Err(GraphError::VertexNotFound(id)),
        };
        for edge_id in incident {
            // Self-loops are listed twice
            if self.has_edge(edge_id) {
                self.remove_edge(edge_id)?;
            }
        }

        let vertex = self.vertices.remove(&id).ok_or(GraphError::VertexNotFound(id))?;
        self.adjacency.remove(&id);
        debug!(vertex = %id, "vertex removed");
        self.record(Undo::VertexRemoved(vertex.clone()));
        Ok(vertex)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.unlink_edge(id)?;
        debug!(edge = %id, "edge removed");
        self.record(Undo::EdgeRemoved(edge.clone()));
        Ok(edge)
    }

    /// Get a vertex by ID
    pub fn get_vertex(&self, id: VertexId) -> GraphResult<&Vertex> {
        self.vertex(id).ok_or(GraphError::VertexNotFound(id))
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edge(id).ok_or(GraphError::EdgeNotFound(id))
    }

    /// Vertex lookup that reports absence as `None`
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Edge lookup that reports absence as `None`
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn has_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Write a vertex property following `cardinality`
    pub fn set_vertex_property(
        &mut self,
        id: VertexId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        let vertex = self.vertices.get_mut(&id).ok_or(GraphError::VertexNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::VertexProperties(id, vertex.properties.clone()));
        }
        vertex.set_property(key, value, cardinality)
    }

    /// Write an edge property; edges only take `Cardinality::Single`
    pub fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::EdgeProperties(id, edge.properties.clone()));
        }
        edge.set_property(key, value, cardinality)
    }

    /// Every value stored under `key` on a vertex; empty if the key is absent
    pub fn vertex_properties(&self, id: VertexId, key: &str) -> GraphResult<&[PropertyValue]> {
        Ok(self.get_vertex(id)?.values(key))
    }

    /// Drop a vertex property key with all its values
    pub fn remove_vertex_property(&mut self, id: VertexId, key: &str) -> GraphResult<Vec<PropertyValue>> {
        let vertex = self.vertices.get_mut(&id).ok_or(GraphError::VertexNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::VertexProperties(id, vertex.properties.clone()));
        }
        Ok(vertex.remove_property(key))
    }

    /// Drop an edge property
    pub fn remove_edge_property(&mut self, id: EdgeId, key: &str) -> GraphResult<Option<PropertyValue>> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::EdgeProperties(id, edge.properties.clone()));
        }
        Ok(edge.remove_property(key))
    }

    /// All vertices in insertion order
    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges in insertion order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Vertices whose id is at least `start`, in insertion order
    pub fn vertices_from(&self, start: u64) -> impl Iterator<Item = &Vertex> {
        self.vertices.range(VertexId::new(start)..).map(|(_, vertex)| vertex)
    }

    /// Edges whose id is at least `start`, in insertion order
    pub fn edges_from(&self, start: u64) -> impl Iterator<Item = &Edge> {
        self.edges.range(EdgeId::new(start)..).map(|(_, edge)| edge)
    }

    /// The first incident edge of `vertex` listed after edge `after` (from
    /// the start for `None`) whose label is in `labels` (any label when
    /// empty).
    ///
    /// Adjacency lists are sorted by edge id, so a caller can resume from the
    /// edge it last saw even if that edge or others were removed since.
    pub fn next_incident_edge(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[Label],
        after: Option<EdgeId>,
    ) -> Option<&Edge> {
        let list = self.adjacency.get(&vertex)?.list(direction);
        let (ids, filter) = match labels {
            [] => (list.all(), false),
            [label] => (list.with_label(label), false),
            _ => (list.all(), true),
        };

        ids_after(ids, after).iter().find_map(|&id| {
            let edge = self.edge(id)?;
            if filter && !labels.contains(&edge.label) {
                return None;
            }
            Some(edge)
        })
    }

    /// Incident edges of `vertex` in adjacency order, filtered by `labels`
    pub fn incident_edges<'a>(
        &'a self,
        vertex: VertexId,
        direction: Direction,
        labels: &'a [Label],
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        let mut after = None;
        std::iter::from_fn(move || {
            let edge = self.next_incident_edge(vertex, direction, labels, after)?;
            after = Some(edge.id);
            Some(edge)
        })
    }

    /// Get all outgoing edges from a vertex
    pub fn out_edges<'a>(&'a self, vertex: VertexId, labels: &'a [Label]) -> impl Iterator<Item = &'a Edge> + 'a {
        self.incident_edges(vertex, Direction::Out, labels)
    }

    /// Get all incoming edges to a vertex
    pub fn in_edges<'a>(&'a self, vertex: VertexId, labels: &'a [Label]) -> impl Iterator<Item = &'a Edge> + 'a {
        self.incident_edges(vertex, Direction::In, labels)
    }

    /// Number of incident edges in one direction
    pub fn degree(&self, vertex: VertexId, direction: Direction) -> usize {
        self.adjacency
            .get(&vertex)
            .map(|adj| adj.degree(direction))
            .unwrap_or(0)
    }

    /// Get total number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Count elements overall and per label
    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            ..Default::default()
        };
        for vertex in self.all_vertices() {
            *stats.vertices_by_label.entry(vertex.label.clone()).or_insert(0) += 1;
        }
        for edge in self.all_edges() {
            *stats.edges_by_label.entry(edge.label.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Clear all data from the graph. Identifiers keep counting up.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.adjacency.clear();
        self.journal = None;
    }

    /// Next identifiers the allocators would hand out, as (vertex, edge)
    pub fn next_ids(&self) -> (u64, u64) {
        (self.vertex_ids.peek(), self.edge_ids.peek())
    }

    /// Insert a vertex that already carries its identifier (snapshot import)
    pub fn insert_recovered_vertex(&mut self, vertex: Vertex) -> GraphResult<()> {
        if vertex.id.as_u64() == 0 || self.has_vertex(vertex.id) {
            return Err(GraphError::VertexAlreadyExists(vertex.id));
        }
        if !self.vertex_ids.reserve(vertex.id.as_u64()) {
            return Err(GraphError::IdOutOfRange(vertex.id.as_u64()));
        }
        self.place_vertex(vertex);
        Ok(())
    }

    /// Insert an edge that already carries its identifier (snapshot import)
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> GraphResult<()> {
        if edge.id.as_u64() == 0 || self.has_edge(edge.id) {
            return Err(GraphError::EdgeAlreadyExists(edge.id));
        }
        if !self.has_vertex(edge.source) {
            return Err(GraphError::DanglingSource(edge.source));
        }
        if !self.has_vertex(edge.target) {
            return Err(GraphError::DanglingTarget(edge.target));
        }
        Edge::check_single(&edge.properties)?;
        if !self.edge_ids.reserve(edge.id.as_u64()) {
            return Err(GraphError::IdOutOfRange(edge.id.as_u64()));
        }
        self.place_edge(edge);
        Ok(())
    }

    /// Make sure the allocators never hand out anything below these watermarks
    pub(crate) fn reserve_ids(&mut self, next_vertex: u64, next_edge: u64) -> GraphResult<()> {
        if next_vertex > 1 && !self.vertex_ids.reserve(next_vertex - 1) {
            return Err(GraphError::IdOutOfRange(next_vertex));
        }
        if next_edge > 1 && !self.edge_ids.reserve(next_edge - 1) {
            return Err(GraphError::IdOutOfRange(next_edge));
        }
        Ok(())
    }

    /// Start recording the inverse of every mutation
    pub(crate) fn begin_journal(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep everything done since `begin_journal`
    pub(crate) fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Undo everything done since `begin_journal`, newest first
    pub(crate) fn rollback_journal(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let undone = journal.len();
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::VertexAdded(id) => {
                    self.vertices.remove(&id);
                    self.adjacency.remove(&id);
                }
                Undo::VertexRemoved(vertex) => {
                    self.place_vertex(vertex);
                }
                Undo::EdgeAdded(id) => {
                    let _ = self.unlink_edge(id);
                }
                Undo::EdgeRemoved(edge) => self.place_edge(edge),
                Undo::VertexProperties(id, properties) => {
                    if let Some(vertex) = self.vertices.get_mut(&id) {
                        vertex.properties = properties;
                    }
                }
                Undo::EdgeProperties(id, properties) => {
                    if let Some(edge) = self.edges.get_mut(&id) {
                        edge.properties = properties;
                    }
                }
            }
        }
        debug!(undone, "mutations rolled back");
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    fn place_vertex(&mut self, vertex: Vertex) -> &Vertex {
        let id = vertex.id;
        self.adjacency.entry(id).or_default();
        self.vertices.entry(id).or_insert(vertex)
    }

    fn place_edge(&mut self, edge: Edge) {
        self.adjacency
            .entry(edge.source)
            .or_default()
            .insert(Direction::Out, &edge.label, edge.id);
        self.adjacency
            .entry(edge.target)
            .or_default()
            .insert(Direction::In, &edge.label, edge.id);
        self.edges.insert(edge.id, edge);
    }

    /// Take an edge out of storage and both adjacency lists
    fn unlink_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.edges.remove(&id).ok_or(GraphError::EdgeNotFound(id))?;
        if let Some(adj) = self.adjacency.get_mut(&edge.source) {
            adj.remove(Direction::Out, &edge.label, id);
        }
        if let Some(adj) = self.adjacency.get_mut(&edge.target) {
            adj.remove(Direction::In, &edge.label, id);
        }
        Ok(edge)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marko_and_job(store: &mut GraphStore) -> (VertexId, VertexId) {
        let person = store.add_vertex(
            "person",
            PropertyMap::new().with("name", "marko").with("age", 30),
        );
        let job = store.add_vertex(
            "job",
            PropertyMap::new()
                .with("name", "Software Engineer")
                .with("company", "abcdefgh"),
        );
        (person, job)
    }

    #[test]
    fn test_add_and_get_vertex() {
        let mut store = GraphStore::new();
        let (person, _) = marko_and_job(&mut store);

        assert_eq!(store.vertex_count(), 2);
        let vertex = store.get_vertex(person).unwrap();
        assert_eq!(vertex.id, person);
        assert_eq!(vertex.label.as_str(), "person");
        assert_eq!(vertex.property("name").unwrap().as_string(), Some("marko"));
        assert_eq!(vertex.property("age").unwrap().as_integer(), Some(30));
    }

    #[test]
    fn test_add_and_get_edge() {
        let mut store = GraphStore::new();
        let (person, job) = marko_and_job(&mut store);

        let edge_id = store.add_edge("works", person, job, PropertyMap::new()).unwrap();

        assert_eq!(store.edge_count(), 1);
        let edge = store.get_edge(edge_id).unwrap();
        assert_eq!(edge.source, person);
        assert_eq!(edge.target, job);
        assert_eq!(edge.label, Label::new("works"));
    }

    #[test]
    fn test_dangling_edge_leaves_store_unchanged() {
        let mut store = GraphStore::new();
        let (person, _) = marko_and_job(&mut store);
        let missing = VertexId::new(999);
        let before = store.next_ids();

        let result = store.add_edge("works", missing, person, PropertyMap::new());
        assert_eq!(result, Err(GraphError::DanglingSource(missing)));

        let result = store.add_edge("works", person, missing, PropertyMap::new());
        assert_eq!(result, Err(GraphError::DanglingTarget(missing)));
        assert!(result.unwrap_err().is_dangling_reference());

        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.degree(person, Direction::Out), 0);
        assert_eq!(store.next_ids(), before);
    }

    #[test]
    fn test_adjacency_order_and_labels() {
        let mut store = GraphStore::new();
        let a = store.add_vertex("person", PropertyMap::new());
        let b = store.add_vertex("person", PropertyMap::new());
        let c = store.add_vertex("person", PropertyMap::new());

        store.add_edge("knows", a, b, PropertyMap::new()).unwrap();
        store.add_edge("created", a, c, PropertyMap::new()).unwrap();
        store.add_edge("knows", a, c, PropertyMap::new()).unwrap();

        let targets: Vec<_> = store.out_edges(a, &[]).map(|e| e.target).collect();
        assert_eq!(targets, vec![b, c, c]);

        let knows = [Label::new("knows")];
        let targets: Vec<_> = store.out_edges(a, &knows).map(|e| e.target).collect();
        assert_eq!(targets, vec![b, c]);

        let both = [Label::new("created"), Label::new("knows")];
        assert_eq!(store.out_edges(a, &both).count(), 3);

        let sources: Vec<_> = store.in_edges(c, &[]).map(|e| e.source).collect();
        assert_eq!(sources, vec![a, a]);
    }

    #[test]
    fn test_remove_vertex_cascades_edges() {
        let mut store = GraphStore::new();
        let a = store.add_vertex("person", PropertyMap::new());
        let b = store.add_vertex("person", PropertyMap::new());
        let c = store.add_vertex("person", PropertyMap::new());

        store.add_edge("knows", a, b, PropertyMap::new()).unwrap();
        store.add_edge("knows", b, c, PropertyMap::new()).unwrap();
        store.add_edge("knows", c, a, PropertyMap::new()).unwrap();
        store.add_edge("self", b, b, PropertyMap::new()).unwrap();

        let removed = store.remove_vertex(b).unwrap();
        assert_eq!(removed.id, b);
        assert_eq!(store.vertex_count(), 2);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.out_edges(a, &[]).count(), 0);
        assert_eq!(store.in_edges(c, &[]).count(), 0);
        assert!(store.get_vertex(b).unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_missing_elements() {
        let mut store = GraphStore::new();
        assert_eq!(
            store.remove_vertex(VertexId::new(1)).unwrap_err(),
            GraphError::VertexNotFound(VertexId::new(1))
        );
        assert_eq!(
            store.remove_edge(EdgeId::new(3)).unwrap_err(),
            GraphError::EdgeNotFound(EdgeId::new(3))
        );
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = GraphStore::new();
        let first = store.add_vertex("a", PropertyMap::new());
        store.remove_vertex(first).unwrap();
        let second = store.add_vertex("a", PropertyMap::new());
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let mut store = GraphStore::new();
        let ids: Vec<_> = (0..5)
            .map(|i| store.add_vertex("n", PropertyMap::new().with("i", i)))
            .collect();
        store.remove_vertex(ids[2]).unwrap();

        let seen: Vec<_> = store.all_vertices().map(|v| v.id).collect();
        assert_eq!(seen, vec![ids[0], ids[1], ids[3], ids[4]]);

        let tail: Vec<_> = store.vertices_from(ids[3].as_u64()).map(|v| v.id).collect();
        assert_eq!(tail, vec![ids[3], ids[4]]);
    }

    #[test]
    fn test_property_writes() {
        let mut store = GraphStore::new();
        let (person, job) = marko_and_job(&mut store);
        let edge = store.add_edge("works", person, job, PropertyMap::new()).unwrap();

        store
            .set_vertex_property(person, "hobbies", "Reading books", Cardinality::List)
            .unwrap();
        store
            .set_vertex_property(person, "hobbies", "Playing Video Games", Cardinality::List)
            .unwrap();
        assert_eq!(store.vertex_properties(person, "hobbies").unwrap().len(), 2);

        let err = store
            .set_vertex_property(person, "name", "marko", Cardinality::List)
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidCardinality { .. }));

        store
            .set_edge_property(edge, "since", 2020, Cardinality::Single)
            .unwrap();
        assert_eq!(
            store.get_edge(edge).unwrap().property("since"),
            Some(&PropertyValue::Integer(2020))
        );

        let removed = store.remove_vertex_property(person, "hobbies").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.vertex_properties(person, "hobbies").unwrap().is_empty());
    }

    #[test]
    fn test_statistics() {
        let mut store = GraphStore::new();
        let (person, job) = marko_and_job(&mut store);
        store.add_edge("works", person, job, PropertyMap::new()).unwrap();

        let stats = store.statistics();
        assert_eq!(stats.vertex_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.vertices_by_label.get(&Label::new("person")), Some(&1));
        assert_eq!(stats.edges_by_label.get(&Label::new("works")), Some(&1));
    }

    #[test]
    fn test_rollback_restores_everything() {
        let mut store = GraphStore::new();
        let (person, job) = marko_and_job(&mut store);
        let works = store.add_edge("works", person, job, PropertyMap::new()).unwrap();
        let before = crate::persistence::GraphSnapshot::capture(&store);

        store.begin_journal();
        let extra = store.add_vertex("person", PropertyMap::new());
        store.add_edge("knows", extra, person, PropertyMap::new()).unwrap();
        store
            .set_vertex_property(person, "name", "vadas", Cardinality::Single)
            .unwrap();
        store
            .set_edge_property(works, "since", 2020, Cardinality::Single)
            .unwrap();
        store.remove_vertex_property(job, "company").unwrap();
        store.remove_vertex(person).unwrap();
        store.rollback_journal();

        let mut after = crate::persistence::GraphSnapshot::capture(&store);
        // Spent ids stay spent
        assert_eq!(after.next_vertex_id, 4);
        assert_eq!(after.next_edge_id, 3);
        after.next_vertex_id = before.next_vertex_id;
        after.next_edge_id = before.next_edge_id;
        assert_eq!(after, before);

        let targets: Vec<_> = store.out_edges(person, &[]).map(|e| e.target).collect();
        assert_eq!(targets, vec![job]);
        assert_eq!(store.in_edges(job, &[]).count(), 1);
        assert_eq!(store.degree(person, Direction::In), 0);
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut store = GraphStore::new();
        store.begin_journal();
        let id = store.add_vertex("person", PropertyMap::new());
        store.commit_journal();
        store.rollback_journal();
        assert!(store.has_vertex(id));
    }

    #[test]
    fn test_cursor_resumes_after_removed_edge() {
        let mut store = GraphStore::new();
        let hub = store.add_vertex("hub", PropertyMap::new());
        let spokes: Vec<_> = (0..3).map(|_| store.add_vertex("spoke", PropertyMap::new())).collect();
        let edges: Vec<_> = spokes
            .iter()
            .map(|&spoke| store.add_edge("links", hub, spoke, PropertyMap::new()).unwrap())
            .collect();

        let first = store.next_incident_edge(hub, Direction::Out, &[], None).unwrap().id;
        assert_eq!(first, edges[0]);
        store.remove_edge(first).unwrap();

        let second = store.next_incident_edge(hub, Direction::Out, &[], Some(first)).unwrap().id;
        assert_eq!(second, edges[1]);
    }

    #[test]
    fn test_recovered_elements_keep_ids() {
        let mut store = GraphStore::new();
        store
            .insert_recovered_vertex(Vertex::new(VertexId::new(5), "person"))
            .unwrap();
        store
            .insert_recovered_vertex(Vertex::new(VertexId::new(9), "job"))
            .unwrap();
        store
            .insert_recovered_edge(Edge::new(EdgeId::new(4), VertexId::new(5), VertexId::new(9), "works"))
            .unwrap();

        assert_eq!(
            store.insert_recovered_vertex(Vertex::new(VertexId::new(5), "dup")),
            Err(GraphError::VertexAlreadyExists(VertexId::new(5)))
        );
        assert_eq!(store.next_ids(), (10, 5));
        assert_eq!(store.add_vertex("next", PropertyMap::new()), VertexId::new(10));
    }
}
