//! Per-vertex adjacency index
//!
//! Each vertex keeps its incident edge ids twice: once in insertion order
//! and once grouped by edge label, so that navigation with no label and
//! navigation with a single label are both a straight walk over a list.
//!
//! Edge ids are handed out in increasing order, so every list is sorted by
//! id. A walk can therefore resume after the last id it saw, whatever was
//! removed in between.

use super::types::{Direction, EdgeId, Label};
use indexmap::IndexMap;

/// Incident edges of one direction
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    /// Every edge, in insertion order
    all: Vec<EdgeId>,
    /// Edges grouped by label, each group in insertion order
    by_label: IndexMap<Label, Vec<EdgeId>>,
}

impl EdgeList {
    fn insert(&mut self, label: &Label, edge: EdgeId) {
        insert_sorted(&mut self.all, edge);
        insert_sorted(self.by_label.entry(label.clone()).or_default(), edge);
    }

    fn remove(&mut self, label: &Label, edge: EdgeId) {
        self.all.retain(|&id| id != edge);
        if let Some(group) = self.by_label.get_mut(label) {
            group.retain(|&id| id != edge);
            if group.is_empty() {
                self.by_label.shift_remove(label);
            }
        }
    }

    /// Every edge in insertion order
    pub fn all(&self) -> &[EdgeId] {
        &self.all
    }

    /// Edges with `label`, in insertion order
    pub fn with_label(&self, label: &Label) -> &[EdgeId] {
        self.by_label.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Insert keeping `ids` sorted; a fresh id lands at the end
fn insert_sorted(ids: &mut Vec<EdgeId>, edge: EdgeId) {
    let at = ids.partition_point(|&id| id < edge);
    ids.insert(at, edge);
}

/// The part of a sorted id list strictly after `last` (all of it for `None`)
pub fn ids_after(ids: &[EdgeId], last: Option<EdgeId>) -> &[EdgeId] {
    match last {
        Some(last) => &ids[ids.partition_point(|&id| id <= last)..],
        None => ids,
    }
}

/// Outgoing and incoming edges of one vertex
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    outgoing: EdgeList,
    incoming: EdgeList,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, direction: Direction, label: &Label, edge: EdgeId) {
        self.list_mut(direction).insert(label, edge);
    }

    pub fn remove(&mut self, direction: Direction, label: &Label, edge: EdgeId) {
        self.list_mut(direction).remove(label, edge);
    }

    pub fn list(&self, direction: Direction) -> &EdgeList {
        match direction {
            Direction::Out => &self.outgoing,
            Direction::In => &self.incoming,
        }
    }

    fn list_mut(&mut self, direction: Direction) -> &mut EdgeList {
        match direction {
            Direction::Out => &mut self.outgoing,
            Direction::In => &mut self.incoming,
        }
    }

    /// Every incident edge id, outgoing first. Self-loops appear twice.
    pub fn incident(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.outgoing.all.iter().chain(self.incoming.all.iter()).copied()
    }

    pub fn degree(&self, direction: Direction) -> usize {
        self.list(direction).len()
    }
}
