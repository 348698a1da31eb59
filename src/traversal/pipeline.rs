//! Traversal builder and terminal operations

use super::step::{
    DropStep, EdgeVertexStep, GraphAccess, HasCondition, HasStep, LimitStep, ProjectStep, Projection, PropertyStep,
    StepBox, ValuesStep, VertexStep,
};
use super::{TraversalError, TraversalResult, Traverser};
use crate::graph::{Cardinality, Direction, GraphHandle, Label, PropertyValue};
use rustc_hash::FxHashSet;

/// A lazily evaluated chain of steps over one graph.
///
/// Step methods consume and return the traversal; nothing runs until a
/// terminal pulls from it. A traversal is single-use: consuming terminals
/// take it by value, and `next()` advances it.
///
/// Each pull holds the graph lock only for its own duration: the read lock,
/// or the write lock when any step mutates. `to_list`, `to_set`, `count` and
/// `iterate` pull everything under a single acquisition. A pull that fails
/// undoes its own writes.
pub struct Traversal {
    graph: GraphHandle,
    step: StepBox,
    mutating: bool,
    /// Element fetched by `has_next()` and not yet handed out
    peeked: Option<Traverser>,
}

impl Traversal {
    pub(crate) fn new(graph: GraphHandle, step: StepBox) -> Self {
        let mutating = step.is_mutating();
        Self {
            graph,
            step,
            mutating,
            peeked: None,
        }
    }

    fn push(mut self, wrap: impl FnOnce(StepBox) -> StepBox) -> Self {
        let step = wrap(self.step);
        self.mutating |= step.is_mutating();
        self.step = step;
        self
    }

    fn filter(self, condition: HasCondition) -> Self {
        self.push(|input| Box::new(HasStep::new(input, condition)))
    }

    fn navigate(self, direction: Direction, labels: &[&str], emit_edges: bool) -> Self {
        let labels = labels.iter().map(|&label| Label::new(label)).collect();
        self.push(|input| Box::new(VertexStep::new(input, direction, labels, emit_edges)))
    }

    /// Keep elements with at least one value under `key`
    pub fn has_key(self, key: impl Into<String>) -> Self {
        self.filter(HasCondition::Key(key.into()))
    }

    /// Keep elements where `value` is among the values stored under `key`
    pub fn has(self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.filter(HasCondition::Value(key.into(), value.into()))
    }

    /// Keep elements with no value under `key`
    pub fn has_not(self, key: impl Into<String>) -> Self {
        self.filter(HasCondition::Missing(key.into()))
    }

    /// Keep elements whose label is one of `labels`
    pub fn has_label(self, labels: &[&str]) -> Self {
        self.filter(HasCondition::Label(labels.iter().map(|&label| Label::new(label)).collect()))
    }

    /// Adjacent vertices along outgoing edges with one of `labels` (any when empty)
    pub fn out(self, labels: &[&str]) -> Self {
        self.navigate(Direction::Out, labels, false)
    }

    /// Adjacent vertices along incoming edges with one of `labels` (any when empty)
    pub fn in_(self, labels: &[&str]) -> Self {
        self.navigate(Direction::In, labels, false)
    }

    pub fn out_e(self, labels: &[&str]) -> Self {
        self.navigate(Direction::Out, labels, true)
    }

    pub fn in_e(self, labels: &[&str]) -> Self {
        self.navigate(Direction::In, labels, true)
    }

    /// Source vertex of each edge
    pub fn out_v(self) -> Self {
        self.push(|input| Box::new(EdgeVertexStep::new(input, Direction::Out)))
    }

    /// Target vertex of each edge
    pub fn in_v(self) -> Self {
        self.push(|input| Box::new(EdgeVertexStep::new(input, Direction::In)))
    }

    /// Every value stored under `key`, in insertion order
    pub fn values(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.push(|input| Box::new(ValuesStep::new(input, key)))
    }

    pub fn label(self) -> Self {
        self.push(|input| Box::new(ProjectStep::new(input, Projection::Label)))
    }

    pub fn id(self) -> Self {
        self.push(|input| Box::new(ProjectStep::new(input, Projection::Id)))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.push(|input| Box::new(LimitStep::new(input, limit)))
    }

    /// Write a single-valued property on every element flowing through
    pub fn property(self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.property_with(Cardinality::Single, key, value)
    }

    /// Write a property with an explicit cardinality
    pub fn property_with(
        self,
        cardinality: Cardinality,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        let (key, value) = (key.into(), value.into());
        self.push(|input| Box::new(PropertyStep::new(input, key, value, cardinality)))
    }

    /// Remove every element flowing through. Removing a vertex removes its
    /// incident edges as well.
    pub fn drop(self) -> Self {
        self.push(|input| Box::new(DropStep::new(input)))
    }

    /// Whether any step writes to the graph
    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    /// Run one pull. A mutating pull that fails is rolled back, leaving the
    /// store as it was before the pull.
    fn with_access<T>(
        &mut self,
        f: impl FnOnce(&mut StepBox, &mut GraphAccess<'_>) -> TraversalResult<T>,
    ) -> TraversalResult<T> {
        if self.mutating {
            let mut store = self.graph.write();
            store.begin_journal();
            let result = f(&mut self.step, &mut GraphAccess::Write(&mut store));
            match result {
                Ok(_) => store.commit_journal(),
                Err(_) => store.rollback_journal(),
            }
            result
        } else {
            let store = self.graph.read();
            f(&mut self.step, &mut GraphAccess::Read(&store))
        }
    }

    /// Next element, or `None` once exhausted
    pub fn try_next(&mut self) -> TraversalResult<Option<Traverser>> {
        if let Some(traverser) = self.peeked.take() {
            return Ok(Some(traverser));
        }
        self.with_access(pull)
    }

    /// Next element; `NoSuchElement` once exhausted. Later calls keep
    /// reporting `NoSuchElement`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> TraversalResult<Traverser> {
        self.try_next()?.ok_or(TraversalError::NoSuchElement)
    }

    pub fn has_next(&mut self) -> TraversalResult<bool> {
        if self.peeked.is_none() {
            self.peeked = self.with_access(pull)?;
        }
        Ok(self.peeked.is_some())
    }

    /// Every remaining element, in order, duplicates kept
    pub fn to_list(mut self) -> TraversalResult<Vec<Traverser>> {
        let mut out: Vec<Traverser> = self.peeked.take().into_iter().collect();
        self.with_access(|step, graph| -> TraversalResult<()> {
            while let Some(traverser) = pull(step, graph)? {
                out.push(traverser);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Every remaining element, deduplicated: elements by id, values by value
    pub fn to_set(mut self) -> TraversalResult<FxHashSet<Traverser>> {
        let mut out: FxHashSet<Traverser> = self.peeked.take().into_iter().collect();
        self.with_access(|step, graph| -> TraversalResult<()> {
            while let Some(traverser) = pull(step, graph)? {
                out.insert(traverser);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Number of remaining elements
    pub fn count(mut self) -> TraversalResult<usize> {
        let mut count = usize::from(self.peeked.take().is_some());
        self.with_access(|step, graph| -> TraversalResult<()> {
            while pull(step, graph)?.is_some() {
                count += 1;
            }
            Ok(())
        })?;
        Ok(count)
    }

    /// Run the traversal for its side effects, discarding the output
    pub fn iterate(mut self) -> TraversalResult<()> {
        self.peeked = None;
        self.with_access(|step, graph| -> TraversalResult<()> {
            while step.next(graph)?.is_some() {}
            Ok(())
        })
    }

    /// Pull elements one at a time through an iterator
    pub fn to_stream(self) -> TraversalStream {
        TraversalStream {
            traversal: self,
            failed: false,
        }
    }
}

/// Pull until a token resolves to a live element
fn pull(step: &mut StepBox, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Traverser>> {
    while let Some(token) = step.next(graph)? {
        if let Some(traverser) = token.resolve(graph.store()) {
            return Ok(Some(traverser));
        }
    }
    Ok(None)
}

impl IntoIterator for Traversal {
    type Item = TraversalResult<Traverser>;
    type IntoIter = TraversalStream;

    fn into_iter(self) -> Self::IntoIter {
        self.to_stream()
    }
}

/// Iterator over a traversal; ends after the first error
pub struct TraversalStream {
    traversal: Traversal,
    failed: bool,
}

impl Iterator for TraversalStream {
    type Item = TraversalResult<Traverser>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.traversal.try_next() {
            Ok(Some(traverser)) => Some(Ok(traverser)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
