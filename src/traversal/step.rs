//! Traversal steps (Volcano iterator model)
//!
//! Every step wraps its input step and is pulled through [`Step::next`].
//! Graph access is passed in on each pull; between pulls a step keeps only
//! identifiers and cursors, never references into the store.

use super::{TraversalError, TraversalResult, Traverser};
use crate::graph::{
    Cardinality, Direction, Edge, EdgeId, GraphStore, Label, PropertyMap, PropertyValue, Vertex, VertexId,
};

/// What flows between steps: element ids or projected values
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Vertex(VertexId),
    Edge(EdgeId),
    Value(PropertyValue),
}

impl Token {
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Vertex(_) => "vertex",
            Token::Edge(_) => "edge",
            Token::Value(_) => "value",
        }
    }

    /// Copy the element out of the store; `None` if it has been removed
    pub fn resolve(self, store: &GraphStore) -> Option<Traverser> {
        match self {
            Token::Vertex(id) => store.vertex(id).cloned().map(Traverser::Vertex),
            Token::Edge(id) => store.edge(id).cloned().map(Traverser::Edge),
            Token::Value(value) => Some(Traverser::Value(value)),
        }
    }
}

fn unexpected(step: &'static str, token: &Token) -> TraversalError {
    TraversalError::UnexpectedElement {
        step,
        found: token.kind(),
    }
}

/// Store access for one pull: shared for read-only pipelines, exclusive
/// when any step mutates
pub enum GraphAccess<'a> {
    Read(&'a GraphStore),
    Write(&'a mut GraphStore),
}

impl GraphAccess<'_> {
    pub fn store(&self) -> &GraphStore {
        match self {
            GraphAccess::Read(store) => *store,
            GraphAccess::Write(store) => &**store,
        }
    }

    pub fn store_mut(&mut self) -> TraversalResult<&mut GraphStore> {
        match self {
            GraphAccess::Write(store) => Ok(&mut **store),
            GraphAccess::Read(_) => Err(TraversalError::ReadOnly),
        }
    }
}

/// Physical step trait
pub trait Step: Send {
    /// Produce the next token, or `None` once exhausted
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>>;

    /// Returns true if this step writes to the graph store
    fn is_mutating(&self) -> bool {
        false
    }
}

/// Type alias for boxed steps
pub type StepBox = Box<dyn Step>;

/// A live vertex or edge looked up for a token
enum Element<'a> {
    Vertex(&'a Vertex),
    Edge(&'a Edge),
}

impl<'a> Element<'a> {
    /// Fails on value tokens; `None` when the element has been removed
    fn lookup(store: &'a GraphStore, token: &Token, step: &'static str) -> TraversalResult<Option<Self>> {
        match token {
            Token::Vertex(id) => Ok(store.vertex(*id).map(Element::Vertex)),
            Token::Edge(id) => Ok(store.edge(*id).map(Element::Edge)),
            Token::Value(_) => Err(unexpected(step, token)),
        }
    }

    fn label(&self) -> &'a Label {
        match self {
            Element::Vertex(vertex) => &vertex.label,
            Element::Edge(edge) => &edge.label,
        }
    }

    fn properties(&self) -> &'a PropertyMap {
        match self {
            Element::Vertex(vertex) => &vertex.properties,
            Element::Edge(edge) => &edge.properties,
        }
    }
}

/// V(): vertices in insertion order, or the given ids in the given order
pub struct VertexScan {
    ids: Option<Vec<VertexId>>,
    pos: u64,
}

impl VertexScan {
    pub fn all() -> Self {
        Self { ids: None, pos: 0 }
    }

    /// Ids that do not exist when reached are skipped
    pub fn with_ids(ids: Vec<VertexId>) -> Self {
        Self { ids: Some(ids), pos: 0 }
    }
}

impl Step for VertexScan {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        let store = graph.store();
        match &self.ids {
            None => {
                let next = store.vertices_from(self.pos).next().map(|v| v.id);
                if let Some(id) = next {
                    self.pos = id.as_u64() + 1;
                }
                Ok(next.map(Token::Vertex))
            }
            Some(ids) => {
                while let Some(&id) = ids.get(self.pos as usize) {
                    self.pos += 1;
                    if store.has_vertex(id) {
                        return Ok(Some(Token::Vertex(id)));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// E(): edges in insertion order, or the given ids in the given order
pub struct EdgeScan {
    ids: Option<Vec<EdgeId>>,
    pos: u64,
}

impl EdgeScan {
    pub fn all() -> Self {
        Self { ids: None, pos: 0 }
    }

    pub fn with_ids(ids: Vec<EdgeId>) -> Self {
        Self { ids: Some(ids), pos: 0 }
    }
}

impl Step for EdgeScan {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        let store = graph.store();
        match &self.ids {
            None => {
                let next = store.edges_from(self.pos).next().map(|e| e.id);
                if let Some(id) = next {
                    self.pos = id.as_u64() + 1;
                }
                Ok(next.map(Token::Edge))
            }
            Some(ids) => {
                while let Some(&id) = ids.get(self.pos as usize) {
                    self.pos += 1;
                    if store.has_edge(id) {
                        return Ok(Some(Token::Edge(id)));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Condition checked by [`HasStep`]
#[derive(Debug, Clone)]
pub enum HasCondition {
    /// At least one value under the key
    Key(String),
    /// The value is among the values stored under the key
    Value(String, PropertyValue),
    /// No value under the key
    Missing(String),
    /// Label is one of these
    Label(Vec<Label>),
}

impl HasCondition {
    fn step_name(&self) -> &'static str {
        match self {
            HasCondition::Key(_) | HasCondition::Value(..) => "has",
            HasCondition::Missing(_) => "hasNot",
            HasCondition::Label(_) => "hasLabel",
        }
    }

    fn matches(&self, element: &Element<'_>) -> bool {
        match self {
            HasCondition::Key(key) => element.properties().contains_key(key),
            HasCondition::Value(key, value) => element.properties().contains_value(key, value),
            HasCondition::Missing(key) => !element.properties().contains_key(key),
            HasCondition::Label(labels) => labels.contains(element.label()),
        }
    }
}

/// Filter: has(), hasNot(), hasLabel()
pub struct HasStep {
    input: StepBox,
    condition: HasCondition,
}

impl HasStep {
    pub fn new(input: StepBox, condition: HasCondition) -> Self {
        Self { input, condition }
    }
}

impl Step for HasStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        while let Some(token) = self.input.next(graph)? {
            let keep = Element::lookup(graph.store(), &token, self.condition.step_name())?
                .map(|element| self.condition.matches(&element))
                .unwrap_or(false);
            if keep {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }
}

/// Navigation from vertices along incident edges: out(), in(), outE(), inE()
pub struct VertexStep {
    input: StepBox,
    direction: Direction,
    labels: Vec<Label>,
    emit_edges: bool,
    /// Vertex being expanded and the last edge taken from it
    current: Option<(VertexId, Option<EdgeId>)>,
}

impl VertexStep {
    pub fn new(input: StepBox, direction: Direction, labels: Vec<Label>, emit_edges: bool) -> Self {
        Self {
            input,
            direction,
            labels,
            emit_edges,
            current: None,
        }
    }

    fn name(&self) -> &'static str {
        match (self.direction, self.emit_edges) {
            (Direction::Out, false) => "out",
            (Direction::In, false) => "in",
            (Direction::Out, true) => "outE",
            (Direction::In, true) => "inE",
        }
    }
}

impl Step for VertexStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        loop {
            if let Some((vertex, after)) = self.current {
                let found = graph
                    .store()
                    .next_incident_edge(vertex, self.direction, &self.labels, after)
                    .map(|edge| (edge.id, edge.other_end(self.direction)));

                if let Some((edge, other)) = found {
                    self.current = Some((vertex, Some(edge)));
                    return Ok(Some(if self.emit_edges {
                        Token::Edge(edge)
                    } else {
                        Token::Vertex(other)
                    }));
                }
                self.current = None;
            }

            match self.input.next(graph)? {
                Some(Token::Vertex(id)) => self.current = Some((id, None)),
                Some(other) => return Err(unexpected(self.name(), &other)),
                None => return Ok(None),
            }
        }
    }
}

/// outV(), inV(): the source or target vertex of each edge
pub struct EdgeVertexStep {
    input: StepBox,
    direction: Direction,
}

impl EdgeVertexStep {
    pub fn new(input: StepBox, direction: Direction) -> Self {
        Self { input, direction }
    }
}

impl Step for EdgeVertexStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        while let Some(token) = self.input.next(graph)? {
            let id = match token {
                Token::Edge(id) => id,
                other => {
                    let step = match self.direction {
                        Direction::Out => "outV",
                        Direction::In => "inV",
                    };
                    return Err(unexpected(step, &other));
                }
            };
            if let Some(edge) = graph.store().edge(id) {
                return Ok(Some(Token::Vertex(edge.vertex(self.direction))));
            }
        }
        Ok(None)
    }
}

/// values(key): every value stored under a key, in insertion order
pub struct ValuesStep {
    input: StepBox,
    key: String,
    /// Element being projected and the next value position
    current: Option<(Token, usize)>,
}

impl ValuesStep {
    pub fn new(input: StepBox, key: String) -> Self {
        Self {
            input,
            key,
            current: None,
        }
    }
}

impl Step for ValuesStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        loop {
            if let Some((token, pos)) = &mut self.current {
                let value = Element::lookup(graph.store(), token, "values")?
                    .and_then(|element| element.properties().values(&self.key).get(*pos).cloned());
                if let Some(value) = value {
                    *pos += 1;
                    return Ok(Some(Token::Value(value)));
                }
                self.current = None;
            }

            let Some(token) = self.input.next(graph)? else {
                return Ok(None);
            };
            if let Token::Value(_) = token {
                return Err(unexpected("values", &token));
            }
            self.current = Some((token, 0));
        }
    }
}

/// What [`ProjectStep`] maps each element to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Label,
    Id,
}

/// label(), id()
pub struct ProjectStep {
    input: StepBox,
    projection: Projection,
}

impl ProjectStep {
    pub fn new(input: StepBox, projection: Projection) -> Self {
        Self { input, projection }
    }
}

impl Step for ProjectStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        while let Some(token) = self.input.next(graph)? {
            let value = match self.projection {
                Projection::Label => Element::lookup(graph.store(), &token, "label")?
                    .map(|element| PropertyValue::String(element.label().as_str().to_string())),
                Projection::Id => match &token {
                    Token::Vertex(id) if graph.store().has_vertex(*id) => Some(PropertyValue::Integer(id.as_u64() as i64)),
                    Token::Edge(id) if graph.store().has_edge(*id) => Some(PropertyValue::Integer(id.as_u64() as i64)),
                    Token::Value(_) => return Err(unexpected("id", &token)),
                    _ => None,
                },
            };
            if let Some(value) = value {
                return Ok(Some(Token::Value(value)));
            }
        }
        Ok(None)
    }
}

/// limit(n): stops pulling its input after n tokens
pub struct LimitStep {
    input: StepBox,
    remaining: usize,
}

impl LimitStep {
    pub fn new(input: StepBox, limit: usize) -> Self {
        Self {
            input,
            remaining: limit,
        }
    }
}

impl Step for LimitStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let token = self.input.next(graph)?;
        if token.is_some() {
            self.remaining -= 1;
        }
        Ok(token)
    }
}

/// addV(label) at the start of a traversal: creates one vertex when pulled
pub struct AddVertexStep {
    label: Label,
    done: bool,
}

impl AddVertexStep {
    pub fn new(label: Label) -> Self {
        Self { label, done: false }
    }
}

impl Step for AddVertexStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        if self.done {
            return Ok(None);
        }
        let id = graph
            .store_mut()?
            .add_vertex(self.label.clone(), PropertyMap::new());
        self.done = true;
        Ok(Some(Token::Vertex(id)))
    }

    fn is_mutating(&self) -> bool {
        true
    }
}

/// property(): writes one property on every element flowing through
pub struct PropertyStep {
    input: StepBox,
    key: String,
    value: PropertyValue,
    cardinality: Cardinality,
}

impl PropertyStep {
    pub fn new(input: StepBox, key: String, value: PropertyValue, cardinality: Cardinality) -> Self {
        Self {
            input,
            key,
            value,
            cardinality,
        }
    }
}

impl Step for PropertyStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        while let Some(token) = self.input.next(graph)? {
            let store = graph.store_mut()?;
            let written = match &token {
                Token::Vertex(id) if store.has_vertex(*id) => {
                    store.set_vertex_property(*id, self.key.clone(), self.value.clone(), self.cardinality)?;
                    true
                }
                Token::Edge(id) if store.has_edge(*id) => {
                    store.set_edge_property(*id, self.key.clone(), self.value.clone(), self.cardinality)?;
                    true
                }
                Token::Value(_) => return Err(unexpected("property", &token)),
                _ => false,
            };
            if written {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    fn is_mutating(&self) -> bool {
        true
    }
}

/// drop(): removes every element flowing through and emits nothing.
///
/// The input is drained before anything is removed, so a removal never
/// hides an element the steps feeding it have yet to reach.
pub struct DropStep {
    input: StepBox,
}

impl DropStep {
    pub fn new(input: StepBox) -> Self {
        Self { input }
    }
}

impl Step for DropStep {
    fn next(&mut self, graph: &mut GraphAccess<'_>) -> TraversalResult<Option<Token>> {
        let mut doomed = Vec::new();
        while let Some(token) = self.input.next(graph)? {
            if let Token::Value(_) = token {
                return Err(unexpected("drop", &token));
            }
            doomed.push(token);
        }

        let store = graph.store_mut()?;
        for token in doomed {
            match token {
                Token::Vertex(id) if store.has_vertex(id) => {
                    store.remove_vertex(id)?;
                }
                Token::Edge(id) if store.has_edge(id) => {
                    store.remove_edge(id)?;
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn is_mutating(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull_all(step: &mut StepBox, store: &GraphStore) -> Vec<Token> {
        let mut access = GraphAccess::Read(store);
        let mut out = Vec::new();
        while let Some(token) = step.next(&mut access).unwrap() {
            out.push(token);
        }
        out
    }

    fn sample() -> (GraphStore, VertexId, VertexId, VertexId) {
        let mut store = GraphStore::new();
        let a = store.add_vertex("person", PropertyMap::new().with("name", "a"));
        let b = store.add_vertex("person", PropertyMap::new().with("name", "b"));
        let c = store.add_vertex("job", PropertyMap::new().with("name", "c"));
        store.add_edge("knows", a, b, PropertyMap::new()).unwrap();
        store.add_edge("works", a, c, PropertyMap::new()).unwrap();
        store.add_edge("works", b, c, PropertyMap::new()).unwrap();
        (store, a, b, c)
    }

    #[test]
    fn test_vertex_scan_skips_removed() {
        let (mut store, a, b, c) = sample();
        store.remove_vertex(b).unwrap();

        let mut scan: StepBox = Box::new(VertexScan::all());
        assert_eq!(pull_all(&mut scan, &store), vec![Token::Vertex(a), Token::Vertex(c)]);

        let mut seeded: StepBox = Box::new(VertexScan::with_ids(vec![c, b, a]));
        assert_eq!(pull_all(&mut seeded, &store), vec![Token::Vertex(c), Token::Vertex(a)]);
    }

    #[test]
    fn test_navigation_filters_labels() {
        let (store, a, b, c) = sample();

        let mut out_all: StepBox = Box::new(VertexStep::new(
            Box::new(VertexScan::with_ids(vec![a])),
            Direction::Out,
            vec![],
            false,
        ));
        assert_eq!(pull_all(&mut out_all, &store), vec![Token::Vertex(b), Token::Vertex(c)]);

        let mut in_works: StepBox = Box::new(VertexStep::new(
            Box::new(VertexScan::with_ids(vec![c])),
            Direction::In,
            vec![Label::new("works")],
            false,
        ));
        assert_eq!(pull_all(&mut in_works, &store), vec![Token::Vertex(a), Token::Vertex(b)]);
    }

    #[test]
    fn test_navigation_rejects_values() {
        let (store, ..) = sample();
        let values: StepBox = Box::new(ValuesStep::new(Box::new(VertexScan::all()), "name".to_string()));
        let mut out: StepBox = Box::new(VertexStep::new(values, Direction::Out, vec![], false));

        let err = out.next(&mut GraphAccess::Read(&store)).unwrap_err();
        assert_eq!(
            err,
            TraversalError::UnexpectedElement {
                step: "out",
                found: "value"
            }
        );
    }

    #[test]
    fn test_limit_stops_pulling() {
        let (store, a, ..) = sample();
        let mut limited: StepBox = Box::new(LimitStep::new(Box::new(VertexScan::all()), 1));
        assert_eq!(pull_all(&mut limited, &store), vec![Token::Vertex(a)]);
    }

    #[test]
    fn test_mutating_step_needs_write_access() {
        let (store, ..) = sample();
        let mut add = AddVertexStep::new(Label::new("person"));
        assert!(add.is_mutating());
        assert_eq!(
            add.next(&mut GraphAccess::Read(&store)).unwrap_err(),
            TraversalError::ReadOnly
        );
    }

    #[test]
    fn test_drop_removes_all_edges_of_a_vertex() {
        let (mut store, a, ..) = sample();
        let out_edges: StepBox = Box::new(VertexStep::new(
            Box::new(VertexScan::with_ids(vec![a])),
            Direction::Out,
            vec![],
            true,
        ));
        let mut drop_step = DropStep::new(out_edges);

        assert!(drop_step.next(&mut GraphAccess::Write(&mut store)).unwrap().is_none());
        assert_eq!(store.degree(a, Direction::Out), 0);
        assert_eq!(store.edge_count(), 1);
    }
}
