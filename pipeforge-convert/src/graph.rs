//! The conversion graph.
//!
//! Vertices are data types keyed by [`TypeKey`]. An edge `A -> B` means a
//! value of `A` can become a `B`:
//!
//! - *trivial* edges come from the type hierarchy (`A` is-a `B`) and carry
//!   no converter; they weigh as many hierarchy steps as they skip, and
//!   every registered type also has a trivial self-loop of weight 0
//! - *explicit* edges carry a [`DataConverter`] and weigh 1
//!
//! Cheapest paths are found with Dijkstra's algorithm. Adjacency is kept in
//! `BTreeMap`s keyed by vertex index (insertion order) and ties are broken by
//! vertex index, which makes the chosen path a deterministic function of the
//! graph.

use crate::converter::DataConverter;
use crate::data::{Data, DataValue};
use crate::error::{ConversionError, ConversionResult};
use crate::info::DataTypeInfo;
use pipeforge_types::TypeKey;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Trivial,
    Explicit,
}

/// One edge of a conversion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionStep {
    pub from: TypeKey,
    pub to: TypeKey,
    pub kind: StepKind,
}

/// A cheapest path between two types. Empty for the identity conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPath {
    steps: Vec<ConversionStep>,
    cost: usize,
}

impl ConversionPath {
    /// Hierarchy steps plus explicit edges; the conversion distance.
    #[must_use]
    pub fn cost(&self) -> usize {
        self.cost
    }

    #[must_use]
    pub fn steps(&self) -> &[ConversionStep] {
        &self.steps
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of edges that run a converter.
    #[must_use]
    pub fn explicit_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.kind == StepKind::Explicit)
            .count()
    }
}

enum Edge {
    /// Number of hierarchy steps between the endpoints.
    Trivial(usize),
    Explicit(Arc<dyn DataConverter>),
}

impl Edge {
    fn kind(&self) -> StepKind {
        match self {
            Edge::Trivial(_) => StepKind::Trivial,
            Edge::Explicit(_) => StepKind::Explicit,
        }
    }

    fn weight(&self) -> usize {
        match self {
            Edge::Trivial(steps) => *steps,
            Edge::Explicit(_) => 1,
        }
    }
}

/// Vertex indices of a cheapest path, both ends included, and its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Route {
    cost: usize,
    vertices: Arc<[usize]>,
}

struct Vertex {
    info: DataTypeInfo,
    /// False for types only known from a converter registration.
    registered: bool,
}

/// Memoised shortest paths, valid for one graph epoch.
#[derive(Default)]
struct PathCache {
    epoch: u64,
    paths: HashMap<(usize, usize), Option<Route>>,
}

#[derive(Default)]
pub struct ConversionGraph {
    vertices: Vec<Vertex>,
    index: HashMap<TypeKey, usize>,
    /// `edges[a][b]` is the edge `a -> b`.
    edges: Vec<BTreeMap<usize, Edge>>,
    epoch: u64,
    cache: RwLock<PathCache>,
}

impl ConversionGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ================================================================
    // Mutation
    // ================================================================

    /// Adds a data type: its vertex, its self-loop, and trivial edges to and
    /// from every known type its lineage relates it to.
    pub fn register(&mut self, info: DataTypeInfo) {
        let key = info.key();
        let idx = match self.index.get(&key) {
            Some(&idx) => {
                // Replaces the copy a converter registration may have added.
                self.vertices[idx].info = info;
                self.link_hierarchy(idx);
                idx
            }
            None => self.ensure_vertex(info),
        };
        self.vertices[idx].registered = true;
        self.edges[idx].entry(idx).or_insert(Edge::Trivial(0));
        debug!(data_type = %key, "Data type added to conversion graph");
        self.invalidate();
    }

    /// Adds or replaces the explicit edge `input -> output`. Unknown endpoint
    /// types are added as vertices.
    pub fn register_converter(&mut self, converter: Arc<dyn DataConverter>) {
        let from = self.ensure_vertex(converter.input().clone());
        let to = self.ensure_vertex(converter.output().clone());
        debug!(
            from = %self.vertices[from].info.key(),
            to = %self.vertices[to].info.key(),
            "Converter registered"
        );
        self.edges[from].insert(to, Edge::Explicit(converter));
        self.invalidate();
    }

    fn ensure_vertex(&mut self, info: DataTypeInfo) -> usize {
        if let Some(&idx) = self.index.get(&info.key()) {
            return idx;
        }

        let idx = self.vertices.len();
        self.index.insert(info.key(), idx);
        self.vertices.push(Vertex {
            info,
            registered: false,
        });
        self.edges.push(BTreeMap::new());
        self.link_hierarchy(idx);
        idx
    }

    /// Inserts trivial edges between `idx` and every other vertex.
    /// Explicit edges already present are kept.
    fn link_hierarchy(&mut self, idx: usize) {
        for other in 0..self.vertices.len() {
            if other == idx {
                continue;
            }
            let other_key = self.vertices[other].info.key();
            let own_key = self.vertices[idx].info.key();
            if let Some(steps) = self.vertices[idx].info.hierarchy_distance(other_key) {
                self.edges[idx].entry(other).or_insert(Edge::Trivial(steps));
            }
            if let Some(steps) = self.vertices[other].info.hierarchy_distance(own_key) {
                self.edges[other].entry(idx).or_insert(Edge::Trivial(steps));
            }
        }
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
        let cache = match self.cache.get_mut() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.paths.clear();
        cache.epoch = self.epoch;
    }

    // ================================================================
    // Queries
    // ================================================================

    /// True if `to` is `from` or one of its ancestors.
    #[must_use]
    pub fn is_trivially_convertible(from: &DataTypeInfo, to: &DataTypeInfo) -> bool {
        from.is_a(to.key())
    }

    #[must_use]
    pub fn is_convertible(&self, from: &DataTypeInfo, to: &DataTypeInfo) -> bool {
        Self::is_trivially_convertible(from, to) || self.path_indices(from.key(), to.key()).is_some()
    }

    /// `Some(0)` for identical types, the hierarchy distance for trivially
    /// convertible types, otherwise the cost of the cheapest path: every
    /// hierarchy step it takes plus one per converter. `None` if no path
    /// exists.
    #[must_use]
    pub fn conversion_distance(&self, from: &DataTypeInfo, to: &DataTypeInfo) -> Option<usize> {
        if let Some(steps) = from.hierarchy_distance(to.key()) {
            return Some(steps);
        }
        self.path_indices(from.key(), to.key()).map(|route| route.cost)
    }

    /// The cheapest path from `from` to `to` as a list of steps.
    #[must_use]
    pub fn shortest_path(&self, from: &DataTypeInfo, to: &DataTypeInfo) -> Option<ConversionPath> {
        if from.key() == to.key() {
            return Some(ConversionPath {
                steps: Vec::new(),
                cost: 0,
            });
        }
        let route = self.path_indices(from.key(), to.key())?;
        let steps = route
            .vertices
            .windows(2)
            .map(|pair| ConversionStep {
                from: self.vertices[pair[0]].info.key(),
                to: self.vertices[pair[1]].info.key(),
                kind: self.edges[pair[0]][&pair[1]].kind(),
            })
            .collect();
        Some(ConversionPath {
            steps,
            cost: route.cost,
        })
    }

    /// Converts `value` into `to`.
    ///
    /// Values that already are a `to` are returned unchanged. Otherwise the
    /// converters along the shortest path run in order; trivial steps pass
    /// the value through. Converter errors are returned as they are.
    pub fn convert(&self, value: &DataValue, to: &DataTypeInfo) -> ConversionResult<DataValue> {
        let data: &dyn Data = value.as_ref();
        let from_key = data.type_key();

        let trivially = match self.info(from_key) {
            Some(from) => Self::is_trivially_convertible(from, to),
            None => data.is_type(to.key()),
        };
        if trivially {
            return Ok(Arc::clone(value));
        }

        let route = self
            .path_indices(from_key, to.key())
            .ok_or_else(|| ConversionError::NoPath {
                from: self.describe(from_key),
                to: to.label(),
            })?;

        let mut current = Arc::clone(value);
        for pair in route.vertices.windows(2) {
            if let Edge::Explicit(converter) = &self.edges[pair[0]][&pair[1]] {
                trace!(
                    from = %self.vertices[pair[0]].info.key(),
                    to = %self.vertices[pair[1]].info.key(),
                    "Applying converter"
                );
                current = converter.convert(current.as_ref())?;
            }
        }

        if !current.as_ref().is_type(to.key()) {
            return Err(ConversionError::UnexpectedResult {
                expected: to.label(),
                actual: self.describe(current.as_ref().type_key()),
            });
        }
        Ok(current)
    }

    /// The info stored for a type, if it has a vertex.
    #[must_use]
    pub fn info(&self, key: TypeKey) -> Option<&DataTypeInfo> {
        self.index.get(&key).map(|&idx| &self.vertices[idx].info)
    }

    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.index.contains_key(&key)
    }

    /// True if the type was registered, not only referenced by a converter.
    #[must_use]
    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.index
            .get(&key)
            .is_some_and(|&idx| self.vertices[idx].registered)
    }

    /// Whether an edge `from -> to` exists, and of which kind.
    #[must_use]
    pub fn edge_kind(&self, from: TypeKey, to: TypeKey) -> Option<StepKind> {
        let from = *self.index.get(&from)?;
        let to = *self.index.get(&to)?;
        self.edges[from].get(&to).map(Edge::kind)
    }

    /// Types a value of `from` can be turned into in one step, excluding
    /// `from` itself.
    pub fn direct_targets(&self, from: TypeKey) -> impl Iterator<Item = &DataTypeInfo> {
        let idx = self.index.get(&from).copied();
        idx.into_iter().flat_map(move |idx| {
            self.edges[idx]
                .keys()
                .filter(move |&&to| to != idx)
                .map(move |&to| &self.vertices[to].info)
        })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(BTreeMap::len).sum()
    }

    /// Structural version; bumps on every mutation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn describe(&self, key: TypeKey) -> String {
        match self.info(key) {
            Some(info) => info.label(),
            None => key.name().to_string(),
        }
    }

    // ================================================================
    // Cheapest paths
    // ================================================================

    fn path_indices(&self, from: TypeKey, to: TypeKey) -> Option<Route> {
        let from = *self.index.get(&from)?;
        let to = *self.index.get(&to)?;

        {
            let cache = match self.cache.read() {
                Ok(cache) => cache,
                Err(poisoned) => poisoned.into_inner(),
            };
            if cache.epoch == self.epoch {
                if let Some(hit) = cache.paths.get(&(from, to)) {
                    return hit.clone();
                }
            }
        }

        let path = self.cheapest_route(from, to);
        let mut cache = match self.cache.write() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if cache.epoch != self.epoch {
            cache.paths.clear();
            cache.epoch = self.epoch;
        }
        cache.paths.insert((from, to), path.clone());
        path
    }

    fn cheapest_route(&self, from: usize, to: usize) -> Option<Route> {
        let mut cost: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut previous: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut heap = BinaryHeap::new();
        cost[from] = Some(0);
        heap.push(Reverse((0, from)));

        while let Some(Reverse((reached, current))) = heap.pop() {
            if cost[current].is_some_and(|best| reached > best) {
                continue;
            }
            if current == to {
                let mut vertices = vec![to];
                let mut cursor = to;
                while let Some(prev) = previous[cursor] {
                    vertices.push(prev);
                    cursor = prev;
                }
                vertices.reverse();
                return Some(Route {
                    cost: reached,
                    vertices: Arc::from(vertices),
                });
            }
            for (&next, edge) in &self.edges[current] {
                let candidate = reached + edge.weight();
                if cost[next].is_some_and(|best| candidate >= best) {
                    continue;
                }
                cost[next] = Some(candidate);
                previous[next] = Some(current);
                heap.push(Reverse((candidate, next)));
            }
        }
        None
    }
}

impl fmt::Debug for ConversionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionGraph")
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edge_count())
            .field("epoch", &self.epoch)
            .finish()
    }
}
