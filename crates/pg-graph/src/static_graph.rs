use std::fmt;

use pg_utilities::PgError;
use pg_utilities::TagIndex;

/// Tag for [`VertexIndex`].
pub struct VertexTag;

/// Index of a vertex in a [`StaticGraph`], in range `[0, num_vertices())`.
pub type VertexIndex = TagIndex<usize, VertexTag>;

/// Sentinel meaning "no vertex", distinct from every legal index.
pub fn no_vertex() -> VertexIndex {
    VertexIndex::new(usize::MAX)
}

/// Returns whether `v` is the [`no_vertex`] sentinel.
pub fn is_no_vertex(v: VertexIndex) -> bool {
    v.value() == usize::MAX
}

/// Which adjacency lists a [`StaticGraph`] stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Successor,
    Predecessor,
    Bidirectional,
}

impl EdgeDirection {
    pub(crate) fn has_successors(self) -> bool {
        matches!(self, EdgeDirection::Successor | EdgeDirection::Bidirectional)
    }

    pub(crate) fn has_predecessors(self) -> bool {
        matches!(self, EdgeDirection::Predecessor | EdgeDirection::Bidirectional)
    }
}

/// A static directed graph of `V` vertices and `E` edges, storing successor and/or
/// predecessor adjacency lists in compressed-sparse-row form.
///
/// Each stored adjacency list is sorted ascending and duplicate-free; `succ(v) ∋ w ⇔
/// pred(w) ∋ v` whenever both directions are stored.
#[derive(Debug, Clone)]
pub struct StaticGraph {
    num_vertices: usize,
    num_edges: usize,
    direction: EdgeDirection,

    successors: Vec<VertexIndex>,
    successor_index: Vec<usize>,

    predecessors: Vec<VertexIndex>,
    predecessor_index: Vec<usize>,
}

impl StaticGraph {
    /// Constructs an empty graph.
    pub fn empty() -> Self {
        StaticGraph {
            num_vertices: 0,
            num_edges: 0,
            direction: EdgeDirection::Bidirectional,
            successors: Vec::new(),
            successor_index: vec![0],
            predecessors: Vec::new(),
            predecessor_index: vec![0],
        }
    }

    /// Resets this graph to the one described by `edges`, storing adjacency as requested
    /// by `direction`. Duplicate edges are folded; `num_vertices` must be at least one more
    /// than the largest endpoint occurring in `edges`.
    pub fn assign(
        num_vertices: usize,
        edges: &[(VertexIndex, VertexIndex)],
        direction: EdgeDirection,
    ) -> Result<Self, PgError> {
        for &(from, to) in edges {
            if from.value() >= num_vertices || to.value() >= num_vertices {
                return Err(PgError::InvalidInput {
                    reason: format!(
                        "edge ({from}, {to}) has an endpoint outside [0, {num_vertices})"
                    ),
                });
            }
        }

        let (successors, successor_index) = if direction.has_successors() {
            build_adjacency(num_vertices, edges.iter().map(|&(from, to)| (from, to)))
        } else {
            (Vec::new(), vec![0])
        };

        let (predecessors, predecessor_index) = if direction.has_predecessors() {
            build_adjacency(num_vertices, edges.iter().map(|&(from, to)| (to, from)))
        } else {
            (Vec::new(), vec![0])
        };

        let num_edges = if direction.has_successors() {
            successors.len()
        } else {
            predecessors.len()
        };

        Ok(StaticGraph {
            num_vertices,
            num_edges,
            direction,
            successors,
            successor_index,
            predecessors,
            predecessor_index,
        })
    }

    /// Builds the subgraph induced by `vertices` (renumbered `0..vertices.len()` in the
    /// order given). Edges with an endpoint outside `vertices` are dropped.
    ///
    /// Returns the induced subgraph and the old-to-new vertex map (`num_vertices()` long,
    /// [`no_vertex`] for vertices that were not selected). If `proper` is set and any
    /// selected vertex ends up with no outgoing edge, returns `PgError::InvalidInput`.
    pub fn make_subgraph(
        &self,
        vertices: &[VertexIndex],
        proper: bool,
        direction: EdgeDirection,
    ) -> Result<(StaticGraph, Vec<VertexIndex>), PgError> {
        let mut vertex_map = vec![no_vertex(); self.num_vertices];
        for (new_index, &old_index) in vertices.iter().enumerate() {
            vertex_map[old_index.value()] = VertexIndex::new(new_index);
        }

        let mut edges = Vec::new();
        for &old_from in vertices {
            let new_from = vertex_map[old_from.value()];
            for old_to in self.succ(old_from) {
                let new_to = vertex_map[old_to.value()];
                if !is_no_vertex(new_to) {
                    edges.push((new_from, new_to));
                }
            }
        }

        let subgraph = StaticGraph::assign(vertices.len(), &edges, direction)?;

        if proper {
            for v in subgraph.iter_vertices() {
                if subgraph.outdegree(v) == 0 {
                    return Err(PgError::InvalidInput {
                        reason: format!("vertex {v} has no outgoing edge in the induced subgraph"),
                    });
                }
            }
        }

        Ok((subgraph, vertex_map))
    }

    /// Removes the given edges from the graph, rebuilding the adjacency lists.
    pub fn remove_edges(&self, edges: &[(VertexIndex, VertexIndex)]) -> Result<StaticGraph, PgError> {
        let to_remove: std::collections::HashSet<(usize, usize)> =
            edges.iter().map(|&(a, b)| (a.value(), b.value())).collect();

        let remaining: Vec<(VertexIndex, VertexIndex)> = self
            .iter_vertices()
            .flat_map(|v| self.succ(v).map(move |w| (v, w)))
            .filter(|&(v, w)| !to_remove.contains(&(v.value(), w.value())))
            .collect();

        StaticGraph::assign(self.num_vertices, &remaining, self.direction)
    }

    /// Relabels vertex `v` to `perm[v]`, returning the relabelled graph.
    pub fn shuffle_vertices(&self, perm: &[VertexIndex]) -> Result<StaticGraph, PgError> {
        debug_assert_eq!(perm.len(), self.num_vertices);

        let edges: Vec<(VertexIndex, VertexIndex)> = self
            .iter_vertices()
            .flat_map(|v| self.succ(v).map(move |w| (v, w)))
            .map(|(v, w)| (perm[v.value()], perm[w.value()]))
            .collect();

        StaticGraph::assign(self.num_vertices, &edges, self.direction)
    }

    pub fn num_of_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_of_edges(&self) -> usize {
        self.num_edges
    }

    pub fn edge_direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        (0..self.num_vertices).map(VertexIndex::new)
    }

    /// Iterates over the successors of `v`, ascending. Requires successors to be stored.
    pub fn succ(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        debug_assert!(self.direction.has_successors());
        let start = self.successor_index[v.value()];
        let end = self.successor_index[v.value() + 1];
        self.successors[start..end].iter().copied()
    }

    /// Iterates over the predecessors of `v`, ascending. Requires predecessors to be stored.
    pub fn pred(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        debug_assert!(self.direction.has_predecessors());
        let start = self.predecessor_index[v.value()];
        let end = self.predecessor_index[v.value() + 1];
        self.predecessors[start..end].iter().copied()
    }

    pub fn has_succ(&self, v: VertexIndex, w: VertexIndex) -> bool {
        let start = self.successor_index[v.value()];
        let end = self.successor_index[v.value() + 1];
        self.successors[start..end].binary_search(&w).is_ok()
    }

    pub fn outdegree(&self, v: VertexIndex) -> usize {
        self.successor_index[v.value() + 1] - self.successor_index[v.value()]
    }

    pub fn indegree(&self, v: VertexIndex) -> usize {
        self.predecessor_index[v.value() + 1] - self.predecessor_index[v.value()]
    }

    pub fn degree(&self, v: VertexIndex) -> usize {
        self.indegree(v) + self.outdegree(v)
    }

    /// Raw successor adjacency arrays, used by the raw binary format.
    pub(crate) fn successor_arrays(&self) -> (&[VertexIndex], &[usize]) {
        (&self.successors, &self.successor_index)
    }

    /// Raw predecessor adjacency arrays, used by the raw binary format.
    pub(crate) fn predecessor_arrays(&self) -> (&[VertexIndex], &[usize]) {
        (&self.predecessors, &self.predecessor_index)
    }

    /// Reconstructs a graph directly from raw adjacency arrays, used by the raw binary format.
    pub(crate) fn from_raw_parts(
        num_vertices: usize,
        num_edges: usize,
        direction: EdgeDirection,
        successors: Vec<VertexIndex>,
        successor_index: Vec<usize>,
        predecessors: Vec<VertexIndex>,
        predecessor_index: Vec<usize>,
    ) -> Self {
        StaticGraph {
            num_vertices,
            num_edges,
            direction,
            successors,
            successor_index: if successor_index.is_empty() { vec![0] } else { successor_index },
            predecessors,
            predecessor_index: if predecessor_index.is_empty() { vec![0] } else { predecessor_index },
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeDirection::Successor => "successor",
            EdgeDirection::Predecessor => "predecessor",
            EdgeDirection::Bidirectional => "bidirectional",
        };
        write!(f, "{s}")
    }
}

/// Builds a compressed-sparse-row adjacency list: for every `(key, value)` pair, `value` is
/// placed in `key`'s bucket. Buckets are sorted ascending and deduplicated.
///
/// Two-pass construction: count bucket sizes, prefix-sum into offsets, then place.
fn build_adjacency(
    num_vertices: usize,
    pairs: impl Iterator<Item = (VertexIndex, VertexIndex)> + Clone,
) -> (Vec<VertexIndex>, Vec<usize>) {
    let mut index = vec![0usize; num_vertices + 1];
    for (key, _) in pairs.clone() {
        index[key.value() + 1] += 1;
    }
    for i in 0..num_vertices {
        index[i + 1] += index[i];
    }

    let mut cursor = index.clone();
    let mut adjacency = vec![no_vertex(); index[num_vertices]];
    for (key, value) in pairs {
        let slot = &mut cursor[key.value()];
        adjacency[*slot] = value;
        *slot += 1;
    }

    let mut write = 0;
    let mut deduped_index = vec![0usize; num_vertices + 1];
    for v in 0..num_vertices {
        let start = index[v];
        let end = index[v + 1];
        let bucket = &mut adjacency[start..end];
        bucket.sort_unstable();
        let mut last = None;
        for i in start..end {
            if last != Some(adjacency[i]) {
                adjacency[write] = adjacency[i];
                last = Some(adjacency[i]);
                write += 1;
            }
        }
        deduped_index[v + 1] = write;
    }
    adjacency.truncate(write);

    (adjacency, deduped_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_assign_and_iterate() {
        let edges = vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(0)), (v(0), v(1))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();

        assert_eq!(graph.num_of_vertices(), 3);
        assert_eq!(graph.num_of_edges(), 3);
        assert_eq!(graph.succ(v(0)).collect::<Vec<_>>(), vec![v(1)]);
        assert_eq!(graph.pred(v(1)).collect::<Vec<_>>(), vec![v(0)]);
        assert!(graph.has_succ(v(0), v(1)));
        assert!(!graph.has_succ(v(1), v(0)));
    }

    #[test]
    fn test_symmetry_invariant() {
        let edges = vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(0)), (v(2), v(1))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();

        for w in graph.iter_vertices() {
            for v_ in graph.pred(w) {
                assert!(graph.succ(v_).any(|x| x == w));
            }
        }
    }

    #[test]
    fn test_make_subgraph() {
        let edges = vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(0))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();

        let (sub, map) = graph
            .make_subgraph(&[v(0), v(2)], true, EdgeDirection::Bidirectional)
            .unwrap();

        assert_eq!(sub.num_of_vertices(), 2);
        assert_eq!(map[0], v(0));
        assert_eq!(map[2], v(1));
        assert!(is_no_vertex(map[1]));
        assert_eq!(sub.succ(v(1)).collect::<Vec<_>>(), vec![v(0)]);
    }

    #[test]
    fn test_make_subgraph_not_proper_fails() {
        let edges = vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(0))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();

        assert!(graph.make_subgraph(&[v(0)], true, EdgeDirection::Bidirectional).is_err());
    }

    #[test]
    fn test_out_of_range_edge_rejected() {
        let edges = vec![(v(0), v(5))];
        assert!(StaticGraph::assign(3, &edges, EdgeDirection::Successor).is_err());
    }
}
