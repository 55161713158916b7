use rand::Rng;
use rand::seq::SliceRandom;

use crate::EdgeDirection;
use crate::StaticGraph;
use crate::VertexIndex;

/// Generates a uniformly random permutation of `0..num_vertices`, for use with
/// [`StaticGraph::shuffle_vertices`] when no specific relabelling is wanted.
pub fn random_permutation<R: Rng + ?Sized>(rng: &mut R, num_vertices: usize) -> Vec<VertexIndex> {
    let mut perm: Vec<VertexIndex> = (0..num_vertices).map(VertexIndex::new).collect();
    perm.shuffle(rng);
    perm
}

/// Appends, for each vertex in `vertices`, between 1 and `2 * out_degree - 1` edges to
/// distinct targets drawn from `vertices` (so the average out-degree is `out_degree` and
/// every vertex keeps at least one move).
fn push_random_edges<R: Rng + ?Sized>(
    rng: &mut R,
    vertices: &[usize],
    out_degree: usize,
    edges: &mut Vec<(VertexIndex, VertexIndex)>,
) {
    let out_degree = out_degree.max(1);
    let mut targets = vertices.to_vec();
    for &from in vertices {
        let wanted = 1 + rng.random_range(0..2 * out_degree - 1);
        for n in 0..wanted.min(targets.len()) {
            let len = targets.len();
            targets.swap(n, n + rng.random_range(0..len - n));
            edges.push((VertexIndex::new(from), VertexIndex::new(targets[n])));
        }
    }
}

/// Appends a random cycle through all of `vertices`, tying them into one strongly
/// connected component.
fn push_spanning_cycle<R: Rng + ?Sized>(
    rng: &mut R,
    vertices: &[usize],
    edges: &mut Vec<(VertexIndex, VertexIndex)>,
) {
    if vertices.len() < 2 {
        return;
    }
    let mut order = vertices.to_vec();
    order.shuffle(rng);
    for window in order.windows(2) {
        edges.push((VertexIndex::new(window[0]), VertexIndex::new(window[1])));
    }
    edges.push((
        VertexIndex::new(*order.last().expect("cycle has vertices")),
        VertexIndex::new(order[0]),
    ));
}

/// Generates a random graph with `num_vertices` vertices and an average out-degree of
/// `out_degree` (minimum out-degree one, so the result is always proper). With
/// `single_component` set, a spanning cycle is added so the whole graph is one strongly
/// connected component.
pub fn make_random<R: Rng + ?Sized>(
    rng: &mut R,
    num_vertices: usize,
    out_degree: usize,
    direction: EdgeDirection,
    single_component: bool,
) -> StaticGraph {
    let vertices: Vec<usize> = (0..num_vertices).collect();
    let mut edges = Vec::with_capacity(num_vertices * out_degree.max(1));
    push_random_edges(rng, &vertices, out_degree, &mut edges);
    if single_component {
        push_spanning_cycle(rng, &vertices, &mut edges);
    }
    StaticGraph::assign(num_vertices, &edges, direction)
        .expect("generated edges are always within range")
}

/// Splits `vertices` into groups of at most `cluster_size`, recursively builds a clustered
/// game inside each group, then connects the groups like the vertices of one more random
/// game: every group-level edge becomes an edge between random members.
fn clustered_edges<R: Rng + ?Sized>(
    rng: &mut R,
    vertices: &[usize],
    cluster_size: usize,
    out_degree: usize,
    edges: &mut Vec<(VertexIndex, VertexIndex)>,
) {
    if vertices.len() <= cluster_size {
        push_random_edges(rng, vertices, out_degree, edges);
        push_spanning_cycle(rng, vertices, edges);
        return;
    }

    let group_size = vertices.len().div_ceil(cluster_size);
    let groups: Vec<&[usize]> = vertices.chunks(group_size).collect();
    for group in &groups {
        clustered_edges(rng, group, cluster_size, out_degree, edges);
    }

    // The groups themselves play the part of vertices one level up.
    let mut group_edges = Vec::new();
    let group_indices: Vec<usize> = (0..groups.len()).collect();
    push_random_edges(rng, &group_indices, out_degree, &mut group_edges);
    push_spanning_cycle(rng, &group_indices, &mut group_edges);

    for (from_group, to_group) in group_edges {
        let from = groups[from_group.value()];
        let to = groups[to_group.value()];
        if from_group == to_group {
            continue;
        }
        edges.push((
            VertexIndex::new(from[rng.random_range(0..from.len())]),
            VertexIndex::new(to[rng.random_range(0..to.len())]),
        ));
    }
}

/// Generates a random game graph with hierarchical structure: random games of (at most)
/// `cluster_size` vertices each are substituted for the vertices of another random game of
/// `cluster_size` clusters, repeatedly, until a single game remains. The result is one
/// strongly connected component.
///
/// Passing `cluster_size >= num_vertices` degenerates to a single-component
/// [`make_random`].
pub fn make_random_clustered<R: Rng + ?Sized>(
    rng: &mut R,
    num_vertices: usize,
    out_degree: usize,
    direction: EdgeDirection,
    cluster_size: usize,
) -> StaticGraph {
    let vertices: Vec<usize> = (0..num_vertices).collect();
    let mut edges = Vec::new();
    clustered_edges(rng, &vertices, cluster_size.max(2), out_degree, &mut edges);
    StaticGraph::assign(num_vertices, &edges, direction)
        .expect("generated edges are always within range")
}
