use std::collections::VecDeque;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use pg_game::ParityGame;
use pg_game::Player;
use pg_graph::VertexIndex;
use pg_graph::no_vertex;
use rustc_hash::FxHashSet;

/// A set of vertex indices, as used for the subgame scope passed to [`attractor`] and for
/// its result.
pub type VertexSet = BitVec<usize, Lsb0>;

/// An all-ones vertex set over `num_vertices` vertices.
pub fn full_vertex_set(num_vertices: usize) -> VertexSet {
    let mut set = VertexSet::repeat(false, num_vertices);
    set.set_elements(usize::MAX);
    set
}

/// Internal set representation used while growing the attractor: dense for large expected
/// results, sparse (hash-set backed) for small ones. The `V/3` threshold matches the
/// heuristic used by the original attractor implementation for choosing between dense and
/// sparse successor/predecessor bookkeeping.
enum GrowingSet {
    Dense(VertexSet),
    Sparse(FxHashSet<usize>),
}

impl GrowingSet {
    fn with_hint(num_vertices: usize, expected_size: usize) -> Self {
        if expected_size.saturating_mul(3) < num_vertices {
            GrowingSet::Sparse(FxHashSet::default())
        } else {
            GrowingSet::Dense(VertexSet::repeat(false, num_vertices))
        }
    }

    fn contains(&self, v: usize) -> bool {
        match self {
            GrowingSet::Dense(set) => set[v],
            GrowingSet::Sparse(set) => set.contains(&v),
        }
    }

    fn insert(&mut self, v: usize) {
        match self {
            GrowingSet::Dense(set) => set.set(v, true),
            GrowingSet::Sparse(set) => {
                set.insert(v);
            }
        }
    }

    fn into_dense(self, num_vertices: usize) -> VertexSet {
        match self {
            GrowingSet::Dense(set) => set,
            GrowingSet::Sparse(set) => {
                let mut dense = VertexSet::repeat(false, num_vertices);
                for v in set {
                    dense.set(v, true);
                }
                dense
            }
        }
    }
}

/// Computes the attractor of `player` to `target` within the vertex subset `within`.
///
/// The returned set `A ⊇ target` is the smallest set such that every `v ∈ A \ target`
/// owned by `player` has some successor in `A`, and every `v ∈ A \ target` owned by the
/// opponent has *all* of its successors (restricted to `within`) in `A`. `strategy[v]` is
/// set to the chosen successor for `player`-owned vertices pulled into the attractor, or to
/// [`no_vertex`] for opponent-owned vertices pulled in because all their moves lead into it.
///
/// Uses the liberties-counter algorithm: each opponent-owned vertex outside `within` or
/// outside the attractor is tracked by a remaining-liberties counter (successors, restricted
/// to `within`, not yet in the attractor), decremented as the attractor grows; the vertex is
/// pulled in once its counter reaches zero. This is `O(V + E)` overall, unlike the naive
/// variant that rescans every successor on every candidate.
pub fn attractor(
    game: &ParityGame,
    player: Player,
    within: &VertexSet,
    target: &VertexSet,
    strategy: &mut [VertexIndex],
) -> VertexSet {
    let num_vertices = game.num_of_vertices();
    let mut in_set = GrowingSet::with_hint(num_vertices, target.count_ones().max(1));
    let mut liberties: Vec<usize> = (0..num_vertices)
        .map(|v| {
            game.graph()
                .succ(VertexIndex::new(v))
                .filter(|w| within[w.value()])
                .count()
        })
        .collect();

    let mut queue: VecDeque<VertexIndex> = VecDeque::new();
    for v in target.iter_ones() {
        if within[v] && !in_set.contains(v) {
            in_set.insert(v);
            queue.push_back(VertexIndex::new(v));
        }
    }

    while let Some(w) = queue.pop_front() {
        for v in game.graph().pred(w) {
            if !within[v.value()] || in_set.contains(v.value()) {
                continue;
            }

            let pulled_in = if game.owner(v) == player {
                strategy[v.value()] = w;
                true
            } else {
                liberties[v.value()] -= 1;
                if liberties[v.value()] == 0 {
                    strategy[v.value()] = no_vertex();
                    true
                } else {
                    false
                }
            };

            if pulled_in {
                in_set.insert(v.value());
                queue.push_back(v);
            }
        }
    }

    in_set.into_dense(num_vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::Priority;
    use pg_graph::EdgeDirection;
    use pg_graph::StaticGraph;
    use pg_game::empty_strategy;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_attractor_monotone_and_contains_target() {
        // 0 -> 1 -> 2 -> 0, all Even-owned, even priorities.
        let edges = vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(0))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();
        let game = pg_game::ParityGame::from_parts(
            graph,
            vec![Player::Even; 3],
            vec![Priority::new(0), Priority::new(2), Priority::new(4)],
            5,
        )
        .unwrap();

        let within = full_vertex_set(3);
        let mut target = VertexSet::repeat(false, 3);
        target.set(0, true);

        let mut strategy = empty_strategy(3);
        let attracted = attractor(&game, Player::Even, &within, &target, &mut strategy);

        assert!(attracted[0]);
        assert!(attracted[1]);
        assert!(attracted[2]);
        assert_eq!(strategy[1], v(2));
        assert_eq!(strategy[2], v(0));
    }

    #[test]
    fn test_attractor_opponent_needs_all_successors() {
        // vertex 0 (Odd-owned) has two successors: 1 and 2. Only attracting via 1 should
        // not pull 0 in; attracting via both should.
        let edges = vec![(v(0), v(1)), (v(0), v(2))];
        let graph = StaticGraph::assign(3, &edges, EdgeDirection::Bidirectional).unwrap();
        let game = pg_game::ParityGame::from_parts(
            graph,
            vec![Player::Odd, Player::Even, Player::Even],
            vec![Priority::new(0), Priority::new(0), Priority::new(0)],
            1,
        )
        .unwrap();

        let within = full_vertex_set(3);
        let mut target = VertexSet::repeat(false, 3);
        target.set(1, true);

        let mut strategy = empty_strategy(3);
        let attracted = attractor(&game, Player::Even, &within, &target, &mut strategy);
        assert!(!attracted[0]);

        target.set(2, true);
        let mut strategy = empty_strategy(3);
        let attracted = attractor(&game, Player::Even, &within, &target, &mut strategy);
        assert!(attracted[0]);
    }
}
