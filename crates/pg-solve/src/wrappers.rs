use std::collections::VecDeque;

use pg_game::ParityGame;
use pg_game::Player;
use pg_graph::EdgeDirection;
use pg_graph::VertexIndex;
use pg_graph::is_no_vertex;
use pg_graph::no_vertex;
use pg_utilities::PgError;
use pg_utilities::check_abort;

use crate::VertexSet;
use crate::attractor;
use crate::full_vertex_set;
use crate::scc::strongly_connected_components;
use crate::spm::preprocess_self_loops;
use crate::spm::solve_spm;
use crate::statistics::LiftingStatistics;
use crate::zielonka::solve_zielonka;

/// A solving backend usable standalone or wrapped by a preprocessing layer.
///
/// Implementations write into `strategy` (sized `game.num_of_vertices()`) and return the set
/// of vertices won by Even, or `None` if the solve was aborted. `vmap` maps this game's
/// vertex indices to the outermost game's, for statistics attribution when `game` is a
/// wrapper's subgame; an empty slice is the identity.
pub trait Solver {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError>;
}

impl<T: Solver + ?Sized> Solver for Box<T> {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        (**self).solve(game, vmap, strategy, stats)
    }
}

/// Composes a subgame's local-to-outer map with the outer game's own map, so a doubly
/// nested subgame still attributes statistics to the outermost indices.
pub fn merge_vertex_maps(local: &[VertexIndex], outer: &[VertexIndex]) -> Vec<VertexIndex> {
    if outer.is_empty() {
        local.to_vec()
    } else {
        local.iter().map(|&v| outer[v.value()]).collect()
    }
}

/// A view of the outer strategy vector through a subgame's vertex-index map: writes of
/// locally-indexed moves land on the corresponding outer entries, translated to outer
/// indices. Winners stay reconstructible from the local owner plus the no-move sentinel.
pub struct Substrategy<'a> {
    outer: &'a mut [VertexIndex],
    map: &'a [VertexIndex],
}

impl<'a> Substrategy<'a> {
    /// `map[local]` is the outer index of local vertex `local` (the vertex list passed to
    /// `make_subgame`).
    pub fn new(outer: &'a mut [VertexIndex], map: &'a [VertexIndex]) -> Self {
        Substrategy { outer, map }
    }

    /// Records local vertex `local` moving to local vertex `mv` (or having no move).
    pub fn set(&mut self, local: usize, mv: VertexIndex) {
        self.outer[self.map[local].value()] = if is_no_vertex(mv) { no_vertex() } else { self.map[mv.value()] };
    }

    /// The winner of local vertex `local` given its owner, as recorded so far.
    pub fn winner(&self, local: usize, owner: Player) -> Player {
        if is_no_vertex(self.outer[self.map[local].value()]) {
            owner.opponent()
        } else {
            owner
        }
    }

    /// Copies a whole locally-indexed strategy across.
    pub fn merge(&mut self, local_strategy: &[VertexIndex]) {
        for (local, &mv) in local_strategy.iter().enumerate() {
            self.set(local, mv);
        }
    }
}

/// Derives the Even winning set from a fully populated strategy vector.
fn even_winning_set(game: &ParityGame, strategy: &[VertexIndex]) -> VertexSet {
    let mut even = VertexSet::repeat(false, game.num_of_vertices());
    for v in game.iter_vertices() {
        if game.winner(strategy, v) == Player::Even {
            even.set(v.value(), true);
        }
    }
    even
}

/// Solves with small progress measures, using the given lifting strategy descriptor.
pub struct SpmSolver {
    pub descriptor: String,
    pub alternate: bool,
}

impl Solver for SpmSolver {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        solve_spm(game, &self.descriptor, self.alternate, strategy, stats, vmap)
    }
}

/// Solves with Zielonka's recursive algorithm.
pub struct ZielonkaSolver;

impl Solver for ZielonkaSolver {
    fn solve(
        &self,
        game: &ParityGame,
        _vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        _stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        Ok(solve_zielonka(game, strategy))
    }
}

/// Solves the subgame induced by the unresolved vertices with `inner`, merging its strategy
/// back through a [`Substrategy`]. Shared tail of every preprocessing wrapper.
fn solve_remainder<S: Solver>(
    inner: &S,
    game: &ParityGame,
    vmap: &[VertexIndex],
    resolved: &VertexSet,
    strategy: &mut [VertexIndex],
    stats: &mut LiftingStatistics,
) -> Result<Option<VertexSet>, PgError> {
    let remaining: Vec<VertexIndex> = game.iter_vertices().filter(|v| !resolved[v.value()]).collect();

    if !remaining.is_empty() {
        let (subgame, _) = game.make_subgame(&remaining, true, EdgeDirection::Bidirectional)?;
        let submap = merge_vertex_maps(&remaining, vmap);
        let mut substrat = vec![no_vertex(); subgame.num_of_vertices()];
        if inner.solve(&subgame, &submap, &mut substrat, stats)?.is_none() {
            return Ok(None);
        }
        Substrategy::new(strategy, &remaining).merge(&substrat);
    }

    Ok(Some(even_winning_set(game, strategy)))
}

/// Resolves self-loop-decided vertices (and anything forced into them) before delegating the
/// rest to the wrapped solver.
///
/// After the self-loop pruning of [`preprocess_self_loops`], every vertex that still has a
/// self-loop and out-degree one replays its own priority forever, so its winner is the
/// player matching that priority's parity. Those vertices, and everything attracted to them,
/// are settled without invoking the inner solver.
pub struct Deloop<S> {
    pub inner: S,
}

impl<S: Solver> Solver for Deloop<S> {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        let processed = preprocess_self_loops(game);
        let num_vertices = game.num_of_vertices();

        let mut loop_won = [
            VertexSet::repeat(false, num_vertices),
            VertexSet::repeat(false, num_vertices),
        ];
        let mut any = false;
        for v in processed.iter_vertices() {
            if processed.graph().outdegree(v) == 1 && processed.graph().has_succ(v, v) {
                let winner = Player::from_priority(processed.priority(v));
                strategy[v.value()] = if processed.owner(v) == winner { v } else { no_vertex() };
                loop_won[winner.to_index()].set(v.value(), true);
                any = true;
            }
        }

        if !any {
            return self.inner.solve(game, vmap, strategy, stats);
        }

        // Even's attractor runs over the full game first; Odd's then runs over what is
        // left, so a vertex with an Even-favourable choice is never miscounted as forced.
        let full = full_vertex_set(num_vertices);
        let even_region = attractor(&processed, Player::Even, &full, &loop_won[0], strategy);
        let rest = full & !even_region.clone();
        let odd_region = attractor(&processed, Player::Odd, &rest, &loop_won[1], strategy);

        let resolved = even_region | odd_region;
        solve_remainder(&self.inner, &processed, vmap, &resolved, strategy, stats)
    }
}

/// Resolves cycles decided by ownership before delegating the rest to the wrapped solver:
/// a cycle whose maximum priority is `i` and whose vertices are all owned by player
/// `i mod 2` is won outright by that player, who simply keeps the play on it.
///
/// Works down from the highest priority; at each `i` the strongly connected components of
/// the unresolved subgraph restricted to priorities at most `i` are scanned for such
/// cycles, and each hit is extended with its winner's attractor.
pub struct Decycle<S> {
    pub inner: S,
}

impl<S: Solver> Decycle<S> {
    /// Routes every component vertex towards `anchor` (a vertex of the component's maximum
    /// priority) along reverse breadth-first tree edges, then closes the cycle by sending
    /// `anchor` to any component successor. Every resulting play revisits `anchor` forever.
    fn route_component(
        game: &ParityGame,
        in_component: &VertexSet,
        anchor: VertexIndex,
        strategy: &mut [VertexIndex],
    ) {
        let mut visited = VertexSet::repeat(false, game.num_of_vertices());
        visited.set(anchor.value(), true);
        let mut queue = VecDeque::from([anchor]);
        while let Some(y) = queue.pop_front() {
            for x in game.graph().pred(y) {
                if in_component[x.value()] && !visited[x.value()] {
                    visited.set(x.value(), true);
                    strategy[x.value()] = y;
                    queue.push_back(x);
                }
            }
        }

        strategy[anchor.value()] = game
            .graph()
            .succ(anchor)
            .find(|w| in_component[w.value()])
            .expect("a strongly connected component with an edge has an internal successor");
    }
}

impl<S: Solver> Solver for Decycle<S> {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        let processed = preprocess_self_loops(game);
        let num_vertices = game.num_of_vertices();
        let mut resolved = VertexSet::repeat(false, num_vertices);
        let mut any = false;

        for i in (0..processed.priority_limit()).rev() {
            let player = Player::from_index((i % 2) as u8);

            let mut within = VertexSet::repeat(false, num_vertices);
            let mut candidates = false;
            for v in processed.iter_vertices() {
                if !resolved[v.value()] && processed.priority(v).value() <= i {
                    within.set(v.value(), true);
                    candidates = true;
                }
            }
            if !candidates {
                continue;
            }

            for component in strongly_connected_components(&processed, &within) {
                let single_loop =
                    component.len() == 1 && processed.graph().has_succ(component[0], component[0]);
                if component.len() < 2 && !single_loop {
                    continue;
                }
                let Some(&anchor) = component.iter().find(|&&v| processed.priority(v).value() == i) else {
                    continue;
                };
                if !component.iter().all(|&v| processed.owner(v) == player) {
                    continue;
                }

                let mut in_component = VertexSet::repeat(false, num_vertices);
                for &v in &component {
                    in_component.set(v.value(), true);
                }
                Self::route_component(&processed, &in_component, anchor, strategy);

                let unresolved = full_vertex_set(num_vertices) & !resolved.clone();
                let region = attractor(&processed, player, &unresolved, &in_component, strategy);
                resolved |= region;
                any = true;
            }
        }

        if !any {
            return self.inner.solve(game, vmap, strategy, stats);
        }
        solve_remainder(&self.inner, &processed, vmap, &resolved, strategy, stats)
    }
}

/// Decomposes the game into strongly connected components and solves them in the
/// reverse-topological order [`strongly_connected_components`] emits. After each component
/// both winning regions are extended with their attractors, so by the time a later
/// component is reached, every vertex with a profitable escape into solved territory has
/// already been claimed, and the induced subgame of the leftovers is exact.
pub struct ComponentSolver<S> {
    pub inner: S,
}

impl<S: Solver> Solver for ComponentSolver<S> {
    fn solve(
        &self,
        game: &ParityGame,
        vmap: &[VertexIndex],
        strategy: &mut [VertexIndex],
        stats: &mut LiftingStatistics,
    ) -> Result<Option<VertexSet>, PgError> {
        let num_vertices = game.num_of_vertices();
        let full = full_vertex_set(num_vertices);
        let components = strongly_connected_components(game, &full);

        let mut resolved = VertexSet::repeat(false, num_vertices);
        let mut winning = [
            VertexSet::repeat(false, num_vertices),
            VertexSet::repeat(false, num_vertices),
        ];

        for component in &components {
            if check_abort() {
                return Ok(None);
            }

            let remainder: Vec<VertexIndex> =
                component.iter().copied().filter(|v| !resolved[v.value()]).collect();
            if remainder.is_empty() {
                continue;
            }

            let (subgame, _) = game.make_subgame(&remainder, true, EdgeDirection::Bidirectional)?;
            let (subgame, _) = subgame.compress_priorities(None, true);
            let submap = merge_vertex_maps(&remainder, vmap);

            let mut substrat = vec![no_vertex(); subgame.num_of_vertices()];
            if self.inner.solve(&subgame, &submap, &mut substrat, stats)?.is_none() {
                return Ok(None);
            }

            let mut view = Substrategy::new(strategy, &remainder);
            view.merge(&substrat);
            for (local, &outer) in remainder.iter().enumerate() {
                let winner = view.winner(local, subgame.owner(VertexIndex::new(local)));
                winning[winner.to_index()].set(outer.value(), true);
                resolved.set(outer.value(), true);
            }

            for player in [Player::Even, Player::Odd] {
                let region = attractor(game, player, &full, &winning[player.to_index()], strategy);
                for v in region.iter_ones() {
                    winning[player.to_index()].set(v, true);
                    resolved.set(v, true);
                }
            }
        }

        Ok(Some(winning[Player::Even.to_index()].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::Priority;
    use pg_game::Strategy;
    use pg_game::empty_strategy;
    use pg_graph::StaticGraph;

    use crate::verify::verify_strategy;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn solve_with<S: Solver>(solver: &S, game: &ParityGame) -> (VertexSet, Strategy) {
        let mut strategy = empty_strategy(game.num_of_vertices());
        let mut stats = LiftingStatistics::new(game.num_of_vertices());
        let even = solver.solve(game, &[], &mut strategy, &mut stats).unwrap().unwrap();
        (even, strategy)
    }

    fn baseline(game: &ParityGame) -> VertexSet {
        let mut strategy = empty_strategy(game.num_of_vertices());
        solve_zielonka(game, &mut strategy).unwrap()
    }

    fn chain_game() -> ParityGame {
        // 0 (Odd) -> 1 (Even, self-loop); 1 also -> 0.
        let graph = StaticGraph::assign(
            2,
            &[(v(0), v(1)), (v(1), v(1)), (v(1), v(0))],
            EdgeDirection::Bidirectional,
        )
        .unwrap();
        ParityGame::from_parts(
            graph,
            vec![Player::Odd, Player::Even],
            vec![Priority::new(1), Priority::new(0)],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_deloop_agrees_with_zielonka() {
        let game = chain_game();
        let deloop = Deloop { inner: ZielonkaSolver };
        let (even, strategy) = solve_with(&deloop, &game);
        assert_eq!(even, baseline(&game));
        assert_eq!(verify_strategy(&game, &strategy), None);
    }

    #[test]
    fn test_decycle_resolves_uniformly_owned_cycle() {
        // A 3-cycle entirely owned by Even with maximum priority 2: Even wins it all by
        // keeping the play on the cycle.
        let graph = StaticGraph::assign(3, &[(v(0), v(1)), (v(1), v(2)), (v(2), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even; 3],
            vec![Priority::new(0), Priority::new(2), Priority::new(1)],
            3,
        )
        .unwrap();

        let decycle = Decycle { inner: ZielonkaSolver };
        let (even, strategy) = solve_with(&decycle, &game);
        assert_eq!(even.count_ones(), 3);
        assert_eq!(verify_strategy(&game, &strategy), None);
    }

    #[test]
    fn test_decycle_routes_through_dominant_vertex() {
        // Odd owns a 3-cycle with maximum priority 3 and a shortcut 0 -> 2 that skips the
        // dominant vertex 1; the routed strategy must still visit vertex 1 forever.
        let graph = StaticGraph::assign(
            3,
            &[(v(0), v(1)), (v(0), v(2)), (v(1), v(2)), (v(2), v(0))],
            EdgeDirection::Bidirectional,
        )
        .unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Odd; 3],
            vec![Priority::new(0), Priority::new(3), Priority::new(1)],
            4,
        )
        .unwrap();

        let decycle = Decycle { inner: ZielonkaSolver };
        let (even, strategy) = solve_with(&decycle, &game);
        assert_eq!(even.count_ones(), 0);
        assert_eq!(strategy[0], v(1));
        assert_eq!(verify_strategy(&game, &strategy), None);
    }

    #[test]
    fn test_component_solver_agrees_with_direct_solve() {
        let graph = StaticGraph::assign(
            4,
            &[(v(0), v(1)), (v(1), v(0)), (v(1), v(2)), (v(2), v(3)), (v(3), v(2))],
            EdgeDirection::Bidirectional,
        )
        .unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even, Player::Odd, Player::Even, Player::Odd],
            vec![Priority::new(0), Priority::new(1), Priority::new(2), Priority::new(3)],
            4,
        )
        .unwrap();

        let solver = ComponentSolver { inner: ZielonkaSolver };
        let (even, strategy) = solve_with(&solver, &game);
        assert_eq!(even, baseline(&game));
        assert_eq!(verify_strategy(&game, &strategy), None);
    }

    #[test]
    fn test_substrategy_translates_indices() {
        let mut outer = empty_strategy(4);
        let map = [v(3), v(1)];
        let mut view = Substrategy::new(&mut outer, &map);
        view.set(0, v(1));
        view.set(1, no_vertex());

        assert_eq!(outer[3], v(1));
        assert!(is_no_vertex(outer[1]));
    }
}
