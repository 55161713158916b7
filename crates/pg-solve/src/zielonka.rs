use log::debug;
use pg_game::ParityGame;
use pg_game::Player;
use pg_graph::VertexIndex;
use pg_graph::no_vertex;
use pg_utilities::check_abort;

use crate::VertexSet;
use crate::attractor;
use crate::full_vertex_set;

/// Solves `game` using Zielonka's recursive algorithm, writing the winning strategy into
/// `strategy` (already sized `game.num_of_vertices()`). Returns the set of vertices won by
/// Even, or `None` if aborted.
pub fn solve_zielonka(game: &ParityGame, strategy: &mut [VertexIndex]) -> Option<VertexSet> {
    let mut solver = ZielonkaSolver::new(game);
    let within = full_vertex_set(game.num_of_vertices());
    solver.solve_rec(within, strategy)?;
    debug!("zielonka solver performed {} recursive calls", solver.recursive_calls);

    let mut even = VertexSet::repeat(false, game.num_of_vertices());
    for v in game.iter_vertices() {
        if game.winner(strategy, v) == Player::Even {
            even.set(v.value(), true);
        }
    }
    Some(even)
}

struct ZielonkaSolver<'a> {
    game: &'a ParityGame,
    recursive_calls: usize,
}

impl<'a> ZielonkaSolver<'a> {
    fn new(game: &'a ParityGame) -> Self {
        ZielonkaSolver {
            game,
            recursive_calls: 0,
        }
    }

    /// The lowest priority of the dominant parity run within `within`: the smallest `cut`
    /// such that every used priority at least `cut` shares the parity of the maximum used
    /// priority. `cut == 0` means only one parity occurs at all.
    fn dominant_run_cut(&self, within: &VertexSet) -> (usize, Player) {
        let mut used = vec![false; self.game.priority_limit()];
        let mut max_priority = 0;
        for v in within.iter_ones() {
            let p = self.game.priority(VertexIndex::new(v)).value();
            used[p] = true;
            max_priority = max_priority.max(p);
        }

        let cut = (0..max_priority)
            .rev()
            .find(|&p| used[p] && p % 2 != max_priority % 2)
            .map_or(0, |p| p + 1);
        let player = Player::from_index((max_priority % 2) as u8);
        (cut, player)
    }

    /// Solves the subgame induced by `within`, assigning a strategy entry to every one of
    /// its vertices. Returns `None` if aborted.
    fn solve_rec(&mut self, mut within: VertexSet, strategy: &mut [VertexIndex]) -> Option<()> {
        self.recursive_calls += 1;
        let num_vertices = self.game.num_of_vertices();

        loop {
            if within.count_ones() == 0 {
                return Some(());
            }
            if check_abort() {
                return None;
            }

            let (cut, player) = self.dominant_run_cut(&within);

            if cut > 0 {
                // Attract towards the dominant priority class for its player.
                let mut target = VertexSet::repeat(false, num_vertices);
                for v in within.iter_ones() {
                    if self.game.priority(VertexIndex::new(v)).value() >= cut {
                        target.set(v, true);
                    }
                }
                let attracted = attractor(self.game, player, &within, &target, strategy);

                if attracted.count_ones() != within.count_ones() {
                    let unsolved = within.clone() & !attracted;
                    self.solve_rec(unsolved.clone(), strategy)?;

                    // Everything the opponent wins in the subgame, it also wins here; its
                    // attractor is carved out and the remainder is solved afresh.
                    let opponent = player.opponent();
                    let mut lost = VertexSet::repeat(false, num_vertices);
                    let mut any_lost = false;
                    for v in unsolved.iter_ones() {
                        if self.game.winner(strategy, VertexIndex::new(v)) == opponent {
                            lost.set(v, true);
                            any_lost = true;
                        }
                    }

                    if any_lost {
                        let lost_attracted = attractor(self.game, opponent, &within, &lost, strategy);
                        within &= !lost_attracted;
                        continue;
                    }
                }
            }

            // The opponent's region came up empty, so `player` wins all of `within`. The
            // attractor passes already recorded moves everywhere except on the dominant
            // class itself, where any move staying inside the region does.
            for v in within.iter_ones() {
                let vertex = VertexIndex::new(v);
                if self.game.priority(vertex).value() >= cut {
                    let parity_player = Player::from_priority(self.game.priority(vertex));
                    strategy[v] = if self.game.owner(vertex) == parity_player {
                        self.game
                            .outgoing_edges(vertex)
                            .find(|w| within[w.value()])
                            .unwrap_or_else(no_vertex)
                    } else {
                        no_vertex()
                    };
                }
            }
            return Some(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::Priority;
    use pg_game::empty_strategy;
    use pg_graph::EdgeDirection;
    use pg_graph::StaticGraph;
    use pg_graph::is_no_vertex;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_single_loop_won_by_even() {
        let graph = StaticGraph::assign(1, &[(v(0), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(graph, vec![Player::Even], vec![Priority::new(0)], 1).unwrap();

        let mut strategy = empty_strategy(1);
        let even = solve_zielonka(&game, &mut strategy).unwrap();
        assert!(even[0]);
        assert_eq!(strategy[0], v(0));
    }

    #[test]
    fn test_single_odd_owned_even_loop_won_by_even() {
        let graph = StaticGraph::assign(1, &[(v(0), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(graph, vec![Player::Odd], vec![Priority::new(0)], 1).unwrap();

        let mut strategy = empty_strategy(1);
        let even = solve_zielonka(&game, &mut strategy).unwrap();
        assert!(even[0]);
        assert!(is_no_vertex(strategy[0]));
    }

    #[test]
    fn test_two_vertex_toggle_won_by_odd() {
        // Max priority seen infinitely often on the forced cycle is 1.
        let graph = StaticGraph::assign(2, &[(v(0), v(1)), (v(1), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Odd, Player::Even],
            vec![Priority::new(1), Priority::new(0)],
            2,
        )
        .unwrap();

        let mut strategy = empty_strategy(2);
        let even = solve_zielonka(&game, &mut strategy).unwrap();
        assert_eq!(even.count_ones(), 0);
        assert_eq!(strategy[0], v(1));
        assert!(is_no_vertex(strategy[1]));
    }

    #[test]
    fn test_attractor_chain_won_by_even() {
        let graph = StaticGraph::assign(
            3,
            &[(v(0), v(0)), (v(1), v(0)), (v(2), v(1)), (v(1), v(2))],
            EdgeDirection::Bidirectional,
        )
        .unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even; 3],
            vec![Priority::new(2), Priority::new(1), Priority::new(0)],
            3,
        )
        .unwrap();

        let mut strategy = empty_strategy(3);
        let even = solve_zielonka(&game, &mut strategy).unwrap();
        assert_eq!(even.count_ones(), 3);
        assert_eq!(strategy[0], v(0));
        assert_eq!(strategy[1], v(0));
        assert_eq!(strategy[2], v(1));
    }

    #[test]
    fn test_mixed_ownership_partition() {
        // 0 <-> 1 with priorities 2 (Even-owned) and 1 (Odd-owned): vertex 0 can loop
        // through 1 back to itself, making 2 the maximum seen infinitely often.
        let graph = StaticGraph::assign(2, &[(v(0), v(1)), (v(1), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even, Player::Odd],
            vec![Priority::new(2), Priority::new(1)],
            3,
        )
        .unwrap();

        let mut strategy = empty_strategy(2);
        let even = solve_zielonka(&game, &mut strategy).unwrap();
        assert_eq!(even.count_ones(), 2);
    }
}
