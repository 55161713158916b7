use pg_game::ParityGame;
use pg_game::Player;
use pg_graph::VertexIndex;
use pg_graph::is_no_vertex;

use crate::VertexSet;
use crate::scc::strongly_connected_components_by;

/// Checks that `strategy` is a valid winning certificate for `game`.
///
/// Two phases: first, every vertex's declared winner (per [`ParityGame::winner`]) must be
/// consistent with its own committed move (and the mover's winner) or, for a vertex whose
/// opponent is declared the winner, with *every* successor agreeing on that winner. Second,
/// for each priority `p`, the region declared won by the player of parity `1 - (p mod 2)`
/// must not contain a cycle whose maximum priority is `p`. That is checked by restricting
/// the region to vertices of priority at most `p`, keeping committed moves (or all
/// successors, where none is committed), and looking for a cycle through a priority-`p`
/// vertex.
///
/// Returns the first offending vertex, or `None` if `strategy` verifies.
pub fn verify_strategy(game: &ParityGame, strategy: &[VertexIndex]) -> Option<VertexIndex> {
    if let Some(v) = verify_local_consistency(game, strategy) {
        return Some(v);
    }
    verify_no_contradicting_cycle(game, strategy)
}

fn verify_local_consistency(game: &ParityGame, strategy: &[VertexIndex]) -> Option<VertexIndex> {
    for v in game.iter_vertices() {
        let pl = game.winner(strategy, v);
        if pl == game.owner(v) {
            let mv = strategy[v.value()];
            let is_real_move = game.outgoing_edges(v).any(|w| w == mv);
            if !is_real_move || game.winner(strategy, mv) != pl {
                return Some(v);
            }
        } else {
            for w in game.outgoing_edges(v) {
                if game.winner(strategy, w) != pl {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn verify_no_contradicting_cycle(game: &ParityGame, strategy: &[VertexIndex]) -> Option<VertexIndex> {
    let num_vertices = game.num_of_vertices();

    for p in 0..game.priority_limit() {
        let loser = Player::from_index((1 - (p % 2)) as u8);

        let mut within = VertexSet::repeat(false, num_vertices);
        for v in game.iter_vertices() {
            if game.priority(v).value() <= p && game.winner(strategy, v) == loser {
                within.set(v.value(), true);
            }
        }
        if within.count_ones() == 0 {
            continue;
        }

        let committed_move = |v: VertexIndex| {
            let mv = strategy[v.value()];
            if is_no_vertex(mv) { None } else { Some(mv) }
        };

        let components = strongly_connected_components_by(num_vertices, &within, |v| {
            let mut moves: Vec<VertexIndex> = Vec::new();
            if let Some(mv) = committed_move(v) {
                moves.push(mv);
            } else {
                moves.extend(game.outgoing_edges(v));
            }
            moves.into_iter()
        });

        for component in &components {
            let has_self_loop = component.len() == 1 && {
                let v = component[0];
                committed_move(v).map(|mv| mv == v).unwrap_or_else(|| game.outgoing_edges(v).any(|w| w == v))
            };
            if component.len() < 2 && !has_self_loop {
                continue;
            }
            if let Some(&offending) = component.iter().find(|&&v| game.priority(v).value() == p) {
                return Some(offending);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::Priority;
    use pg_game::empty_strategy;
    use pg_graph::EdgeDirection;
    use pg_graph::StaticGraph;
    use pg_graph::no_vertex;

    use crate::zielonka::solve_zielonka;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_zielonka_strategy_verifies() {
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
        solve_zielonka(&game, &mut strategy).unwrap();
        assert_eq!(verify_strategy(&game, &strategy), None);
    }

    #[test]
    fn test_tampered_strategy_move_is_rejected() {
        let graph = StaticGraph::assign(2, &[(v(0), v(1)), (v(1), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Odd, Player::Even],
            vec![Priority::new(1), Priority::new(0)],
            2,
        )
        .unwrap();

        let mut strategy = empty_strategy(2);
        solve_zielonka(&game, &mut strategy).unwrap();
        // Vertex 1 (Even) should have no move (Odd wins it); force a bogus one in.
        strategy[1] = v(0);
        assert_eq!(verify_strategy(&game, &strategy), Some(v(1)));
    }

    #[test]
    fn test_cycle_through_wrong_winner_is_rejected() {
        // 0 (Even, priority 0) <-> 1 (Odd, priority 0): a self-consistent but wrong claim
        // that Odd wins despite an Even-dominated cycle reachable under committed moves.
        let graph = StaticGraph::assign(2, &[(v(0), v(1)), (v(1), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even, Player::Odd],
            vec![Priority::new(0), Priority::new(0)],
            1,
        )
        .unwrap();

        // Claim Odd wins everywhere: 0 (Even) gets no move, 1 (Odd) moves to 0.
        let mut strategy = vec![no_vertex(); 2];
        strategy[1] = v(0);
        let offending = verify_strategy(&game, &strategy);
        assert!(matches!(offending, Some(w) if w == v(0) || w == v(1)));
    }
}
