//! Cooperative abort behaviour. Kept in its own test binary: the abort flag is
//! process-wide, so these tests must not share a process with ordinary solves.

use pg_game::ParityGame;
use pg_game::Player;
use pg_game::Priority;
use pg_game::empty_strategy;
use pg_graph::EdgeDirection;
use pg_graph::make_random;
use pg_solve::LiftingStatistics;
use pg_solve::SolverOptions;
use pg_solve::build_solver;
use pg_solve::solve_zielonka;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_abort_produces_empty_result_and_clears() {
    let mut rng = StdRng::seed_from_u64(83);
    let num_vertices = 30;
    let graph = make_random(&mut rng, num_vertices, 3, EdgeDirection::Bidirectional, false);
    let owner = (0..num_vertices)
        .map(|_| if rng.random_bool(0.5) { Player::Even } else { Player::Odd })
        .collect();
    let priority = (0..num_vertices).map(|_| Priority::new(rng.random_range(0..4))).collect();
    let game = ParityGame::from_parts(graph, owner, priority, 4).unwrap();

    pg_utilities::request_abort();
    let mut strategy = empty_strategy(game.num_of_vertices());
    let mut stats = LiftingStatistics::new(game.num_of_vertices());
    let solver = build_solver(SolverOptions { scc: true, ..Default::default() }, "linear").unwrap();
    let spm_result = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap();
    let zielonka_result = solve_zielonka(&game, &mut empty_strategy(game.num_of_vertices()));
    pg_utilities::clear_abort();

    assert!(spm_result.is_none());
    assert!(zielonka_result.is_none());

    // A fresh solve after clearing the flag succeeds.
    let mut strategy = empty_strategy(game.num_of_vertices());
    let even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap();
    assert!(even.is_some());
}
