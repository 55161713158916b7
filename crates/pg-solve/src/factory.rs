use pg_utilities::PgError;

use crate::lifting::parse_strategy;
use crate::wrappers::ComponentSolver;
use crate::wrappers::Decycle;
use crate::wrappers::Deloop;
use crate::wrappers::Solver;
use crate::wrappers::SpmSolver;
use crate::wrappers::ZielonkaSolver;

/// Which preprocessing layers and base algorithm a solve should use, mirroring the `pgsolve`
/// CLI's `--use-recursive`/`--alternate`/`--deloop`/`--decycle`/`--scc` flags.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolverOptions {
    pub use_recursive: bool,
    pub alternate: bool,
    pub deloop: bool,
    pub decycle: bool,
    pub scc: bool,
}

/// Assembles the solver chain described by `options`. `strategy_descriptor` selects the
/// small progress measures lifting order (see [`parse_strategy`]) and is ignored when
/// `options.use_recursive` is set, but is still validated eagerly so a bad `--strategy`
/// value is rejected before any solving starts.
///
/// Wrapping order, outermost first: SCC decomposition, then decycle, then deloop, then the
/// base solver; each layer narrows the game before handing it to the next.
pub fn build_solver(options: SolverOptions, strategy_descriptor: &str) -> Result<Box<dyn Solver>, PgError> {
    if !options.use_recursive {
        parse_strategy(strategy_descriptor)?;
    }

    let base: Box<dyn Solver> = if options.use_recursive {
        Box::new(ZielonkaSolver)
    } else {
        Box::new(SpmSolver {
            descriptor: strategy_descriptor.to_string(),
            alternate: options.alternate,
        })
    };

    let with_deloop: Box<dyn Solver> = if options.deloop { Box::new(Deloop { inner: base }) } else { base };
    let with_decycle: Box<dyn Solver> = if options.decycle {
        Box::new(Decycle { inner: with_deloop })
    } else {
        with_deloop
    };
    let with_scc: Box<dyn Solver> = if options.scc {
        Box::new(ComponentSolver { inner: with_decycle })
    } else {
        with_decycle
    };

    Ok(with_scc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::ParityGame;
    use pg_game::Player;
    use pg_game::Priority;
    use pg_game::empty_strategy;
    use pg_graph::EdgeDirection;
    use pg_graph::StaticGraph;
    use pg_graph::VertexIndex;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::statistics::LiftingStatistics;
    use crate::verify::verify_strategy;
    use crate::zielonka::solve_zielonka;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn toggle_game() -> ParityGame {
        let graph = StaticGraph::assign(2, &[(v(0), v(1)), (v(1), v(0))], EdgeDirection::Bidirectional).unwrap();
        ParityGame::from_parts(graph, vec![Player::Odd, Player::Even], vec![Priority::new(1), Priority::new(0)], 2).unwrap()
    }

    fn random_game(rng: &mut StdRng, num_vertices: usize, out_degree: usize, priorities: usize) -> ParityGame {
        let graph = pg_graph::make_random(rng, num_vertices, out_degree, EdgeDirection::Bidirectional, false);
        let owner = (0..num_vertices)
            .map(|_| if rng.random_bool(0.5) { Player::Even } else { Player::Odd })
            .collect();
        let priority = (0..num_vertices).map(|_| Priority::new(rng.random_range(0..priorities))).collect();
        ParityGame::from_parts(graph, owner, priority, priorities).unwrap()
    }

    fn all_configs() -> Vec<SolverOptions> {
        vec![
            SolverOptions::default(),
            SolverOptions { alternate: true, ..Default::default() },
            SolverOptions { deloop: true, ..Default::default() },
            SolverOptions { decycle: true, ..Default::default() },
            SolverOptions { scc: true, ..Default::default() },
            SolverOptions { use_recursive: true, ..Default::default() },
            SolverOptions { use_recursive: true, deloop: true, decycle: true, scc: true, ..Default::default() },
            SolverOptions { deloop: true, decycle: true, scc: true, ..Default::default() },
        ]
    }

    #[test]
    fn test_build_solver_rejects_unknown_strategy() {
        assert!(build_solver(SolverOptions::default(), "not-a-real-strategy").is_err());
    }

    #[test]
    fn test_build_solver_every_layer_agrees_with_zielonka() {
        let game = toggle_game();
        let mut baseline_strategy = empty_strategy(2);
        let baseline = solve_zielonka(&game, &mut baseline_strategy).unwrap();

        for options in all_configs() {
            let solver = build_solver(options, "linear").unwrap();
            let mut strategy = empty_strategy(2);
            let mut stats = LiftingStatistics::new(2);
            let even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap().unwrap();
            assert_eq!(even, baseline, "options {options:?} disagreed with zielonka");
        }
    }

    #[test]
    fn test_solver_partitions_agree_on_random_games() {
        let mut rng = StdRng::seed_from_u64(2024);
        let descriptors = ["linear", "linear:1", "predecessor", "pred:1", "focuslist", "maxmeasure", "maxstep", "minmeasure", "oldmaxmeasure", "linpred"];

        for round in 0..8 {
            let game = random_game(&mut rng, 24, 3, 5);

            let mut baseline_strategy = empty_strategy(game.num_of_vertices());
            let baseline = solve_zielonka(&game, &mut baseline_strategy).unwrap();
            assert_eq!(verify_strategy(&game, &baseline_strategy), None, "round {round}: zielonka strategy invalid");

            for descriptor in descriptors {
                let solver = build_solver(SolverOptions::default(), descriptor).unwrap();
                let mut strategy = empty_strategy(game.num_of_vertices());
                let mut stats = LiftingStatistics::new(game.num_of_vertices());
                let even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap().unwrap();
                assert_eq!(even, baseline, "round {round}: descriptor {descriptor} disagreed");
                assert_eq!(
                    verify_strategy(&game, &strategy),
                    None,
                    "round {round}: descriptor {descriptor} produced an invalid strategy"
                );
            }

            for options in all_configs() {
                let solver = build_solver(options, "predecessor").unwrap();
                let mut strategy = empty_strategy(game.num_of_vertices());
                let mut stats = LiftingStatistics::new(game.num_of_vertices());
                let even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap().unwrap();
                assert_eq!(even, baseline, "round {round}: options {options:?} disagreed");
                assert_eq!(
                    verify_strategy(&game, &strategy),
                    None,
                    "round {round}: options {options:?} produced an invalid strategy"
                );
            }
        }
    }
}
