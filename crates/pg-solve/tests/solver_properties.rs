//! End-to-end properties of the solving stack: solver agreement, dualisation, priority
//! transformations and raw-format round-trips over randomly generated games.

use pg_game::ParityGame;
use pg_game::Player;
use pg_game::Priority;
use pg_game::empty_strategy;
use pg_graph::EdgeDirection;
use pg_graph::StaticGraph;
use pg_graph::VertexIndex;
use pg_graph::make_random;
use pg_solve::LiftingStatistics;
use pg_solve::SolverOptions;
use pg_solve::VertexSet;
use pg_solve::build_solver;
use pg_solve::solve_zielonka;
use pg_solve::verify_strategy;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn random_game(rng: &mut StdRng, num_vertices: usize, out_degree: usize, priorities: usize) -> ParityGame {
    let graph = make_random(rng, num_vertices, out_degree, EdgeDirection::Bidirectional, false);
    let owner = (0..num_vertices)
        .map(|_| if rng.random_bool(0.5) { Player::Even } else { Player::Odd })
        .collect();
    let priority = (0..num_vertices)
        .map(|_| Priority::new(rng.random_range(0..priorities)))
        .collect();
    ParityGame::from_parts(graph, owner, priority, priorities).unwrap()
}

fn solve(game: &ParityGame) -> VertexSet {
    let mut strategy = empty_strategy(game.num_of_vertices());
    let even = solve_zielonka(game, &mut strategy).unwrap();
    assert_eq!(verify_strategy(game, &strategy), None, "strategy failed verification");
    even
}

#[test]
fn test_empty_game_solves_to_empty_strategy() {
    let game = ParityGame::empty();
    let mut strategy = empty_strategy(0);
    let mut stats = LiftingStatistics::new(0);

    for options in [SolverOptions::default(), SolverOptions { use_recursive: true, ..Default::default() }] {
        let solver = build_solver(options, "linear").unwrap();
        let even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap().unwrap();
        assert_eq!(even.count_ones(), 0);
        assert!(strategy.is_empty());
    }
}

#[test]
fn test_single_priority_game_won_by_its_parity() {
    // With only priority 0 in play, Even wins everywhere; every Even vertex may play
    // anything and every Odd vertex plays nothing.
    let mut rng = StdRng::seed_from_u64(5);
    let game = random_game(&mut rng, 12, 2, 1);

    let even = solve(&game);
    assert_eq!(even.count_ones(), 12);

    let mut strategy = empty_strategy(game.num_of_vertices());
    let mut stats = LiftingStatistics::new(game.num_of_vertices());
    let solver = build_solver(SolverOptions::default(), "predecessor").unwrap();
    let spm_even = solver.solve(&game, &[], &mut strategy, &mut stats).unwrap().unwrap();
    assert_eq!(spm_even, even);
    for v in game.iter_vertices() {
        let mv = strategy[v.value()];
        if game.owner(v) == Player::Even {
            assert!(game.outgoing_edges(v).any(|w| w == mv));
        } else {
            assert!(pg_graph::is_no_vertex(mv));
        }
    }
}

#[test]
fn test_dual_game_has_complementary_winners() {
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..6 {
        let game = random_game(&mut rng, 20, 3, 4);
        let dual = game.make_dual();

        let even = solve(&game);
        let dual_even = solve(&dual);
        for v in game.iter_vertices() {
            assert_ne!(even[v.value()], dual_even[v.value()], "winner not inverted at {v}");
        }
    }
}

#[test]
fn test_double_dual_restores_winning_sets() {
    let mut rng = StdRng::seed_from_u64(78);
    let game = random_game(&mut rng, 18, 2, 5);
    let restored = game.make_dual().make_dual();

    assert_eq!(solve(&game), solve(&restored));
}

#[test]
fn test_compress_priorities_is_idempotent_and_preserves_winners() {
    let mut rng = StdRng::seed_from_u64(79);
    // Sparse priority use, so compression has something to contract.
    let graph = make_random(&mut rng, 16, 2, EdgeDirection::Bidirectional, false);
    let owner: Vec<Player> = (0..16)
        .map(|_| if rng.random_bool(0.5) { Player::Even } else { Player::Odd })
        .collect();
    let priority: Vec<Priority> = (0..16)
        .map(|_| Priority::new([0, 3, 7][rng.random_range(0..3)]))
        .collect();
    let game = ParityGame::from_parts(graph, owner, priority, 9).unwrap();

    let (compressed, _) = game.compress_priorities(None, true);
    for p in 1..compressed.priority_limit() {
        assert!(compressed.cardinality(p) > 0, "compressed priority {p} unused");
    }
    assert_eq!(solve(&game), solve(&compressed));

    let (again, _) = compressed.compress_priorities(None, true);
    assert_eq!(again.priority_limit(), compressed.priority_limit());
    for v in game.iter_vertices() {
        assert_eq!(again.priority(v), compressed.priority(v));
    }
}

#[test]
fn test_propagate_priorities_preserves_winners() {
    let mut rng = StdRng::seed_from_u64(80);
    for _ in 0..4 {
        let mut game = random_game(&mut rng, 20, 2, 6);
        let before = solve(&game);
        game.propagate_priorities();
        assert_eq!(solve(&game), before);
    }
}

#[test]
fn test_raw_roundtrip_solves_to_same_partition() {
    let mut rng = StdRng::seed_from_u64(81);
    let game = random_game(&mut rng, 1000, 3, 5);

    let mut buffer = Vec::new();
    game.write_raw(&mut buffer).unwrap();
    let restored = ParityGame::read_raw(&mut buffer.as_slice()).unwrap();

    assert_eq!(restored.num_of_vertices(), game.num_of_vertices());
    assert_eq!(restored.priority_limit(), game.priority_limit());
    for v in game.iter_vertices() {
        assert_eq!(restored.owner(v), game.owner(v));
        assert_eq!(restored.priority(v), game.priority(v));
        assert_eq!(
            restored.graph().succ(v).collect::<Vec<_>>(),
            game.graph().succ(v).collect::<Vec<_>>()
        );
    }
    for p in 0..game.priority_limit() {
        assert_eq!(restored.cardinality(p), game.cardinality(p));
    }

    assert_eq!(solve(&game), solve(&restored));
}

#[test]
fn test_shuffle_preserves_winners_modulo_relabelling() {
    let mut rng = StdRng::seed_from_u64(82);
    let game = random_game(&mut rng, 15, 2, 4);
    let perm = pg_graph::random_permutation(&mut rng, 15);
    let shuffled = game.shuffle(&perm).unwrap();

    let even = solve(&game);
    let shuffled_even = solve(&shuffled);
    for v in game.iter_vertices() {
        assert_eq!(even[v.value()], shuffled_even[perm[v.value()].value()]);
    }
}

#[test]
fn test_attractor_is_monotone() {
    let mut rng = StdRng::seed_from_u64(84);
    let game = random_game(&mut rng, 25, 3, 3);
    let num_vertices = game.num_of_vertices();
    let within = pg_solve::full_vertex_set(num_vertices);

    let mut small = VertexSet::repeat(false, num_vertices);
    small.set(0, true);
    let mut large = small.clone();
    large.set(1, true);
    large.set(2, true);

    for player in [Player::Even, Player::Odd] {
        let mut strategy = empty_strategy(num_vertices);
        let from_small = pg_solve::attractor(&game, player, &within, &small, &mut strategy);
        let mut strategy = empty_strategy(num_vertices);
        let from_large = pg_solve::attractor(&game, player, &within, &large, &mut strategy);

        for v in from_small.iter_ones() {
            assert!(from_large[v], "attractor not monotone at vertex {v}");
        }
        assert!(from_small[0]);
    }
}

#[test]
fn test_two_vertex_toggle_end_to_end() {
    let graph = StaticGraph::assign(
        2,
        &[(VertexIndex::new(0), VertexIndex::new(1)), (VertexIndex::new(1), VertexIndex::new(0))],
        EdgeDirection::Bidirectional,
    )
    .unwrap();
    let game = ParityGame::from_parts(
        graph,
        vec![Player::Odd, Player::Even],
        vec![Priority::new(1), Priority::new(0)],
        2,
    )
    .unwrap();

    let even = solve(&game);
    assert_eq!(even.count_ones(), 0);
}
