use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use log::info;
use pg_game::ParityGame;
use pg_game::Player;
use pg_game::Priority;
use pg_game::empty_strategy;
use pg_graph::EdgeDirection;
use pg_graph::VertexIndex;
use pg_graph::is_no_vertex;
use pg_graph::make_random;
use pg_graph::make_random_clustered;
use pg_graph::random_permutation;
use pg_solve::LiftingStatistics;
use pg_solve::SolverOptions;
use pg_solve::build_solver;
use pg_solve::verify_strategy;
use pg_utilities::PgError;
use pg_utilities::request_abort;
use rand::SeedableRng;
use rand::rngs::StdRng;

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_FAILURE: u8 = 1;
const EXIT_TIMEOUT: u8 = 2;
const EXIT_SOLVER_FAILURE: u8 = 3;
const EXIT_VERIFICATION_FAILURE: u8 = 4;

#[derive(clap::Parser, Debug)]
#[command(about = "A command line tool for solving and verifying parity games", arg_required_else_help = true)]
struct Cli {
    /// Increase logging verbosity; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Solve(SolveArgs),
    Random(RandomArgs),
    Verify(VerifyArgs),
}

/// Arguments for solving a parity game read in the canonical raw format.
#[derive(clap::Args, Debug)]
struct SolveArgs {
    /// Raw-format parity game file.
    file: String,

    /// Lifting strategy descriptor (see the solver-factory grammar), ignored with
    /// `--use-recursive`.
    #[arg(long, default_value = "linear")]
    strategy: String,

    /// Solve with Zielonka's recursive algorithm instead of small progress measures.
    #[arg(long)]
    use_recursive: bool,

    /// Run two small progress measures engines, one per player, in alternation.
    #[arg(long)]
    alternate: bool,

    /// Wrap the solver with the self-loop preprocessing pass.
    #[arg(long)]
    deloop: bool,

    /// Wrap the solver with the generalized cycle-detection preprocessing pass.
    #[arg(long)]
    decycle: bool,

    /// Wrap the solver with strongly-connected-component decomposition.
    #[arg(long)]
    scc: bool,

    /// Verify the computed strategy before printing the result.
    #[arg(long)]
    verify: bool,

    /// Abort the solve after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Print lifting statistics to stderr after solving.
    #[arg(long)]
    stats: bool,

    /// Solve the game's dual instead, inverting the reported winner.
    #[arg(long)]
    dual: bool,

    /// Input format; `raw` is the only one currently supported.
    #[arg(long, default_value = "raw")]
    format: String,
}

/// Arguments for generating a random parity game fixture.
#[derive(clap::Args, Debug)]
struct RandomArgs {
    /// Number of vertices.
    vertices: usize,

    /// Average out-degree.
    out_degree: usize,

    /// Number of distinct priorities (the priority limit `d`).
    priorities: usize,

    /// Raw-format output file.
    #[arg(long)]
    output: String,

    /// Build a hierarchical clustered graph with clusters of this size, instead of a flat
    /// random graph.
    #[arg(long)]
    cluster: Option<usize>,

    /// Seed for the random number generator.
    #[arg(long)]
    seed: Option<u64>,
}

/// Arguments for verifying a previously computed strategy against a game.
#[derive(clap::Args, Debug)]
struct VerifyArgs {
    /// Raw-format parity game file.
    game_file: String,

    /// Strategy file: one line `v->w` per vertex with a move, decimal indices.
    strategy_file: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    let code = match cli.command {
        Commands::Solve(args) => handle_solve(args),
        Commands::Random(args) => handle_random(args),
        Commands::Verify(args) => handle_verify(args),
    };

    match code {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(exit_code_for(&error))
        }
    }
}

fn exit_code_for(error: &PgError) -> u8 {
    match error {
        PgError::Aborted => EXIT_TIMEOUT,
        PgError::InternalInconsistency(_) => EXIT_SOLVER_FAILURE,
        PgError::InvalidInput { .. }
        | PgError::InvalidStrategyDescriptor { .. }
        | PgError::IOFailure(_)
        | PgError::VersionMismatch { .. } => EXIT_PARSE_FAILURE,
    }
}

fn handle_solve(args: SolveArgs) -> Result<u8, PgError> {
    if args.format != "raw" {
        return Err(PgError::InvalidInput {
            reason: format!("unsupported game format '{}': only 'raw' is supported", args.format),
        });
    }

    let mut file = File::open(&args.file)?;
    let game = ParityGame::read_raw(&mut file)?;
    let game = if args.dual { game.make_dual() } else { game };

    if let Some(seconds) = args.timeout {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(seconds));
            request_abort();
        });
    }

    let options = SolverOptions {
        use_recursive: args.use_recursive,
        alternate: args.alternate,
        deloop: args.deloop,
        decycle: args.decycle,
        scc: args.scc,
    };
    let solver = build_solver(options, &args.strategy)?;

    let mut strategy = empty_strategy(game.num_of_vertices());
    let mut stats = LiftingStatistics::new(game.num_of_vertices());
    let Some(even_winner) = solver.solve(&game, &[], &mut strategy, &mut stats)? else {
        if args.timeout.is_some() {
            eprintln!("time limit exceeded");
            return Ok(EXIT_TIMEOUT);
        }
        eprintln!("solving failed");
        return Ok(EXIT_SOLVER_FAILURE);
    };

    if args.verify {
        if let Some(offending) = verify_strategy(&game, &strategy) {
            eprintln!("verification failed at vertex {offending}");
            return Ok(EXIT_VERIFICATION_FAILURE);
        }
    }

    print_winners(&game, &even_winner, args.dual);
    print_strategy(&strategy);

    if args.stats {
        print_stats(&stats, game.num_of_vertices());
    }

    Ok(EXIT_SUCCESS)
}

fn handle_random(args: RandomArgs) -> Result<u8, PgError> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let graph = match args.cluster {
        Some(cluster_size) => {
            let graph = make_random_clustered(
                &mut rng,
                args.vertices,
                args.out_degree,
                EdgeDirection::Bidirectional,
                cluster_size,
            );
            // Obfuscate the block structure the clustering leaves in the vertex numbering.
            let perm = random_permutation(&mut rng, args.vertices);
            graph.shuffle_vertices(&perm)?
        }
        None => make_random(&mut rng, args.vertices, args.out_degree, EdgeDirection::Bidirectional, false),
    };

    let priority_limit = args.priorities.max(1);
    let mut owner = Vec::with_capacity(args.vertices);
    let mut priority = Vec::with_capacity(args.vertices);
    for _ in 0..args.vertices {
        owner.push(if rand::Rng::random_bool(&mut rng, 0.5) { Player::Even } else { Player::Odd });
        priority.push(Priority::new(rand::Rng::random_range(&mut rng, 0..priority_limit)));
    }

    let game = ParityGame::from_parts(graph, owner, priority, priority_limit)?;

    let mut output = BufWriter::new(File::create(&args.output)?);
    game.write_raw(&mut output)?;
    info!("wrote random game with {} vertices to {}", args.vertices, args.output);

    Ok(EXIT_SUCCESS)
}

fn handle_verify(args: VerifyArgs) -> Result<u8, PgError> {
    let mut game_file = File::open(&args.game_file)?;
    let game = ParityGame::read_raw(&mut game_file)?;

    let strategy_text = std::fs::read_to_string(&args.strategy_file)?;
    let mut strategy = empty_strategy(game.num_of_vertices());
    for line in strategy_text.lines() {
        let Some((from, to)) = line.split_once("->") else {
            continue;
        };
        let from: usize = from.trim().parse().map_err(|_| PgError::InvalidInput {
            reason: format!("malformed strategy line '{line}'"),
        })?;
        let to: usize = to.trim().parse().map_err(|_| PgError::InvalidInput {
            reason: format!("malformed strategy line '{line}'"),
        })?;
        strategy[from] = VertexIndex::new(to);
    }

    match verify_strategy(&game, &strategy) {
        None => {
            println!("valid");
            Ok(EXIT_SUCCESS)
        }
        Some(offending) => {
            println!("invalid at vertex {offending}");
            Ok(EXIT_VERIFICATION_FAILURE)
        }
    }
}

/// Prints the §6 winner format: one `E`/`O` character per vertex, 80 per line. If `dualised`,
/// the reported winner is inverted to undo the `--dual` transformation before printing.
fn print_winners(game: &ParityGame, even_winner: &pg_solve::VertexSet, dualised: bool) {
    let mut line = String::new();
    for v in game.iter_vertices() {
        let mut is_even = even_winner[v.value()];
        if dualised {
            is_even = !is_even;
        }
        line.push(if is_even { 'E' } else { 'O' });
        if line.len() == 80 {
            println!("{line}");
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{line}");
    }
}

fn print_strategy(strategy: &[VertexIndex]) {
    for (v, &mv) in strategy.iter().enumerate() {
        if !is_no_vertex(mv) {
            println!("{v}->{}", mv.value());
        }
    }
}

fn print_stats(stats: &LiftingStatistics, num_vertices: usize) {
    eprintln!("lift attempts: {}", stats.total_attempted());
    eprintln!("successful lifts: {}", stats.total_succeeded());
    for v in 0..num_vertices {
        let attempted = stats.attempted(v);
        if attempted > 0 {
            eprintln!("  vertex {v}: {} attempts, {} successes", attempted, stats.succeeded(v));
        }
    }
}
