//! hex-mcts demo driver.
//!
//! ## Usage
//!
//! - `hex-mcts selfplay` - Play Hex self-play games and fill a replay buffer
//! - `hex-mcts nim` - Search a Nim position and play it out
//!
//! Logging is controlled by `RUST_LOG` (default `info`) or `--verbose`.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hex_mcts::config::MctsConfig;
use hex_mcts::constants::{DEFAULT_BOARD_SIZE, NIM_MAX_TAKE, NIM_PIECES, N_SIMS, ROLLOUT_EPSILON};
use hex_mcts::evaluator::UniformEvaluator;
use hex_mcts::game::GameState;
use hex_mcts::hex::HexState;
use hex_mcts::mcts::Mcts;
use hex_mcts::nim::NimState;
use hex_mcts::selfplay::{SelfPlay, SelfPlayConfig};

/// hex-mcts: Monte Carlo Tree Search for Hex and Nim
#[derive(Parser)]
#[command(name = "hex-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play Hex self-play games and collect training cases
    Selfplay {
        /// Board size
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Number of games
        #[arg(long, default_value_t = 1)]
        games: usize,
        /// Simulations per move
        #[arg(long, default_value_t = N_SIMS)]
        sims: u32,
        /// Soft time limit per move in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Guide playouts with the uniform evaluator
        #[arg(long)]
        guided: bool,
        /// Epsilon for guided playouts
        #[arg(long, default_value_t = ROLLOUT_EPSILON)]
        epsilon: f64,
        /// Reuse the played move's subtree between moves
        #[arg(long)]
        reuse_tree: bool,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Search a single-pile Nim game and play it out
    Nim {
        /// Pieces in the pile
        #[arg(long, default_value_t = NIM_PIECES)]
        pieces: u32,
        /// Maximum pieces removed per move
        #[arg(long, default_value_t = NIM_MAX_TAKE)]
        max_take: u32,
        /// Simulations per move
        #[arg(long, default_value_t = 2000)]
        sims: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Selfplay {
            size,
            games,
            sims,
            time_limit_ms,
            guided,
            epsilon,
            reuse_tree,
            seed,
        }) => {
            let mut mcts = MctsConfig::for_selfplay()
                .with_simulations(sims)
                .with_rollout_epsilon(epsilon);
            if let Some(ms) = time_limit_ms {
                mcts = mcts.with_time_limit(Duration::from_millis(ms));
            }
            if let Some(seed) = seed {
                mcts = mcts.with_seed(seed);
            }
            let config = SelfPlayConfig {
                board_size: size,
                games,
                reuse_tree,
                mcts,
                ..SelfPlayConfig::default()
            };
            run_selfplay(config, guided)
        }
        Some(Commands::Nim {
            pieces,
            max_take,
            sims,
        }) => run_nim(pieces, max_take, sims),
        None => run_selfplay(
            SelfPlayConfig {
                games: 1,
                ..SelfPlayConfig::default()
            },
            false,
        ),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_selfplay(config: SelfPlayConfig, guided: bool) -> Result<()> {
    let size = config.board_size;
    let mut runner = if guided {
        SelfPlay::with_evaluator(config, UniformEvaluator::new())
    } else {
        SelfPlay::new(config)
    }
    .context("failed to set up self-play")?;

    let records = runner
        .run(|batch| info!(cases = batch.len(), "minibatch ready for training"))
        .context("self-play failed")?;

    for (i, record) in records.iter().enumerate() {
        let mut state = HexState::new(size)?;
        for &mv in &record.moves {
            state = state.apply_action(mv)?;
        }
        println!("=== Game {} ({} moves, winner {:?}) ===", i + 1, record.moves.len(), record.winner);
        println!("{state}");
    }
    println!("Replay buffer: {} cases", runner.buffer().len());
    Ok(())
}

fn run_nim(pieces: u32, max_take: u32, sims: u32) -> Result<()> {
    let mut state = NimState::new(pieces, max_take)?;
    let mut mcts = Mcts::new(MctsConfig::default().with_simulations(sims))?;

    println!("Nim: {state}");
    while !state.is_terminal() {
        let outcome = mcts.search(&state)?;
        println!(
            "{:?} takes {} (root value {:+.3})",
            state.player_to_move(),
            outcome.action,
            outcome.root_value
        );
        state = outcome.best;
    }

    match state.winner() {
        Some(winner) => println!("Winner: {winner:?}"),
        None => bail!("game ended without a winner"),
    }
    Ok(())
}
