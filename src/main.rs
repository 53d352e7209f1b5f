//! gaugo: a Monte Carlo Go engine.
//!
//! ## Usage
//!
//! - `gaugo` / `gaugo gtp` - Start the GTP server for GUI integration
//! - `gaugo bench` - Time pure-random playouts from the empty board
//! - `gaugo demo` - Search one position and print the analysis
//!
//! Engine options (`--boardsize`, `--komi`, `--sims`, ...) go before the
//! subcommand. Logs are written to stderr; stdout belongs to GTP.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, info};

use gaugo::board::{Board, Color};
use gaugo::gtp::GtpEngine;
use gaugo::mcts::{UctSearch, budget_for, policy_for};
use gaugo::options::Options;
use gaugo::playout::{AmafMap, PlayoutPolicy};
use gaugo::zobrist::ZobristTable;

/// gaugo: a Monte Carlo Go engine
#[derive(Parser)]
#[command(name = "gaugo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run random playouts from the empty board and report their speed
    Bench {
        /// Number of playouts
        #[arg(default_value_t = 10_000)]
        playouts: u32,
    },
    /// Search a short opening and print the analysis
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.options.validate()?;

    let level = match cli.options.verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match cli.command {
        Some(Commands::Gtp) | None => {
            let mut engine = GtpEngine::new(cli.options)?;
            engine.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Bench { playouts }) => run_bench(&cli.options, playouts)?,
        Some(Commands::Demo) => run_demo(&cli.options)?,
    }
    Ok(())
}

fn run_bench(options: &Options, playouts: u32) -> Result<()> {
    let empty = Board::new(options.board_size, Arc::new(ZobristTable::default()))?;
    let mut board = empty.clone();
    let mut amaf = AmafMap::new();
    let mut policy = policy_for(options);

    let started = Instant::now();
    let mut black_wins = 0u32;
    for _ in 0..playouts {
        board.clone_from(&empty);
        amaf.clear();
        if policy.playout(&mut board, options.komi, &mut amaf) == Color::Black {
            black_wins += 1;
        }
    }
    let secs = started.elapsed().as_secs_f64();

    info!(playouts, secs, "bench finished");
    println!(
        "{}",
        bench_summary(options.board_size, playouts, black_wins, secs)
    );
    Ok(())
}

/// One-line report of a benchmark run.
fn bench_summary(size: usize, playouts: u32, black_wins: u32, secs: f64) -> String {
    let rate = if secs > 0.0 { playouts as f64 / secs } else { 0.0 };
    let black_pct = if playouts > 0 {
        black_wins as f64 * 100.0 / playouts as f64
    } else {
        0.0
    };
    format!(
        "{playouts} playouts on {size}x{size} in {secs:.2}s: {rate:.0} playouts/s, Black wins {black_pct:.1}%"
    )
}

fn run_demo(options: &Options) -> Result<()> {
    println!("gaugo: Monte Carlo Go engine\n");

    let mut board = Board::new(options.board_size, Arc::new(ZobristTable::default()))?;
    let mut history = Vec::new();
    let center = options.board_size / 2;
    for (x, y) in [(center, center), (center + 1, center - 1)] {
        let pt = board.point(x, y);
        history.push(board.hash());
        board.play(pt);
    }
    println!("{board}");

    println!("Running {} simulations...", options.simulations);
    let mut search = UctSearch::new(
        &board,
        &history,
        options,
        policy_for(options),
        budget_for(options),
    );
    let best = search.run();

    println!("Best move: {}", board.point_name(best));
    let pv: Vec<String> = search
        .principal_variation(10)
        .into_iter()
        .map(|mv| board.point_name(mv))
        .collect();
    println!("Principal variation: {}", pv.join(" "));

    let mut stats = search.root_stats();
    stats.sort_by(|a, b| b.played.cmp(&a.played));
    for child in stats.iter().take(5) {
        println!(
            "  {:>4} played {:>6} winrate {:>5.1}% amaf {:>6} ({:>5.1}%)",
            board.point_name(child.mv),
            child.played,
            child.winrate.unwrap_or(0.0) * 100.0,
            child.amaf_played,
            child.amaf_winrate.unwrap_or(0.0) * 100.0,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_summary_reports_black_share() {
        let line = bench_summary(9, 200, 150, 2.0);
        assert_eq!(
            line,
            "200 playouts on 9x9 in 2.00s: 100 playouts/s, Black wins 75.0%"
        );
    }

    #[test]
    fn test_bench_summary_without_playouts() {
        let line = bench_summary(5, 0, 0, 0.0);
        assert!(line.ends_with("0 playouts/s, Black wins 0.0%"));
    }

    #[test]
    fn test_cli_parses_bench() {
        let cli = Cli::try_parse_from(["gaugo", "--boardsize", "7", "bench", "50"]).unwrap();
        assert_eq!(cli.options.board_size, 7);
        assert!(matches!(cli.command, Some(Commands::Bench { playouts: 50 })));
    }
}
