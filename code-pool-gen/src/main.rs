//! Code pool generator
//!
//! Builds a pool of unique, non-guessable redemption codes and writes it
//! as a CSV file with assignment-status columns. The QR batch generator
//! consumes the resulting pool file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use redeem_core::pool::{self, DEFAULT_ATTEMPTS_PER_CODE};

/// Code pool generator CLI
#[derive(Parser)]
#[command(name = "code-pool-gen")]
#[command(about = "Generate a pool of unique redemption codes", long_about = None)]
struct Cli {
    /// Number of codes to generate
    #[arg(long, default_value_t = 2000)]
    count: usize,

    /// Destination CSV file
    #[arg(long, default_value = "./pool/code_pool.csv")]
    out: PathBuf,

    /// RNG seed for reproducible pools (rehearsal runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on total random draws before giving up
    #[arg(long)]
    max_attempts: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let max_attempts = cli
        .max_attempts
        .unwrap_or(cli.count as u64 * DEFAULT_ATTEMPTS_PER_CODE);

    info!(count = cli.count, out = %cli.out.display(), "building code pool");

    let codes = match cli.seed {
        Some(seed) => pool::build_pool(cli.count, max_attempts, &mut StdRng::seed_from_u64(seed)),
        None => pool::build_pool(cli.count, max_attempts, &mut rand::thread_rng()),
    }
    .context("failed to build code pool")?;

    pool::write_pool(&cli.out, &codes)
        .with_context(|| format!("failed to write pool to {}", cli.out.display()))?;

    println!("✅ Saved {} with {} codes", cli.out.display(), codes.len());
    Ok(())
}
