use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fortuna_core::{derive_hash_hex, spin_with_seeds, verify_reels, EngineParams, Symbol};

mod simulate;

#[derive(Parser)]
#[command(name = "fortuna-cli", about = "Operator CLI for the fortuna slot engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// JSON file with weights, paytable, bet limits and odds; defaults when omitted
    #[arg(long, global = true, env = "FORTUNA_PARAMS")]
    params: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one provably-fair spin and print it as JSON
    Spin {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long, default_value_t = 1)]
        nonce: u64,
        #[arg(long, default_value_t = 10)]
        bet: u64,
    },
    /// Monte Carlo simulation of a single session
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long, default_value_t = 10)]
        bet: u64,
        #[arg(long, default_value_t = u64::MAX / 2)]
        balance: u64,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Write every spin to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print win and jackpot chances for a range of losing streaks
    Odds {
        #[arg(long, default_value_t = 50)]
        bet: u64,
        #[arg(long, default_value_t = 8)]
        max_losses: u32,
        #[arg(long, default_value_t = 0)]
        spins_since_jackpot: u32,
    },
    /// Check that seeds reproduce the given reels, e.g. --reels cherry,bell,cherry
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long, value_delimiter = ',')]
        reels: Vec<Symbol>,
    },
}

fn load_params(path: Option<PathBuf>) -> anyhow::Result<EngineParams> {
    let Some(path) = path else {
        return Ok(EngineParams::default());
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let params = load_params(cli.params)?;

    match cli.command {
        Commands::Spin {
            server_seed,
            client_seed,
            nonce,
            bet,
        } => {
            let outcome = spin_with_seeds(&server_seed, &client_seed, nonce, &params, bet)?;
            let out = serde_json::json!({
                "server_seed_hash": derive_hash_hex(server_seed.as_bytes()),
                "nonce": nonce,
                "reels": outcome.reels,
                "result": outcome.result,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Simulate {
            spins,
            bet,
            balance,
            seed,
            csv,
        } => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let mut writer = match &csv {
                Some(path) => Some(
                    csv::Writer::from_path(path)
                        .with_context(|| format!("creating {}", path.display()))?,
                ),
                None => None,
            };
            info!(spins, bet, "simulating");
            let summary = simulate::run(&mut rng, &params, bet, spins, balance, |row| {
                if let Some(w) = writer.as_mut() {
                    w.serialize(row)?;
                }
                Ok(())
            })?;
            if let (Some(mut w), Some(path)) = (writer, csv) {
                w.flush()?;
                println!("Exported {} rows to {}", summary.spins, path.display());
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Odds {
            bet,
            max_losses,
            spins_since_jackpot,
        } => {
            println!("{:>6} {:>10} {:>12}", "losses", "win", "jackpot");
            for losses in 0..=max_losses {
                println!(
                    "{:>6} {:>10.4} {:>12.6}",
                    losses,
                    params.odds.win_chance(losses),
                    params.odds.jackpot_chance(bet, spins_since_jackpot)
                );
            }
        }
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            reels,
        } => {
            let indices: Vec<u8> = reels.iter().map(|s| s.to_index()).collect();
            if verify_reels(&server_seed, &client_seed, nonce, &params.weights, &indices)? {
                println!("OK: reels match seeds (nonce {nonce})");
            } else {
                bail!("reels do not match seeds (nonce {nonce})");
            }
        }
    }

    Ok(())
}
