use fortuna_core::{jackpot_chance, spin_once, win_chance, EngineParams, ProvablyFairRng};

fn main() -> Result<(), fortuna_core::CoreError> {
    // Example end-to-end spin
    let rng = ProvablyFairRng::new("example-server-seed", "example-client-seed", 1);
    let params = EngineParams::default();
    let outcome = spin_once(&rng, &params, 50)?;
    println!(
        "server_seed_hash={} reels={:?} win={} payout={}",
        rng.server_seed_hash_hex(),
        outcome.reels,
        outcome.result.is_win,
        outcome.result.payout
    );
    println!(
        "win_chance(0)={:.2} jackpot_chance(50, 0)={:.4}",
        win_chance(0),
        jackpot_chance(50, 0)
    );
    Ok(())
}
