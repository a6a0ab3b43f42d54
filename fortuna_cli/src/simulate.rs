use fortuna_core::{spin_with_rng, EngineParams, SessionState, WinType};
use rand::Rng;
use serde::Serialize;

/// One CSV row per simulated spin.
#[derive(Debug, Serialize)]
pub struct SimRow {
    pub spin: u64,
    pub reels: String,
    pub win_type: String,
    pub payout: u64,
    pub balance: u64,
    pub win_chance: f64,
    pub jackpot_chance: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct SimSummary {
    pub spins: u64,
    pub wagered: u64,
    pub paid: u64,
    pub rtp: f64,
    pub triples: u64,
    pub doubles: u64,
    pub losses: u64,
    pub jackpots: u64,
    pub longest_losing_streak: u32,
    pub final_balance: u64,
    pub stopped_early: bool,
}

/// Plays `spins` rounds of `bet` against a fresh session, stopping early if
/// the balance runs out. `on_spin` sees every row as it is produced.
pub fn run<R, F>(
    rng: &mut R,
    params: &EngineParams,
    bet: u64,
    spins: u64,
    balance: u64,
    mut on_spin: F,
) -> anyhow::Result<SimSummary>
where
    R: Rng + ?Sized,
    F: FnMut(&SimRow) -> anyhow::Result<()>,
{
    params.bet_limits.validate(bet)?;
    let mut session = SessionState::new(balance);
    let mut summary = SimSummary::default();

    for n in 1..=spins {
        if session.balance < bet {
            summary.stopped_early = true;
            break;
        }
        session.place_bet(bet)?;
        let outcome = spin_with_rng(&mut *rng, params, bet)?;
        let jackpot = params.is_jackpot(&outcome.reels);
        session.settle(&outcome.result, jackpot);

        match outcome.result.win_type {
            Some(WinType::Triple) => summary.triples += 1,
            Some(WinType::Double) => summary.doubles += 1,
            None => summary.losses += 1,
        }
        if jackpot {
            summary.jackpots += 1;
        }
        summary.longest_losing_streak = summary.longest_losing_streak.max(session.consecutive_losses);

        on_spin(&SimRow {
            spin: n,
            reels: outcome
                .reels
                .iter()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(" "),
            win_type: outcome.result.win_type.map_or("none", |w| w.label()).to_string(),
            payout: outcome.result.payout,
            balance: session.balance,
            win_chance: session.win_chance(&params.odds),
            jackpot_chance: session.jackpot_chance(&params.odds, bet),
        })?;
    }

    summary.spins = session.spins;
    summary.wagered = session.total_wagered;
    summary.paid = session.total_paid;
    summary.rtp = session.rtp();
    summary.final_balance = session.balance;
    Ok(summary)
}
