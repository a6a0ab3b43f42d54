use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    paytable::Paytable,
    probability::OddsPolicy,
    rng::ProvablyFairRng,
    symbols::{Symbol, WeightTable},
};

pub const REEL_COUNT: usize = 3;

pub type Reels = [Symbol; REEL_COUNT];

// Checked in order; outside a triple at most one of these can match.
const PAIRS: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WinType {
    Triple,
    Double,
}

impl WinType {
    pub fn label(self) -> &'static str {
        match self {
            WinType::Triple => "triple",
            WinType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinResult {
    pub is_win: bool,
    pub payout: u64,
    pub win_type: Option<WinType>,
    pub winning_positions: Vec<usize>,
}

impl WinResult {
    fn no_match() -> Self {
        Self {
            is_win: false,
            payout: 0,
            win_type: None,
            winning_positions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetLimits {
    pub min: u64,
    pub max: u64,
}

impl BetLimits {
    pub fn validate(&self, bet: u64) -> CoreResult<()> {
        if bet == 0 {
            return Err(CoreError::InvalidBet);
        }
        if bet < self.min || bet > self.max {
            return Err(CoreError::BetOutOfRange {
                bet,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self { min: 1, max: 1000 }
    }
}

/// Everything a spin needs: reel weights, payouts, bet bounds and the odds
/// shown alongside results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineParams {
    pub weights: WeightTable,
    pub paytable: Paytable,
    pub bet_limits: BetLimits,
    pub odds: OddsPolicy,
}

impl EngineParams {
    /// [`evaluate`] behind the configured bet limits.
    pub fn evaluate_bet(&self, reels: &Reels, bet: u64) -> CoreResult<WinResult> {
        self.bet_limits.validate(bet)?;
        evaluate(reels, bet, &self.paytable)
    }

    /// Three of the best-paying symbol.
    pub fn is_jackpot(&self, reels: &Reels) -> bool {
        match self.paytable.top_symbol() {
            Some(top) => reels.iter().all(|s| *s == top),
            None => false,
        }
    }
}

/// Classifies three reels and computes the payout for `bet`.
///
/// Triple pays `bet * triple multiplier`, a single matching pair pays
/// `floor(bet * 1.5)` with the default paytable, anything else pays nothing.
pub fn evaluate(reels: &Reels, bet: u64, paytable: &Paytable) -> CoreResult<WinResult> {
    if bet == 0 {
        return Err(CoreError::InvalidBet);
    }

    let [a, b, c] = *reels;
    if a == b && b == c {
        let payout = bet
            .checked_mul(paytable.triple_multiplier(a))
            .ok_or(CoreError::PayoutOverflow(bet))?;
        return Ok(WinResult {
            is_win: true,
            payout,
            win_type: Some(WinType::Triple),
            winning_positions: vec![0, 1, 2],
        });
    }

    if let Some(&(i, j)) = PAIRS.iter().find(|(i, j)| reels[*i] == reels[*j]) {
        let payout = bet
            .checked_mul(paytable.double_numerator)
            .ok_or(CoreError::PayoutOverflow(bet))?
            .checked_div(paytable.double_denominator)
            .ok_or(CoreError::InvalidPaytable("double denominator is zero"))?;
        return Ok(WinResult {
            is_win: true,
            payout,
            win_type: Some(WinType::Double),
            winning_positions: vec![i, j],
        });
    }

    Ok(WinResult::no_match())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinOutcome {
    pub reels: Reels,
    pub result: WinResult,
}

impl SpinOutcome {
    pub fn reel_indices(&self) -> Vec<u8> {
        self.reels.iter().map(|s| s.to_index()).collect()
    }
}

/// One weighted pick per reel, each from its own float of the seeded stream.
pub fn draw_reels(rng: &ProvablyFairRng, weights: &WeightTable) -> CoreResult<Reels> {
    let floats = rng.next_floats(REEL_COUNT)?;
    Ok(std::array::from_fn(|i| weights.pick(floats[i])))
}

pub fn spin_once(rng: &ProvablyFairRng, params: &EngineParams, bet: u64) -> CoreResult<SpinOutcome> {
    params.bet_limits.validate(bet)?;
    let reels = draw_reels(rng, &params.weights)?;
    let result = evaluate(&reels, bet, &params.paytable)?;
    debug!(nonce = rng.nonce, ?reels, payout = result.payout, "spin");
    Ok(SpinOutcome { reels, result })
}

/// Same as [`spin_once`] but draws from an ordinary `rand` generator.
pub fn spin_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    params: &EngineParams,
    bet: u64,
) -> CoreResult<SpinOutcome> {
    params.bet_limits.validate(bet)?;
    let reels: Reels = std::array::from_fn(|_| params.weights.sample(&mut *rng));
    let result = evaluate(&reels, bet, &params.paytable)?;
    Ok(SpinOutcome { reels, result })
}

/// Convenience: perform a spin creating the RNG from seeds.
pub fn spin_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    params: &EngineParams,
    bet: u64,
) -> CoreResult<SpinOutcome> {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    spin_once(&rng, params, bet)
}

/// Checks that `expected_indices` are the reels the seeds produce.
pub fn verify_reels(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    weights: &WeightTable,
    expected_indices: &[u8],
) -> CoreResult<bool> {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    let reels = draw_reels(&rng, weights)?;
    Ok(reels.iter().map(|s| s.to_index()).eq(expected_indices.iter().copied()))
}
