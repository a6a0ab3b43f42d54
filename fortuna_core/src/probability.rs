//! Display-side odds estimators.
//!
//! These numbers are shown to players and fed into simulations. They never
//! decide an outcome: reels are drawn from the weight table alone.

use serde::{Deserialize, Serialize};

/// Tunable constants behind [`OddsPolicy::win_chance`] and
/// [`OddsPolicy::jackpot_chance`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OddsPolicy {
    pub base_win_chance: f64,
    pub loss_streak_bonus: f64,
    pub max_win_chance: f64,
    pub min_jackpot_bet: u64,
    pub base_jackpot_chance: f64,
    pub jackpot_spin_bonus: f64,
    pub max_jackpot_spin_bonus: f64,
    pub max_jackpot_chance: f64,
}

impl Default for OddsPolicy {
    fn default() -> Self {
        Self {
            base_win_chance: 0.15,
            loss_streak_bonus: 0.05,
            max_win_chance: 0.45,
            min_jackpot_bet: 50,
            base_jackpot_chance: 0.0005,
            jackpot_spin_bonus: 0.00001,
            max_jackpot_spin_bonus: 0.005,
            max_jackpot_chance: 0.01,
        }
    }
}

impl OddsPolicy {
    /// Base chance plus a bonus per consecutive loss, capped.
    pub fn win_chance(&self, consecutive_losses: u32) -> f64 {
        let chance = self.base_win_chance + consecutive_losses as f64 * self.loss_streak_bonus;
        chance.min(self.max_win_chance).clamp(0.0, 1.0)
    }

    /// Zero below the minimum bet. Above it the base chance scales linearly
    /// with `bet / min_jackpot_bet`, plus a capped per-spin drought bonus.
    pub fn jackpot_chance(&self, bet: u64, spins_since_last_jackpot: u32) -> f64 {
        if self.min_jackpot_bet == 0 || bet < self.min_jackpot_bet {
            return 0.0;
        }
        let bet_multiplier = bet as f64 / self.min_jackpot_bet as f64;
        let spin_bonus = (spins_since_last_jackpot as f64 * self.jackpot_spin_bonus)
            .min(self.max_jackpot_spin_bonus);
        (self.base_jackpot_chance * bet_multiplier + spin_bonus)
            .min(self.max_jackpot_chance)
            .clamp(0.0, 1.0)
    }
}

pub fn win_chance(consecutive_losses: u32) -> f64 {
    OddsPolicy::default().win_chance(consecutive_losses)
}

pub fn jackpot_chance(bet: u64, spins_since_last_jackpot: u32) -> f64 {
    OddsPolicy::default().jackpot_chance(bet, spins_since_last_jackpot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_win_chance_curve() {
        assert!((win_chance(0) - 0.15).abs() < EPS);
        assert!((win_chance(1) - 0.20).abs() < EPS);
        assert!((win_chance(6) - 0.45).abs() < EPS);
        assert!((win_chance(100) - 0.45).abs() < EPS);
        assert!((win_chance(u32::MAX) - 0.45).abs() < EPS);
    }

    #[test]
    fn test_jackpot_below_min_bet() {
        assert_eq!(jackpot_chance(10, 0), 0.0);
        assert_eq!(jackpot_chance(49, 10_000), 0.0);
    }

    #[test]
    fn test_jackpot_base_case() {
        assert!((jackpot_chance(50, 0) - 0.0005).abs() < EPS);
        assert!((jackpot_chance(100, 0) - 0.001).abs() < EPS);
    }

    #[test]
    fn test_jackpot_grows_with_spins() {
        let mut prev = jackpot_chance(50, 0);
        for spins in 1..=500 {
            let next = jackpot_chance(50, spins);
            assert!(next > prev, "spins={spins}");
            prev = next;
        }
        assert!(jackpot_chance(50, u32::MAX) <= 0.01);
    }

    #[test]
    fn test_jackpot_cap() {
        assert!((jackpot_chance(1_000_000, 1_000_000) - 0.01).abs() < EPS);
    }

    #[test]
    fn test_policy_from_partial_json() {
        let policy: OddsPolicy = serde_json::from_str(r#"{"max_win_chance":0.3}"#).unwrap();
        assert!((policy.win_chance(10) - 0.3).abs() < EPS);
        assert_eq!(policy.min_jackpot_bet, 50);
    }
}
