use serde::{Deserialize, Serialize};

use crate::{
    engine::WinResult,
    error::{CoreError, CoreResult},
    probability::OddsPolicy,
};

/// Per-player running totals. Owned by whoever drives the spins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub balance: u64,
    pub consecutive_losses: u32,
    pub spins_since_jackpot: u32,
    pub total_wagered: u64,
    pub total_paid: u64,
    pub spins: u64,
}

impl SessionState {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    /// Debits `bet` from the balance.
    pub fn place_bet(&mut self, bet: u64) -> CoreResult<()> {
        if bet == 0 {
            return Err(CoreError::InvalidBet);
        }
        self.balance = self
            .balance
            .checked_sub(bet)
            .ok_or(CoreError::InsufficientBalance {
                balance: self.balance,
                bet,
            })?;
        self.total_wagered = self.total_wagered.saturating_add(bet);
        Ok(())
    }

    /// Credits the payout and rolls the streak counters forward.
    pub fn settle(&mut self, result: &WinResult, jackpot: bool) {
        self.spins += 1;
        self.balance = self.balance.saturating_add(result.payout);
        self.total_paid = self.total_paid.saturating_add(result.payout);
        if result.is_win {
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses = self.consecutive_losses.saturating_add(1);
        }
        if jackpot {
            self.spins_since_jackpot = 0;
        } else {
            self.spins_since_jackpot = self.spins_since_jackpot.saturating_add(1);
        }
    }

    pub fn win_chance(&self, odds: &OddsPolicy) -> f64 {
        odds.win_chance(self.consecutive_losses)
    }

    pub fn jackpot_chance(&self, odds: &OddsPolicy, bet: u64) -> f64 {
        odds.jackpot_chance(bet, self.spins_since_jackpot)
    }

    /// Return to player so far; zero before the first wager.
    pub fn rtp(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        self.total_paid as f64 / self.total_wagered as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WinType;

    fn loss() -> WinResult {
        WinResult {
            is_win: false,
            payout: 0,
            win_type: None,
            winning_positions: vec![],
        }
    }

    fn win(payout: u64) -> WinResult {
        WinResult {
            is_win: true,
            payout,
            win_type: Some(WinType::Double),
            winning_positions: vec![0, 1],
        }
    }

    #[test]
    fn test_streaks() {
        let mut s = SessionState::new(100);
        for _ in 0..3 {
            s.place_bet(10).unwrap();
            s.settle(&loss(), false);
        }
        assert_eq!(s.consecutive_losses, 3);
        assert_eq!(s.spins_since_jackpot, 3);
        assert!((s.win_chance(&OddsPolicy::default()) - 0.30).abs() < 1e-12);

        s.place_bet(10).unwrap();
        s.settle(&win(15), false);
        assert_eq!(s.consecutive_losses, 0);
        assert_eq!(s.spins_since_jackpot, 4);

        s.place_bet(10).unwrap();
        s.settle(&win(1000), true);
        assert_eq!(s.spins_since_jackpot, 0);
    }

    #[test]
    fn test_balance_and_rtp() {
        let mut s = SessionState::new(50);
        assert_eq!(s.rtp(), 0.0);
        s.place_bet(20).unwrap();
        s.settle(&win(30), false);
        s.place_bet(20).unwrap();
        s.settle(&loss(), false);
        assert_eq!(s.balance, 40);
        assert_eq!(s.total_wagered, 40);
        assert_eq!(s.total_paid, 30);
        assert_eq!(s.spins, 2);
        assert!((s.rtp() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_balance() {
        let mut s = SessionState::new(5);
        assert_eq!(
            s.place_bet(6),
            Err(CoreError::InsufficientBalance { balance: 5, bet: 6 })
        );
        assert_eq!(s.balance, 5);
        assert_eq!(s.place_bet(0), Err(CoreError::InvalidBet));
    }
}
