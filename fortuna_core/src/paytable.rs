use crate::error::{CoreError, CoreResult};
use crate::symbols::Symbol;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Multiplier applied when a symbol has no triple entry in the table.
pub const FALLBACK_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaytableEntry {
    pub symbol: Symbol,
    pub multiplier: u64,
}

/// Payout rules for three-reel outcomes.
///
/// Triples pay `bet * multiplier` from `triples`. Doubles pay
/// `bet * double_numerator / double_denominator`, rounded down.
///
/// Deserialization goes through [`Paytable::new`], so a loaded table always
/// has triples, unique symbols and a non-zero double denominator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawPaytable")]
pub struct Paytable {
    pub triples: Vec<PaytableEntry>,
    pub double_numerator: u64,
    pub double_denominator: u64,
}

#[derive(Deserialize)]
struct RawPaytable {
    triples: Vec<PaytableEntry>,
    double_numerator: u64,
    double_denominator: u64,
}

impl TryFrom<RawPaytable> for Paytable {
    type Error = CoreError;

    fn try_from(raw: RawPaytable) -> Result<Self, Self::Error> {
        Self::new(raw.triples, raw.double_numerator, raw.double_denominator)
    }
}

impl Paytable {
    pub fn new(
        triples: Vec<PaytableEntry>,
        double_numerator: u64,
        double_denominator: u64,
    ) -> CoreResult<Self> {
        if triples.is_empty() {
            return Err(CoreError::InvalidPaytable("triples must not be empty"));
        }
        for (i, entry) in triples.iter().enumerate() {
            if triples[..i].iter().any(|e| e.symbol == entry.symbol) {
                return Err(CoreError::InvalidPaytable("symbol listed twice in triples"));
            }
        }
        if double_denominator == 0 {
            return Err(CoreError::InvalidPaytable("double denominator is zero"));
        }
        Ok(Self {
            triples,
            double_numerator,
            double_denominator,
        })
    }

    pub fn triple_multiplier(&self, symbol: Symbol) -> u64 {
        match self.triples.iter().find(|e| e.symbol == symbol) {
            Some(entry) => entry.multiplier,
            None => {
                warn!(%symbol, "no triple entry in paytable; using fallback multiplier");
                FALLBACK_MULTIPLIER
            }
        }
    }

    /// Symbol with the highest triple multiplier.
    pub fn top_symbol(&self) -> Option<Symbol> {
        self.triples
            .iter()
            .max_by_key(|e| e.multiplier)
            .map(|e| e.symbol)
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self {
            triples: vec![
                PaytableEntry { symbol: Symbol::Cherry, multiplier: 5 },
                PaytableEntry { symbol: Symbol::Bell, multiplier: 10 },
                PaytableEntry { symbol: Symbol::Diamond, multiplier: 20 },
                PaytableEntry { symbol: Symbol::Seven, multiplier: 50 },
                PaytableEntry { symbol: Symbol::Star, multiplier: 100 },
            ],
            double_numerator: 3,
            double_denominator: 2,
        }
    }
}
