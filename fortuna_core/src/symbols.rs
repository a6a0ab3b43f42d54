use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Reel symbols, ordered from most common to rarest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherry,
    Bell,
    Diamond,
    Seven,
    Star,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [
        Symbol::Cherry,
        Symbol::Bell,
        Symbol::Diamond,
        Symbol::Seven,
        Symbol::Star,
    ];

    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(i as usize).copied()
    }

    pub fn to_index(self) -> u8 {
        match self {
            Symbol::Cherry => 0,
            Symbol::Bell => 1,
            Symbol::Diamond => 2,
            Symbol::Seven => 3,
            Symbol::Star => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Bell => "bell",
            Symbol::Diamond => "diamond",
            Symbol::Seven => "seven",
            Symbol::Star => "star",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|sym| sym.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownSymbol(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeightEntry {
    pub symbol: Symbol,
    pub weight: u32,
}

/// Relative draw weights, iterated in insertion order.
///
/// Built through [`WeightTable::new`] (or `Default`), so every table in the
/// program is non-empty with strictly positive weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<WeightEntry>", into = "Vec<WeightEntry>")]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
    total: u64,
}

impl WeightTable {
    pub fn new(entries: Vec<WeightEntry>) -> CoreResult<Self> {
        if entries.is_empty() {
            return Err(CoreError::EmptyWeightTable);
        }
        let mut total = 0u64;
        for (i, entry) in entries.iter().enumerate() {
            if entry.weight == 0 {
                return Err(CoreError::ZeroWeight(entry.symbol));
            }
            if entries[..i].iter().any(|e| e.symbol == entry.symbol) {
                return Err(CoreError::DuplicateSymbol(entry.symbol));
            }
            total += entry.weight as u64;
        }
        Ok(Self { entries, total })
    }

    pub fn from_pairs(pairs: &[(Symbol, u32)]) -> CoreResult<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(symbol, weight)| WeightEntry { symbol, weight })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn weight_of(&self, symbol: Symbol) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.weight)
    }

    /// Share of draws expected to land on `symbol`.
    pub fn probability_of(&self, symbol: Symbol) -> f64 {
        self.weight_of(symbol)
            .map_or(0.0, |w| w as f64 / self.total as f64)
    }

    pub fn first(&self) -> Symbol {
        self.entries[0].symbol
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            entries: vec![
                WeightEntry { symbol: Symbol::Cherry, weight: 40 },
                WeightEntry { symbol: Symbol::Bell, weight: 30 },
                WeightEntry { symbol: Symbol::Diamond, weight: 15 },
                WeightEntry { symbol: Symbol::Seven, weight: 10 },
                WeightEntry { symbol: Symbol::Star, weight: 5 },
            ],
            total: 100,
        }
    }
}

impl TryFrom<Vec<WeightEntry>> for WeightTable {
    type Error = CoreError;

    fn try_from(entries: Vec<WeightEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<WeightTable> for Vec<WeightEntry> {
    fn from(table: WeightTable) -> Self {
        table.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for sym in Symbol::ALL {
            assert_eq!(Symbol::from_index(sym.to_index()), Some(sym));
        }
        assert_eq!(Symbol::from_index(5), None);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!("Diamond".parse::<Symbol>(), Ok(Symbol::Diamond));
        assert_eq!(" star ".parse::<Symbol>(), Ok(Symbol::Star));
        assert!(matches!(
            "lemon".parse::<Symbol>(),
            Err(CoreError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = WeightTable::default();
        let rebuilt = WeightTable::new(table.entries().to_vec()).unwrap();
        assert_eq!(table, rebuilt);
        assert_eq!(table.total(), 100);
        assert_eq!(table.weight_of(Symbol::Star), Some(5));
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert_eq!(WeightTable::new(vec![]), Err(CoreError::EmptyWeightTable));
        assert_eq!(
            WeightTable::from_pairs(&[(Symbol::Bell, 3), (Symbol::Star, 0)]),
            Err(CoreError::ZeroWeight(Symbol::Star))
        );
        assert_eq!(
            WeightTable::from_pairs(&[(Symbol::Bell, 3), (Symbol::Bell, 1)]),
            Err(CoreError::DuplicateSymbol(Symbol::Bell))
        );
    }

    #[test]
    fn test_serde_validates() {
        let json = r#"[{"symbol":"cherry","weight":0}]"#;
        assert!(serde_json::from_str::<WeightTable>(json).is_err());

        let json = r#"[{"symbol":"cherry","weight":3},{"symbol":"star","weight":1}]"#;
        let table: WeightTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.total(), 4);
        assert_eq!(table.first(), Symbol::Cherry);
    }
}
