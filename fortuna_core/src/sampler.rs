use rand::Rng;
use tracing::debug;

use crate::symbols::{Symbol, WeightTable};

impl WeightTable {
    /// Maps a unit float in [0,1) onto a symbol by cumulative weight.
    ///
    /// Scales `unit` by the total weight and walks the table in order,
    /// subtracting each weight until the remainder drops to zero or below.
    /// If no entry is reached (out-of-range `unit`, float drift) the first
    /// symbol of the table is returned.
    pub fn pick(&self, unit: f64) -> Symbol {
        let mut remainder = unit * self.total() as f64;
        for entry in self.entries() {
            remainder -= entry.weight as f64;
            if remainder <= 0.0 {
                return entry.symbol;
            }
        }
        debug!(unit, "weighted pick fell through; using first symbol");
        self.first()
    }

    /// Draws one symbol with probability weight/total.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        self.pick(rng.gen::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_pick_boundaries() {
        let table = WeightTable::default();
        assert_eq!(table.pick(0.0), Symbol::Cherry);
        assert_eq!(table.pick(0.39), Symbol::Cherry);
        assert_eq!(table.pick(0.41), Symbol::Bell);
        assert_eq!(table.pick(0.80), Symbol::Diamond);
        assert_eq!(table.pick(0.90), Symbol::Seven);
        assert_eq!(table.pick(0.999), Symbol::Star);
    }

    #[test]
    fn test_pick_fallback_is_first() {
        let table = WeightTable::from_pairs(&[(Symbol::Seven, 1), (Symbol::Bell, 1)]).unwrap();
        assert_eq!(table.pick(1.5), Symbol::Seven);
        assert_eq!(table.pick(f64::NAN), Symbol::Seven);
    }

    #[test]
    fn test_sample_frequencies() {
        let table = WeightTable::default();
        let mut rng = StdRng::seed_from_u64(7);
        let draws = 200_000;
        let mut counts = [0u32; 5];
        for _ in 0..draws {
            counts[table.sample(&mut rng).to_index() as usize] += 1;
        }
        for entry in table.entries() {
            let observed = counts[entry.symbol.to_index() as usize] as f64 / draws as f64;
            let expected = table.probability_of(entry.symbol);
            assert!(
                (observed - expected).abs() < 0.01,
                "{}: observed {observed}, expected {expected}",
                entry.symbol
            );
        }
    }

    #[test]
    fn test_sample_stays_in_table() {
        let table = WeightTable::from_pairs(&[(Symbol::Diamond, 2), (Symbol::Star, 9)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let s = table.sample(&mut rng);
            assert!(s == Symbol::Diamond || s == Symbol::Star);
        }
    }
}
