pub mod engine;
pub mod error;
pub mod paytable;
pub mod probability;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod symbols;

pub use crate::engine::{
    draw_reels, evaluate, spin_once, spin_with_rng, spin_with_seeds, verify_reels, BetLimits,
    EngineParams, Reels, SpinOutcome, WinResult, WinType, REEL_COUNT,
};
pub use crate::error::{CoreError, CoreResult};
pub use crate::paytable::{Paytable, PaytableEntry, FALLBACK_MULTIPLIER};
pub use crate::probability::{jackpot_chance, win_chance, OddsPolicy};
pub use crate::rng::{derive_floats, derive_hash_hex, ProvablyFairRng};
pub use crate::session::SessionState;
pub use crate::symbols::{Symbol, WeightEntry, WeightTable};
