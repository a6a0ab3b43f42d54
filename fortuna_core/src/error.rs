use crate::symbols::Symbol;

/// Caller-contract violations raised by the engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("bet must be a positive amount")]
    InvalidBet,
    #[error("bet {bet} outside allowed range {min}..={max}")]
    BetOutOfRange { bet: u64, min: u64, max: u64 },
    #[error("weight table has no symbols")]
    EmptyWeightTable,
    #[error("weight for {0} must be positive")]
    ZeroWeight(Symbol),
    #[error("symbol {0} appears more than once in weight table")]
    DuplicateSymbol(Symbol),
    #[error("invalid paytable: {0}")]
    InvalidPaytable(&'static str),
    #[error("payout overflows for bet {0}")]
    PayoutOverflow(u64),
    #[error("insufficient balance: have {balance}, need {bet}")]
    InsufficientBalance { balance: u64, bet: u64 },
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("rng failure: {0}")]
    Rng(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
