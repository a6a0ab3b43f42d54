use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinRequest {
    pub client_seed: String,
    pub bet: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinResponse {
    pub server_seed_hash: String,
    pub nonce: u64,
    /// Symbol indices, one per reel.
    pub reels: Vec<u8>,
    pub symbols: Vec<String>,
    pub is_win: bool,
    pub payout: u64,
    pub win_type: Option<String>,
    pub winning_positions: Vec<usize>,
    pub balance: u64,
    pub win_chance: f64,
    pub jackpot_chance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerifyResponse {
    pub server_seed_hash: String,
    pub nonce: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OddsQuery {
    pub bet: u64,
    #[serde(default)]
    pub consecutive_losses: u32,
    #[serde(default)]
    pub spins_since_jackpot: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OddsResponse {
    pub win_chance: f64,
    pub jackpot_chance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RotateSeedRequest {
    pub new_seed: String,
}

/// The retired seed is revealed so past spins can be checked against its hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RotateSeedResponse {
    pub revealed_seed: String,
    pub revealed_seed_hash: String,
    pub last_nonce: u64,
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinLogEntry {
    pub id: u64,
    pub ts: DateTime<Utc>,
    pub client_seed: String,
    pub nonce: u64,
    pub server_seed_hash: String,
    pub bet: u64,
    pub result_reels: Vec<u8>,
    pub payout: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Invalid(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::Internal => 500,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
