use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Context};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::TypedHeader;
use rand::RngCore;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use fortuna_core::{derive_hash_hex, spin_with_seeds, CoreError, EngineParams, SessionState};
use fortuna_shared::{
    ApiError, OddsQuery, OddsResponse, RotateSeedRequest, RotateSeedResponse, SpinLogEntry,
    SpinRequest, SpinResponse, VerifyResponse,
};

const LOG_CAPACITY: usize = 1000;
const DEFAULT_LOG_LIMIT: usize = 20;
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Startup settings read from the environment.
#[derive(Debug)]
struct ServerConfig {
    bind: String,
    server_seed: String,
    nonce: u64,
    api_key: String,
    starting_balance: u64,
    max_sessions: usize,
}

impl ServerConfig {
    /// A fixed `SERVER_SEED` must come with the last `NONCE` served under it,
    /// otherwise a restart would hand out (seed, nonce) pairs again.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let (server_seed, nonce) = match (get("SERVER_SEED"), get("NONCE")) {
            (Some(seed), Some(nonce)) => (seed, nonce.parse().context("NONCE must be an integer")?),
            (Some(_), None) => bail!("SERVER_SEED is set but NONCE is not; set NONCE to the last nonce served"),
            (None, Some(_)) => bail!("NONCE is set without SERVER_SEED"),
            (None, None) => (random_seed(), 0),
        };
        if server_seed.is_empty() {
            bail!("SERVER_SEED must not be empty");
        }
        let api_key = get("API_KEY").unwrap_or_else(|| {
            warn!("API_KEY not set; using dev-key");
            "dev-key".into()
        });
        let starting_balance = match get("STARTING_BALANCE") {
            Some(v) => v.parse().context("STARTING_BALANCE must be an integer")?,
            None => 1000,
        };
        let max_sessions = match get("MAX_SESSIONS") {
            Some(v) => v.parse().context("MAX_SESSIONS must be an integer")?,
            None => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            bail!("MAX_SESSIONS must be at least 1");
        }
        Ok(Self {
            bind: get("BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            server_seed,
            nonce,
            api_key,
            starting_balance,
            max_sessions,
        })
    }
}

struct SeedState {
    server_seed: String,
    server_seed_hash: String,
    nonce: u64,
    // hashes of every seed revealed by a rotation
    revealed: HashSet<String>,
}

impl SeedState {
    fn new(server_seed: String, nonce: u64) -> Self {
        Self {
            server_seed_hash: derive_hash_hex(server_seed.as_bytes()),
            server_seed,
            nonce,
            revealed: HashSet::new(),
        }
    }

    /// Swaps in `new_seed` with a fresh nonce and returns the retired seed,
    /// its hash and the last nonce it served.
    fn rotate(&mut self, new_seed: String) -> Result<(String, String, u64), ApiError> {
        let new_hash = derive_hash_hex(new_seed.as_bytes());
        if new_hash == self.server_seed_hash || self.revealed.contains(&new_hash) {
            return Err(ApiError::Invalid("new_seed has already been used".into()));
        }
        let old_seed = std::mem::replace(&mut self.server_seed, new_seed);
        let old_hash = std::mem::replace(&mut self.server_seed_hash, new_hash);
        let old_nonce = std::mem::replace(&mut self.nonce, 0);
        self.revealed.insert(old_hash.clone());
        Ok((old_seed, old_hash, old_nonce))
    }
}

/// Per-client sessions, keyed by client seed. Once full, storing a new
/// client drops the least recently stored one.
struct SessionStore {
    capacity: usize,
    tick: u64,
    entries: HashMap<String, (u64, SessionState)>,
}

impl SessionStore {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
        }
    }

    fn get(&self, client_seed: &str) -> Option<SessionState> {
        self.entries.get(client_seed).map(|(_, s)| s.clone())
    }

    fn put(&mut self, client_seed: String, session: SessionState) {
        self.tick += 1;
        if !self.entries.contains_key(&client_seed) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (tick, _))| *tick)
                .map(|(k, _)| k.clone());
            if let Some(key) = oldest {
                debug!(client_seed = %key, "evicting session");
                self.entries.remove(&key);
            }
        }
        self.entries.insert(client_seed, (self.tick, session));
    }
}

#[derive(Default)]
struct SpinLog {
    next_id: u64,
    entries: VecDeque<SpinLogEntry>,
}

impl SpinLog {
    fn push(&mut self, mut entry: SpinLogEntry) {
        self.next_id += 1;
        entry.id = self.next_id;
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn recent(&self, limit: usize) -> Vec<SpinLogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

struct AppState {
    params: EngineParams,
    api_key: String,
    starting_balance: u64,
    seed: Mutex<SeedState>,
    log: Mutex<SpinLog>,
    sessions: Mutex<SessionStore>,
}

impl AppState {
    fn new(params: EngineParams, config: &ServerConfig) -> Self {
        Self {
            params,
            api_key: config.api_key.clone(),
            starting_balance: config.starting_balance,
            seed: Mutex::new(SeedState::new(config.server_seed.clone(), config.nonce)),
            log: Mutex::new(SpinLog::default()),
            sessions: Mutex::new(SessionStore::new(config.max_sessions)),
        }
    }
}

struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        let internal = matches!(
            e,
            CoreError::Rng(_) | CoreError::InvalidPaytable(_) | CoreError::PayoutOverflow(_)
        );
        if internal {
            error!(error = %e, "spin failed");
            Self(ApiError::Internal)
        } else {
            Self(ApiError::Invalid(e.to_string()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex.lock().map_err(|_| {
        error!("state mutex poisoned");
        AppError(ApiError::Internal)
    })
}

async fn route_verify(State(state): State<Arc<AppState>>) -> Result<Json<VerifyResponse>, AppError> {
    let seed = lock(&state.seed)?;
    Ok(Json(VerifyResponse {
        server_seed_hash: seed.server_seed_hash.clone(),
        nonce: seed.nonce,
    }))
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, AppError> {
    if req.client_seed.is_empty() {
        return Err(ApiError::Invalid("client_seed must not be empty".into()).into());
    }
    let params = &state.params;
    params.bet_limits.validate(req.bet)?;

    let mut sessions = lock(&state.sessions)?;
    let mut session = sessions
        .get(&req.client_seed)
        .unwrap_or_else(|| SessionState::new(state.starting_balance));
    session.place_bet(req.bet)?;

    let (outcome, nonce, server_seed_hash) = {
        let mut seed = lock(&state.seed)?;
        let nonce = seed.nonce + 1;
        let outcome = spin_with_seeds(&seed.server_seed, &req.client_seed, nonce, params, req.bet)?;
        seed.nonce = nonce;
        (outcome, nonce, seed.server_seed_hash.clone())
    };

    session.settle(&outcome.result, params.is_jackpot(&outcome.reels));
    sessions.put(req.client_seed.clone(), session.clone());
    drop(sessions);

    let reels = outcome.reel_indices();
    lock(&state.log)?.push(SpinLogEntry {
        id: 0,
        ts: chrono::Utc::now(),
        client_seed: req.client_seed,
        nonce,
        server_seed_hash: server_seed_hash.clone(),
        bet: req.bet,
        result_reels: reels.clone(),
        payout: outcome.result.payout,
    });
    info!(nonce, bet = req.bet, payout = outcome.result.payout, "spin");

    Ok(Json(SpinResponse {
        server_seed_hash,
        nonce,
        reels,
        symbols: outcome.reels.iter().map(|s| s.label().to_string()).collect(),
        is_win: outcome.result.is_win,
        payout: outcome.result.payout,
        win_type: outcome.result.win_type.map(|w| w.label().to_string()),
        winning_positions: outcome.result.winning_positions,
        balance: session.balance,
        win_chance: session.win_chance(&params.odds),
        jackpot_chance: session.jackpot_chance(&params.odds, req.bet),
    }))
}

async fn route_odds(
    State(state): State<Arc<AppState>>,
    Query(q): Query<OddsQuery>,
) -> Json<OddsResponse> {
    let odds = &state.params.odds;
    Json(OddsResponse {
        win_chance: odds.win_chance(q.consecutive_losses),
        jackpot_chance: odds.jackpot_chance(q.bet, q.spins_since_jackpot),
    })
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    limit: Option<usize>,
}

async fn route_spins(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LogQuery>,
) -> Result<Json<Vec<SpinLogEntry>>, AppError> {
    let limit = q.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(LOG_CAPACITY);
    Ok(Json(lock(&state.log)?.recent(limit)))
}

async fn route_admin_rotate_seed(
    State(state): State<Arc<AppState>>,
    TypedHeader(axum_extra::headers::Authorization(bearer)): TypedHeader<
        axum_extra::headers::Authorization<axum_extra::headers::authorization::Bearer>,
    >,
    Json(req): Json<RotateSeedRequest>,
) -> Result<Json<RotateSeedResponse>, AppError> {
    if bearer.token() != state.api_key {
        warn!("rejected seed rotation with bad api key");
        return Err(ApiError::Unauthorized.into());
    }
    if req.new_seed.is_empty() {
        return Err(ApiError::Invalid("new_seed must not be empty".into()).into());
    }
    let mut seed = lock(&state.seed)?;
    let (revealed_seed, revealed_seed_hash, last_nonce) = seed.rotate(req.new_seed)?;
    info!(new_hash = %seed.server_seed_hash, last_nonce, "rotated server seed");
    Ok(Json(RotateSeedResponse {
        revealed_seed,
        revealed_seed_hash,
        last_nonce,
        server_seed_hash: seed.server_seed_hash.clone(),
    }))
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/verify", get(route_verify))
        .route("/spin", post(route_spin))
        .route("/odds", get(route_odds))
        .route("/spins", get(route_spins))
        .route("/admin/rotate-seed", post(route_admin_rotate_seed))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn load_params() -> anyhow::Result<EngineParams> {
    match std::env::var("PARAMS_FILE") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading params file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing params file {path}"))
        }
        Err(_) => Ok(EngineParams::default()),
    }
}

fn random_seed() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let params = load_params()?;
    let config = ServerConfig::from_lookup(|key| std::env::var(key).ok())?;
    info!(nonce = config.nonce, max_sessions = config.max_sessions, "starting");

    let state = Arc::new(AppState::new(params, &config));
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("listening on {}", config.bind);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
