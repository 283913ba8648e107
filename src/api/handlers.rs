//! API Handlers
//!
//! HTTP request handlers for each cache admin endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use regex::Regex;
use serde_json::Value;

use crate::cache::{AssetCache, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchGetRequest, BatchGetResponse, BatchSetRequest, DeleteResponse, GetResponse, HasResponse,
    HealthResponse, KeysQuery, KeysResponse, MessageResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The cache handle is cheap to clone and carries its own lock.
#[derive(Clone)]
pub struct AppState {
    pub cache: AssetCache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: AssetCache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with an in-memory cache built from `config`.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(AssetCache::new(config)?))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    state.cache.set(req.key.clone(), req.value, ttl);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let present = state.cache.has(&key);
    Json(HasResponse { key, present })
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear();
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /keys?pattern=<regex>
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Result<Json<KeysResponse>> {
    let pattern = query
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| CacheError::InvalidRequest(format!("Invalid key pattern: {}", e)))?;

    Ok(Json(KeysResponse {
        keys: state.cache.keys(pattern.as_ref()),
    }))
}

/// Handler for POST /batch/get
pub async fn batch_get_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchGetRequest>,
) -> Json<BatchGetResponse> {
    Json(BatchGetResponse {
        values: state.cache.get_batch(&req.keys),
    })
}

/// Handler for PUT /batch/set
pub async fn batch_set_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchSetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let count = req.entries.len();
    state.cache.set_batch(req.entries, ttl);

    Ok(Json(MessageResponse::new(format!("{} keys set successfully", count))))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
