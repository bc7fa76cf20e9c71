//! Axum route handlers for the Selection API.

use std::collections::HashSet;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::models::fragment::ContentFragment;
use crate::models::job::JobContext;
use crate::models::selection::SelectionResult;
use crate::selection::engine::{ScoreBatch, SelectionRequest};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub fragments: Vec<ContentFragment>,
    #[serde(default)]
    pub job: JobContext,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub batch: ScoreBatch,
    pub scorer_backend: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub engine: EngineConfig,
    pub scorer_backend: String,
    pub selection_config_path: Option<String>,
    pub score_cache_capacity: usize,
    /// Entries currently cached; absent when the cache is disabled.
    pub cached_scores: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    #[serde(flatten)]
    pub result: SelectionResult,
    pub scorer_backend: String,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/config
///
/// Returns the active, validated engine configuration.
pub async fn handle_get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        engine: state.engine.config().clone(),
        scorer_backend: state.engine.scorer_backend().to_string(),
        selection_config_path: state.config.selection_config_path.clone(),
        score_cache_capacity: state.config.score_cache_capacity,
        cached_scores: state.engine.cached_scores(),
    })
}

/// POST /api/v1/scores
///
/// Scores each fragment against the job context. No scopes, budgets or suggestions.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    reject_duplicates(request.fragments.iter().map(|f| f.id))?;

    let engine = state.engine.clone();
    let batch = tokio::task::spawn_blocking(move || engine.score_all(&request.fragments, &request.job))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Scoring task failed: {e}")))?;

    Ok(Json(ScoreResponse {
        batch,
        scorer_backend: state.engine.scorer_backend().to_string(),
    }))
}

/// POST /api/v1/selections
///
/// Runs scope inclusion, ranking, budget truncation and suggestion generation
/// for one profile snapshot against one job context.
pub async fn handle_select(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let duplicates = request.snapshot.duplicate_ids();
    if !duplicates.is_empty() {
        return Err(duplicate_error(&duplicates));
    }

    let fragment_count = request.snapshot.fragments.len();
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.select(&request))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Selection task failed: {e}")))?;

    info!(
        "Selected {} of {fragment_count} fragments across {} scopes",
        result.included_ids().len(),
        result.scopes.len()
    );

    Ok(Json(SelectionResponse {
        result,
        scorer_backend: state.engine.scorer_backend().to_string(),
        generated_at: Utc::now(),
    }))
}

fn reject_duplicates(ids: impl Iterator<Item = Uuid>) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    let duplicates: Vec<Uuid> = ids.filter(|id| !seen.insert(*id)).collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(duplicate_error(&duplicates))
    }
}

fn duplicate_error(ids: &[Uuid]) -> AppError {
    let listed: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    AppError::Validation(format!("Duplicate ids in request: {}", listed.join(", ")))
}
