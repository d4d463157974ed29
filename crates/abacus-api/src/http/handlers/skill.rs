//! Skill HTTP handlers: list, describe, execute, and execute-with-adapter.

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use abacus_core::executor::SkillExecutor;
use abacus_types::log::ExecutionSource;
use abacus_types::skill::{SkillDescription, SkillSummary};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response DTOs
// ---------------------------------------------------------------------------

/// Query parameters for listing skills.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Whitespace- or comma-separated search terms.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SkillList {
    count: usize,
    skills: Vec<SkillSummary>,
}

/// Request body for executing a skill.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub input: Value,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/skills - List registered skills, optionally filtered by `?q=`.
pub async fn list_skills(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<SkillList>, AppError> {
    let started = Instant::now();
    let Query(query) = query?;

    let terms: Vec<&str> = query
        .q
        .as_deref()
        .unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let skills: Vec<SkillSummary> = if terms.is_empty() {
        state.registry.summaries()
    } else {
        state
            .registry
            .search(&terms)
            .iter()
            .map(|skill| skill.summary())
            .collect()
    };

    Ok(ApiResponse::success(
        SkillList {
            count: skills.len(),
            skills,
        },
        started,
    ))
}

/// GET /api/v1/skills/{id} - Describe a skill with its form fields.
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SkillDescription>, AppError> {
    let started = Instant::now();
    let description = state.registry.describe(&id)?;
    Ok(ApiResponse::success(description, started))
}

/// POST /api/v1/skills/{id} - Execute a skill with `{ input }`.
pub async fn execute_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let started = Instant::now();
    let Json(request) = body?;
    let output = state
        .executor
        .execute(&id, request.input, Some(ExecutionSource::Api))?;
    Ok(ApiResponse::success(output, started))
}

/// POST /api/v1/skills/{id}/adapt - Execute, then enrich the output through
/// the skill's presentation adapter.
pub async fn adapt_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let started = Instant::now();
    let Json(request) = body?;
    let output = state
        .executor
        .execute(&id, request.input.clone(), Some(ExecutionSource::Api))?;
    let adapted = state.adapters.adapt(&id, &request.input, &output);
    Ok(ApiResponse::success(adapted, started))
}
