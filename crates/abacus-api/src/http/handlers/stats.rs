//! Execution log endpoints.
//!
//! GET /api/v1/logs?limit=n - Most recent entries, newest first.
//! GET /api/v1/stats        - Aggregates over the retained entries.

use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use abacus_core::logger::DEFAULT_RECENT_LIMIT;
use abacus_types::log::{ExecutionLogEntry, LogStats};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogList {
    count: usize,
    logs: Vec<ExecutionLogEntry>,
}

pub async fn get_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<ApiResponse<LogList>, AppError> {
    let started = Instant::now();
    let Query(query) = query?;
    let logs = state
        .logger
        .recent(query.limit.unwrap_or(DEFAULT_RECENT_LIMIT));
    Ok(ApiResponse::success(
        LogList {
            count: logs.len(),
            logs,
        },
        started,
    ))
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResponse<LogStats> {
    let started = Instant::now();
    ApiResponse::success(state.logger.stats(), started)
}
