//! Allow-listed execution for untrusted callers.
//!
//! POST /api/v1/public/execute - `{ skillId, input }`
//! GET  /api/v1/public/execute - the allowed ids

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExecuteRequest {
    pub skill_id: String,
    #[serde(default)]
    pub input: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllowedSkills {
    allowed: Vec<String>,
}

pub async fn public_execute(
    State(state): State<AppState>,
    body: Result<Json<PublicExecuteRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let started = Instant::now();
    let Json(request) = body?;
    let output = state
        .gate
        .execute(state.executor.as_ref(), &request.skill_id, request.input)?;
    Ok(ApiResponse::success(output, started))
}

pub async fn list_public(State(state): State<AppState>) -> ApiResponse<AllowedSkills> {
    let started = Instant::now();
    ApiResponse::success(
        AllowedSkills {
            allowed: state.gate.allowed().to_vec(),
        },
        started,
    )
}
