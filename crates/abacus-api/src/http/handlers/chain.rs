//! Chain execution endpoint.
//!
//! POST /api/v1/skills/chain - Run `{ skills: [...] }` in order.
//!
//! A chain that ran returns status 200 whether or not every step succeeded;
//! the envelope's `success` mirrors the chain result and `error` carries the
//! failing step's error. Only an empty chain or a malformed body is rejected
//! outright.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use abacus_types::chain::{ChainResult, ChainStep};
use abacus_types::envelope::Envelope;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChainRequest {
    pub skills: Vec<ChainStep>,
}

pub async fn execute_chain(
    State(state): State<AppState>,
    body: Result<Json<ChainRequest>, JsonRejection>,
) -> Result<ApiResponse<ChainResult>, AppError> {
    let started = Instant::now();
    let Json(request) = body?;
    let result = state.executor.execute_chain(&request.skills)?;

    let error = result
        .steps
        .iter()
        .find(|step| !step.success)
        .and_then(|step| step.error.clone());
    let envelope = Envelope {
        success: result.success,
        data: Some(result),
        error,
    };
    Ok(ApiResponse::from_envelope(envelope, started))
}
