//! HTTP/REST API layer for Abacus.
//!
//! Axum-based REST API at `/api/v1/` with the `{ success, data?, error? }`
//! envelope on every response and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
