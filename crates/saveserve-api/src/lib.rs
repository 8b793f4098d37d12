//! # saveserve-api
//!
//! HTTP API layer: the axum router, request handlers, auth/pagination
//! extractors, DTOs, error mapping, and middleware.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
