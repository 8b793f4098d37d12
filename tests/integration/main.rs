//! Integration tests for the SaveServe HTTP API.
//!
//! Each module exercises one route group against a real PostgreSQL
//! database (see `tests/fixtures/test_config.toml`).

mod helpers;

mod auth_test;
mod booking_test;
mod collection_test;
mod concurrency_test;
mod listing_test;
mod notification_test;
