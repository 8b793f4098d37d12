//! # saveserve-worker
//!
//! Background maintenance: a registry of [`executor::JobHandler`]s driven
//! by a cron scheduler. Jobs are periodic sweeps (booking QR expiry,
//! listing freshness, NGO window release) and cleanup (old notifications,
//! stale sessions). Handlers run in-process; there is no persistent job
//! queue.

pub mod executor;
pub mod jobs;
pub mod scheduler;
