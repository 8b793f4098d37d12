//! Job executor — dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use saveserve_core::error::AppError;

/// Trait for job handler implementations.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes.
    fn job_type(&self) -> &str;

    /// Execute the job, returning an optional summary for the log.
    async fn execute(&self) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// The handler failed; the next scheduled tick will try again.
    #[error("Job failure: {0}")]
    Failed(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the appropriate handler based on job type.
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type.
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a job handler.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job by dispatching to the correct handler.
    pub async fn run(&self, job_type: &str) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(job_type).ok_or_else(|| {
            JobExecutionError::Failed(format!("No handler registered for job type '{job_type}'"))
        })?;

        tracing::debug!("Executing job '{}'", job_type);
        let result = handler.execute().await;
        match &result {
            Ok(summary) => {
                tracing::info!(job_type, summary = ?summary, "Job finished");
            }
            Err(e) => {
                tracing::error!(job_type, "Job failed: {e}");
            }
        }
        result
    }

    /// Check if a handler is registered for a job type.
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types.
    pub fn registered_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}
