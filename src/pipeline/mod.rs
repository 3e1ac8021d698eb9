//! The bounded retry pipeline: generate, screen, execute, feed the error
//! back, up to a retry budget.

mod runner;

pub use runner::PipelineRunner;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to run the pipeline for one task prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
    /// Retry budget; defaults to the configured value, capped.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Per-attempt execution timeout; defaults to the configured value.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_retries: None,
            timeout_secs: None,
        }
    }
}

/// Record of a single generate-screen-execute attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    /// The retry budget for the run this attempt belongs to.
    pub total_attempts: u32,
    /// Generated code (empty when generation itself failed).
    pub code: String,
    pub success: bool,
    /// Captured stdout on success.
    pub output: Option<String>,
    /// Failure description: security violations, runtime stderr, timeout,
    /// or a generation fault.
    pub error: Option<String>,
    /// Wall-clock execution time; absent when the code never ran.
    pub execution_time_secs: Option<f64>,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub success: bool,
    /// Every attempt, in order. Never empty.
    pub attempts: Vec<AttemptRecord>,
    /// The attempt that ended the run (always the last element of `attempts`).
    pub final_result: AttemptRecord,
    pub total_time_secs: f64,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_deserializes_with_defaults() {
        let req: RunRequest = serde_json::from_str(r#"{"prompt": "sum a list"}"#).unwrap();
        assert_eq!(req.prompt, "sum a list");
        assert!(req.max_retries.is_none());
        assert!(req.timeout_secs.is_none());
    }

    #[test]
    fn test_run_request_deserializes_with_overrides() {
        let req: RunRequest =
            serde_json::from_str(r#"{"prompt": "x", "max_retries": 3, "timeout_secs": 10}"#)
                .unwrap();
        assert_eq!(req.max_retries, Some(3));
        assert_eq!(req.timeout_secs, Some(10));
    }

    #[test]
    fn test_attempt_record_serializes_all_fields() {
        let record = AttemptRecord {
            attempt: 2,
            total_attempts: 5,
            code: "print(1)".to_string(),
            success: true,
            output: Some("1\n".to_string()),
            error: None,
            execution_time_secs: Some(0.05),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["attempt"], 2);
        assert_eq!(json["total_attempts"], 5);
        assert_eq!(json["success"], true);
        assert_eq!(json["output"], "1\n");
        assert!(json["error"].is_null());
    }
}
