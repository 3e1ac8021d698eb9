//! Typed error hierarchy for rexec.
//!
//! Three top-level enums cover the three subsystems:
//! - `GenerateError` — failures talking to the completion provider
//! - `SandboxError` — failures setting up or spawning the execution sandbox
//! - `PipelineError` — request validation and run-level failures

use thiserror::Error;

/// Errors from the code generation subsystem.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Completion request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("Provider returned an empty completion")]
    EmptyCompletion,

    #[error("Failed to parse provider response: {0}")]
    MalformedResponse(String),
}

/// Errors from the sandbox subsystem.
///
/// A timed-out or non-zero-exit run is NOT an error — it is a failed
/// `ExecOutcome`. These variants are reserved for faults in the sandbox
/// machinery itself.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Failed to write code to temp file: {0}")]
    TempFileWrite(#[source] std::io::Error),

    #[error("Failed to spawn {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Prompt must be between 1 and {max} characters (got {got})")]
    PromptLength { got: usize, max: usize },

    #[error("max_retries must be between 1 and {cap} (got {got})")]
    RetriesOutOfRange { got: u32, cap: u32 },

    #[error("timeout_secs must be between {min} and {max} (got {got})")]
    TimeoutOutOfRange { got: u64, min: u64, max: u64 },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

impl PipelineError {
    /// Whether this error is the caller's fault (maps to HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::PromptLength { .. }
                | PipelineError::RetriesOutOfRange { .. }
                | PipelineError::TimeoutOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_error_missing_key_message() {
        let err = GenerateError::MissingApiKey;
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn sandbox_error_spawn_carries_command() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "python3 not found");
        let err = SandboxError::SpawnFailed {
            command: "python3".to_string(),
            source: io_err,
        };
        match &err {
            SandboxError::SpawnFailed { command, source } => {
                assert_eq!(command, "python3");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected SpawnFailed variant"),
        }
        assert!(err.to_string().contains("python3"));
    }

    #[test]
    fn pipeline_error_validation_classification() {
        let err = PipelineError::PromptLength { got: 0, max: 1000 };
        assert!(err.is_validation());

        let err = PipelineError::RetriesOutOfRange { got: 99, cap: 10 };
        assert!(err.is_validation());

        let err: PipelineError = GenerateError::MissingApiKey.into();
        assert!(!err.is_validation());
    }

    #[test]
    fn pipeline_error_converts_from_generate_error() {
        let inner = GenerateError::EmptyCompletion;
        let err: PipelineError = inner.into();
        assert!(matches!(
            err,
            PipelineError::Generate(GenerateError::EmptyCompletion)
        ));
    }

    #[test]
    fn timeout_out_of_range_carries_bounds() {
        let err = PipelineError::TimeoutOutOfRange {
            got: 120,
            min: 5,
            max: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("120"));
        assert!(msg.contains('5'));
        assert!(msg.contains("60"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&GenerateError::EmptyCompletion);
        assert_std_error(&SandboxError::TempFileWrite(std::io::Error::other("x")));
        assert_std_error(&PipelineError::PromptLength { got: 0, max: 1000 });
    }
}
