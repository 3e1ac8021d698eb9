use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{AttemptRecord, RunOutcome, RunRequest};
use crate::config::{PipelineConfig, SandboxConfig};
use crate::errors::PipelineError;
use crate::generate::CodeGenerator;
use crate::sandbox::SandboxRunner;
use crate::screen::{describe_violations, screen_source};
use crate::ui::RunUi;

/// Drives the generate → screen → execute loop for a single prompt.
///
/// State carried across attempts is exactly the attempt counter and the
/// previous attempt's error text, which is appended to the next generation
/// prompt.
pub struct PipelineRunner {
    generator: Arc<dyn CodeGenerator>,
    sandbox: SandboxRunner,
    pipeline: PipelineConfig,
    sandbox_cfg: SandboxConfig,
}

impl PipelineRunner {
    pub fn new(
        generator: Arc<dyn CodeGenerator>,
        pipeline: PipelineConfig,
        sandbox_cfg: SandboxConfig,
    ) -> Self {
        Self {
            generator,
            sandbox: SandboxRunner::new(sandbox_cfg.clone()),
            pipeline,
            sandbox_cfg,
        }
    }

    /// Validate the request and resolve defaults into concrete limits.
    fn resolve_limits(&self, request: &RunRequest) -> Result<(u32, Duration), PipelineError> {
        let prompt_len = request.prompt.chars().count();
        if prompt_len == 0 || prompt_len > self.pipeline.max_prompt_chars {
            return Err(PipelineError::PromptLength {
                got: prompt_len,
                max: self.pipeline.max_prompt_chars,
            });
        }

        let max_retries = request
            .max_retries
            .unwrap_or(self.pipeline.default_max_retries);
        if max_retries == 0 || max_retries > self.pipeline.max_retries_cap {
            return Err(PipelineError::RetriesOutOfRange {
                got: max_retries,
                cap: self.pipeline.max_retries_cap,
            });
        }

        let timeout_secs = request
            .timeout_secs
            .unwrap_or(self.sandbox_cfg.default_timeout_secs);
        if timeout_secs < self.sandbox_cfg.min_timeout_secs
            || timeout_secs > self.sandbox_cfg.max_timeout_secs
        {
            return Err(PipelineError::TimeoutOutOfRange {
                got: timeout_secs,
                min: self.sandbox_cfg.min_timeout_secs,
                max: self.sandbox_cfg.max_timeout_secs,
            });
        }

        Ok((max_retries, Duration::from_secs(timeout_secs)))
    }

    /// Run the full retry loop for one request.
    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome, PipelineError> {
        self.run_with_ui(request, None).await
    }

    /// Run the loop, reporting per-attempt progress to a terminal UI.
    pub async fn run_with_ui(
        &self,
        request: &RunRequest,
        ui: Option<Arc<RunUi>>,
    ) -> Result<RunOutcome, PipelineError> {
        let (max_retries, timeout) = self.resolve_limits(request)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_start = Instant::now();
        info!(%run_id, max_retries, timeout_secs = timeout.as_secs(), "starting pipeline run");

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut previous_error: Option<String> = None;

        for attempt in 1..=max_retries {
            if let Some(ref ui) = ui {
                ui.start_attempt(attempt, max_retries);
            }

            let code = match self
                .generator
                .generate(&request.prompt, previous_error.as_deref())
                .await
            {
                Ok(code) => code,
                Err(err) => {
                    // Generation faults are infrastructure problems, not code
                    // problems; retrying would burn budget on the same outage.
                    warn!(%run_id, attempt, error = %err, "generation failed, aborting run");
                    let record = AttemptRecord {
                        attempt,
                        total_attempts: max_retries,
                        code: String::new(),
                        success: false,
                        output: None,
                        error: Some(err.to_string()),
                        execution_time_secs: None,
                    };
                    if let Some(ref ui) = ui {
                        ui.attempt_outcome(&record);
                    }
                    attempts.push(record);
                    break;
                }
            };

            let violations = screen_source(&code);
            if !violations.is_empty() {
                let error = describe_violations(&violations);
                info!(%run_id, attempt, %error, "screening rejected generated code");
                let record = AttemptRecord {
                    attempt,
                    total_attempts: max_retries,
                    code,
                    success: false,
                    output: None,
                    error: Some(error.clone()),
                    execution_time_secs: None,
                };
                if let Some(ref ui) = ui {
                    ui.attempt_outcome(&record);
                }
                attempts.push(record);
                previous_error = Some(error);
                continue;
            }

            let outcome = self.sandbox.run(&code, timeout).await?;
            let error = outcome.error_text(timeout);
            let record = AttemptRecord {
                attempt,
                total_attempts: max_retries,
                code,
                success: outcome.success,
                output: outcome.success.then(|| outcome.stdout.clone()),
                error: error.clone(),
                execution_time_secs: Some(outcome.duration.as_secs_f64()),
            };
            if let Some(ref ui) = ui {
                ui.attempt_outcome(&record);
            }
            let succeeded = record.success;
            attempts.push(record);

            if succeeded {
                info!(%run_id, attempt, "run succeeded");
                break;
            }
            previous_error = error;
        }

        // The loop always records at least one attempt before exiting.
        let final_result = attempts
            .last()
            .cloned()
            .expect("pipeline produced no attempts");
        let success = final_result.success;
        if !success {
            info!(%run_id, attempts = attempts.len(), "run exhausted without success");
        }

        let outcome = RunOutcome {
            run_id,
            success,
            attempts,
            final_result,
            total_time_secs: run_start.elapsed().as_secs_f64(),
            started_at,
        };
        if let Some(ref ui) = ui {
            ui.finish(&outcome);
        }
        Ok(outcome)
    }
}
