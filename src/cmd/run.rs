use std::sync::Arc;

use anyhow::{Context, Result};

use rexec::config::RexecConfig;
use rexec::generate::OpenAiGenerator;
use rexec::pipeline::{PipelineRunner, RunRequest};
use rexec::ui::RunUi;

/// One-shot pipeline run from the terminal.
///
/// Returns the run's success flag so `main` can set the exit code; a run
/// that exhausts its budget is a normal outcome, not a CLI error.
pub async fn cmd_run(
    prompt: String,
    max_retries: Option<u32>,
    timeout_secs: Option<u64>,
    json: bool,
    verbose: bool,
) -> Result<bool> {
    let config = RexecConfig::load(&std::env::current_dir()?)?;

    let generator = OpenAiGenerator::from_env(config.generation.clone())
        .context("Set OPENAI_API_KEY to run code generation")?;
    let pipeline = PipelineRunner::new(
        Arc::new(generator),
        config.pipeline.clone(),
        config.sandbox.clone(),
    );

    let request = RunRequest {
        prompt,
        max_retries,
        timeout_secs,
    };

    let ui = if json {
        None
    } else {
        Some(Arc::new(RunUi::new(verbose)))
    };

    let outcome = pipeline
        .run_with_ui(&request, ui)
        .await
        .context("Pipeline run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(outcome.success)
}
