//! Subprocess execution of screened code with a wall-clock timeout.
//!
//! Code is written to a fresh temp file and run under the configured Python
//! interpreter with the temp directory as its working directory. The child
//! is killed when the timeout expires; a timeout or non-zero exit is a
//! failed [`ExecOutcome`], not an error.

use std::io::Write;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use crate::config::SandboxConfig;
use crate::errors::SandboxError;

/// Result of one sandboxed execution.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    /// Exit code 0 and no timeout.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// None when the process was killed by a signal or timed out.
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub timed_out: bool,
}

impl ExecOutcome {
    /// The error text to feed back into the next generation attempt,
    /// if this run failed.
    pub fn error_text(&self, timeout: Duration) -> Option<String> {
        if self.success {
            return None;
        }
        if self.timed_out {
            return Some(format!(
                "Code execution timed out after {} seconds",
                timeout.as_secs()
            ));
        }
        if self.stderr.trim().is_empty() {
            Some(format!(
                "Process exited with code {}",
                self.exit_code.unwrap_or(-1)
            ))
        } else {
            Some(self.stderr.trim().to_string())
        }
    }
}

/// Runs Python code in an isolated subprocess.
#[derive(Debug, Clone)]
pub struct SandboxRunner {
    config: SandboxConfig,
}

impl SandboxRunner {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Write `code` to a temp file and execute it with the given timeout.
    pub async fn run(&self, code: &str, timeout: Duration) -> Result<ExecOutcome, SandboxError> {
        let mut file = tempfile::Builder::new()
            .prefix("rexec-")
            .suffix(".py")
            .tempfile()
            .map_err(SandboxError::TempFileWrite)?;
        file.write_all(code.as_bytes())
            .map_err(SandboxError::TempFileWrite)?;
        file.flush().map_err(SandboxError::TempFileWrite)?;

        let script_path = file.path().to_path_buf();
        let workdir = script_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(std::env::temp_dir);

        debug!(script = %script_path.display(), timeout_secs = timeout.as_secs(), "running sandboxed code");

        let mut cmd = Command::new(&self.config.python_cmd);
        cmd.arg(&script_path)
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reaps the child if the timeout drops the output future mid-run.
            .kill_on_drop(true);

        let start = Instant::now();
        let outcome = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code();
                ExecOutcome {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code,
                    duration: start.elapsed(),
                    timed_out: false,
                }
            }
            Ok(Err(source)) => {
                return Err(SandboxError::SpawnFailed {
                    command: self.config.python_cmd.clone(),
                    source,
                });
            }
            Err(_) => ExecOutcome {
                success: false,
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                duration: start.elapsed(),
                timed_out: true,
            },
        };

        // Temp file guard drops here, removing the script.
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> SandboxRunner {
        SandboxRunner::new(SandboxConfig::default())
    }

    #[tokio::test]
    async fn test_run_success_captures_stdout() {
        let outcome = runner()
            .run("print('hello from sandbox')", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.stdout.contains("hello from sandbox"));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn test_run_failure_captures_stderr() {
        let outcome = runner()
            .run("raise ValueError('boom')", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_ne!(outcome.exit_code, Some(0));
        assert!(outcome.stderr.contains("ValueError"));
    }

    #[tokio::test]
    async fn test_run_timeout_kills_process() {
        let outcome = runner()
            .run(
                "import time\ntime.sleep(30)\nprint('never')",
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.timed_out);
        assert!(outcome.duration < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_missing_interpreter_is_spawn_error() {
        let runner = SandboxRunner::new(SandboxConfig {
            python_cmd: "definitely-not-a-python".to_string(),
            ..SandboxConfig::default()
        });
        let err = runner
            .run("print('x')", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::SpawnFailed { .. }));
    }

    #[test]
    fn test_error_text_for_timeout() {
        let outcome = ExecOutcome {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            duration: Duration::from_secs(30),
            timed_out: true,
        };
        let text = outcome.error_text(Duration::from_secs(30)).unwrap();
        assert_eq!(text, "Code execution timed out after 30 seconds");
    }

    #[test]
    fn test_error_text_prefers_stderr() {
        let outcome = ExecOutcome {
            success: false,
            stdout: String::new(),
            stderr: "Traceback (most recent call last):\nValueError: boom\n".to_string(),
            exit_code: Some(1),
            duration: Duration::from_millis(50),
            timed_out: false,
        };
        let text = outcome.error_text(Duration::from_secs(30)).unwrap();
        assert!(text.contains("ValueError: boom"));
    }

    #[test]
    fn test_error_text_none_on_success() {
        let outcome = ExecOutcome {
            success: true,
            stdout: "42\n".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
            duration: Duration::from_millis(10),
            timed_out: false,
        };
        assert!(outcome.error_text(Duration::from_secs(30)).is_none());
    }
}
