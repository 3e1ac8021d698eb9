//! AI code generation.
//!
//! The [`CodeGenerator`] trait is the seam between the retry pipeline and
//! the completion provider; [`OpenAiGenerator`] is the production
//! implementation, and tests substitute scripted stubs.

mod client;
pub mod prompts;

pub use client::OpenAiGenerator;

use async_trait::async_trait;

use crate::errors::GenerateError;

/// Produces Python source for a task prompt, optionally correcting a
/// previous failed attempt.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generate code for `prompt`. When `previous_error` is set, the
    /// generator is asked to fix that error in the new code.
    async fn generate(
        &self,
        prompt: &str,
        previous_error: Option<&str>,
    ) -> Result<String, GenerateError>;
}
