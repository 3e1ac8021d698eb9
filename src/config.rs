use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Default chat model for generation.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default completions endpoint base.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Runtime configuration for rexec.
///
/// Loaded from an optional `rexec.toml` in the working directory. Missing
/// file means defaults; a partial file overrides only the keys it sets.
/// The provider API key comes exclusively from the `OPENAI_API_KEY`
/// environment variable.
#[derive(Debug, Clone)]
pub struct RexecConfig {
    pub generation: GenerationConfig,
    pub sandbox: SandboxConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub python_cmd: String,
    pub default_timeout_secs: u64,
    pub min_timeout_secs: u64,
    pub max_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_max_retries: u32,
    pub max_retries_cap: u32,
    pub max_prompt_chars: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: 1000,
            temperature: 0.1,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python_cmd: "python3".to_string(),
            default_timeout_secs: 30,
            min_timeout_secs: 5,
            max_timeout_secs: 60,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_max_retries: 5,
            max_retries_cap: 10,
            max_prompt_chars: 1000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for RexecConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            sandbox: SandboxConfig::default(),
            pipeline: PipelineConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Raw TOML structure for `rexec.toml`.
#[derive(Debug, Deserialize)]
struct RexecToml {
    generation: Option<GenerationSection>,
    sandbox: Option<SandboxSection>,
    pipeline: Option<PipelineSection>,
    server: Option<ServerSection>,
}

#[derive(Debug, Deserialize)]
struct GenerationSection {
    model: Option<String>,
    api_base: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SandboxSection {
    python_cmd: Option<String>,
    default_timeout_secs: Option<u64>,
    min_timeout_secs: Option<u64>,
    max_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PipelineSection {
    default_max_retries: Option<u32>,
    max_retries_cap: Option<u32>,
    max_prompt_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    port: Option<u16>,
}

impl RexecConfig {
    /// Load configuration from `rexec.toml` in the given directory.
    /// Returns defaults if the file doesn't exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join("rexec.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let toml: RexecToml = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let mut config = Self::default();

        if let Some(section) = toml.generation {
            if let Some(model) = section.model {
                config.generation.model = model;
            }
            if let Some(api_base) = section.api_base {
                config.generation.api_base = api_base;
            }
            if let Some(max_tokens) = section.max_tokens {
                config.generation.max_tokens = max_tokens;
            }
            if let Some(temperature) = section.temperature {
                config.generation.temperature = temperature;
            }
        }
        if let Some(section) = toml.sandbox {
            if let Some(python_cmd) = section.python_cmd {
                config.sandbox.python_cmd = python_cmd;
            }
            if let Some(secs) = section.default_timeout_secs {
                config.sandbox.default_timeout_secs = secs;
            }
            if let Some(secs) = section.min_timeout_secs {
                config.sandbox.min_timeout_secs = secs;
            }
            if let Some(secs) = section.max_timeout_secs {
                config.sandbox.max_timeout_secs = secs;
            }
        }
        if let Some(section) = toml.pipeline {
            if let Some(retries) = section.default_max_retries {
                config.pipeline.default_max_retries = retries;
            }
            if let Some(cap) = section.max_retries_cap {
                config.pipeline.max_retries_cap = cap;
            }
            if let Some(chars) = section.max_prompt_chars {
                config.pipeline.max_prompt_chars = chars;
            }
        }
        if let Some(section) = toml.server {
            if let Some(port) = section.port {
                config.server.port = port;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency of the loaded values.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sandbox;
        if s.min_timeout_secs > s.default_timeout_secs
            || s.default_timeout_secs > s.max_timeout_secs
        {
            bail!(
                "Sandbox timeouts must satisfy min <= default <= max (got {} <= {} <= {})",
                s.min_timeout_secs,
                s.default_timeout_secs,
                s.max_timeout_secs
            );
        }
        let p = &self.pipeline;
        if p.default_max_retries == 0 || p.default_max_retries > p.max_retries_cap {
            bail!(
                "Pipeline retries must satisfy 1 <= default <= cap (got default {}, cap {})",
                p.default_max_retries,
                p.max_retries_cap
            );
        }
        if p.max_prompt_chars == 0 {
            bail!("max_prompt_chars must be at least 1");
        }
        Ok(())
    }

    /// Read the provider API key from the environment, if set.
    pub fn api_key() -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
