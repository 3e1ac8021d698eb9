use anyhow::Result;
use console::style;

use rexec::config::RexecConfig;

/// Print the effective configuration, optionally validating only.
pub fn cmd_config(check: bool) -> Result<()> {
    let dir = std::env::current_dir()?;
    let config = RexecConfig::load(&dir)?;

    if check {
        config.validate()?;
        if RexecConfig::api_key().is_none() {
            println!(
                "{} OPENAI_API_KEY is not set; `serve` and `run` will refuse to start",
                style("warning:").yellow().bold()
            );
        }
        println!("{} Configuration OK", style("✓").green());
        return Ok(());
    }

    println!("{}", style("[generation]").bold());
    println!("model = {:?}", config.generation.model);
    println!("api_base = {:?}", config.generation.api_base);
    println!("max_tokens = {}", config.generation.max_tokens);
    println!("temperature = {}", config.generation.temperature);
    println!();
    println!("{}", style("[sandbox]").bold());
    println!("python_cmd = {:?}", config.sandbox.python_cmd);
    println!("default_timeout_secs = {}", config.sandbox.default_timeout_secs);
    println!("min_timeout_secs = {}", config.sandbox.min_timeout_secs);
    println!("max_timeout_secs = {}", config.sandbox.max_timeout_secs);
    println!();
    println!("{}", style("[pipeline]").bold());
    println!("default_max_retries = {}", config.pipeline.default_max_retries);
    println!("max_retries_cap = {}", config.pipeline.max_retries_cap);
    println!("max_prompt_chars = {}", config.pipeline.max_prompt_chars);
    println!();
    println!("{}", style("[server]").bold());
    println!("port = {}", config.server.port);
    println!();
    println!(
        "OPENAI_API_KEY: {}",
        if RexecConfig::api_key().is_some() {
            style("set").green().to_string()
        } else {
            style("not set").red().to_string()
        }
    );

    Ok(())
}
