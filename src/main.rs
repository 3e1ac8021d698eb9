use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "rexec")]
#[command(version, about = "Recursive AI code executor")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to serve on (defaults to rexec.toml / 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind 0.0.0.0 and allow any origin (for frontend development)
        #[arg(long)]
        dev: bool,
    },
    /// Run the pipeline once for a prompt and print the result
    Run {
        /// Task prompt for the generator
        prompt: String,

        /// Retry budget (defaults to rexec.toml / 5)
        #[arg(long)]
        max_retries: Option<u32>,

        /// Per-attempt execution timeout in seconds (defaults to rexec.toml / 30)
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the full run outcome as JSON instead of the live log
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Validate the configuration and exit
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, dev } => cmd::cmd_serve(port, dev, cli.verbose).await,
        Commands::Run {
            prompt,
            max_retries,
            timeout,
            json,
        } => {
            let success = cmd::cmd_run(prompt, max_retries, timeout, json, cli.verbose).await?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config { check } => cmd::cmd_config(check),
    }
}
