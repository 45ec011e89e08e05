//! assemble - submit code snippets to GitHub as pull requests
//!
//! Server binary exposing the OAuth flow and the submission pipeline
//! over HTTP.

use anyhow::Result;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "assemble")]
#[command(about = "Submit code snippets to a GitHub project as pull requests")]
#[command(version)]
struct Cli {
    /// Upstream repository (`owner/repo` or a GitHub URL)
    #[arg(long)]
    upstream: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding local working copies
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Bypass the OAuth exchange with a token from the environment
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Value of `key`, preferring a command line flag over the environment
    fn lookup(&self, key: &str) -> Option<String> {
        let flag = match key {
            "ASSEMBLE_UPSTREAM" => self.upstream.clone(),
            "ASSEMBLE_PORT" => self.port.map(|p| p.to_string()),
            "ASSEMBLE_BIND" => self.bind.clone(),
            "ASSEMBLE_WORK_DIR" => self.work_dir.as_ref().map(|p| p.display().to_string()),
            "ASSEMBLE_DEBUG" if self.debug => Some("true".to_string()),
            _ => None,
        };
        flag.or_else(|| env::var(key).ok())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = assemble::config::Config::from_lookup(|key| cli.lookup(key))?;
    cli::run_serve(config).await
}
