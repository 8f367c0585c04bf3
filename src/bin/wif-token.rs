use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::arg;
use clap::command;
use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};
use wif_token::config::environment::Environment;
use wif_token::config::loader;
use wif_token::config::types::WifParams;
use wif_token::credential::select::external_account_credential;
use wif_token::credential::wif::Credential;
use wif_token::utils::constants::{DEFAULT_LIFETIME_SECONDS, DEFAULT_SAFETY_MARGIN_SECS};
use wif_token::utils::logging::{self, LogFormat, LogLevel, LoggingConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// External account credential document (JSON)
    #[arg(short, long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    config: PathBuf,
    /// Scope for the service account token; repeat for several
    #[arg(short, long = "scope", default_value = "https://www.googleapis.com/auth/cloud-platform")]
    scopes: Vec<String>,
    /// Requested token lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_LIFETIME_SECONDS)]
    lifetime: u64,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "compact")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read args, env
    // -------------------------------

    let args = Args::parse();
    logging::init_logging(&LoggingConfig::new(args.log_level, args.log_format))?;
    let env = Environment::from_process();

    // -------------------------------
    // 2. Load credential document
    // -------------------------------

    let document = loader::file_to_config(&args.config)
        .await
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    // -------------------------------
    // 3. Derive the access token
    // -------------------------------

    let params = WifParams::new(args.scopes).with_lifetime(args.lifetime);
    let credential = external_account_credential(&document, &env, params, Client::new())
        .await
        .context("workload identity federation failed")?
        .ok_or_else(|| anyhow!("{} does not yield a usable credential here", args.config.display()))?;

    let token = credential
        .credentials()
        .ok_or_else(|| anyhow!("credential derived without a token"))?;
    info!(expire_time = %token.expire_time, "access token obtained");
    if token.is_expired(DEFAULT_SAFETY_MARGIN_SECS) {
        warn!(expire_time = %token.expire_time, "access token expires within the safety margin");
    }

    println!("{}", serde_json::to_string_pretty(token)?);
    Ok(())
}
