use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::api::{RouteOverrides, RouteTable};

const ENV_PREFIX: &str = "BIZDESK_";

fn default_timeout() -> u64 {
    15
}

fn default_log_file() -> PathBuf {
    PathBuf::from("bizdesk.log")
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `http://localhost:3000`
    #[serde(default)]
    pub backend_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(skip)]
    pub routes: RouteTable,
}

impl Config {
    /// Load configuration from `BIZDESK_*` environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize the prefixed variables into Config
    /// 3. Apply any per-route overrides
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mut config = envy::prefixed(ENV_PREFIX)
            .from_env::<Config>()
            .context("invalid BIZDESK_* configuration")?;
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_env::<RouteOverrides>()
            .context("invalid route override")?;
        config.routes = RouteTable::default().with_overrides(overrides);

        Ok(config)
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Command-line flags take precedence over the environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.backend_url {
            self.backend_url = url.clone();
        }
        if let Some(path) = &cli.log_file {
            self.log_file = path.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StartScreen {
    #[default]
    Dashboard,
    Projects,
    Documents,
    Finance,
}

/// Terminal client for projects, documents and finance records
#[derive(Debug, Parser)]
#[command(name = "bizdesk", version)]
pub struct Cli {
    /// Backend base URL (overrides BIZDESK_BACKEND_URL)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Where to write logs (overrides BIZDESK_LOG_FILE)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Screen shown on start
    #[arg(long, value_enum, default_value_t = StartScreen::Dashboard)]
    pub screen: StartScreen,
}

/// Initialize environment variables and load configuration
pub fn init(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    config.apply_cli(cli);
    anyhow::ensure!(
        !config.backend_url.trim().is_empty(),
        "BIZDESK_BACKEND_URL or --backend-url must be set"
    );
    Ok(config)
}
