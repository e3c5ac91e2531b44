// ⚙️ Configuration - Where the portfolio comes from, and logging setup
//
// Shared by the CLI and the API server. Every flag has an environment
// fallback so the server can be configured without arguments.

use crate::filter::{FilterController, FilterView};
use crate::init::{Initializer, DEFAULT_ATTEMPTS};
use crate::source::probe_path;
use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_PORTFOLIO_PATH: &str = "portfolio.json";
pub const DEFAULT_INIT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Portfolio description (.json or .csv)
    #[arg(long, short = 'p', env = "PORTFOLIO_PATH", default_value = DEFAULT_PORTFOLIO_PATH)]
    pub portfolio: PathBuf,

    /// How many times to look for the portfolio before giving up
    #[arg(long, env = "PORTFOLIO_INIT_ATTEMPTS", default_value_t = DEFAULT_ATTEMPTS)]
    pub init_attempts: u32,

    /// Milliseconds between lookups
    #[arg(long, env = "PORTFOLIO_INIT_DELAY_MS", default_value_t = DEFAULT_INIT_DELAY_MS)]
    pub init_delay_ms: u64,
}

impl SourceArgs {
    pub fn initializer(&self) -> Initializer {
        Initializer::new(self.init_attempts, Duration::from_millis(self.init_delay_ms))
    }

    /// Wait for the portfolio file and build the controller from it
    pub fn load_controller(&self) -> Result<FilterController> {
        let path = self.portfolio.clone();
        self.initializer().run(|| probe_path(&path))
    }

    /// Same as `load_controller`, with `view` receiving the render signals
    pub fn load_controller_with_view<V: FilterView>(&self, view: V) -> Result<FilterController<V>> {
        let path = self.portfolio.clone();
        self.initializer().run_with_view(|| probe_path(&path), view)
    }
}

/// Install the global tracing subscriber (stderr, `RUST_LOG` overrides)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Install the global tracing subscriber, appending to `path`
///
/// For the TUI: anything written to stderr would land on the alternate screen.
pub fn init_tracing_file(default_directive: &str, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
