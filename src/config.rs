use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "arcade-vault", version, about = "Four arcade mini-games in the terminal")]
pub struct Config {
    /// Base URL of the score API (e.g. http://localhost:8000). Leaderboard is off without it.
    #[arg(long, env = "ARCADE_API_BASE")]
    pub api_base: Option<String>,

    /// Best-score file (defaults to one next to the executable)
    #[arg(long)]
    pub scores_file: Option<PathBuf>,

    /// Where log output goes; the terminal belongs to the UI
    #[arg(long, default_value = "arcade-vault.log")]
    pub log_file: PathBuf,

    /// Milliseconds between frames
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    /// Text file with four chicken glyphs: up, down, left, right
    #[arg(long)]
    pub chicken_sprite: Option<PathBuf>,

    /// Show the on-screen control pad under the game board
    #[arg(long)]
    pub pad: bool,

    /// Start with sound effects off
    #[arg(long)]
    pub no_sound: bool,

    /// Fixed seed for every game's randomness
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            scores_file: None,
            log_file: PathBuf::from("arcade-vault.log"),
            tick_ms: 16,
            chicken_sprite: None,
            pad: false,
            no_sound: false,
            seed: None,
        }
    }
}

/// Send `log` output to the configured file. `RUST_LOG` overrides the
/// default `warn` filter.
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("initialising logger")?;
    Ok(())
}
