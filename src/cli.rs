//! Command-line interface definitions.
//!
//! Both flags are optional; with none the bot reads `./keys.yml` and posts
//! for real.

use crate::config::DEFAULT_CONFIG_PATH;
use clap::Parser;

/// Command-line arguments for the match thread bot.
///
/// # Examples
///
/// ```sh
/// # Follow the configured team and keep the thread updated
/// match_thread
///
/// # Use another secrets file and only print what would be posted
/// match_thread --config ./other-keys.yml --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML file holding the forum secrets
    #[arg(short, long, env = "MATCH_THREAD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Print post bodies instead of submitting them to the forum
    #[arg(long)]
    pub dry_run: bool,
}
