//! # Match Thread
//!
//! Follows a team's live football match on Forza Football and keeps a Reddit
//! match thread up to date with the score, the starting lineups and a
//! Spanish-language log of goals, cards and substitutions.
//!
//! ## Usage
//!
//! ```sh
//! match_thread                 # reads ./keys.yml
//! match_thread --dry-run       # print instead of posting
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Locating**: find the live (or next) match on the team's schedule page
//! 2. **Extracting**: read lineups, score, clock and the event timeline
//! 3. **Rendering**: turn them into Markdown
//! 4. **Publishing**: submit the thread once, then edit it whenever the
//!    timeline grows, for a fixed number of polls

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod document;
mod error;
mod fetcher;
mod forum;
mod models;
mod outputs;
mod scrapers;
mod session;

use cli::Cli;
use config::{Config, Settings};
use fetcher::HttpSource;
use forum::{DryRunForum, Forum, RedditClient};
use session::{Outcome, Session};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("match_thread starting up");

    let args = Cli::parse();
    debug!(config = %args.config, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Cannot start without a valid config file");
            return Err(e.into());
        }
    };

    let outcome = if args.dry_run {
        follow(&config.match_thread, DryRunForum::default()).await
    } else {
        let forum = match RedditClient::login(&config.credentials).await {
            Ok(forum) => forum,
            Err(e) => {
                error!(error = %e, "Forum login failed");
                return Err(e.into());
            }
        };
        follow(&config.match_thread, forum).await
    };

    match outcome {
        Ok(Outcome::Upcoming(reference)) => {
            info!(url = %reference.url, "No live match; exiting");
        }
        Ok(Outcome::Followed(thread)) => {
            info!(
                post = %thread.post,
                events = thread.state.event_count,
                score = ?thread.state.score,
                last_update = ?thread.state.last_update,
                "Match thread session finished"
            );
            debug!(log = %thread.state.event_log, "Final event log");
        }
        Err(e) => {
            error!(error = %e, "Match session failed");
            return Err(e.into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

async fn follow<F: Forum>(settings: &Settings, forum: F) -> Result<Outcome, error::Error> {
    Session::new(settings, HttpSource, forum).run().await
}
