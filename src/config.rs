//! Configuration loaded from the secrets file.
//!
//! The file is YAML with the forum credentials at top level and an optional
//! `match_thread` section for everything that used to be hard-coded:
//!
//! ```yaml
//! client_id: abc
//! client_secret: def
//! user_agent: match-thread-bot/0.1 by u/someone
//! username: someone
//! password: hunter2
//! match_thread:
//!   team_url: https://forzafootball.com/es/team/river-plate-3182
//!   favorite_team: River Plate
//!   subreddit: CARiverPlateTest
//!   poll_iterations: 45
//!   poll_interval_secs: 60
//!   on_bad_event: skip
//! ```

use crate::error::ConfigError;
use crate::outputs::markdown::RenderConfig;
use crate::scrapers::events::EventFailurePolicy;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Default location of the secrets file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "keys.yml";

/// The five values the forum needs for a password-grant login.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Which team to follow and how to report on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Team schedule page on the match tracker.
    pub team_url: String,
    /// Origin used to resolve relative match links.
    pub site_origin: String,
    pub favorite_team: String,
    /// Community the match thread is posted to.
    pub subreddit: String,
    pub poll_iterations: u32,
    pub poll_interval_secs: u64,
    pub on_bad_event: EventFailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            team_url: "https://forzafootball.com/es/team/river-plate-3182".to_string(),
            site_origin: "https://forzafootball.com".to_string(),
            favorite_team: "River Plate".to_string(),
            subreddit: "CARiverPlateTest".to_string(),
            poll_iterations: 45,
            poll_interval_secs: 60,
            on_bad_event: EventFailurePolicy::Skip,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site_origin).map_err(|e| ConfigError::Invalid {
            key: "match_thread.site_origin",
            reason: e.to_string(),
        })
    }

    pub fn render(&self) -> RenderConfig {
        RenderConfig {
            favorite_team: self.favorite_team.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub match_thread: Settings,
}

impl Config {
    /// Read and validate the config file. Any problem here is fatal.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config = Self::from_yaml(&display, &raw)?;
        info!(
            subreddit = %config.match_thread.subreddit,
            team_url = %config.match_thread.team_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn from_yaml(path: &str, raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.credentials;
        for (key, value) in [
            ("client_id", &c.client_id),
            ("client_secret", &c.client_secret),
            ("user_agent", &c.user_agent),
            ("username", &c.username),
            ("password", &c.password),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.match_thread.poll_iterations == 0 {
            return Err(ConfigError::Invalid {
                key: "match_thread.poll_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        self.match_thread.origin()?;
        Ok(())
    }
}
