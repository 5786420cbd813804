//! Data models for matches, lineups, events and the forum post.
//!
//! This module defines the values passed between the scrapers, the renderers
//! and the polling loop:
//! - [`MatchReference`]: where the followed match lives and whether it is live
//! - [`Team`] and [`Lineup`]: who is playing
//! - [`MatchEvent`]: one goal, card or substitution on the timeline
//! - [`MatchState`]: what the polling loop has seen so far
//! - [`PostDraft`]: the text kept on the forum

use chrono::{DateTime, Local};
use std::fmt;

/// Home or away side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    Home,
    Away,
}

impl Locality {
    /// Suffix the match tracker uses in its class names (`MatchInfo-home`).
    pub fn as_str(self) -> &'static str {
        match self {
            Locality::Home => "home",
            Locality::Away => "away",
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a listed match is being played right now or is still ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Live,
    Before,
}

impl MatchStatus {
    /// Suffix used by the schedule list (`MatchlistItem-live`).
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Live => "live",
            MatchStatus::Before => "before",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A match located on the team's schedule page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReference {
    /// Absolute URL of the match page.
    pub url: String,
    pub status: MatchStatus,
}

impl MatchReference {
    /// The lineups tab of the match page.
    pub fn lineups_url(&self) -> String {
        format!("{}/lineups", self.url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub locality: Locality,
}

/// Starting eleven of one side, in the order the tracker lists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    pub name: String,
    pub starters: Vec<String>,
}

/// Card colours the tracker draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardColor {
    Yellow,
    Red,
}

impl CardColor {
    /// Spanish name used in the event log.
    pub fn label(self) -> &'static str {
        match self {
            CardColor::Yellow => "Amarilla",
            CardColor::Red => "Roja",
        }
    }
}

/// What happened, with the people involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    Goal {
        scorer: String,
        assist: Option<String>,
    },
    Card {
        player: String,
        color: CardColor,
    },
    Substitution {
        player_in: String,
        player_out: Option<String>,
    },
}

/// One entry on the match timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    /// Minute of play; stoppage time is folded in (`45+2` is 47).
    pub minute: u16,
    pub team: Team,
    pub detail: EventDetail,
}

/// The two score strings shown in the match header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub home: String,
    pub away: String,
}

/// Everything the polling loop has observed during one session.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    pub score: Option<Score>,
    /// Latest match clock text (`63'`, `45+2`, `Entretiempo`).
    pub clock: String,
    /// Latest phrase derived from the period labels.
    pub phase: Option<String>,
    /// Number of events behind `event_log`.
    pub event_count: usize,
    pub event_log: String,
    pub last_update: Option<DateTime<Local>>,
}

/// Text kept on the forum for the match thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub lineups: String,
    pub events: String,
}

impl PostDraft {
    pub fn new(home: &str, away: &str, lineups: String) -> Self {
        Self {
            title: format!("[MT] {} - {}", home, away),
            lineups,
            events: String::new(),
        }
    }

    /// Body of the post, with the score banner on top once there is one.
    pub fn selftext(&self, banner: Option<&str>) -> String {
        match banner {
            Some(banner) => format!("{}\n\n{}\n{}", banner, self.lineups, self.events),
            None => format!("{}\n{}", self.lineups, self.events),
        }
    }
}
