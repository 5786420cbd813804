//! One match session: locate the match, open the thread, poll.
//!
//! ```text
//! team page ──▶ live? ──no──▶ Outcome::Upcoming
//!                 │
//!                yes
//!                 ▼
//!          lineups page ──▶ submit post (title + lineups)
//!                 │
//!                 ▼
//!   ┌──▶ match page ──▶ banner + events ──▶ more events? ──▶ edit post
//!   └──────── sleep ◀──────────────────────────┘
//! ```
//!
//! Polling runs a fixed number of times with a fixed pause. There is no
//! end-of-match detection and no retry: a failed fetch or edit ends the
//! session with that error.

use crate::config::Settings;
use crate::document::{DocNode, Page};
use crate::error::{Error, ExtractError};
use crate::fetcher::PageSource;
use crate::forum::{Forum, PostId};
use crate::models::{Locality, MatchEvent, MatchReference, MatchState, MatchStatus, PostDraft, Score};
use crate::outputs::markdown::{self, RenderConfig};
use crate::scrapers::events::{EventFailurePolicy, match_events};
use crate::scrapers::forza;
use chrono::Local;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// The forum post being kept up to date and what it reflects.
#[derive(Debug, Clone)]
pub struct MatchThread {
    pub post: PostId,
    pub home: String,
    pub away: String,
    pub draft: PostDraft,
    pub state: MatchState,
}

/// How a session ended.
#[derive(Debug)]
pub enum Outcome {
    /// No match in progress; this is the next one.
    Upcoming(MatchReference),
    /// The polling budget ran out.
    Followed(MatchThread),
}

/// Everything read from one fetch of the match page.
#[derive(Debug)]
struct Snapshot {
    clock: String,
    score: Score,
    phase: Option<String>,
    events: Vec<MatchEvent>,
}

fn read_snapshot(page: &Page, policy: EventFailurePolicy) -> Result<Snapshot, ExtractError> {
    let root = page.root();
    Ok(Snapshot {
        clock: forza::game_time(&root)?,
        score: forza::score(&root)?,
        phase: markdown::phase_state(&forza::phase_labels(&root)),
        events: match_events(&root, policy)?,
    })
}

fn team_names<N: DocNode>(doc: &N) -> Result<(String, String), ExtractError> {
    Ok((
        forza::team(doc, Locality::Home)?.name,
        forza::team(doc, Locality::Away)?.name,
    ))
}

pub struct Session<'a, S, F> {
    settings: &'a Settings,
    render: RenderConfig,
    source: S,
    forum: F,
}

impl<'a, S: PageSource, F: Forum> Session<'a, S, F> {
    pub fn new(settings: &'a Settings, source: S, forum: F) -> Self {
        Self {
            settings,
            render: settings.render(),
            source,
            forum,
        }
    }

    /// Run the whole session to completion.
    #[instrument(level = "info", skip_all, fields(team_url = %self.settings.team_url))]
    pub async fn run(&self) -> Result<Outcome, Error> {
        let origin = self.settings.origin()?;
        let team_page = self.source.fetch(&self.settings.team_url).await?;
        let reference = forza::locate_match(&team_page.root(), &origin)?;
        info!(url = %reference.url, status = %reference.status, "Located match");

        if reference.status == MatchStatus::Before {
            info!(url = %reference.url, "Next match has not started; nothing to post");
            return Ok(Outcome::Upcoming(reference));
        }

        let mut thread = self.open_thread(&reference).await?;

        let iterations = self.settings.poll_iterations;
        let interval = self.settings.poll_interval();
        for i in 0..iterations {
            if i > 0 {
                sleep(interval).await;
            }
            let changed = self.poll(&reference, &mut thread).await?;
            debug!(iteration = i + 1, iterations, changed, "Poll complete");
        }

        info!(
            events = thread.state.event_count,
            clock = %thread.state.clock,
            "Polling budget exhausted"
        );
        Ok(Outcome::Followed(thread))
    }

    /// Read the lineups and submit the initial post.
    #[instrument(level = "info", skip_all, fields(url = %reference.url))]
    async fn open_thread(&self, reference: &MatchReference) -> Result<MatchThread, Error> {
        let lineups_page = self.source.fetch(&reference.lineups_url()).await?;
        let home = forza::lineup(&lineups_page.root(), Locality::Home)?;
        let away = forza::lineup(&lineups_page.root(), Locality::Away)?;

        let (home_name, away_name, lineups) = match (home, away) {
            (Some(home), Some(away)) => {
                let table = markdown::lineup_table(&home, &away);
                (home.name, away.name, table)
            }
            _ => {
                info!("Lineups not published yet; taking team names from the match page");
                let match_page = self.source.fetch(&reference.url).await?;
                let (home, away) = team_names(&match_page.root())?;
                (home, away, String::new())
            }
        };

        let draft = PostDraft::new(&home_name, &away_name, lineups);
        let post = self
            .forum
            .submit(&self.settings.subreddit, &draft.title, &draft.selftext(None))
            .await?;
        info!(%post, title = %draft.title, "Opened match thread");

        Ok(MatchThread {
            post,
            home: home_name,
            away: away_name,
            draft,
            state: MatchState::default(),
        })
    }

    /// Fetch the match page once and edit the post if the timeline grew.
    ///
    /// Returns whether the post was edited.
    #[instrument(level = "debug", skip_all)]
    async fn poll(&self, reference: &MatchReference, thread: &mut MatchThread) -> Result<bool, Error> {
        let page = self.source.fetch(&reference.url).await?;
        let snapshot = read_snapshot(&page, self.settings.on_bad_event)?;

        let banner = markdown::score_banner(&thread.home, &snapshot.score, &snapshot.clock, &thread.away);
        if snapshot.phase != thread.state.phase {
            if let Some(phase) = &snapshot.phase {
                info!(%phase, "Match phase changed");
            }
        }

        let state = &mut thread.state;
        state.score = Some(snapshot.score);
        state.clock = snapshot.clock;
        state.phase = snapshot.phase;
        state.last_update = Some(Local::now());

        if snapshot.events.len() <= state.event_count {
            debug!(events = snapshot.events.len(), "No new events");
            return Ok(false);
        }

        let log = markdown::event_log(&snapshot.events, &self.render);
        state.event_count = snapshot.events.len();
        state.event_log = log.clone();
        thread.draft.events = log;

        let body = thread.draft.selftext(Some(&banner));
        self.forum.edit(&thread.post, &body).await?;
        info!(events = thread.state.event_count, %banner, "Posted new events");
        Ok(true)
    }
}
