//! Field extractors for Forza Football pages.
//!
//! Each function looks up a single marker and reports
//! [`ExtractError::MissingField`] when it is absent. Lineups are the
//! exception: an unpublished lineup is `Ok(None)`.

use crate::document::{DocNode, Marker};
use crate::error::ExtractError;
use crate::models::{Lineup, Locality, MatchReference, MatchStatus, Score, Team};
use tracing::debug;
use url::Url;

/// Whether the schedule lists a match in progress.
pub fn match_status<N: DocNode>(doc: &N) -> MatchStatus {
    let live = Marker::tagged("a", format!("MatchlistItem-{}", MatchStatus::Live));
    if doc.find(&live).is_some() {
        MatchStatus::Live
    } else {
        MatchStatus::Before
    }
}

/// Absolute URL of the listed match in the given state.
///
/// Relative links are resolved against `origin`.
pub fn game_link<N: DocNode>(
    doc: &N,
    status: MatchStatus,
    origin: &Url,
) -> Result<String, ExtractError> {
    let marker = Marker::tagged("a", format!("MatchlistItem-{}", status));
    let link = doc
        .find(&marker)
        .ok_or_else(|| ExtractError::missing(&marker))?;
    let href = link
        .attr("href")
        .ok_or_else(|| ExtractError::missing(format!("{}[href]", marker)))?;
    let resolved = origin.join(href.trim()).map_err(|_| ExtractError::Malformed {
        field: "game link",
        value: href.clone(),
    })?;
    debug!(%resolved, %status, "Resolved game link");
    Ok(resolved.to_string())
}

/// Locate the live match if there is one, else the next one.
pub fn locate_match<N: DocNode>(doc: &N, origin: &Url) -> Result<MatchReference, ExtractError> {
    let status = match_status(doc);
    let url = game_link(doc, status, origin)?;
    Ok(MatchReference { url, status })
}

/// Raw match clock text: a minute, a phase label or stoppage notation.
pub fn game_time<N: DocNode>(doc: &N) -> Result<String, ExtractError> {
    let marker = Marker::tagged("div", "MatchInfo-state-text2");
    let node = doc
        .find(&marker)
        .ok_or_else(|| ExtractError::missing(&marker))?;
    Ok(node.text().trim().to_string())
}

/// Name of the home or away side from the match header.
pub fn team<N: DocNode>(doc: &N, locality: Locality) -> Result<Team, ExtractError> {
    let marker = Marker::tagged("a", format!("MatchInfo-{}", locality));
    let node = doc
        .find(&marker)
        .ok_or_else(|| ExtractError::missing(&marker))?;
    let name = node.text().trim().to_string();
    if name.is_empty() {
        return Err(ExtractError::Malformed {
            field: "team name",
            value: name,
        });
    }
    Ok(Team { name, locality })
}

/// Home and away score strings, split on the single dash.
pub fn score<N: DocNode>(doc: &N) -> Result<Score, ExtractError> {
    let marker = Marker::tagged("div", "MatchInfo-state-text");
    let text = doc
        .find(&marker)
        .ok_or_else(|| ExtractError::missing(&marker))?
        .text();

    let mut parts = text.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(home), Some(away), None) => Ok(Score {
            home: home.trim().to_string(),
            away: away.trim().to_string(),
        }),
        _ => Err(ExtractError::Malformed {
            field: "score",
            value: text.trim().to_string(),
        }),
    }
}

/// Period labels from the match timeline (`Primer tiempo En curso`, ...).
pub fn phase_labels<N: DocNode>(doc: &N) -> Vec<String> {
    doc.find_all(&Marker::class("Event-period"))
        .iter()
        .map(|n| n.text().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Starting eleven for one side, or `None` if the lineup is not out yet.
pub fn lineup<N: DocNode>(doc: &N, locality: Locality) -> Result<Option<Lineup>, ExtractError> {
    let label = match doc.find(&Marker::tagged(
        "div",
        format!("LineupFormations-label-{}", locality),
    )) {
        Some(label) => label,
        None => {
            debug!(%locality, "Lineup label not published");
            return Ok(None);
        }
    };
    let team = match doc.find(&Marker::tagged(
        "div",
        format!("LineupFormations-team-{}", locality),
    )) {
        Some(team) => team,
        None => {
            debug!(%locality, "Lineup formation not published");
            return Ok(None);
        }
    };

    let player_marker = Marker::tagged("a", "LineupFormations-player");
    let name_marker = Marker::tagged("div", "LineupFormations-player-text");
    let mut starters = Vec::new();
    for row in team.find_all(&Marker::tagged("div", "LineupFormations-row")) {
        for player in row.find_all(&player_marker) {
            let name = player
                .find(&name_marker)
                .ok_or_else(|| ExtractError::missing(&name_marker))?;
            starters.push(name.text().trim().to_string());
        }
    }

    Ok(Some(Lineup {
        name: label.text().trim().to_string(),
        starters,
    }))
}
