//! Match timeline normalization.
//!
//! Every `div.Event` on a match page holds one goal, card or substitution.
//! The first inner `div` says which (`Event-goal`, `Event-card`,
//! `Event-substitution`) and carries `Event-reverse` when the away side is
//! the protagonist. Events are bucketed by kind, concatenated as goals,
//! cards, substitutions and stably sorted by minute, so same-minute events
//! keep that order.

use crate::document::{DocNode, Marker};
use crate::error::ExtractError;
use crate::models::{CardColor, EventDetail, Locality, MatchEvent, Team};
use crate::scrapers::forza::team;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Fill the tracker uses for a yellow card.
pub const YELLOW_FILL: &str = "#fc0";
/// Fill the tracker uses for a red card.
pub const RED_FILL: &str = "#ff5100";

static MINUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})(?:\s*\+\s*(\d{1,2}))?$").expect("valid minute pattern"));

/// What to do with an event element that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFailurePolicy {
    /// Log it and keep the rest of the timeline.
    #[default]
    Skip,
    /// Abort the whole extraction.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Goal,
    Card,
    Substitution,
}

fn classify(class: &str) -> Option<EventKind> {
    if class.contains("goal") {
        Some(EventKind::Goal)
    } else if class.contains("card") {
        Some(EventKind::Card)
    } else if class.contains("substitution") {
        Some(EventKind::Substitution)
    } else {
        None
    }
}

/// Fold a clock token into a single minute.
///
/// Quotes and whitespace around the token are ignored; `45+2` is 47.
pub fn parse_minute(token: &str) -> Result<u16, ExtractError> {
    let cleaned = token.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '’' | '′'));
    let bad = || ExtractError::BadMinute {
        token: token.to_string(),
    };

    let caps = MINUTE.captures(cleaned).ok_or_else(bad)?;
    let base: u16 = caps[1].parse().map_err(|_| bad())?;
    let extra: u16 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| bad())?,
        None => 0,
    };
    Ok(base + extra)
}

/// Map the tracker's card fill to a colour.
pub fn card_color(fill: &str) -> Result<CardColor, ExtractError> {
    match fill.trim().to_ascii_lowercase().as_str() {
        YELLOW_FILL => Ok(CardColor::Yellow),
        RED_FILL => Ok(CardColor::Red),
        _ => Err(ExtractError::UnrecognizedCard {
            fill: fill.to_string(),
        }),
    }
}

fn required_text<N: DocNode>(node: &N, marker: &Marker) -> Result<String, ExtractError> {
    node.find(marker)
        .map(|n| n.text().trim().to_string())
        .ok_or_else(|| ExtractError::missing(marker))
}

fn optional_text<N: DocNode>(node: &N, marker: &Marker) -> Option<String> {
    node.find(marker)
        .map(|n| n.text().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn read_event<N: DocNode>(node: &N, kind: EventKind, side: &Team) -> Result<MatchEvent, ExtractError> {
    let actor = required_text(node, &Marker::tagged("div", "Event-text"))?;
    let minute = parse_minute(&required_text(node, &Marker::tagged("div", "Event-time"))?)?;
    let secondary = optional_text(node, &Marker::tagged("div", "Event-subText"));

    let detail = match kind {
        EventKind::Goal => EventDetail::Goal {
            scorer: actor,
            assist: secondary,
        },
        EventKind::Substitution => EventDetail::Substitution {
            player_in: actor,
            player_out: secondary,
        },
        EventKind::Card => {
            let rect = Marker::tag("rect");
            let fill = node
                .find(&rect)
                .and_then(|r| r.attr("fill"))
                .ok_or_else(|| ExtractError::missing(format!("{}[fill]", rect)))?;
            EventDetail::Card {
                player: actor,
                color: card_color(&fill)?,
            }
        }
    };

    Ok(MatchEvent {
        minute,
        team: side.clone(),
        detail,
    })
}

/// Goals, cards and substitutions of a match page, in minute order.
pub fn match_events<N: DocNode>(
    doc: &N,
    policy: EventFailurePolicy,
) -> Result<Vec<MatchEvent>, ExtractError> {
    let home = team(doc, Locality::Home)?;
    let away = team(doc, Locality::Away)?;

    let mut goals = Vec::new();
    let mut cards = Vec::new();
    let mut subs = Vec::new();
    let inner_div = Marker::tag("div");

    for (index, node) in doc.find_all(&Marker::tagged("div", "Event")).iter().enumerate() {
        let Some(inner) = node.find(&inner_div) else {
            continue;
        };
        let classes = inner.classes();
        // The first class naming a kind wins; `Event-reverse` may sit anywhere.
        let Some(kind) = classes.iter().find_map(|c| classify(c)) else {
            debug!(index, ?classes, "Ignoring event of unknown kind");
            continue;
        };
        let side = if classes.iter().any(|c| c == "Event-reverse") {
            &away
        } else {
            &home
        };

        match read_event(node, kind, side) {
            Ok(event) => {
                debug!(
                    index,
                    minute = event.minute,
                    team = %event.team.name,
                    locality = %event.team.locality,
                    ?kind,
                    "Read event"
                );
                match kind {
                    EventKind::Goal => goals.push(event),
                    EventKind::Card => cards.push(event),
                    EventKind::Substitution => subs.push(event),
                }
            }
            Err(e) => match policy {
                EventFailurePolicy::FailFast => return Err(e),
                EventFailurePolicy::Skip => {
                    warn!(index, ?kind, error = %e, "Skipping unreadable event");
                }
            },
        }
    }

    let mut events = goals;
    events.append(&mut cards);
    events.append(&mut subs);
    events.sort_by_key(|e| e.minute);
    debug!(count = events.len(), "Normalized match events");
    Ok(events)
}
