//! Markdown rendering of match data.
//!
//! Everything here is a pure function of its inputs: rendering the same data
//! twice gives the same bytes, which is what lets the polling loop compare
//! event logs by count alone.

use crate::models::{EventDetail, Lineup, MatchEvent, Score};
use itertools::{EitherOrBoth, Itertools};
use std::fmt::Write;

/// Goal word used when the favourite team scores.
pub const FAVORITE_GOAL: &str = "GOOOOOOOOOOOOOOOOOOOOOL";
/// Goal word for everyone else.
pub const PLAIN_GOAL: &str = "gol";
/// Shown in place of a missing assist.
pub const NO_ASSIST: &str = "Sin asistencia";

const PHASES: [&str; 2] = ["Primer tiempo", "Segundo tiempo"];
const IN_PROGRESS: &str = "En curso";

/// Rendering options that used to be module-level constants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Goals by this team get the long goal word.
    pub favorite_team: String,
}

/// `#### Home 1 63' 0 Away`
pub fn score_banner(home: &str, score: &Score, clock: &str, away: &str) -> String {
    format!("#### {} {} {} {} {}", home, score.home, clock, score.away, away)
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.chars().count());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.chars().count())
        .fold(header.chars().count(), usize::max)
}

/// Two-column table of starters, one team per column, centred.
///
/// When one side lists fewer players its column is padded with empty cells.
pub fn lineup_table(home: &Lineup, away: &Lineup) -> String {
    let rows: Vec<(&str, &str)> = home
        .starters
        .iter()
        .zip_longest(away.starters.iter())
        .map(|pair| match pair {
            EitherOrBoth::Both(h, a) => (h.as_str(), a.as_str()),
            EitherOrBoth::Left(h) => (h.as_str(), ""),
            EitherOrBoth::Right(a) => ("", a.as_str()),
        })
        .collect();

    let home_w = column_width(&home.name, rows.iter().map(|r| r.0));
    let away_w = column_width(&away.name, rows.iter().map(|r| r.1));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "| {} | {} |",
        center(&home.name, home_w),
        center(&away.name, away_w)
    );
    let _ = writeln!(
        out,
        "|:{}:|:{}:|",
        "-".repeat(home_w),
        "-".repeat(away_w)
    );
    for (h, a) in rows {
        let _ = writeln!(out, "| {} | {} |", center(h, home_w), center(a, away_w));
    }
    out
}

/// One bullet line for an event.
pub fn event_line(event: &MatchEvent, config: &RenderConfig) -> String {
    let minute = event.minute;
    match &event.detail {
        EventDetail::Substitution {
            player_in,
            player_out: Some(out),
        } => format!("* {}' - sale {}, entra {}", minute, out, player_in),
        EventDetail::Substitution {
            player_in,
            player_out: None,
        } => format!("* {}' - entra {}", minute, player_in),
        EventDetail::Card { player, color } => {
            format!("* {}' - tarjeta {} para {}", minute, color.label(), player)
        }
        EventDetail::Goal { scorer, assist } => {
            let word = if event.team.name == config.favorite_team {
                FAVORITE_GOAL
            } else {
                PLAIN_GOAL
            };
            format!(
                "* {}' - {} de {} {}, {}",
                minute,
                word,
                event.team.name,
                scorer,
                assist.as_deref().unwrap_or(NO_ASSIST)
            )
        }
    }
}

/// Bulleted event log, one line per event, each ending in a newline.
pub fn event_log(events: &[MatchEvent], config: &RenderConfig) -> String {
    let mut out = String::new();
    for event in events {
        out.push_str(&event_line(event, config));
        out.push('\n');
    }
    out
}

/// Describe the current period from the timeline's period labels.
///
/// The last label naming a half wins. A label still marked in progress
/// reads as the half having started; otherwise as the half having ended,
/// followed by whatever the label adds (usually the partial score).
pub fn phase_state<S: AsRef<str>>(labels: &[S]) -> Option<String> {
    let mut state = None;
    for label in labels {
        let text = label.as_ref().trim();
        let Some(phase) = PHASES.iter().find(|p| text.contains(*p)) else {
            continue;
        };
        state = Some(if text.contains(IN_PROGRESS) {
            format!("arrancó el {}", text.replace(IN_PROGRESS, "").trim())
        } else {
            let rest = text.replace(phase, "");
            let rest = rest.trim();
            if rest.is_empty() {
                format!("fin del {}", phase)
            } else {
                format!("fin del {} {}", phase, rest)
            }
        });
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;
    use crate::models::{CardColor, Locality, Team};
    use crate::scrapers::events::{EventFailurePolicy, match_events};

    fn team(name: &str, locality: Locality) -> Team {
        Team {
            name: name.to_string(),
            locality,
        }
    }

    fn config() -> RenderConfig {
        RenderConfig {
            favorite_team: "River Plate".to_string(),
        }
    }

    #[test]
    fn test_score_banner() {
        let score = Score {
            home: "2".to_string(),
            away: "1".to_string(),
        };
        assert_eq!(
            score_banner("River Plate", &score, "45+2", "Boca Juniors"),
            "#### River Plate 2 45+2 1 Boca Juniors"
        );
    }

    #[test]
    fn test_lineup_table_pads_short_column() {
        let home = Lineup {
            name: "Home".to_string(),
            starters: vec!["Goalkeeper".to_string(), "Ed".to_string()],
        };
        let away = Lineup {
            name: "Visitors".to_string(),
            starters: vec!["Al".to_string()],
        };

        let expected = "\
|    Home    | Visitors |
|:----------:|:--------:|
| Goalkeeper |    Al    |
|     Ed     |          |
";
        assert_eq!(lineup_table(&home, &away), expected);
    }

    #[test]
    fn test_lineup_table_counts_chars_not_bytes() {
        let home = Lineup {
            name: "A".to_string(),
            starters: vec!["Pérez".to_string()],
        };
        let away = Lineup {
            name: "B".to_string(),
            starters: vec![],
        };
        let table = lineup_table(&home, &away);
        assert_eq!(table.lines().nth(1), Some("|:-----:|:-:|"));
        assert_eq!(table.lines().nth(2), Some("| Pérez |   |"));
    }

    #[test]
    fn test_event_lines() {
        let config = config();
        let sub = MatchEvent {
            minute: 60,
            team: team("Boca Juniors", Locality::Away),
            detail: EventDetail::Substitution {
                player_in: "Salvio".to_string(),
                player_out: Some("Villa".to_string()),
            },
        };
        let card = MatchEvent {
            minute: 40,
            team: team("Boca Juniors", Locality::Away),
            detail: EventDetail::Card {
                player: "Tevez".to_string(),
                color: CardColor::Yellow,
            },
        };
        let own_goal = MatchEvent {
            minute: 23,
            team: team("River Plate", Locality::Home),
            detail: EventDetail::Goal {
                scorer: "Borré".to_string(),
                assist: None,
            },
        };
        let their_goal = MatchEvent {
            minute: 50,
            team: team("Boca Juniors", Locality::Away),
            detail: EventDetail::Goal {
                scorer: "Tevez".to_string(),
                assist: Some("Salvio".to_string()),
            },
        };

        assert_eq!(event_line(&sub, &config), "* 60' - sale Villa, entra Salvio");
        assert_eq!(event_line(&card, &config), "* 40' - tarjeta Amarilla para Tevez");
        assert_eq!(
            event_line(&own_goal, &config),
            "* 23' - GOOOOOOOOOOOOOOOOOOOOOL de River Plate Borré, Sin asistencia"
        );
        assert_eq!(
            event_line(&their_goal, &config),
            "* 50' - gol de Boca Juniors Tevez, Salvio"
        );
    }

    #[test]
    fn test_substitution_without_outgoing_player() {
        let sub = MatchEvent {
            minute: 46,
            team: team("A", Locality::Home),
            detail: EventDetail::Substitution {
                player_in: "Fresh".to_string(),
                player_out: None,
            },
        };
        assert_eq!(event_line(&sub, &config()), "* 46' - entra Fresh");
    }

    #[test]
    fn test_home_goal_fixture_renders_one_line() {
        let page = Page::parse("match", include_str!("../../fixtures/match_home_goal.html")).unwrap();
        let events = match_events(&page.root(), EventFailurePolicy::FailFast).unwrap();
        let log = event_log(&events, &config());
        assert_eq!(log, "* 23' - gol de Home FC Scorer, A\n");
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let page = Page::parse("match", include_str!("../../fixtures/match_live.html")).unwrap();
        let events = match_events(&page.root(), EventFailurePolicy::Skip).unwrap();
        assert_eq!(event_log(&events, &config()), event_log(&events, &config()));

        let lineup = Lineup {
            name: "X".to_string(),
            starters: vec!["One".to_string()],
        };
        assert_eq!(lineup_table(&lineup, &lineup), lineup_table(&lineup, &lineup));
    }

    #[test]
    fn test_phase_state_in_progress() {
        assert_eq!(
            phase_state(&["Primer tiempo En curso"]).as_deref(),
            Some("arrancó el Primer tiempo")
        );
    }

    #[test]
    fn test_phase_state_half_ended() {
        assert_eq!(
            phase_state(&["Primer tiempo 1 - 0"]).as_deref(),
            Some("fin del Primer tiempo 1 - 0")
        );
    }

    #[test]
    fn test_phase_state_last_label_wins() {
        let labels = vec![
            "Primer tiempo 1 - 0".to_string(),
            "Segundo tiempo En curso".to_string(),
        ];
        assert_eq!(phase_state(&labels[..]).as_deref(), Some("arrancó el Segundo tiempo"));
    }

    #[test]
    fn test_phase_state_without_labels() {
        let labels: Vec<String> = vec!["Penales".to_string()];
        assert_eq!(phase_state(&labels[..]), None);
    }
}
