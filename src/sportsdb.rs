//! Structured-API adapter for TheSportsDB v1 JSON endpoints.
//!
//! Payloads are schema-bearing but sloppy: numeric fields arrive as
//! strings or numbers, collections arrive as `null` when empty. Every
//! field read coerces safely and never fails a whole record over one
//! bad value.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::SnapshotConfig;
use crate::error::{ParseError, SourceError};
use crate::fetch::fetch_text;
use crate::source::{EventScope, EventSource, RawEvent, RawStandingsRow, StandingsSource};
use crate::text::{non_empty, parse_optional_count, parse_optional_int};

pub const SOURCE_ID: &str = "thesportsdb";

pub struct SportsDbAdapter<'a> {
    client: &'a Client,
    cfg: &'a SnapshotConfig,
}

impl<'a> SportsDbAdapter<'a> {
    pub fn new(client: &'a Client, cfg: &'a SnapshotConfig) -> Self {
        Self { client, cfg }
    }
}

impl EventSource for SportsDbAdapter<'_> {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn list_events(&self, scope: EventScope) -> Result<Vec<RawEvent>, SourceError> {
        let url = match scope {
            EventScope::Upcoming => self.cfg.next_events_url(),
            EventScope::Past => self.cfg.past_events_url(),
            EventScope::Round(r) => self.cfg.round_events_url(r),
        };
        let body = fetch_text(self.client, &url, &self.cfg.retry)?;
        Ok(parse_events_json(&body)?)
    }
}

impl StandingsSource for SportsDbAdapter<'_> {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn list_standings(&self) -> Result<Vec<RawStandingsRow>, SourceError> {
        let body = fetch_text(self.client, &self.cfg.table_url(), &self.cfg.retry)?;
        Ok(parse_table_json(&body)?)
    }
}

/// Parse an `events` collection. A `null` or missing collection is an
/// empty feed, not an error.
pub fn parse_events_json(raw: &str) -> Result<Vec<RawEvent>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let Some(events) = root.get("events").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };
    Ok(events.iter().filter_map(parse_event).collect())
}

fn parse_event(v: &Value) -> Option<RawEvent> {
    let home = str_field(v, "strHomeTeam")?;
    let away = str_field(v, "strAwayTeam")?;
    let date = str_field(v, "dateEvent")?;

    Some(RawEvent {
        id: str_field(v, "idEvent"),
        round: opt_u32(v, "intRound"),
        date,
        time: str_field(v, "strTime"),
        home,
        away,
        home_score: opt_u32(v, "intHomeScore"),
        away_score: opt_u32(v, "intAwayScore"),
        venue: str_field(v, "strVenue"),
        city: str_field(v, "strCity"),
    })
}

/// Parse a `table` collection into raw standings rows.
pub fn parse_table_json(raw: &str) -> Result<Vec<RawStandingsRow>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let Some(table) = root.get("table").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::with_capacity(table.len());
    for item in table {
        let Some(team) = str_field(item, "strTeam") else {
            continue;
        };
        rows.push(RawStandingsRow {
            position: opt_u32(item, "intRank"),
            team,
            played: opt_u32(item, "intPlayed"),
            win: opt_u32(item, "intWin"),
            draw: opt_u32(item, "intDraw"),
            loss: opt_u32(item, "intLoss"),
            goals_for: opt_u32(item, "intGoalsFor"),
            goals_against: opt_u32(item, "intGoalsAgainst"),
            goal_difference: opt_i32(item, "intGoalDifference"),
            points: opt_u32(item, "intPoints"),
        });
    }
    Ok(rows)
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|x| x.as_str()).and_then(non_empty)
}

/// Numbers arrive as `"3"`, `3`, `""` or `null` depending on the feed's mood.
fn opt_u32(v: &Value, key: &str) -> Option<u32> {
    match v.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => parse_optional_count(s),
        _ => None,
    }
}

fn opt_i32(v: &Value, key: &str) -> Option<i32> {
    match v.get(key)? {
        Value::Number(n) => n.as_i64().and_then(|x| i32::try_from(x).ok()),
        Value::String(s) => parse_optional_int(s).and_then(|x| i32::try_from(x).ok()),
        _ => None,
    }
}
