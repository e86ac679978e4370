use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Match status is derived, never taken from a source flag: a match is
/// finished iff both scores are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Scheduled,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// One match in the canonical schema published to the artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub season: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// Calendar date "YYYY-MM-DD"; no timezone guarantee.
    pub date: String,
    /// Local time-of-day "HH:MM[:SS]" when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Naive "date[Ttime]" string, kept for consumers that sort on one key.
    pub kickoff: String,
    pub home: String,
    pub away: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "sourceId")]
    pub source_id: String,
}

/// Identity for dedupe: authoritative id when present, else the
/// (kickoff, home, away) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Id(String),
    Natural(String, String, String),
}

impl Event {
    pub fn key(&self) -> EventKey {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => EventKey::Id(id.to_string()),
            _ => EventKey::Natural(self.kickoff.clone(), self.home.clone(), self.away.clone()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    #[serde(rename = "goalsFor")]
    pub goals_for: u32,
    #[serde(rename = "goalsAgainst")]
    pub goals_against: u32,
    #[serde(rename = "goalDifference")]
    pub goal_difference: i32,
    pub points: u32,
}

/// Which strategy produced the published standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingsSourceTag {
    Lookup,
    Computed,
    LookupIncomplete,
    ComputedIncomplete,
}

impl StandingsSourceTag {
    pub fn as_code(&self) -> &'static str {
        match self {
            StandingsSourceTag::Lookup => "lookup",
            StandingsSourceTag::Computed => "computed",
            StandingsSourceTag::LookupIncomplete => "lookup_incomplete",
            StandingsSourceTag::ComputedIncomplete => "computed_incomplete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub fixtures: usize,
    pub results: usize,
    #[serde(rename = "standingsRows")]
    pub standings_rows: usize,
}

/// Provenance artifact, written only when a data artifact changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub competition: String,
    pub season: String,
    #[serde(rename = "source_league_id")]
    pub source_league_id: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    #[serde(rename = "standingsSource")]
    pub standings_source: Option<StandingsSourceTag>,
    /// Per-stage machine-readable codes, e.g. "events" -> "ok_total:42".
    pub status: BTreeMap<String, String>,
    pub counts: Counts,
}
