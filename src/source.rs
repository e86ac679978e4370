use crate::error::SourceError;

/// Which slice of the season an event feed should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Upcoming fixtures; may also carry matches that finished between pulls.
    Upcoming,
    /// Recently completed matches.
    Past,
    /// One specific round.
    Round(u32),
}

/// Intermediate record produced by an adapter, before normalization.
/// Every field is optional or raw text; coercion happens downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub id: Option<String>,
    pub round: Option<u32>,
    pub date: String,
    pub time: Option<String>,
    pub home: String,
    pub away: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub venue: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStandingsRow {
    pub position: Option<u32>,
    pub team: String,
    pub played: Option<u32>,
    pub win: Option<u32>,
    pub draw: Option<u32>,
    pub loss: Option<u32>,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    pub goal_difference: Option<i32>,
    pub points: Option<u32>,
}

/// Capability: an upstream source that can list match records.
pub trait EventSource {
    fn source_id(&self) -> &str;
    fn list_events(&self, scope: EventScope) -> Result<Vec<RawEvent>, SourceError>;
}

/// Capability: an upstream source that can list a standings table.
pub trait StandingsSource {
    fn source_id(&self) -> &str;
    fn list_standings(&self) -> Result<Vec<RawStandingsRow>, SourceError>;
}
