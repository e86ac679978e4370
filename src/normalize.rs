use std::collections::HashSet;

use crate::model::{Event, EventKey, Score, Status};
use crate::source::RawEvent;
use crate::text::collapse_ws;

/// Raw record -> canonical Event. Returns None when the record lacks the
/// fields identity is derived from (date and both team names).
///
/// Status comes from score presence alone; a source-asserted status flag
/// is never trusted. A half-present score counts as no score.
pub fn normalize(raw: &RawEvent, season: &str, source_id: &str) -> Option<Event> {
    let home = collapse_ws(&raw.home);
    let away = collapse_ws(&raw.away);
    let date = collapse_ws(&raw.date);
    if home.is_empty() || away.is_empty() || date.is_empty() {
        return None;
    }

    let score = match (raw.home_score, raw.away_score) {
        (Some(h), Some(a)) => Some(Score { home: h, away: a }),
        _ => None,
    };
    let status = if score.is_some() {
        Status::Finished
    } else {
        Status::Scheduled
    };

    let time = raw.time.as_deref().map(collapse_ws).filter(|t| !t.is_empty());
    let kickoff = match time.as_deref() {
        Some(t) => format!("{date}T{t}"),
        None => date.clone(),
    };

    Some(Event {
        id: raw.id.as_deref().map(collapse_ws).filter(|s| !s.is_empty()),
        season: season.to_string(),
        round: raw.round,
        date,
        time,
        kickoff,
        home,
        away,
        status,
        score,
        venue: raw.venue.as_deref().map(collapse_ws).filter(|s| !s.is_empty()),
        city: raw.city.as_deref().map(collapse_ws).filter(|s| !s.is_empty()),
        source_id: source_id.to_string(),
    })
}

/// Dedupe by identity, keeping the first occurrence encountered.
pub fn dedupe(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<EventKey> = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|e| seen.insert(e.key()))
        .collect()
}

#[derive(Debug, Default)]
pub struct FeedSplit {
    /// status=scheduled, sorted ascending by (date, time, home, away).
    pub fixtures: Vec<Event>,
    /// status=finished, sorted descending by (date, time).
    pub results: Vec<Event>,
}

impl FeedSplit {
    pub fn total(&self) -> usize {
        self.fixtures.len() + self.results.len()
    }
}

/// Merge the "upcoming" and "past" feeds. A match that finished between
/// two pulls can legitimately appear in both; it is published as a
/// result if it is finished in either feed, with the past-feed copy
/// preferred on conflict.
pub fn merge_feeds(next: Vec<Event>, past: Vec<Event>) -> FeedSplit {
    let fixtures: Vec<Event> = next
        .iter()
        .filter(|e| e.status == Status::Scheduled)
        .cloned()
        .collect();

    // Past feed first so dedupe keeps its copy over the next-feed one.
    let mut results: Vec<Event> = past
        .into_iter()
        .filter(Event::is_finished)
        .chain(next.into_iter().filter(Event::is_finished))
        .collect();
    results = dedupe(results);

    // A stale "upcoming" entry for a match the past feed already settled
    // belongs to results only.
    let settled: HashSet<EventKey> = results.iter().map(Event::key).collect();
    let fixtures: Vec<Event> = fixtures
        .into_iter()
        .filter(|e| !settled.contains(&e.key()))
        .collect();

    let mut fixtures = dedupe(fixtures);
    fixtures.sort_by(|a, b| {
        (&a.date, &a.time, &a.home, &a.away).cmp(&(&b.date, &b.time, &b.home, &b.away))
    });
    results.sort_by(|a, b| (&b.date, &b.time).cmp(&(&a.date, &a.time)));

    FeedSplit { fixtures, results }
}
