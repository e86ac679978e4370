//! End-to-end run: sources in priority order, completeness gates, and
//! fall-back to the previously published artifact instead of ever
//! publishing a regression.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::Utc;

use crate::config::SnapshotConfig;
use crate::error::CompletenessError;
use crate::model::{Counts, Event, Meta, StandingsRow, StandingsSourceTag};
use crate::normalize::{FeedSplit, dedupe, merge_feeds, normalize};
use crate::persist::{load_previous, write_if_changed};
use crate::source::{EventScope, EventSource, RawStandingsRow, StandingsSource};
use crate::standings;

pub struct Sources<'a> {
    /// Tried in priority order; first acceptable feed wins.
    pub events: Vec<&'a dyn EventSource>,
    pub standings: Vec<&'a dyn StandingsSource>,
}

#[derive(Debug)]
pub struct RunReport {
    pub status: BTreeMap<String, String>,
    pub counts: Counts,
    pub standings_source: Option<StandingsSourceTag>,
    pub wrote_fixtures: bool,
    pub wrote_results: bool,
    pub wrote_standings: bool,
    pub wrote_meta: bool,
    pub out_dir: PathBuf,
}

/// Which way `resolve_or_fallback` went, recorded into meta.status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackBranch {
    PublishedNew,
    KeptPrevious,
    PublishedPartial,
    Nothing,
}

/// The one keep-old-on-failure rule, used uniformly for events and
/// standings: publish the new value when it passes the gate, else keep
/// the previous artifact, else publish whatever partial exists.
pub fn resolve_or_fallback<T>(
    new_value: Option<T>,
    previous: Option<T>,
    is_acceptable: impl Fn(&T) -> bool,
) -> (Option<T>, FallbackBranch) {
    match (new_value, previous) {
        (Some(n), _) if is_acceptable(&n) => (Some(n), FallbackBranch::PublishedNew),
        (_, Some(p)) => (Some(p), FallbackBranch::KeptPrevious),
        (Some(n), None) => (Some(n), FallbackBranch::PublishedPartial),
        (None, None) => (None, FallbackBranch::Nothing),
    }
}

pub fn run(cfg: &SnapshotConfig, sources: &Sources) -> Result<RunReport> {
    let mut status: BTreeMap<String, String> = BTreeMap::new();

    let fixtures_path = cfg.out_dir.join("fixtures.json");
    let results_path = cfg.out_dir.join("results.json");
    let standings_path = cfg.out_dir.join("standings.json");
    let meta_path = cfg.out_dir.join("meta.json");

    // -- events ------------------------------------------------------------
    let mut parsed: Option<FeedSplit> = None;
    for src in &sources.events {
        let sid = src.source_id().to_string();
        let Some(split) = collect_source_events(cfg, *src, &mut status) else {
            continue;
        };
        match events_gate(&split, cfg.min_events) {
            Ok(()) => {
                status.insert("events".to_string(), format!("ok_total:{}", split.total()));
                status.insert(format!("events.{sid}"), format!("ok:{}", split.total()));
                parsed = Some(split);
                break;
            }
            Err(short) => {
                status.insert(format!("events.{sid}"), format!("short:{}", short.got));
                // Keep the largest partial in case no source passes the gate.
                if parsed.as_ref().map(|p| p.total()).unwrap_or(0) < split.total() {
                    parsed = Some(split);
                }
            }
        }
    }

    let prev_fixtures: Option<Vec<Event>> = load_previous(&fixtures_path);
    let prev_results: Option<Vec<Event>> = load_previous(&results_path);
    let previous_split = match (prev_fixtures, prev_results) {
        (None, None) => None,
        (f, r) => Some(FeedSplit {
            fixtures: f.unwrap_or_default(),
            results: r.unwrap_or_default(),
        }),
    };

    let min_events = cfg.min_events;
    let (published, events_branch) =
        resolve_or_fallback(parsed, previous_split, |s: &FeedSplit| {
            events_gate(s, min_events).is_ok()
        });
    match events_branch {
        FallbackBranch::PublishedNew => {}
        FallbackBranch::KeptPrevious => {
            let n = published.as_ref().map(|s| s.total()).unwrap_or(0);
            status.insert("events".to_string(), format!("kept_old_parsed:{n}"));
        }
        FallbackBranch::PublishedPartial => {
            let n = published.as_ref().map(|s| s.total()).unwrap_or(0);
            status.insert("events".to_string(), format!("published_partial:{n}"));
        }
        FallbackBranch::Nothing => {
            status.insert("events".to_string(), "no_data_no_fallback".to_string());
        }
    }
    let published = published.unwrap_or_default();

    // -- standings ---------------------------------------------------------
    let mut authoritative: Option<Vec<RawStandingsRow>> = None;
    for src in &sources.standings {
        let sid = src.source_id().to_string();
        match src.list_standings() {
            Ok(rows) if rows.len() >= cfg.min_teams => {
                status.insert(format!("standings.{sid}"), format!("rows:{}", rows.len()));
                authoritative = Some(rows);
                break;
            }
            // A "null" table arrives as an empty list; try the next source.
            Ok(rows) => {
                status.insert(format!("standings.{sid}"), format!("short:{}", rows.len()));
                if authoritative.as_ref().map(Vec::len).unwrap_or(0) < rows.len() {
                    authoritative = Some(rows);
                }
            }
            Err(err) => {
                status.insert(format!("standings.{sid}"), err.code());
            }
        }
    }

    let resolution = standings::resolve(authoritative, &published.results, cfg.min_teams);
    if let Some(note) = &resolution.note {
        status.insert("standings.resolve".to_string(), note.clone());
    }
    let new_rows = (!resolution.rows.is_empty()).then_some(resolution.rows);
    let prev_rows: Option<Vec<StandingsRow>> = load_previous(&standings_path);
    // Same completeness gate as adoption: a short table only publishes
    // when there is no previous artifact to keep.
    let min_teams = cfg.min_teams;
    let (published_rows, standings_branch) =
        resolve_or_fallback(new_rows, prev_rows, |rows: &Vec<StandingsRow>| {
            rows.len() >= min_teams
        });
    let published_rows = published_rows.unwrap_or_default();
    let standings_source = match standings_branch {
        FallbackBranch::PublishedNew | FallbackBranch::PublishedPartial => {
            status.insert(
                "standings".to_string(),
                format!("{}:{}", resolution.tag.as_code(), published_rows.len()),
            );
            Some(resolution.tag)
        }
        FallbackBranch::KeptPrevious => {
            status.insert(
                "standings".to_string(),
                format!("kept_old:{}", published_rows.len()),
            );
            None
        }
        FallbackBranch::Nothing => {
            status.insert("standings".to_string(), "empty".to_string());
            None
        }
    };

    // -- persistence -------------------------------------------------------
    // Artifacts computed above are always written, even if a later step
    // fails; write errors are collected, not propagated mid-way.
    let mut write_errors: Vec<String> = Vec::new();
    let wrote_fixtures = write_artifact(&fixtures_path, &published.fixtures, &mut write_errors);
    let wrote_results = write_artifact(&results_path, &published.results, &mut write_errors);
    let wrote_standings = write_artifact(&standings_path, &published_rows, &mut write_errors);

    let counts = Counts {
        fixtures: published.fixtures.len(),
        results: published.results.len(),
        standings_rows: published_rows.len(),
    };

    let data_changed = wrote_fixtures || wrote_results || wrote_standings;
    let mut wrote_meta = false;
    if data_changed {
        let meta = Meta {
            competition: cfg.competition.clone(),
            season: cfg.season.clone(),
            source_league_id: cfg.league_id.clone(),
            generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            standings_source,
            status: status.clone(),
            counts,
        };
        match write_if_changed(&meta_path, &meta) {
            Ok(written) => wrote_meta = written,
            Err(e) => write_errors.push(format!("{}: {e:#}", meta_path.display())),
        }
    }

    for err in &write_errors {
        eprintln!("[WARN] artifact write failed: {err}");
    }

    // Fatal only when the mandatory event path produced nothing and no
    // fallback artifact exists at all.
    if events_branch == FallbackBranch::Nothing {
        return Err(anyhow!("event fetch failed with no fallback artifact"));
    }
    if !write_errors.is_empty() {
        return Err(anyhow!("artifact writes failed: {}", write_errors.join("; ")));
    }

    Ok(RunReport {
        status,
        counts,
        standings_source,
        wrote_fixtures,
        wrote_results,
        wrote_standings,
        wrote_meta,
        out_dir: cfg.out_dir.clone(),
    })
}

/// Pull both feed windows from one source and merge them. A single
/// window failing degrades to an empty window and gets its code
/// recorded; both windows failing fails the source.
fn collect_source_events(
    cfg: &SnapshotConfig,
    src: &dyn EventSource,
    status: &mut BTreeMap<String, String>,
) -> Option<FeedSplit> {
    let sid = src.source_id().to_string();
    let next = src.list_events(EventScope::Upcoming);
    let past = src.list_events(EventScope::Past);

    if let Err(err) = &next {
        status.insert(format!("events.{sid}.next"), err.code());
    }
    if let Err(err) = &past {
        status.insert(format!("events.{sid}.past"), err.code());
    }
    if next.is_err() && past.is_err() {
        return None;
    }

    let normalize_all = |raw: Vec<crate::source::RawEvent>| -> Vec<Event> {
        raw.iter()
            .filter_map(|r| normalize(r, &cfg.season, &sid))
            .collect()
    };
    let mut next = normalize_all(next.unwrap_or_default());
    let past = normalize_all(past.unwrap_or_default());

    // Explicit rounds top up the feeds; a failed round is recorded and
    // skipped, never fatal for the source.
    if let Some((lo, hi)) = cfg.rounds {
        for round in lo..=hi {
            match src.list_events(EventScope::Round(round)) {
                Ok(raw) => next.extend(normalize_all(raw)),
                Err(err) => {
                    status.insert(format!("events.{sid}.round{round}"), err.code());
                }
            }
        }
    }

    Some(merge_feeds(dedupe(next), dedupe(past)))
}

fn events_gate(split: &FeedSplit, need: usize) -> Result<(), CompletenessError> {
    if split.total() >= need {
        Ok(())
    } else {
        Err(CompletenessError {
            what: "events",
            got: split.total(),
            need,
        })
    }
}

fn write_artifact<T: serde::Serialize>(
    path: &std::path::Path,
    value: &T,
    errors: &mut Vec<String>,
) -> bool {
    match write_if_changed(path, value) {
        Ok(written) => written,
        Err(e) => {
            errors.push(format!("{}: {e:#}", path.display()));
            false
        }
    }
}
