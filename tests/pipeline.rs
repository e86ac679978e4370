use std::fs;
use std::path::Path;

use liga_snapshot::config::{RetryPolicy, SnapshotConfig};
use liga_snapshot::error::{FetchError, SourceError};
use liga_snapshot::model::{Event, StandingsSourceTag};
use liga_snapshot::pipeline::{Sources, run};
use liga_snapshot::source::{
    EventScope, EventSource, RawEvent, RawStandingsRow, StandingsSource,
};

fn cfg(dir: &Path) -> SnapshotConfig {
    SnapshotConfig {
        competition: "Test League".to_string(),
        league_id: "999".to_string(),
        season: "2025-2026".to_string(),
        api_base: "http://localhost".to_string(),
        markup_url: None,
        rounds: None,
        min_teams: 3,
        min_events: 3,
        out_dir: dir.to_path_buf(),
        retry: RetryPolicy::default(),
    }
}

fn raw(home: &str, away: &str, date: &str, score: Option<(u32, u32)>) -> RawEvent {
    RawEvent {
        date: date.to_string(),
        home: home.to_string(),
        away: away.to_string(),
        home_score: score.map(|s| s.0),
        away_score: score.map(|s| s.1),
        ..RawEvent::default()
    }
}

struct FakeEvents {
    id: &'static str,
    upcoming: Vec<RawEvent>,
    past: Vec<RawEvent>,
}

impl EventSource for FakeEvents {
    fn source_id(&self) -> &str {
        self.id
    }

    fn list_events(&self, scope: EventScope) -> Result<Vec<RawEvent>, SourceError> {
        Ok(match scope {
            EventScope::Upcoming => self.upcoming.clone(),
            EventScope::Past => self.past.clone(),
            EventScope::Round(_) => Vec::new(),
        })
    }
}

struct DownSource;

impl EventSource for DownSource {
    fn source_id(&self) -> &str {
        "down"
    }

    fn list_events(&self, _scope: EventScope) -> Result<Vec<RawEvent>, SourceError> {
        Err(SourceError::Fetch(FetchError::Connect(
            "connection refused".to_string(),
        )))
    }
}

impl StandingsSource for DownSource {
    fn source_id(&self) -> &str {
        "down"
    }

    fn list_standings(&self) -> Result<Vec<RawStandingsRow>, SourceError> {
        Err(SourceError::Fetch(FetchError::Connect(
            "connection refused".to_string(),
        )))
    }
}

struct FakeStandings {
    id: &'static str,
    rows: Vec<RawStandingsRow>,
}

impl StandingsSource for FakeStandings {
    fn source_id(&self) -> &str {
        self.id
    }

    fn list_standings(&self) -> Result<Vec<RawStandingsRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

fn table(teams: &[&str]) -> Vec<RawStandingsRow> {
    teams
        .iter()
        .enumerate()
        .map(|(idx, team)| RawStandingsRow {
            position: Some(idx as u32 + 1),
            team: team.to_string(),
            played: Some(5),
            points: Some(30 - idx as u32),
            ..RawStandingsRow::default()
        })
        .collect()
}

fn healthy_source() -> FakeEvents {
    FakeEvents {
        id: "fake",
        upcoming: vec![
            raw("E", "F", "2025-09-06", None),
            raw("G", "H", "2025-09-07", None),
            // Finished between pulls: still present in the upcoming feed.
            raw("C", "D", "2025-08-30", Some((1, 1))),
        ],
        past: vec![
            raw("A", "B", "2025-08-23", Some((2, 0))),
            raw("C", "A", "2025-08-16", Some((0, 0))),
        ],
    }
}

#[test]
fn publishes_all_artifacts_and_meta_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());
    let source = healthy_source();
    let sources = Sources {
        events: vec![&source],
        standings: vec![],
    };

    let report = run(&cfg, &sources).expect("run should succeed");
    assert!(report.wrote_fixtures);
    assert!(report.wrote_results);
    assert!(report.wrote_standings);
    assert!(report.wrote_meta);
    assert_eq!(report.counts.fixtures, 2);
    assert_eq!(report.counts.results, 3);
    assert_eq!(report.status.get("events").unwrap(), "ok_total:5");

    // Finished-in-upcoming was merged into results, not dropped.
    let results: Vec<Event> =
        serde_json::from_str(&fs::read_to_string(dir.path().join("results.json")).unwrap())
            .unwrap();
    assert!(results.iter().any(|e| e.home == "C" && e.away == "D"));
    // Results sorted descending by date.
    assert_eq!(results[0].date, "2025-08-30");
    assert_eq!(results[2].date, "2025-08-16");

    // Same data again: no artifact changes, meta untouched.
    let report = run(&cfg, &sources).expect("second run should succeed");
    assert!(!report.wrote_fixtures);
    assert!(!report.wrote_results);
    assert!(!report.wrote_standings);
    assert!(!report.wrote_meta);
}

#[test]
fn failing_fetch_keeps_previous_artifacts_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());

    let source = healthy_source();
    let sources = Sources {
        events: vec![&source],
        standings: vec![],
    };
    run(&cfg, &sources).expect("seed run");
    let fixtures_before = fs::read(dir.path().join("fixtures.json")).unwrap();
    let results_before = fs::read(dir.path().join("results.json")).unwrap();

    let down = DownSource;
    let sources = Sources {
        events: vec![&down],
        standings: vec![&down],
    };
    let report = run(&cfg, &sources).expect("fallback run should still succeed");

    assert_eq!(fs::read(dir.path().join("fixtures.json")).unwrap(), fixtures_before);
    assert_eq!(fs::read(dir.path().join("results.json")).unwrap(), results_before);
    assert_eq!(report.status.get("events").unwrap(), "kept_old_parsed:5");
    assert_eq!(
        report.status.get("events.down.next").unwrap(),
        "fetch_failed:connect"
    );
    assert_eq!(
        report.status.get("standings.down").unwrap(),
        "fetch_failed:connect"
    );
}

#[test]
fn failing_fetch_with_no_fallback_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());
    let down = DownSource;
    let sources = Sources {
        events: vec![&down],
        standings: vec![],
    };
    assert!(run(&cfg, &sources).is_err());
}

#[test]
fn short_feed_falls_back_to_previous_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());

    let source = healthy_source();
    let sources = Sources {
        events: vec![&source],
        standings: vec![],
    };
    run(&cfg, &sources).expect("seed run");

    // Source drifts and now yields a single event, below min_events.
    let short = FakeEvents {
        id: "fake",
        upcoming: vec![raw("E", "F", "2025-09-06", None)],
        past: vec![],
    };
    let sources = Sources {
        events: vec![&short],
        standings: vec![],
    };
    let report = run(&cfg, &sources).expect("fallback run");
    assert_eq!(report.status.get("events").unwrap(), "kept_old_parsed:5");
    assert_eq!(report.status.get("events.fake").unwrap(), "short:1");
    assert_eq!(report.counts.fixtures, 2);
}

#[test]
fn short_standings_never_replace_a_full_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = cfg(dir.path());
    cfg.min_teams = 10;

    let events = healthy_source();
    let full = FakeStandings {
        id: "table",
        rows: table(&[
            "T01", "T02", "T03", "T04", "T05", "T06", "T07", "T08", "T09", "T10", "T11", "T12",
        ]),
    };
    let sources = Sources {
        events: vec![&events],
        standings: vec![&full],
    };
    run(&cfg, &sources).expect("seed run");
    let standings_before = fs::read(dir.path().join("standings.json")).unwrap();

    // Source drifts to a two-row fragment; the table computed from
    // results is short too, so the previous full table must survive.
    let short = FakeStandings {
        id: "table",
        rows: table(&["T01", "T02"]),
    };
    let sources = Sources {
        events: vec![&events],
        standings: vec![&short],
    };
    let report = run(&cfg, &sources).expect("fallback run");

    assert_eq!(
        fs::read(dir.path().join("standings.json")).unwrap(),
        standings_before
    );
    assert_eq!(report.status.get("standings.table").unwrap(), "short:2");
    assert_eq!(report.status.get("standings").unwrap(), "kept_old:12");
    assert_eq!(report.counts.standings_rows, 12);
    assert!(!report.wrote_standings);
}

#[test]
fn empty_primary_table_defers_to_the_backup_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());
    let events = healthy_source();
    // A "null" upstream table parses to an empty list, not an error; the
    // lower-priority source must still get its turn.
    let empty = FakeStandings {
        id: "api",
        rows: Vec::new(),
    };
    let backup = FakeStandings {
        id: "page",
        rows: table(&["P", "Q", "R", "S"]),
    };
    let sources = Sources {
        events: vec![&events],
        standings: vec![&empty, &backup],
    };
    let report = run(&cfg, &sources).expect("run should succeed");
    assert_eq!(report.status.get("standings.api").unwrap(), "short:0");
    assert_eq!(report.status.get("standings.page").unwrap(), "rows:4");
    assert_eq!(report.standings_source, Some(StandingsSourceTag::Lookup));
    assert_eq!(report.counts.standings_rows, 4);
}

struct RoundOnly;

impl EventSource for RoundOnly {
    fn source_id(&self) -> &str {
        "rounds"
    }

    fn list_events(&self, scope: EventScope) -> Result<Vec<RawEvent>, SourceError> {
        match scope {
            EventScope::Upcoming | EventScope::Past => Ok(Vec::new()),
            EventScope::Round(1) => Ok(vec![
                raw("A", "B", "2025-08-02", Some((1, 0))),
                raw("C", "D", "2025-08-03", Some((0, 2))),
            ]),
            EventScope::Round(2) => Ok(vec![raw("A", "C", "2025-08-09", None)]),
            EventScope::Round(_) => Err(SourceError::Fetch(FetchError::Status {
                status: 404,
                url: "http://localhost/round".to_string(),
            })),
        }
    }
}

#[test]
fn explicit_rounds_top_up_the_feeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = cfg(dir.path());
    cfg.rounds = Some((1, 3));

    let source = RoundOnly;
    let sources = Sources {
        events: vec![&source],
        standings: vec![],
    };
    let report = run(&cfg, &sources).expect("round-fed run");
    assert_eq!(report.counts.results, 2);
    assert_eq!(report.counts.fixtures, 1);
    // Round 3 failed but the source still carried the run.
    assert_eq!(
        report.status.get("events.rounds.round3").unwrap(),
        "fetch_failed:http_404"
    );
    assert_eq!(report.status.get("events").unwrap(), "ok_total:3");
}

#[test]
fn second_source_is_tried_when_the_first_is_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = cfg(dir.path());
    let down = DownSource;
    let backup = healthy_source();
    let sources = Sources {
        events: vec![&down, &backup],
        standings: vec![],
    };
    let report = run(&cfg, &sources).expect("backup source should carry the run");
    assert_eq!(report.status.get("events").unwrap(), "ok_total:5");
    assert_eq!(
        report.status.get("events.down.past").unwrap(),
        "fetch_failed:connect"
    );
    assert_eq!(report.status.get("events.fake").unwrap(), "ok:5");
}
