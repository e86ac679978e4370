use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Bounded retry for idempotent GETs. Reference behavior: 4 attempts,
/// backoff factor 1.2 over a base delay, capped.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            base_delay: Duration::from_millis(500),
            backoff_factor: 1.2,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt as i32);
        let millis = (self.base_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Explicit run configuration; no module-level mutable state.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub competition: String,
    pub league_id: String,
    pub season: String,
    pub api_base: String,
    /// Optional scraped-page source, tried after the structured API.
    pub markup_url: Option<String>,
    /// Inclusive round range to fetch explicitly, on top of the
    /// upcoming/past feeds. None means feeds only.
    pub rounds: Option<(u32, u32)>,
    /// Authoritative standings adopted only with at least this many teams.
    pub min_teams: usize,
    /// Newly parsed fixtures+results published only at this size or above.
    pub min_events: usize,
    pub out_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl SnapshotConfig {
    pub fn from_env() -> Self {
        let season = env_string("SNAPSHOT_SEASON", "2025-2026");
        Self {
            competition: env_string("SNAPSHOT_COMPETITION", "SuperLiga (Romanian Liga I)"),
            league_id: env_string("SNAPSHOT_LEAGUE_ID", "4691"),
            api_base: env_string(
                "SNAPSHOT_API_BASE",
                "https://www.thesportsdb.com/api/v1/json/123",
            ),
            markup_url: env::var("SNAPSHOT_MARKUP_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            rounds: env::var("SNAPSHOT_ROUNDS").ok().and_then(|v| parse_rounds(&v)),
            min_teams: env_usize("SNAPSHOT_MIN_TEAMS", 14).clamp(4, 24),
            min_events: env_usize("SNAPSHOT_MIN_EVENTS", 8).clamp(1, 100),
            out_dir: PathBuf::from(env_string("SNAPSHOT_OUT_DIR", "public/superliga"))
                .join(&season),
            season,
            retry: RetryPolicy::default(),
        }
    }

    pub fn next_events_url(&self) -> String {
        format!("{}/eventsnextleague.php?id={}", self.api_base, self.league_id)
    }

    pub fn past_events_url(&self) -> String {
        format!("{}/eventspastleague.php?id={}", self.api_base, self.league_id)
    }

    pub fn round_events_url(&self, round: u32) -> String {
        format!(
            "{}/eventsround.php?id={}&r={}&s={}",
            self.api_base, self.league_id, round, self.season
        )
    }

    pub fn table_url(&self) -> String {
        format!(
            "{}/lookuptable.php?l={}&s={}",
            self.api_base, self.league_id, self.season
        )
    }
}

/// "3-7" -> rounds 3 through 7; a single "5" is the one-round range.
fn parse_rounds(v: &str) -> Option<(u32, u32)> {
    let v = v.trim();
    if v.is_empty() {
        return None;
    }
    let (lo, hi) = match v.split_once('-') {
        Some((lo, hi)) => (lo.trim().parse().ok()?, hi.trim().parse().ok()?),
        None => {
            let r = v.parse().ok()?;
            (r, r)
        }
    };
    (lo <= hi).then_some((lo, hi))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}
