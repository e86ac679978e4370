//! Markup-scraping adapter for rendered HTML/text pages with no schema
//! guarantee.
//!
//! Parsing is pattern-driven: a datetime anchor (day, month-name, year,
//! optional time) marks the start of a match record, and the tokens
//! around it are classified by shape. The match patterns live in an
//! ordered table so a new page layout is an additive entry, not a new
//! branch. Unmatched lines are skipped; a partially-matched pattern
//! never emits a record.

use reqwest::blocking::Client;

use crate::config::SnapshotConfig;
use crate::error::{ParseError, SourceError};
use crate::fetch::fetch_text;
use crate::source::{EventScope, EventSource, RawEvent, RawStandingsRow, StandingsSource};
use crate::text::{collapse_ws, strip_furniture};

pub const SOURCE_ID: &str = "markup";

pub struct MarkupAdapter<'a> {
    client: &'a Client,
    cfg: &'a SnapshotConfig,
    url: String,
}

impl<'a> MarkupAdapter<'a> {
    pub fn new(client: &'a Client, cfg: &'a SnapshotConfig, url: String) -> Self {
        Self { client, cfg, url }
    }
}

impl EventSource for MarkupAdapter<'_> {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    /// The page carries past and upcoming matches in one listing; the
    /// scope filter happens downstream on score presence.
    fn list_events(&self, _scope: EventScope) -> Result<Vec<RawEvent>, SourceError> {
        let body = fetch_text(self.client, &self.url, &self.cfg.retry)?;
        Ok(parse_event_text(&body)?)
    }
}

impl StandingsSource for MarkupAdapter<'_> {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn list_standings(&self) -> Result<Vec<RawStandingsRow>, SourceError> {
        let body = fetch_text(self.client, &self.url, &self.cfg.retry)?;
        Ok(parse_standings_text(&body)?)
    }
}

// ---------------------------------------------------------------------------
// Tokenization

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(u32),
    /// Lone dash: "no score yet".
    Dash,
    /// "2-1" style pair.
    ScorePair(u32, u32),
    /// "18:30" style time-of-day.
    Time(String),
    Word(String),
}

/// Month names accepted in datetime anchors. Kept as data so a new
/// source language is one row, not new code.
const MONTHS: &[(&str, u32)] = &[
    ("ianuarie", 1),
    ("februarie", 2),
    ("martie", 3),
    ("aprilie", 4),
    ("mai", 5),
    ("iunie", 6),
    ("iulie", 7),
    ("august", 8),
    ("septembrie", 9),
    ("octombrie", 10),
    ("noiembrie", 11),
    ("decembrie", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Phrases that look like team names but are site furniture: menu text,
/// day-of-week headers, statistics labels.
const NOISE_PHRASES: &[&str] = &[
    "luni",
    "marti",
    "mar\u{21b}i",
    "miercuri",
    "joi",
    "vineri",
    "sambata",
    "s\u{e2}mb\u{103}t\u{103}",
    "duminica",
    "duminic\u{103}",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "statistici",
    "statistics",
    "meniu",
    "menu",
    "program",
    "rezultate",
    "clasament",
    "live",
    "bilete",
    "detalii",
    "avancronica",
    "etapa",
    "vs",
];

fn month_number(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, n)| *n)
}

fn is_noise(word: &str) -> bool {
    let lower = word.to_lowercase();
    NOISE_PHRASES.iter().any(|p| *p == lower)
}

fn classify(raw: &str) -> Option<Token> {
    let t = raw.trim_matches(|c: char| matches!(c, ',' | ';' | '|' | '.'));
    if t.is_empty() {
        return None;
    }
    if t == "-" {
        return Some(Token::Dash);
    }
    if let Ok(n) = t.parse::<u32>() {
        return Some(Token::Int(n));
    }
    if let Some((a, b)) = split_score_pair(t) {
        return Some(Token::ScorePair(a, b));
    }
    if is_time(t) {
        return Some(Token::Time(t.to_string()));
    }
    if t.chars().any(|c| c.is_alphabetic()) {
        return Some(Token::Word(t.to_string()));
    }
    None
}

// Caps the pair so season spans like "2025-2026" don't read as scores.
const MAX_PLAUSIBLE_GOALS: u32 = 200;

fn split_score_pair(t: &str) -> Option<(u32, u32)> {
    let (a, b) = t.split_once('-')?;
    let a: u32 = a.trim().parse().ok()?;
    let b: u32 = b.trim().parse().ok()?;
    if a > MAX_PLAUSIBLE_GOALS || b > MAX_PLAUSIBLE_GOALS {
        return None;
    }
    Some((a, b))
}

fn is_time(t: &str) -> bool {
    let parts: Vec<&str> = t.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return false;
    }
    let Some(h) = parts[0].parse::<u32>().ok() else {
        return false;
    };
    h < 24 && parts[1..].iter().all(|p| matches!(p.parse::<u32>(), Ok(m) if m < 60))
}

/// Drop markup, keeping text content and line boundaries. Tags become
/// line breaks so table cells don't glue together.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push('\n');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&copy;", "\u{a9}")
        .replace("&#8211;", "-")
        .replace("&ndash;", "-")
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace().filter_map(classify).collect()
}

// ---------------------------------------------------------------------------
// Match records

#[derive(Debug, Clone, PartialEq, Eq)]
struct Anchor {
    date: String,
    time: Option<String>,
    /// Index just past the anchor tokens.
    end: usize,
}

/// A datetime anchor is `day month-name year [time]` starting at `idx`.
fn match_anchor(tokens: &[Token], idx: usize) -> Option<Anchor> {
    let Token::Int(day) = tokens.get(idx)? else {
        return None;
    };
    if !(1..=31).contains(day) {
        return None;
    }
    let Token::Word(month_word) = tokens.get(idx + 1)? else {
        return None;
    };
    let month = month_number(month_word)?;
    let Token::Int(year) = tokens.get(idx + 2)? else {
        return None;
    };
    if !(1900..=2100).contains(year) {
        return None;
    }
    let (time, end) = match tokens.get(idx + 3) {
        Some(Token::Time(t)) => (Some(t.clone()), idx + 4),
        _ => (None, idx + 3),
    };
    Some(Anchor {
        date: format!("{year:04}-{month:02}-{day:02}"),
        time,
        end,
    })
}

type MatchExtractor = fn(&Anchor, &[Token]) -> Option<RawEvent>;

/// Ordered: the finished shape is stricter, so it goes first.
const MATCH_PATTERNS: &[(&str, MatchExtractor)] =
    &[("finished", extract_finished), ("scheduled", extract_scheduled)];

/// `datetime, team, score-score, team`
fn extract_finished(anchor: &Anchor, window: &[Token]) -> Option<RawEvent> {
    let (split, len, score) = find_score(window)?;
    let home = team_name(&window[..split])?;
    let away = team_name(&window[split + len..])?;
    Some(raw_event(anchor, home, away, Some(score)))
}

/// `datetime, team, -, team` (dash meaning "no score yet")
fn extract_scheduled(anchor: &Anchor, window: &[Token]) -> Option<RawEvent> {
    let split = window.iter().position(|t| *t == Token::Dash)?;
    // A dash flanked by integers is half of a score, not a separator.
    if matches!(window.get(split.wrapping_sub(1)), Some(Token::Int(_)))
        && matches!(window.get(split + 1), Some(Token::Int(_)))
    {
        return None;
    }
    let home = team_name(&window[..split])?;
    let away = team_name(&window[split + 1..])?;
    Some(raw_event(anchor, home, away, None))
}

/// Find a score inside the window: either a joined "2-1" token or the
/// split form `2 - 1`. Returns (index, token length, (home, away)).
fn find_score(window: &[Token]) -> Option<(usize, usize, (u32, u32))> {
    for i in 0..window.len() {
        if let Token::ScorePair(a, b) = &window[i] {
            return Some((i, 1, (*a, *b)));
        }
        if i >= 1 && i + 1 < window.len() {
            if let (Token::Int(a), Token::Dash, Token::Int(b)) =
                (&window[i - 1], &window[i], &window[i + 1])
            {
                return Some((i - 1, 3, (*a, *b)));
            }
        }
    }
    None
}

fn team_name(tokens: &[Token]) -> Option<String> {
    let words: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Word(w) if !is_noise(w) => Some(w.as_str()),
            _ => None,
        })
        .collect();
    if words.is_empty() {
        return None;
    }
    let name = strip_furniture(&words.join(" "));
    if name.is_empty() { None } else { Some(name) }
}

fn raw_event(anchor: &Anchor, home: String, away: String, score: Option<(u32, u32)>) -> RawEvent {
    RawEvent {
        id: None,
        round: None,
        date: anchor.date.clone(),
        time: anchor.time.clone(),
        home,
        away,
        home_score: score.map(|(h, _)| h),
        away_score: score.map(|(_, a)| a),
        venue: None,
        city: None,
    }
}

/// Scrape match records out of a rendered page.
pub fn parse_event_text(input: &str) -> Result<Vec<RawEvent>, ParseError> {
    let text = strip_tags(input);
    let tokens = tokenize(&text);

    let mut anchors = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Some(anchor) = match_anchor(&tokens, i) {
            i = anchor.end;
            anchors.push(anchor);
        } else {
            i += 1;
        }
    }

    let mut events = Vec::new();
    for (n, anchor) in anchors.iter().enumerate() {
        // Record tokens run from this anchor to the start of the next.
        let window_end = anchors
            .get(n + 1)
            .map(|next| next.end - anchor_len(next))
            .unwrap_or(tokens.len());
        let window = &tokens[anchor.end..window_end.max(anchor.end)];

        for (_, extract) in MATCH_PATTERNS {
            if let Some(event) = extract(anchor, window) {
                events.push(event);
                break;
            }
        }
    }
    Ok(events)
}

fn anchor_len(anchor: &Anchor) -> usize {
    if anchor.time.is_some() { 4 } else { 3 }
}

// ---------------------------------------------------------------------------
// Standings lines

/// A standings line is: position, team (greedy up to the next integer
/// run), played, win, draw, loss, gf-ga, points. Trailing decorative
/// fields (form, last-5 dots) are ignored.
pub fn parse_standings_text(input: &str) -> Result<Vec<RawStandingsRow>, ParseError> {
    let text = strip_tags(input);
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = collapse_ws(line);
        if line.is_empty() {
            continue;
        }
        if let Some(row) = parse_standings_line(&line) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn parse_standings_line(line: &str) -> Option<RawStandingsRow> {
    let tokens = tokenize(line);
    let Some(Token::Int(position)) = tokens.first() else {
        return None;
    };

    // Greedy team name: everything up to the first spot where the
    // numeric tail (4 ints, gf-ga, points) begins.
    for start in 1..tokens.len() {
        if let Some(row) = match_numeric_tail(*position, &tokens, start) {
            return Some(row);
        }
    }
    None
}

fn match_numeric_tail(position: u32, tokens: &[Token], start: usize) -> Option<RawStandingsRow> {
    let team = team_name(&tokens[1..start])?;
    let mut ints = [0u32; 4];
    for (k, slot) in ints.iter_mut().enumerate() {
        match tokens.get(start + k)? {
            Token::Int(n) => *slot = *n,
            _ => return None,
        }
    }
    let Token::ScorePair(gf, ga) = tokens.get(start + 4)? else {
        return None;
    };
    let Token::Int(points) = tokens.get(start + 5)? else {
        return None;
    };
    let [played, win, draw, loss] = ints;
    Some(RawStandingsRow {
        position: Some(position),
        team,
        played: Some(played),
        win: Some(win),
        draw: Some(draw),
        loss: Some(loss),
        goals_for: Some(*gf),
        goals_against: Some(*ga),
        goal_difference: Some(*gf as i32 - *ga as i32),
        points: Some(*points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_needs_full_date() {
        let tokens = tokenize("23 august 2025 18:30");
        let anchor = match_anchor(&tokens, 0).expect("valid anchor");
        assert_eq!(anchor.date, "2025-08-23");
        assert_eq!(anchor.time.as_deref(), Some("18:30"));

        assert!(match_anchor(&tokenize("23 august"), 0).is_none());
        assert!(match_anchor(&tokenize("43 august 2025"), 0).is_none());
    }

    #[test]
    fn split_score_form_is_recognized() {
        let events = parse_event_text("23 august 2025 18:30 FCSB 2 - 1 Rapid").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].home_score, Some(2));
        assert_eq!(events[0].away_score, Some(1));
    }

    #[test]
    fn partial_pattern_emits_nothing() {
        // Anchor with no teams around it.
        let events = parse_event_text("23 august 2025 18:30 2-1").unwrap();
        assert!(events.is_empty());
    }
}
