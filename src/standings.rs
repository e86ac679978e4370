//! Standings resolution: adopt the source's own table when it is
//! complete enough, otherwise recompute one from finished matches.

use std::collections::HashMap;

use crate::model::{Event, StandingsRow, StandingsSourceTag};
use crate::source::RawStandingsRow;
use crate::text::collapse_ws;

#[derive(Debug)]
pub struct Resolution {
    pub rows: Vec<StandingsRow>,
    pub tag: StandingsSourceTag,
    /// Machine-readable note for meta.status, e.g. "lookup_short:5".
    pub note: Option<String>,
}

/// Choose between the authoritative table and the computed fallback.
/// Neither strategy fabricates rows: below `min_teams` the larger
/// partial wins and the shortfall is recorded.
pub fn resolve(
    authoritative: Option<Vec<RawStandingsRow>>,
    finished: &[Event],
    min_teams: usize,
) -> Resolution {
    let lookup = authoritative.map(adopt_lookup).unwrap_or_default();
    if distinct_teams(&lookup) >= min_teams {
        return Resolution {
            rows: lookup,
            tag: StandingsSourceTag::Lookup,
            note: None,
        };
    }

    let computed = compute_from_results(finished);
    if computed.len() >= min_teams {
        return Resolution {
            note: Some(format!("lookup_short:{}", lookup.len())),
            rows: computed,
            tag: StandingsSourceTag::Computed,
        };
    }

    if lookup.len() >= computed.len() {
        Resolution {
            note: Some(format!("lookup_short:{}", lookup.len())),
            rows: lookup,
            tag: StandingsSourceTag::LookupIncomplete,
        }
    } else {
        Resolution {
            note: Some(format!("computed_short:{}", computed.len())),
            rows: computed,
            tag: StandingsSourceTag::ComputedIncomplete,
        }
    }
}

/// Take the source's table verbatim (its points may include deductions,
/// so no 3W+D check), drop rows with no team name, and renumber
/// positions contiguously in the source's order.
pub fn adopt_lookup(raw: Vec<RawStandingsRow>) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = raw
        .into_iter()
        .filter_map(|r| {
            let team = collapse_ws(&r.team);
            if team.is_empty() {
                return None;
            }
            let gf = r.goals_for.unwrap_or(0);
            let ga = r.goals_against.unwrap_or(0);
            Some(StandingsRow {
                position: r.position.unwrap_or(u32::MAX),
                team,
                played: r.played.unwrap_or(0),
                win: r.win.unwrap_or(0),
                draw: r.draw.unwrap_or(0),
                loss: r.loss.unwrap_or(0),
                goals_for: gf,
                goals_against: ga,
                goal_difference: r.goal_difference.unwrap_or(gf as i32 - ga as i32),
                points: r.points.unwrap_or(0),
            })
        })
        .collect();

    rows.sort_by(|a, b| a.position.cmp(&b.position).then(a.team.cmp(&b.team)));
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    rows
}

fn distinct_teams(rows: &[StandingsRow]) -> usize {
    let mut teams: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
    teams.sort_unstable();
    teams.dedup();
    teams.len()
}

#[derive(Debug, Default, Clone)]
struct Tally {
    played: u32,
    win: u32,
    draw: u32,
    loss: u32,
    goals_for: u32,
    goals_against: u32,
}

/// Recompute a table from finished matches: 3 points for a win, 1 for a
/// draw. Ranking is (points desc, goal difference desc, goals for desc,
/// team name asc) — the deterministic tie-break.
pub fn compute_from_results(finished: &[Event]) -> Vec<StandingsRow> {
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for event in finished {
        let Some(score) = event.score else {
            continue;
        };
        let home = tallies.entry(event.home.clone()).or_default();
        home.played += 1;
        home.goals_for += score.home;
        home.goals_against += score.away;
        match score.home.cmp(&score.away) {
            std::cmp::Ordering::Greater => home.win += 1,
            std::cmp::Ordering::Equal => home.draw += 1,
            std::cmp::Ordering::Less => home.loss += 1,
        }

        let away = tallies.entry(event.away.clone()).or_default();
        away.played += 1;
        away.goals_for += score.away;
        away.goals_against += score.home;
        match score.away.cmp(&score.home) {
            std::cmp::Ordering::Greater => away.win += 1,
            std::cmp::Ordering::Equal => away.draw += 1,
            std::cmp::Ordering::Less => away.loss += 1,
        }
    }

    let mut rows: Vec<StandingsRow> = tallies
        .into_iter()
        .map(|(team, t)| StandingsRow {
            position: 0,
            team,
            played: t.played,
            win: t.win,
            draw: t.draw,
            loss: t.loss,
            goals_for: t.goals_for,
            goals_against: t.goals_against,
            goal_difference: t.goals_for as i32 - t.goals_against as i32,
            points: 3 * t.win + t.draw,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team.cmp(&b.team))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    rows
}
