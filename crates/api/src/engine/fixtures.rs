//! Round-robin schedule generation (circle method) and the planned-round
//! shapes shared with the knockout draw.

use chrono::{DateTime, Duration, Utc};
use infra::repos::CompetitionType;
use std::collections::HashSet;
use uuid::Uuid;

use super::error::{CompetitionError, EngineResult};

/// How fixtures are produced for a competition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    RoundRobin,
    /// Round-robin inside each group, rounds shared across groups.
    GroupedRoundRobin,
    Knockout,
}

impl FixtureFormat {
    pub fn for_type(competition_type: CompetitionType) -> Self {
        match competition_type {
            CompetitionType::League | CompetitionType::Friendly => FixtureFormat::RoundRobin,
            CompetitionType::Tournament => FixtureFormat::GroupedRoundRobin,
            CompetitionType::Cup | CompetitionType::Knockout => FixtureFormat::Knockout,
        }
    }

    pub fn is_knockout(&self) -> bool {
        matches!(self, FixtureFormat::Knockout)
    }

    /// Mutation that builds the schedule for this format.
    pub fn operation(&self) -> &'static str {
        match self {
            FixtureFormat::Knockout => "performDraw",
            _ => "generateFixtures",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    pub home_and_away: bool,
    pub start: DateTime<Utc>,
    pub days_between_rounds: i64,
}

impl ScheduleOptions {
    /// Kick-off of the round at `index` (0-based).
    pub fn round_start(&self, index: usize) -> DateTime<Utc> {
        self.start + Duration::days(self.days_between_rounds * index as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub leg_number: i32,
    pub bracket_position: Option<i32>,
    pub group_name: Option<String>,
    /// Persisted as a Bye-status match (knockout only).
    pub is_bye: bool,
}

#[derive(Debug, Clone)]
pub struct PlannedRound {
    pub number: i32,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub matches: Vec<PlannedMatch>,
    /// Teams sitting out this round. Round-robin byes are not stored as matches.
    pub byes: Vec<Uuid>,
}

pub fn default_round_name(number: i32) -> String {
    format!("Round {}", number)
}

fn check_unique(teams: &[Uuid]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(teams.len());
    for id in teams {
        if !seen.insert(*id) {
            return Err(CompetitionError::validation(format!(
                "team {} is listed more than once",
                id
            )));
        }
    }
    Ok(())
}

/// One leg of pairings by the circle method. The first slot stays fixed while
/// the others rotate; an odd field gets an empty slot in the fixed position so
/// every team sits out exactly once per leg.
fn circle_pairings(teams: &[Uuid]) -> Vec<(Vec<(Uuid, Uuid)>, Vec<Uuid>)> {
    let mut slots: Vec<Option<Uuid>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.insert(0, None);
    }
    let m = slots.len();
    let mut rounds = Vec::with_capacity(m - 1);

    for r in 0..m - 1 {
        let mut pairs = Vec::with_capacity(m / 2);
        let mut byes = Vec::new();
        for i in 0..m / 2 {
            match (slots[i], slots[m - 1 - i]) {
                (Some(a), Some(b)) => {
                    // alternate the fixed team between home and away
                    if i == 0 && r % 2 == 1 {
                        pairs.push((b, a));
                    } else {
                        pairs.push((a, b));
                    }
                }
                (Some(t), None) | (None, Some(t)) => byes.push(t),
                (None, None) => {}
            }
        }
        rounds.push((pairs, byes));
        slots[1..].rotate_right(1);
    }

    rounds
}

/// Full round-robin schedule for an ordered team list. Ordering (and any
/// shuffling) is the caller's business; the output is deterministic.
pub fn round_robin(
    teams: &[Uuid],
    group_name: Option<&str>,
    options: &ScheduleOptions,
) -> EngineResult<Vec<PlannedRound>> {
    if teams.len() < 2 {
        return Err(CompetitionError::validation(format!(
            "a round-robin needs at least 2 teams, found {}",
            teams.len()
        )));
    }
    check_unique(teams)?;

    let first_leg = circle_pairings(teams);
    let legs: &[i32] = if options.home_and_away { &[1, 2] } else { &[1] };
    let per_leg = first_leg.len();
    let mut rounds = Vec::with_capacity(per_leg * legs.len());

    for &leg in legs {
        for (idx, (pairs, byes)) in first_leg.iter().enumerate() {
            let index = (leg as usize - 1) * per_leg + idx;
            let number = index as i32 + 1;
            let matches = pairs
                .iter()
                .map(|&(home, away)| {
                    let (home, away) = if leg == 2 { (away, home) } else { (home, away) };
                    PlannedMatch {
                        home_team_id: Some(home),
                        away_team_id: Some(away),
                        leg_number: leg,
                        bracket_position: None,
                        group_name: group_name.map(str::to_string),
                        is_bye: false,
                    }
                })
                .collect();
            rounds.push(PlannedRound {
                number,
                name: default_round_name(number),
                starts_at: options.round_start(index),
                matches,
                byes: byes.clone(),
            });
        }
    }

    Ok(rounds)
}

/// Round-robin within each group. Round N of every group is played in the same
/// competition round.
pub fn grouped_round_robin(
    groups: &[(String, Vec<Uuid>)],
    options: &ScheduleOptions,
) -> EngineResult<Vec<PlannedRound>> {
    if groups.is_empty() {
        return Err(CompetitionError::validation(
            "a group tournament needs at least one group",
        ));
    }

    let all: Vec<Uuid> = groups.iter().flat_map(|(_, t)| t.iter().copied()).collect();
    check_unique(&all)?;

    let mut merged: Vec<PlannedRound> = Vec::new();
    for (name, teams) in groups {
        if teams.len() < 2 {
            return Err(CompetitionError::validation(format!(
                "group {} needs at least 2 teams, found {}",
                name,
                teams.len()
            )));
        }
        for round in round_robin(teams, Some(name.as_str()), options)? {
            let idx = (round.number - 1) as usize;
            if idx < merged.len() {
                merged[idx].matches.extend(round.matches);
                merged[idx].byes.extend(round.byes);
            } else {
                merged.push(round);
            }
        }
    }

    Ok(merged)
}
