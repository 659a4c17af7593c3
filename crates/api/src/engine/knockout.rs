//! Knockout draw, standard seeding and forward-only bracket advancement.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use super::error::{CompetitionError, EngineResult};
use super::fixtures::{PlannedMatch, PlannedRound};

#[derive(Debug, Clone, Copy)]
pub struct DrawEntry {
    pub team_id: Uuid,
    pub seed: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct KnockoutDraw {
    pub bracket_size: usize,
    /// (team, draw position) with positions 1..=N.
    pub draw_positions: Vec<(Uuid, i32)>,
    pub first_round: PlannedRound,
}

/// Emitted once every match of the latest knockout round is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundCompleted {
    pub competition_id: Uuid,
    pub round_id: Uuid,
    pub round_number: i32,
}

/// Smallest power of two that holds `teams`.
pub fn bracket_size(teams: usize) -> usize {
    teams.max(2).next_power_of_two()
}

/// Seed numbers in bracket slot order, so that seeds 1 and 2 can only meet in
/// the final, 1 to 4 only from the semi-finals on, and so on.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let next_len = order.len() * 2;
        order = order
            .iter()
            .flat_map(|&s| [s, next_len + 1 - s])
            .collect();
    }
    order
}

pub fn round_name(teams_in_round: usize) -> String {
    match teams_in_round {
        0..=2 => "Final".to_string(),
        4 => "Semi-finals".to_string(),
        8 => "Quarter-finals".to_string(),
        n => format!("Round of {}", n),
    }
}

/// Build the first knockout round.
///
/// With `seed_teams`, seeded entries are ranked by seed number ahead of the
/// unseeded ones; otherwise the entry order is the ranking. Ranks beyond the
/// field size are byes, which therefore fall to the top-ranked teams.
pub fn draw(
    entries: &[DrawEntry],
    seed_teams: bool,
    round_number: i32,
    starts_at: DateTime<Utc>,
) -> EngineResult<KnockoutDraw> {
    if entries.len() < 2 {
        return Err(CompetitionError::validation(format!(
            "a knockout draw needs at least 2 teams, found {}",
            entries.len()
        )));
    }

    let mut seen = HashSet::new();
    for e in entries {
        if !seen.insert(e.team_id) {
            return Err(CompetitionError::validation(format!(
                "team {} is listed more than once",
                e.team_id
            )));
        }
    }

    let ranked: Vec<Uuid> = if seed_teams {
        let mut seeded: Vec<&DrawEntry> = entries.iter().filter(|e| e.seed.is_some()).collect();
        seeded.sort_by_key(|e| e.seed);
        let mut seeds = HashSet::new();
        for e in &seeded {
            if let Some(seed) = e.seed {
                if seed < 1 {
                    return Err(CompetitionError::validation(format!(
                        "seed numbers start at 1, team {} has {}",
                        e.team_id, seed
                    )));
                }
                if !seeds.insert(seed) {
                    return Err(CompetitionError::validation(format!(
                        "seed {} is used by more than one team",
                        seed
                    )));
                }
            }
        }
        seeded
            .into_iter()
            .chain(entries.iter().filter(|e| e.seed.is_none()))
            .map(|e| e.team_id)
            .collect()
    } else {
        entries.iter().map(|e| e.team_id).collect()
    };

    let size = bracket_size(ranked.len());
    let slots: Vec<Option<Uuid>> = seeding_order(size)
        .into_iter()
        .map(|rank| ranked.get(rank - 1).copied())
        .collect();

    let matches = slots
        .chunks(2)
        .enumerate()
        .map(|(k, pair)| planned_pair(pair[0], pair[1], k))
        .collect();

    let draw_positions = ranked
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i32 + 1))
        .collect();

    Ok(KnockoutDraw {
        bracket_size: size,
        draw_positions,
        first_round: PlannedRound {
            number: round_number,
            name: round_name(size),
            starts_at,
            matches,
            byes: Vec::new(),
        },
    })
}

fn planned_pair(a: Option<Uuid>, b: Option<Uuid>, index: usize) -> PlannedMatch {
    let (home, away, is_bye) = match (a, b) {
        (Some(h), Some(w)) => (Some(h), Some(w), false),
        (Some(t), None) | (None, Some(t)) => (Some(t), None, true),
        (None, None) => (None, None, true),
    };
    PlannedMatch {
        home_team_id: home,
        away_team_id: away,
        leg_number: 1,
        bracket_position: Some(index as i32 + 1),
        group_name: None,
        is_bye,
    }
}

/// One finished slot of a knockout round.
#[derive(Debug, Clone, Copy)]
pub struct SlotResult {
    pub bracket_position: i32,
    pub winner: Option<Uuid>,
    pub loser: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub enum Advancement {
    NextRound(PlannedRound),
    /// The final has been decided (or ended without a winner).
    Decided {
        champion: Option<Uuid>,
        runner_up: Option<Uuid>,
    },
}

/// Pair the winners of a completed round in bracket order. A slot that
/// produced no winner hands its partner a bye.
pub fn advance(
    completed: &[SlotResult],
    next_round_number: i32,
    starts_at: DateTime<Utc>,
) -> EngineResult<Advancement> {
    if completed.is_empty() {
        return Err(CompetitionError::invariant("knockout round has no matches"));
    }

    let mut slots = completed.to_vec();
    slots.sort_by_key(|s| s.bracket_position);
    for (i, slot) in slots.iter().enumerate() {
        if slot.bracket_position != i as i32 + 1 {
            return Err(CompetitionError::invariant(format!(
                "knockout round has a gap at bracket position {}",
                i + 1
            )));
        }
    }

    if slots.len() == 1 {
        return Ok(Advancement::Decided {
            champion: slots[0].winner,
            runner_up: slots[0].loser,
        });
    }

    if !slots.len().is_power_of_two() {
        return Err(CompetitionError::invariant(format!(
            "knockout round holds {} matches, which is not a bracket",
            slots.len()
        )));
    }

    let matches = slots
        .chunks(2)
        .enumerate()
        .map(|(k, pair)| planned_pair(pair[0].winner, pair[1].winner, k))
        .collect();

    Ok(Advancement::NextRound(PlannedRound {
        number: next_round_number,
        name: round_name(slots.len()),
        starts_at,
        matches,
        byes: Vec::new(),
    }))
}
