use infra::models::{CompetitionParticipantRow, MatchEventRow, MatchLineupRow};
use infra::repos::{MatchEventType, ParticipantTotals};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::error::{CompetitionError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantTally {
    pub participant_id: Uuid,
    pub team_id: Uuid,
    pub display_name: String,
    pub goals: i32,
    pub penalty_goals: i32,
    pub assists: i32,
    pub appearances: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
    /// Sequence of the participant's first counted goal.
    pub first_goal_sequence: Option<i64>,
}

impl ParticipantTally {
    fn new(p: &CompetitionParticipantRow) -> Self {
        ParticipantTally {
            participant_id: p.id,
            team_id: p.team_id,
            display_name: p.display_name.clone(),
            goals: 0,
            penalty_goals: 0,
            assists: 0,
            appearances: 0,
            yellow_cards: 0,
            red_cards: 0,
            first_goal_sequence: None,
        }
    }

    pub fn totals(&self) -> ParticipantTotals {
        ParticipantTotals {
            appearances: self.appearances,
            goals: self.goals,
            assists: self.assists,
            yellow_cards: self.yellow_cards,
            red_cards: self.red_cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerLine {
    pub rank: i32,
    pub tally: ParticipantTally,
}

/// Per-participant statistics from counted events and lineups, in the order
/// the participants were given.
pub fn tally_participants(
    participants: &[CompetitionParticipantRow],
    events: &[MatchEventRow],
    lineups: &[MatchLineupRow],
) -> EngineResult<Vec<ParticipantTally>> {
    let index: HashMap<Uuid, usize> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();
    let mut tallies: Vec<ParticipantTally> = participants.iter().map(ParticipantTally::new).collect();

    let slot = |id: Uuid, what: &str| {
        index.get(&id).copied().ok_or_else(|| {
            CompetitionError::invariant(format!(
                "{} references participant {} outside the competition",
                what, id
            ))
        })
    };

    let mut ordered: Vec<&MatchEventRow> = events.iter().collect();
    ordered.sort_by_key(|e| e.sequence);

    for event in ordered {
        if let Some(pid) = event.participant_id {
            let t = &mut tallies[slot(pid, "match event")?];
            match event.event_type {
                MatchEventType::Goal => t.goals += 1,
                MatchEventType::PenaltyGoal => {
                    t.goals += 1;
                    t.penalty_goals += 1;
                }
                MatchEventType::YellowCard => t.yellow_cards += 1,
                kind if kind.is_dismissal() => t.red_cards += 1,
                _ => {}
            }
            if event.event_type.is_scoring() && t.first_goal_sequence.is_none() {
                t.first_goal_sequence = Some(event.sequence);
            }
        }
        if event.event_type.allows_assist() {
            if let Some(aid) = event.assist_participant_id {
                tallies[slot(aid, "assist")?].assists += 1;
            }
        }
    }

    let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
    for entry in lineups {
        let i = slot(entry.participant_id, "lineup")?;
        if seen.insert((entry.participant_id, entry.match_id)) {
            tallies[i].appearances += 1;
        }
    }

    Ok(tallies)
}

/// Leaderboard size for a request. Oversized requests are capped at `max`.
pub fn clamp_limit(requested: Option<i32>, default: usize, max: usize) -> EngineResult<usize> {
    match requested {
        Some(n) if n < 1 => Err(CompetitionError::validation(format!(
            "limit must be at least 1, got {}",
            n
        ))),
        Some(n) => Ok((n as usize).min(max)),
        None => Ok(default.clamp(1, max)),
    }
}

/// Goal scorers ranked by goals, then assists, then fewer appearances, then
/// name, then who scored first.
pub fn rank_top_scorers(tallies: &[ParticipantTally], limit: usize) -> Vec<ScorerLine> {
    let mut scorers: Vec<&ParticipantTally> = tallies.iter().filter(|t| t.goals > 0).collect();
    scorers.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then_with(|| b.assists.cmp(&a.assists))
            .then_with(|| a.appearances.cmp(&b.appearances))
            .then_with(|| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()))
            .then_with(|| a.first_goal_sequence.cmp(&b.first_goal_sequence))
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });

    scorers
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, t)| ScorerLine {
            rank: i as i32 + 1,
            tally: t.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use infra::repos::ParticipantRole;

    fn participant(name: &str, team_id: Uuid) -> CompetitionParticipantRow {
        let now = Utc::now();
        CompetitionParticipantRow {
            id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            team_id,
            member_id: Uuid::new_v4(),
            display_name: name.to_string(),
            role: ParticipantRole::Player,
            shirt_number: None,
            appearances: 0,
            goals: 0,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn event(
        seq: i64,
        kind: MatchEventType,
        who: &CompetitionParticipantRow,
        assist: Option<&CompetitionParticipantRow>,
    ) -> MatchEventRow {
        MatchEventRow {
            id: Uuid::new_v4(),
            match_id: Uuid::nil(),
            sequence: seq,
            event_type: kind,
            minute: 10,
            participant_id: Some(who.id),
            team_id: who.team_id,
            assist_participant_id: assist.map(|a| a.id),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn lineup(match_id: Uuid, who: &CompetitionParticipantRow) -> MatchLineupRow {
        MatchLineupRow {
            id: Uuid::new_v4(),
            match_id,
            team_id: who.team_id,
            participant_id: who.id,
            is_starting: true,
            shirt_number: None,
            minutes_played: Some(90),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn goals_assists_and_cards_are_counted() {
        let team = Uuid::new_v4();
        let ana = participant("Ana", team);
        let ben = participant("Ben", team);
        let events = vec![
            event(1, MatchEventType::Goal, &ana, Some(&ben)),
            event(2, MatchEventType::PenaltyGoal, &ana, None),
            event(3, MatchEventType::OwnGoal, &ben, None),
            event(4, MatchEventType::YellowCard, &ben, None),
            event(5, MatchEventType::SecondYellow, &ben, None),
            event(6, MatchEventType::PenaltyMissed, &ana, None),
        ];
        let tallies = tally_participants(&[ana.clone(), ben.clone()], &events, &[]).unwrap();

        assert_eq!(tallies[0].goals, 2);
        assert_eq!(tallies[0].penalty_goals, 1);
        assert_eq!(tallies[0].first_goal_sequence, Some(1));
        assert_eq!(tallies[1].goals, 0, "own goals are not credited");
        assert_eq!(tallies[1].assists, 1);
        assert_eq!(tallies[1].yellow_cards, 1);
        assert_eq!(tallies[1].red_cards, 1);
    }

    #[test]
    fn appearances_count_distinct_matches() {
        let team = Uuid::new_v4();
        let ana = participant("Ana", team);
        let (m1, m2) = (Uuid::new_v4(), Uuid::new_v4());
        let lineups = vec![lineup(m1, &ana), lineup(m1, &ana), lineup(m2, &ana)];
        let tallies = tally_participants(&[ana], &[], &lineups).unwrap();
        assert_eq!(tallies[0].appearances, 2);
    }

    #[test]
    fn ranking_uses_goals_assists_then_fewer_appearances() {
        let team = Uuid::new_v4();
        let ana = participant("Ana", team);
        let ben = participant("Ben", team);
        let cal = participant("Cal", team);
        let dee = participant("Dee", team);
        let (m1, m2) = (Uuid::new_v4(), Uuid::new_v4());

        let events = vec![
            event(1, MatchEventType::Goal, &ben, Some(&dee)),
            event(2, MatchEventType::Goal, &ana, None),
            event(3, MatchEventType::Goal, &cal, None),
            event(4, MatchEventType::Goal, &cal, None),
            event(5, MatchEventType::Goal, &ana, Some(&ben)),
        ];
        // Ana and Cal both score twice without an assist; Cal needed one match.
        let lineups = vec![lineup(m1, &ana), lineup(m2, &ana), lineup(m1, &cal)];
        let tallies = tally_participants(
            &[ana.clone(), ben.clone(), cal.clone(), dee.clone()],
            &events,
            &lineups,
        )
        .unwrap();

        let ranked = rank_top_scorers(&tallies, 10);
        let order: Vec<&str> = ranked.iter().map(|l| l.tally.display_name.as_str()).collect();
        assert_eq!(order, vec!["Cal", "Ana", "Ben"]);
        assert_eq!(ranked[0].rank, 1);
        assert!(ranked.iter().all(|l| l.tally.goals > 0), "non-scorers are left out");
    }

    #[test]
    fn name_then_first_goal_break_remaining_ties() {
        let team = Uuid::new_v4();
        let zed = participant("Zed", team);
        let amy = participant("Amy", team);
        let events = vec![
            event(1, MatchEventType::Goal, &zed, None),
            event(2, MatchEventType::Goal, &amy, None),
        ];
        let tallies = tally_participants(&[zed, amy], &events, &[]).unwrap();
        let ranked = rank_top_scorers(&tallies, 10);
        assert_eq!(ranked[0].tally.display_name, "Amy");
    }

    #[test]
    fn limit_is_applied_and_clamped() {
        let team = Uuid::new_v4();
        let players: Vec<_> = (0..5).map(|i| participant(&format!("P{}", i), team)).collect();
        let events: Vec<_> = players
            .iter()
            .enumerate()
            .map(|(i, p)| event(i as i64 + 1, MatchEventType::Goal, p, None))
            .collect();
        let tallies = tally_participants(&players, &events, &[]).unwrap();
        assert_eq!(rank_top_scorers(&tallies, 3).len(), 3);

        assert_eq!(clamp_limit(None, 10, 100).unwrap(), 10);
        assert_eq!(clamp_limit(Some(500), 10, 100).unwrap(), 100);
        assert_eq!(clamp_limit(Some(25), 10, 100).unwrap(), 25);
        let err = clamp_limit(Some(0), 10, 100).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(clamp_limit(Some(-3), 10, 100).is_err());
    }

    #[test]
    fn unknown_participants_are_invariant_violations() {
        let team = Uuid::new_v4();
        let ana = participant("Ana", team);
        let ghost = participant("Ghost", team);
        let events = vec![event(1, MatchEventType::Goal, &ghost, None)];
        assert!(matches!(
            tally_participants(&[ana], &events, &[]),
            Err(CompetitionError::Invariant(_))
        ));
    }
}
