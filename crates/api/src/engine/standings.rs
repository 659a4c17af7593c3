//! League table derivation.
//!
//! The table is a pure reduce over the stored matches of a competition. Running
//! it twice over the same matches and the table it produced last time yields
//! the same rows, positions and previous positions.

use infra::models::{CompetitionRow, CompetitionStandingRow, CompetitionTeamRow, MatchRow};
use infra::repos::{CompetitionStatus, TeamAggregates, TeamStatus};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use super::error::{CompetitionError, EngineResult};
use super::fixtures::FixtureFormat;
use super::outcome::MatchOutcome;

#[derive(Debug, Clone)]
pub struct TeamEntry {
    pub id: Uuid,
    pub name: String,
    pub group_name: Option<String>,
    pub status: TeamStatus,
}

impl From<&CompetitionTeamRow> for TeamEntry {
    fn from(row: &CompetitionTeamRow) -> Self {
        TeamEntry {
            id: row.id,
            name: row.name.clone(),
            group_name: row.group_name.clone(),
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StandingsRules {
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
    pub head_to_head: bool,
    pub promotion_places: i32,
    pub relegation_places: i32,
    pub form_length: usize,
    /// Promotion and relegation flags are only handed out on a finished table.
    pub finalised: bool,
    pub grouped: bool,
}

impl StandingsRules {
    pub fn for_competition(competition: &CompetitionRow, form_length: usize) -> Self {
        StandingsRules {
            points_for_win: competition.points_for_win,
            points_for_draw: competition.points_for_draw,
            points_for_loss: competition.points_for_loss,
            head_to_head: competition.head_to_head_tiebreak,
            promotion_places: competition.promotion_places,
            relegation_places: competition.relegation_places,
            form_length,
            finalised: competition.status == CompetitionStatus::Completed,
            grouped: FixtureFormat::for_type(competition.competition_type)
                == FixtureFormat::GroupedRoundRobin,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub points: i32,
}

impl Record {
    pub fn goal_difference(&self) -> i32 {
        self.goals_for - self.goals_against
    }

    pub fn aggregates(&self) -> TeamAggregates {
        TeamAggregates {
            played: self.played,
            won: self.won,
            drawn: self.drawn,
            lost: self.lost,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            points: self.points,
        }
    }

    fn add(&mut self, scored: i32, conceded: i32, mark: FormMark, rules: &StandingsRules) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match mark {
            FormMark::Win => {
                self.won += 1;
                self.points += rules.points_for_win;
            }
            FormMark::Draw => {
                self.drawn += 1;
                self.points += rules.points_for_draw;
            }
            FormMark::Loss => {
                self.lost += 1;
                self.points += rules.points_for_loss;
            }
        }
    }

    fn check(&self, team_id: Uuid) -> EngineResult<()> {
        if self.played < 0 || self.won + self.drawn + self.lost != self.played {
            return Err(CompetitionError::invariant(format!(
                "team {} has {} played but {}-{}-{} won/drawn/lost",
                team_id, self.played, self.won, self.drawn, self.lost
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMark {
    Win,
    Draw,
    Loss,
}

impl FormMark {
    fn letter(&self) -> char {
        match self {
            FormMark::Win => 'W',
            FormMark::Draw => 'D',
            FormMark::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Promotion,
    Relegation,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Promotion => "promotion",
            Zone::Relegation => "relegation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "promotion" => Some(Zone::Promotion),
            "relegation" => Some(Zone::Relegation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Same,
    New,
}

pub fn movement(position: i32, previous_position: Option<i32>) -> Movement {
    match previous_position {
        None => Movement::New,
        Some(prev) => match prev.cmp(&position) {
            Ordering::Greater => Movement::Up,
            Ordering::Less => Movement::Down,
            Ordering::Equal => Movement::Same,
        },
    }
}

/// Last persisted row of a team, used to carry previous positions forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousStanding {
    pub position: i32,
    pub previous_position: Option<i32>,
    pub record: Record,
    pub group_name: Option<String>,
}

impl From<&CompetitionStandingRow> for PreviousStanding {
    fn from(row: &CompetitionStandingRow) -> Self {
        PreviousStanding {
            position: row.position,
            previous_position: row.previous_position,
            record: Record {
                played: row.played,
                won: row.won,
                drawn: row.drawn,
                lost: row.lost,
                goals_for: row.goals_for,
                goals_against: row.goals_against,
                points: row.points,
            },
            group_name: row.group_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingLine {
    pub team_id: Uuid,
    pub team_name: String,
    pub group_name: Option<String>,
    pub position: i32,
    pub previous_position: Option<i32>,
    pub record: Record,
    pub form: String,
    pub zone: Option<Zone>,
    pub is_promoted: bool,
    pub is_relegated: bool,
}

impl StandingLine {
    pub fn movement(&self) -> Movement {
        movement(self.position, self.previous_position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsTable {
    pub group_name: Option<String>,
    pub lines: Vec<StandingLine>,
}

#[derive(Debug, Clone)]
pub struct Standings {
    pub tables: Vec<StandingsTable>,
    /// Overall record of every team passed in, whether it is listed or not.
    pub records: HashMap<Uuid, Record>,
}

/// A match that counts towards the table, reduced to what the table needs.
#[derive(Debug, Clone, Copy)]
struct Counted {
    home: Uuid,
    away: Uuid,
    home_goals: i32,
    away_goals: i32,
    winner: Option<Uuid>,
}

impl Counted {
    fn between(&self, teams: &HashSet<Uuid>) -> bool {
        teams.contains(&self.home) && teams.contains(&self.away)
    }

    fn marks(&self) -> (FormMark, FormMark) {
        match self.winner {
            Some(w) if w == self.home => (FormMark::Win, FormMark::Loss),
            Some(_) => (FormMark::Loss, FormMark::Win),
            None => (FormMark::Draw, FormMark::Draw),
        }
    }
}

fn counted_matches(matches: &[MatchRow]) -> EngineResult<Vec<Counted>> {
    let mut ordered: Vec<&MatchRow> = matches.iter().collect();
    ordered.sort_by(|a, b| {
        a.scheduled_date_time
            .cmp(&b.scheduled_date_time)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut counted = Vec::new();
    for row in ordered {
        let c = match MatchOutcome::from_row(row)? {
            MatchOutcome::HomeWin(s) => Counted {
                home: s.home,
                away: s.away,
                home_goals: s.home_score,
                away_goals: s.away_score,
                winner: Some(s.home),
            },
            MatchOutcome::AwayWin(s) => Counted {
                home: s.home,
                away: s.away,
                home_goals: s.home_score,
                away_goals: s.away_score,
                winner: Some(s.away),
            },
            MatchOutcome::Draw(s) => Counted {
                home: s.home,
                away: s.away,
                home_goals: s.home_score,
                away_goals: s.away_score,
                winner: None,
            },
            MatchOutcome::Walkover {
                winner,
                loser,
                winner_score,
                loser_score,
            } => Counted {
                home: winner,
                away: loser,
                home_goals: winner_score,
                away_goals: loser_score,
                winner: Some(winner),
            },
            MatchOutcome::Void | MatchOutcome::Bye { .. } | MatchOutcome::Unresolved => continue,
        };
        counted.push(c);
    }
    Ok(counted)
}

#[derive(Debug, Default, Clone)]
struct Tally {
    record: Record,
    form: Vec<char>,
}

fn tally<'a>(
    counted: impl Iterator<Item = &'a Counted>,
    rules: &StandingsRules,
) -> HashMap<Uuid, Tally> {
    let mut out: HashMap<Uuid, Tally> = HashMap::new();
    for c in counted {
        let (home_mark, away_mark) = c.marks();
        let home = out.entry(c.home).or_default();
        home.record.add(c.home_goals, c.away_goals, home_mark, rules);
        home.form.push(home_mark.letter());
        let away = out.entry(c.away).or_default();
        away.record.add(c.away_goals, c.home_goals, away_mark, rules);
        away.form.push(away_mark.letter());
    }
    out
}

/// Head-to-head sort key (points, goal difference, goals for) of each team
/// among the teams it is level with on points.
fn head_to_head_keys(
    teams: &[&TeamEntry],
    tallies: &HashMap<Uuid, Tally>,
    counted: &[Counted],
    rules: &StandingsRules,
) -> HashMap<Uuid, (i32, i32, i32)> {
    let mut blocks: HashMap<i32, HashSet<Uuid>> = HashMap::new();
    for t in teams {
        let points = tallies.get(&t.id).map(|x| x.record.points).unwrap_or(0);
        blocks.entry(points).or_default().insert(t.id);
    }

    let mut keys = HashMap::new();
    for block in blocks.values().filter(|b| b.len() > 1) {
        let mini = tally(counted.iter().filter(|c| c.between(block)), rules);
        for id in block {
            let r = mini.get(id).map(|t| t.record).unwrap_or_default();
            keys.insert(*id, (r.points, r.goal_difference(), r.goals_for));
        }
    }
    keys
}

fn rank_table(
    group_name: Option<String>,
    teams: Vec<&TeamEntry>,
    counted: &[Counted],
    previous: &HashMap<Uuid, PreviousStanding>,
    rules: &StandingsRules,
) -> StandingsTable {
    let members: HashSet<Uuid> = teams.iter().map(|t| t.id).collect();
    let tallies = tally(counted.iter().filter(|c| c.between(&members)), rules);

    let listed: Vec<&TeamEntry> = teams
        .into_iter()
        .filter(|t| match t.status {
            TeamStatus::Registered => false,
            s if s.has_left() => tallies.get(&t.id).is_some_and(|x| x.record.played > 0),
            _ => true,
        })
        .collect();

    let h2h = if rules.head_to_head {
        head_to_head_keys(&listed, &tallies, counted, rules)
    } else {
        HashMap::new()
    };

    let record_of = |id: &Uuid| tallies.get(id).map(|t| t.record).unwrap_or_default();
    let h2h_of = |id: &Uuid| h2h.get(id).copied().unwrap_or_default();

    let mut sorted = listed;
    sorted.sort_by(|a, b| {
        let (ra, rb) = (record_of(&a.id), record_of(&b.id));
        rb.points
            .cmp(&ra.points)
            .then_with(|| h2h_of(&b.id).cmp(&h2h_of(&a.id)))
            .then_with(|| rb.goal_difference().cmp(&ra.goal_difference()))
            .then_with(|| rb.goals_for.cmp(&ra.goals_for))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    let size = sorted.len() as i64;
    let lines = sorted
        .into_iter()
        .enumerate()
        .map(|(i, team)| {
            let position = i as i32 + 1;
            let record = record_of(&team.id);
            let form: String = tallies
                .get(&team.id)
                .map(|t| {
                    let skip = t.form.len().saturating_sub(rules.form_length);
                    t.form[skip..].iter().collect()
                })
                .unwrap_or_default();

            let zone = if position <= rules.promotion_places {
                Some(Zone::Promotion)
            } else if rules.relegation_places > 0
                && i64::from(position) > size - i64::from(rules.relegation_places)
            {
                Some(Zone::Relegation)
            } else {
                None
            };

            // roll the previous position forward only when the row changed
            let previous_position = match previous.get(&team.id) {
                Some(prev)
                    if prev.position == position
                        && prev.record == record
                        && prev.group_name == group_name =>
                {
                    prev.previous_position
                }
                Some(prev) => Some(prev.position),
                None => None,
            };

            StandingLine {
                team_id: team.id,
                team_name: team.name.clone(),
                group_name: group_name.clone(),
                position,
                previous_position,
                record,
                form,
                zone,
                is_promoted: rules.finalised && zone == Some(Zone::Promotion),
                is_relegated: rules.finalised && zone == Some(Zone::Relegation),
            }
        })
        .collect();

    StandingsTable { group_name, lines }
}

/// Compute the table(s) of a competition.
///
/// `teams` is every team of the competition; which of them are listed is
/// decided here. With `group` set only that group's table is produced.
pub fn calculate(
    teams: &[TeamEntry],
    matches: &[MatchRow],
    previous: &HashMap<Uuid, PreviousStanding>,
    rules: &StandingsRules,
    group: Option<&str>,
) -> EngineResult<Standings> {
    let counted = counted_matches(matches)?;

    let known: HashSet<Uuid> = teams.iter().map(|t| t.id).collect();
    for c in &counted {
        for id in [c.home, c.away] {
            if !known.contains(&id) {
                return Err(CompetitionError::invariant(format!(
                    "a counted match references team {} outside the competition",
                    id
                )));
            }
        }
    }

    let overall = tally(counted.iter(), rules);
    let mut records = HashMap::with_capacity(teams.len());
    for team in teams {
        let record = overall.get(&team.id).map(|t| t.record).unwrap_or_default();
        record.check(team.id)?;
        records.insert(team.id, record);
    }

    let tables = match group {
        Some(g) => {
            let members: Vec<&TeamEntry> = teams
                .iter()
                .filter(|t| t.group_name.as_deref() == Some(g))
                .collect();
            vec![rank_table(Some(g.to_string()), members, &counted, previous, rules)]
        }
        None if rules.grouped => {
            let mut groups: BTreeMap<Option<String>, Vec<&TeamEntry>> = BTreeMap::new();
            for t in teams {
                groups.entry(t.group_name.clone()).or_default().push(t);
            }
            groups
                .into_iter()
                .map(|(name, members)| rank_table(name, members, &counted, previous, rules))
                .collect()
        }
        None => vec![rank_table(None, teams.iter().collect(), &counted, previous, rules)],
    };

    Ok(Standings { tables, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::outcome::tests::{played, scheduled};
    use chrono::{Duration, Utc};
    use infra::repos::{MatchResult, MatchStatus};

    fn rules() -> StandingsRules {
        StandingsRules {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            head_to_head: false,
            promotion_places: 0,
            relegation_places: 0,
            form_length: 5,
            finalised: false,
            grouped: false,
        }
    }

    fn team(name: &str) -> TeamEntry {
        TeamEntry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            group_name: None,
            status: TeamStatus::Active,
        }
    }

    fn game(home: &TeamEntry, away: &TeamEntry, h: i32, a: i32, day: i64) -> MatchRow {
        let mut row = played(home.id, away.id, h, a);
        row.scheduled_date_time = Utc::now() + Duration::days(day);
        row
    }

    fn as_previous(table: &StandingsTable) -> HashMap<Uuid, PreviousStanding> {
        table
            .lines
            .iter()
            .map(|l| {
                (
                    l.team_id,
                    PreviousStanding {
                        position: l.position,
                        previous_position: l.previous_position,
                        record: l.record,
                        group_name: l.group_name.clone(),
                    },
                )
            })
            .collect()
    }

    fn names(table: &StandingsTable) -> Vec<String> {
        table.lines.iter().map(|l| l.team_name.clone()).collect()
    }

    #[test]
    fn home_win_updates_both_records() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];
        let s = calculate(&teams, &[game(&a, &b, 3, 1, 0)], &HashMap::new(), &rules(), None)
            .unwrap();

        let home = s.records[&a.id];
        assert_eq!(
            (home.played, home.won, home.goals_for, home.goals_against, home.points),
            (1, 1, 3, 1, 3)
        );
        let away = s.records[&b.id];
        assert_eq!((away.played, away.lost, away.points), (1, 1, 0));

        let table = &s.tables[0];
        assert_eq!(names(table), vec!["Alpha", "Bravo"]);
        assert_eq!(table.lines[0].record.goal_difference(), 2);
    }

    #[test]
    fn points_follow_the_competition_rules() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];
        let custom = StandingsRules {
            points_for_win: 2,
            points_for_draw: 1,
            points_for_loss: 1,
            ..rules()
        };
        let matches = vec![game(&a, &b, 1, 0, 0), game(&b, &a, 2, 2, 1)];
        let s = calculate(&teams, &matches, &HashMap::new(), &custom, None).unwrap();
        assert_eq!(s.records[&a.id].points, 3);
        assert_eq!(s.records[&b.id].points, 2);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let (a, b, c, d) = (team("Alpha"), team("Bravo"), team("Charlie"), team("Delta"));
        let teams = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let matches = vec![
            game(&a, &b, 2, 0, 0),
            game(&c, &d, 1, 1, 0),
            game(&a, &c, 0, 1, 7),
            game(&b, &d, 3, 2, 7),
        ];

        let first = calculate(&teams, &matches, &HashMap::new(), &rules(), None).unwrap();
        let prev = as_previous(&first.tables[0]);
        let second = calculate(&teams, &matches, &prev, &rules(), None).unwrap();
        let third = calculate(&teams, &matches, &as_previous(&second.tables[0]), &rules(), None)
            .unwrap();

        assert_eq!(second.tables, third.tables);
        assert_eq!(names(&first.tables[0]), names(&second.tables[0]));
    }

    #[test]
    fn level_teams_are_ordered_by_name() {
        let (a, b) = (team("Zulu"), team("Mike"));
        let (c, d) = (team("Xray"), team("Kilo"));
        let matches = vec![game(&a, &c, 1, 0, 0), game(&b, &d, 1, 0, 0)];

        let forward = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let reversed: Vec<TeamEntry> = forward.iter().rev().cloned().collect();

        let s1 = calculate(&forward, &matches, &HashMap::new(), &rules(), None).unwrap();
        let s2 = calculate(&reversed, &matches, &HashMap::new(), &rules(), None).unwrap();

        assert_eq!(names(&s1.tables[0]), vec!["Mike", "Zulu", "Kilo", "Xray"]);
        assert_eq!(names(&s1.tables[0]), names(&s2.tables[0]));
    }

    #[test]
    fn goal_difference_then_goals_for() {
        let (a, b, c, d) = (team("A"), team("B"), team("C"), team("D"));
        let teams = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let matches = vec![
            game(&a, &d, 2, 1, 0), // A: +1, 2 scored
            game(&b, &d, 3, 2, 1), // B: +1, 3 scored
            game(&c, &d, 4, 0, 2), // C: +4
        ];
        let s = calculate(&teams, &matches, &HashMap::new(), &rules(), None).unwrap();
        assert_eq!(names(&s.tables[0]), vec!["C", "B", "A", "D"]);
    }

    #[test]
    fn head_to_head_breaks_level_points_when_enabled() {
        let (a, b, c, d) = (team("Alpha"), team("Bravo"), team("Charlie"), team("Delta"));
        let teams = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        // Alpha and Bravo finish level on 3 points. Alpha has the better goal
        // difference but lost the meeting between them.
        let matches = vec![
            game(&b, &a, 1, 0, 0),
            game(&a, &c, 5, 0, 1),
            game(&d, &b, 1, 0, 2),
            game(&c, &d, 1, 1, 3),
        ];

        let plain = calculate(&teams, &matches, &HashMap::new(), &rules(), None).unwrap();
        assert_eq!(names(&plain.tables[0]), vec!["Delta", "Alpha", "Bravo", "Charlie"]);

        let h2h_rules = StandingsRules {
            head_to_head: true,
            ..rules()
        };
        let h2h = calculate(&teams, &matches, &HashMap::new(), &h2h_rules, None).unwrap();
        assert_eq!(names(&h2h.tables[0]), vec!["Delta", "Bravo", "Alpha", "Charlie"]);
    }

    #[test]
    fn unplayed_void_and_bye_matches_do_not_count() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];

        let mut voided = game(&a, &b, 4, 0, 0);
        voided.result = MatchResult::Void;
        let mut cancelled = scheduled(a.id, b.id);
        cancelled.status = MatchStatus::Cancelled;
        let mut bye = scheduled(a.id, b.id);
        bye.status = MatchStatus::Bye;
        bye.away_team_id = None;

        let s = calculate(
            &teams,
            &[voided, cancelled, bye, scheduled(b.id, a.id)],
            &HashMap::new(),
            &rules(),
            None,
        )
        .unwrap();
        assert_eq!(s.records[&a.id], Record::default());
        assert_eq!(s.tables[0].lines.len(), 2);
    }

    #[test]
    fn walkovers_count_as_wins() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];
        let mut row = scheduled(a.id, b.id);
        row.status = MatchStatus::Walkover;
        row.result = MatchResult::AwayWalkover;
        row.home_score = Some(0);
        row.away_score = Some(3);

        let s = calculate(&teams, &[row], &HashMap::new(), &rules(), None).unwrap();
        assert_eq!(s.records[&b.id].won, 1);
        assert_eq!(s.records[&b.id].goals_for, 3);
        assert_eq!(s.records[&a.id].lost, 1);
    }

    #[test]
    fn withdrawn_and_unapproved_teams() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let mut gone = team("Gone");
        gone.status = TeamStatus::Withdrawn;
        let mut played_then_left = team("Left");
        played_then_left.status = TeamStatus::Withdrawn;
        let mut pending = team("Pending");
        pending.status = TeamStatus::Registered;

        let teams = vec![
            a.clone(),
            b.clone(),
            gone.clone(),
            played_then_left.clone(),
            pending,
        ];
        let matches = vec![game(&a, &played_then_left, 1, 0, 0)];
        let s = calculate(&teams, &matches, &HashMap::new(), &rules(), None).unwrap();

        let listed = names(&s.tables[0]);
        assert!(listed.contains(&"Left".to_string()));
        assert!(!listed.contains(&"Gone".to_string()));
        assert!(!listed.contains(&"Pending".to_string()));
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn form_keeps_the_latest_results_oldest_first() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];
        let scores = [(1, 0), (0, 0), (0, 2), (3, 1), (2, 2), (1, 0)];
        let matches: Vec<MatchRow> = scores
            .iter()
            .enumerate()
            .map(|(i, (h, aw))| game(&a, &b, *h, *aw, i as i64))
            .collect();

        let s = calculate(&teams, &matches, &HashMap::new(), &rules(), None).unwrap();
        let alpha = s.tables[0].lines.iter().find(|l| l.team_id == a.id).unwrap();
        assert_eq!(alpha.form, "DLWDW");
    }

    #[test]
    fn zones_and_final_flags() {
        let teams: Vec<TeamEntry> = ["A", "B", "C", "D"].iter().map(|n| team(n)).collect();
        let matches = vec![
            game(&teams[0], &teams[3], 3, 0, 0),
            game(&teams[1], &teams[2], 2, 0, 0),
        ];
        let zoned = StandingsRules {
            promotion_places: 1,
            relegation_places: 1,
            ..rules()
        };

        let live = calculate(&teams, &matches, &HashMap::new(), &zoned, None).unwrap();
        let lines = &live.tables[0].lines;
        assert_eq!(lines[0].zone, Some(Zone::Promotion));
        assert_eq!(lines[3].zone, Some(Zone::Relegation));
        assert!(!lines[0].is_promoted);

        let done = calculate(
            &teams,
            &matches,
            &HashMap::new(),
            &StandingsRules {
                finalised: true,
                ..zoned
            },
            None,
        )
        .unwrap();
        assert!(done.tables[0].lines[0].is_promoted);
        assert!(done.tables[0].lines[3].is_relegated);
    }

    #[test]
    fn movement_tracks_the_last_change() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let teams = vec![a.clone(), b.clone()];
        let first = calculate(&teams, &[game(&a, &b, 1, 0, 0)], &HashMap::new(), &rules(), None)
            .unwrap();
        assert!(first.tables[0].lines.iter().all(|l| l.movement() == Movement::New));

        let more = vec![game(&a, &b, 1, 0, 0), game(&b, &a, 3, 0, 1), game(&b, &a, 1, 0, 2)];
        let second =
            calculate(&teams, &more, &as_previous(&first.tables[0]), &rules(), None).unwrap();
        let bravo = second.tables[0].lines.iter().find(|l| l.team_id == b.id).unwrap();
        assert_eq!(bravo.position, 1);
        assert_eq!(bravo.movement(), Movement::Up);
    }

    #[test]
    fn grouped_tables_restart_positions() {
        let mut teams: Vec<TeamEntry> = ["A1", "A2", "B1", "B2"].iter().map(|n| team(n)).collect();
        teams[0].group_name = Some("A".into());
        teams[1].group_name = Some("A".into());
        teams[2].group_name = Some("B".into());
        teams[3].group_name = Some("B".into());
        let matches = vec![
            game(&teams[0], &teams[1], 1, 0, 0),
            game(&teams[3], &teams[2], 2, 0, 0),
        ];
        let grouped = StandingsRules {
            grouped: true,
            ..rules()
        };

        let s = calculate(&teams, &matches, &HashMap::new(), &grouped, None).unwrap();
        assert_eq!(s.tables.len(), 2);
        assert_eq!(names(&s.tables[0]), vec!["A1", "A2"]);
        assert_eq!(names(&s.tables[1]), vec!["B2", "B1"]);
        assert_eq!(s.tables[1].lines[0].position, 1);

        let only_b = calculate(&teams, &matches, &HashMap::new(), &grouped, Some("B")).unwrap();
        assert_eq!(only_b.tables.len(), 1);
        assert_eq!(only_b.tables[0].group_name.as_deref(), Some("B"));
    }

    #[test]
    fn matches_against_unknown_teams_are_invariant_violations() {
        let (a, b) = (team("Alpha"), team("Bravo"));
        let stranger = team("Stranger");
        let err = calculate(
            &[a.clone(), b],
            &[game(&a, &stranger, 1, 0, 0)],
            &HashMap::new(),
            &rules(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CompetitionError::Invariant(_)));
    }
}
