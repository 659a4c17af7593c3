use infra::models::MatchRow;
use infra::repos::{MatchResult, MatchStatus};
use uuid::Uuid;

use super::error::{CompetitionError, EngineResult};

/// How a result submission should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultKind {
    #[default]
    Normal,
    HomeWalkover,
    AwayWalkover,
    Void,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreEntry {
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub kind: ResultKind,
}

/// Columns written when a result is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedResult {
    pub status: MatchStatus,
    pub result: MatchResult,
    pub home_score: i32,
    pub away_score: i32,
}

/// Turn a submitted score into the status, result and scores to store.
pub fn resolve_result(
    entry: ScoreEntry,
    walkover_goals: i32,
    decisive_required: bool,
) -> EngineResult<ResolvedResult> {
    if entry.home_score.is_some_and(|s| s < 0) || entry.away_score.is_some_and(|s| s < 0) {
        return Err(CompetitionError::validation("scores must be zero or greater"));
    }

    match entry.kind {
        ResultKind::Normal => {
            let (Some(home), Some(away)) = (entry.home_score, entry.away_score) else {
                return Err(CompetitionError::validation(
                    "both homeScore and awayScore are required",
                ));
            };
            let result = match home.cmp(&away) {
                std::cmp::Ordering::Greater => MatchResult::HomeWin,
                std::cmp::Ordering::Less => MatchResult::AwayWin,
                std::cmp::Ordering::Equal if decisive_required => {
                    return Err(CompetitionError::validation(
                        "knockout matches need a winner; record a decisive score or a walkover",
                    ))
                }
                std::cmp::Ordering::Equal => MatchResult::Draw,
            };
            Ok(ResolvedResult {
                status: MatchStatus::Completed,
                result,
                home_score: home,
                away_score: away,
            })
        }
        ResultKind::HomeWalkover | ResultKind::AwayWalkover => {
            let home_wins = entry.kind == ResultKind::HomeWalkover;
            let (default_home, default_away) = if home_wins {
                (walkover_goals, 0)
            } else {
                (0, walkover_goals)
            };
            let home = entry.home_score.unwrap_or(default_home);
            let away = entry.away_score.unwrap_or(default_away);
            if (home_wins && home <= away) || (!home_wins && away <= home) {
                return Err(CompetitionError::validation(
                    "a walkover score must favour the team awarded the walkover",
                ));
            }
            Ok(ResolvedResult {
                status: MatchStatus::Walkover,
                result: if home_wins {
                    MatchResult::HomeWalkover
                } else {
                    MatchResult::AwayWalkover
                },
                home_score: home,
                away_score: away,
            })
        }
        ResultKind::Void => Ok(ResolvedResult {
            status: MatchStatus::Completed,
            result: MatchResult::Void,
            home_score: entry.home_score.unwrap_or(0),
            away_score: entry.away_score.unwrap_or(0),
        }),
    }
}

/// What a stored match means for tables and brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    HomeWin(Score),
    AwayWin(Score),
    Draw(Score),
    Walkover {
        winner: Uuid,
        loser: Uuid,
        winner_score: i32,
        loser_score: i32,
    },
    Void,
    Bye {
        team: Option<Uuid>,
    },
    /// Not played, or ended without a result (cancelled, abandoned, disputed).
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: Uuid,
    pub away: Uuid,
    pub home_score: i32,
    pub away_score: i32,
}

impl MatchOutcome {
    pub fn from_row(row: &MatchRow) -> EngineResult<Self> {
        match row.status {
            MatchStatus::Bye => {
                return Ok(MatchOutcome::Bye {
                    team: row.home_team_id.or(row.away_team_id),
                })
            }
            MatchStatus::Completed | MatchStatus::Walkover => {}
            _ => return Ok(MatchOutcome::Unresolved),
        }

        if row.result == MatchResult::Void {
            return Ok(MatchOutcome::Void);
        }

        let broken = |reason: &str| {
            CompetitionError::invariant(format!("match {} {}", row.id, reason))
        };

        let (Some(home), Some(away)) = (row.home_team_id, row.away_team_id) else {
            return Err(broken("has a result but is missing a team"));
        };
        let (Some(home_score), Some(away_score)) = (row.home_score, row.away_score) else {
            return Err(broken("has a result but no score"));
        };
        if home_score < 0 || away_score < 0 {
            return Err(broken("has a negative score"));
        }
        let score = Score {
            home,
            away,
            home_score,
            away_score,
        };

        match row.result {
            MatchResult::HomeWin if home_score > away_score => Ok(MatchOutcome::HomeWin(score)),
            MatchResult::AwayWin if away_score > home_score => Ok(MatchOutcome::AwayWin(score)),
            MatchResult::Draw if home_score == away_score => Ok(MatchOutcome::Draw(score)),
            MatchResult::HomeWalkover => Ok(MatchOutcome::Walkover {
                winner: home,
                loser: away,
                winner_score: home_score,
                loser_score: away_score,
            }),
            MatchResult::AwayWalkover => Ok(MatchOutcome::Walkover {
                winner: away,
                loser: home,
                winner_score: away_score,
                loser_score: home_score,
            }),
            MatchResult::NotPlayed => Err(broken("is finished but marked not played")),
            other => Err(broken(&format!(
                "is recorded as {} with a score of {}-{}",
                other.as_str(),
                home_score,
                away_score
            ))),
        }
    }

    pub fn winner(&self) -> Option<Uuid> {
        match self {
            MatchOutcome::HomeWin(s) => Some(s.home),
            MatchOutcome::AwayWin(s) => Some(s.away),
            MatchOutcome::Walkover { winner, .. } => Some(*winner),
            MatchOutcome::Bye { team } => *team,
            MatchOutcome::Draw(_) | MatchOutcome::Void | MatchOutcome::Unresolved => None,
        }
    }

    pub fn loser(&self) -> Option<Uuid> {
        match self {
            MatchOutcome::HomeWin(s) => Some(s.away),
            MatchOutcome::AwayWin(s) => Some(s.home),
            MatchOutcome::Walkover { loser, .. } => Some(*loser),
            _ => None,
        }
    }
}
