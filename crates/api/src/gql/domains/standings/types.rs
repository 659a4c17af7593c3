use async_graphql::{Enum, SimpleObject, ID};

use crate::engine::standings::{self, StandingLine, StandingsTable};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum Movement {
    Up,
    Down,
    Same,
    New,
}

impl From<standings::Movement> for Movement {
    fn from(m: standings::Movement) -> Self {
        match m {
            standings::Movement::Up => Movement::Up,
            standings::Movement::Down => Movement::Down,
            standings::Movement::Same => Movement::Same,
            standings::Movement::New => Movement::New,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StandingZone {
    Promotion,
    Relegation,
}

impl From<standings::Zone> for StandingZone {
    fn from(z: standings::Zone) -> Self {
        match z {
            standings::Zone::Promotion => StandingZone::Promotion,
            standings::Zone::Relegation => StandingZone::Relegation,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct Standing {
    pub team_id: ID,
    pub team_name: String,
    pub group_name: Option<String>,
    pub position: i32,
    pub previous_position: Option<i32>,
    pub movement: Movement,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    /// Last results, oldest first, e.g. "WWDLW".
    pub form: String,
    pub zone: Option<StandingZone>,
    pub is_promoted: bool,
    pub is_relegated: bool,
}

impl From<&StandingLine> for Standing {
    fn from(line: &StandingLine) -> Self {
        Self {
            team_id: line.team_id.into(),
            team_name: line.team_name.clone(),
            group_name: line.group_name.clone(),
            position: line.position,
            previous_position: line.previous_position,
            movement: line.movement().into(),
            played: line.record.played,
            won: line.record.won,
            drawn: line.record.drawn,
            lost: line.record.lost,
            goals_for: line.record.goals_for,
            goals_against: line.record.goals_against,
            goal_difference: line.record.goal_difference(),
            points: line.record.points,
            form: line.form.clone(),
            zone: line.zone.map(Into::into),
            is_promoted: line.is_promoted,
            is_relegated: line.is_relegated,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct StandingsGroup {
    pub group_name: Option<String>,
    pub standings: Vec<Standing>,
}

impl From<&StandingsTable> for StandingsGroup {
    fn from(table: &StandingsTable) -> Self {
        Self {
            group_name: table.group_name.clone(),
            standings: table.lines.iter().map(Standing::from).collect(),
        }
    }
}
