use sqlx::PgConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::lifecycle;
use crate::engine::scorers::tally_participants;
use crate::engine::{CompetitionError, EngineResult};
use crate::gql::domains::competitions::service::lock_competition;
use crate::services::MemberDirectory;
use infra::models::CompetitionParticipantRow;
use infra::repos::{
    competition_participants, competition_teams, match_events, match_lineups, CreateParticipant,
    ParticipantRole, ParticipantTotals,
};

pub(crate) fn check_shirt_number(shirt: Option<i32>) -> EngineResult<()> {
    match shirt {
        Some(n) if !(1..=99).contains(&n) => Err(CompetitionError::validation(format!(
            "shirt numbers run from 1 to 99, got {}",
            n
        ))),
        _ => Ok(()),
    }
}

async fn check_shirt_free(conn: &mut PgConnection, team_id: Uuid, shirt: i32) -> EngineResult<()> {
    if competition_participants::shirt_taken(&mut *conn, team_id, shirt).await? {
        return Err(CompetitionError::validation(format!(
            "shirt number {} is already worn in this team",
            shirt
        )));
    }
    Ok(())
}

async fn load(conn: &mut PgConnection, id: Uuid) -> EngineResult<CompetitionParticipantRow> {
    competition_participants::get_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("participant", id))
}

/// Enrol a club member in a team.
///
/// The member is resolved through the directory before the transaction opens;
/// eligibility is the directory's answer at that moment.
pub async fn add_participant(
    pool: &sqlx::PgPool,
    members: &dyn MemberDirectory,
    team_id: Uuid,
    member_id: Uuid,
    role: ParticipantRole,
    shirt_number: Option<i32>,
    display_name: Option<String>,
) -> EngineResult<CompetitionParticipantRow> {
    check_shirt_number(shirt_number)?;
    let member = members
        .resolve(member_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("member", member_id))?;
    if !member.is_active {
        return Err(CompetitionError::validation(format!(
            "member {} is not active",
            member.display_name
        )));
    }

    let mut tx = pool.begin().await?;
    let team = competition_teams::get_by_id(&mut *tx, team_id)
        .await?
        .ok_or_else(|| CompetitionError::not_found("team", team_id))?;
    let competition = lock_competition(&mut tx, team.competition_id).await?;
    lifecycle::check_editable(&competition)?;

    if member.club_id != competition.club_id {
        return Err(CompetitionError::validation(
            "member belongs to a different club than the competition",
        ));
    }
    if team.status.has_left() {
        return Err(CompetitionError::validation(format!(
            "team {} is {} and cannot take new participants",
            team.name,
            team.status.as_str()
        )));
    }
    if competition_participants::member_registered(&mut *tx, competition.id, member_id).await? {
        return Err(CompetitionError::validation(format!(
            "{} is already registered with a team in this competition",
            member.display_name
        )));
    }
    if let Some(shirt) = shirt_number {
        check_shirt_free(&mut tx, team_id, shirt).await?;
    }

    let display_name = display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or(member.display_name);

    let participant = competition_participants::create(
        &mut *tx,
        CreateParticipant {
            competition_id: competition.id,
            team_id,
            member_id,
            display_name,
            role,
            shirt_number,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        competition_id = %participant.competition_id,
        team_id = %team_id,
        participant_id = %participant.id,
        "Participant added"
    );
    Ok(participant)
}

pub async fn update_participant(
    pool: &sqlx::PgPool,
    id: Uuid,
    role: Option<ParticipantRole>,
    shirt_number: Option<i32>,
    display_name: Option<String>,
) -> EngineResult<CompetitionParticipantRow> {
    check_shirt_number(shirt_number)?;
    if matches!(display_name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(CompetitionError::validation("display name must not be empty"));
    }

    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    let competition = lock_competition(&mut tx, current.competition_id).await?;
    lifecycle::check_editable(&competition)?;

    if let Some(shirt) = shirt_number.filter(|s| Some(*s) != current.shirt_number) {
        check_shirt_free(&mut tx, current.team_id, shirt).await?;
    }

    let updated = competition_participants::update(
        &mut *tx,
        id,
        role,
        shirt_number,
        display_name.map(|n| n.trim().to_string()),
    )
    .await?
    .ok_or_else(|| CompetitionError::not_found("participant", id))?;
    tx.commit().await?;

    Ok(updated)
}

/// Participants with recorded events or lineups stay for the record.
pub async fn remove_participant(pool: &sqlx::PgPool, id: Uuid) -> EngineResult<bool> {
    let mut tx = pool.begin().await?;
    let current = load(&mut tx, id).await?;
    lock_competition(&mut tx, current.competition_id).await?;

    if competition_participants::has_match_records(&mut *tx, id).await? {
        return Err(CompetitionError::conflict(format!(
            "{} has match events or lineups and cannot be removed",
            current.display_name
        )));
    }
    let deleted = competition_participants::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(participant_id = %id, "Participant removed");
    Ok(deleted)
}

/// Rewrite the per-participant stat columns from counted events and lineups.
pub(crate) async fn refresh_participant_stats(
    conn: &mut PgConnection,
    competition_id: Uuid,
) -> EngineResult<()> {
    let participants = competition_participants::list_by_competition(&mut *conn, competition_id).await?;
    let events = match_events::list_counted_by_competition(&mut *conn, competition_id).await?;
    let lineups = match_lineups::list_counted_by_competition(&mut *conn, competition_id).await?;

    let tallies = tally_participants(&participants, &events, &lineups)?;
    let mut changed = 0;
    for (row, tally) in participants.iter().zip(&tallies) {
        let totals = tally.totals();
        let stored = ParticipantTotals {
            appearances: row.appearances,
            goals: row.goals,
            assists: row.assists,
            yellow_cards: row.yellow_cards,
            red_cards: row.red_cards,
        };
        if totals != stored {
            competition_participants::set_totals(&mut *conn, row.id, totals).await?;
            changed += 1;
        }
    }

    debug!(%competition_id, changed, "Participant statistics refreshed");
    Ok(())
}
