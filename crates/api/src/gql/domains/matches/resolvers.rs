use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::engine::outcome::ScoreEntry;
use crate::gql::common::helpers::{parse_id, require_competition_manager, require_scope_manager, Scope};
use crate::gql::common::types::PaginationInput;
use crate::gql::error::EngineResultExt;
use crate::state::AppState;
use infra::repos::{match_events, match_lineups, matches, CreateLineupEntry, CreateMatchEvent, MatchFilter};

use super::service::{self, NewMatch, StatusChange};
use super::types::{
    AddMatchEventInput, CancelMatchInput, CreateMatchInput, LineupEntryInput, Match, MatchEvent,
    MatchFilterInput, MatchLineupEntry, PostponeMatchInput, RecordResultInput,
    RescheduleMatchInput, UpdateMatchInput, Venue,
};

fn parse_optional(id: Option<&ID>, entity: &str) -> Result<Option<Uuid>> {
    id.map(|id| parse_id(id, entity)).transpose()
}

#[derive(Default)]
pub struct MatchQuery;

#[Object]
impl MatchQuery {
    #[graphql(name = "match")]
    async fn match_by_id(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Match>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "match")?;
        let row = matches::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(Match::from))
    }

    /// Fixtures ordered by kick-off.
    async fn matches(
        &self,
        ctx: &Context<'_>,
        filter: Option<MatchFilterInput>,
        pagination: Option<PaginationInput>,
    ) -> Result<Vec<Match>> {
        let state = ctx.data::<AppState>()?;
        let filter = filter.unwrap_or_default();
        let filter = MatchFilter {
            competition_id: parse_optional(filter.competition_id.as_ref(), "competition")?,
            round_id: parse_optional(filter.round_id.as_ref(), "round")?,
            team_id: parse_optional(filter.team_id.as_ref(), "team")?,
            status: filter.status.map(Into::into),
            from: filter.from,
            to: filter.to,
        };
        let page = pagination.unwrap_or_default().to_limit_offset();

        let rows = matches::list(&state.db, &filter, Some(page)).await.into_gql()?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn match_events(&self, ctx: &Context<'_>, match_id: ID) -> Result<Vec<MatchEvent>> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&match_id, "match")?;
        let rows = match_events::list_by_match(&state.db, match_id).await.into_gql()?;
        Ok(rows.into_iter().map(MatchEvent::from).collect())
    }

    async fn match_lineup(&self, ctx: &Context<'_>, match_id: ID) -> Result<Vec<MatchLineupEntry>> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&match_id, "match")?;
        let rows = match_lineups::list_by_match(&state.db, match_id).await.into_gql()?;
        Ok(rows.into_iter().map(MatchLineupEntry::from).collect())
    }

    /// Venues a club can host fixtures at.
    async fn venues(&self, ctx: &Context<'_>, club_id: ID) -> Result<Vec<Venue>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&club_id, "club")?;
        let profiles = state.venues().list_for_club(club_id).await.into_gql()?;
        Ok(profiles.into_iter().map(Venue::from).collect())
    }
}

#[derive(Default)]
pub struct MatchMutation;

impl MatchMutation {
    async fn change_status(&self, ctx: &Context<'_>, match_id: &ID, change: StatusChange) -> Result<Match> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(match_id, "match")?;
        require_scope_manager(ctx, Scope::Match(match_id)).await?;

        let row = service::change_match_status(&state.db, &state.config, state.notifier(), match_id, change)
            .await
            .into_gql()?;
        Ok(row.into())
    }
}

#[Object]
impl MatchMutation {
    async fn create_match(&self, ctx: &Context<'_>, input: CreateMatchInput) -> Result<Match> {
        let state = ctx.data::<AppState>()?;
        let competition_id = parse_id(&input.competition_id, "competition")?;
        require_competition_manager(ctx, competition_id).await?;

        let data = NewMatch {
            competition_id,
            round_id: parse_optional(input.round_id.as_ref(), "round")?,
            home_team_id: parse_id(&input.home_team_id, "team")?,
            away_team_id: parse_id(&input.away_team_id, "team")?,
            scheduled_date_time: input.scheduled_date_time,
            venue_id: parse_optional(input.venue_id.as_ref(), "venue")?,
            group_name: input.group_name,
        };
        let row = service::create_match(&state.db, state.venues(), data)
            .await
            .into_gql()?;
        Ok(row.into())
    }

    async fn update_match(&self, ctx: &Context<'_>, id: ID, input: UpdateMatchInput) -> Result<Match> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "match")?;
        require_scope_manager(ctx, Scope::Match(id)).await?;

        let venue_id = parse_optional(input.venue_id.as_ref(), "venue")?;
        let row = service::update_match(&state.db, state.venues(), id, venue_id, input.notes)
            .await
            .into_gql()?;
        Ok(row.into())
    }

    async fn delete_match(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "match")?;
        require_scope_manager(ctx, Scope::Match(id)).await?;

        service::delete_match(&state.db, id).await.into_gql()
    }

    async fn confirm_match(&self, ctx: &Context<'_>, id: ID) -> Result<Match> {
        self.change_status(ctx, &id, StatusChange::Confirm).await
    }

    async fn start_match(&self, ctx: &Context<'_>, id: ID) -> Result<Match> {
        self.change_status(ctx, &id, StatusChange::Start).await
    }

    async fn postpone_match(&self, ctx: &Context<'_>, input: PostponeMatchInput) -> Result<Match> {
        let change = StatusChange::Postpone {
            reason: input.reason,
            new_date_time: input.new_date_time,
        };
        self.change_status(ctx, &input.match_id, change).await
    }

    async fn reschedule_match(&self, ctx: &Context<'_>, input: RescheduleMatchInput) -> Result<Match> {
        let change = StatusChange::Reschedule {
            at: input.scheduled_date_time,
        };
        self.change_status(ctx, &input.match_id, change).await
    }

    async fn cancel_match(&self, ctx: &Context<'_>, input: CancelMatchInput) -> Result<Match> {
        let change = StatusChange::Cancel {
            reason: input.reason,
        };
        self.change_status(ctx, &input.match_id, change).await
    }

    async fn abandon_match(&self, ctx: &Context<'_>, id: ID) -> Result<Match> {
        self.change_status(ctx, &id, StatusChange::Abandon).await
    }

    async fn dispute_match(&self, ctx: &Context<'_>, id: ID) -> Result<Match> {
        self.change_status(ctx, &id, StatusChange::Dispute).await
    }

    async fn record_result(&self, ctx: &Context<'_>, input: RecordResultInput) -> Result<Match> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&input.match_id, "match")?;
        require_scope_manager(ctx, Scope::Match(match_id)).await?;

        let entry = ScoreEntry {
            home_score: input.home_score,
            away_score: input.away_score,
            kind: input.outcome.into(),
        };
        let row = service::record_result(
            &state.db,
            &state.config,
            state.notifier(),
            match_id,
            entry,
            input.notes,
        )
        .await
        .into_gql()?;
        Ok(row.into())
    }

    async fn add_match_event(&self, ctx: &Context<'_>, input: AddMatchEventInput) -> Result<MatchEvent> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&input.match_id, "match")?;
        require_scope_manager(ctx, Scope::Match(match_id)).await?;

        let data = CreateMatchEvent {
            match_id,
            event_type: input.event_type.into(),
            minute: input.minute,
            participant_id: parse_optional(input.participant_id.as_ref(), "participant")?,
            team_id: parse_id(&input.team_id, "team")?,
            assist_participant_id: parse_optional(input.assist_participant_id.as_ref(), "participant")?,
            notes: input.notes,
        };
        let event = service::add_match_event(&state.db, data).await.into_gql()?;
        Ok(event.into())
    }

    async fn delete_match_event(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "match event")?;
        let event = match_events::get_by_id(&state.db, id).await.into_gql()?;
        let Some(event) = event else {
            return Ok(false);
        };
        require_scope_manager(ctx, Scope::Match(event.match_id)).await?;

        service::delete_match_event(&state.db, id).await.into_gql()
    }

    async fn set_lineup_entry(&self, ctx: &Context<'_>, input: LineupEntryInput) -> Result<MatchLineupEntry> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&input.match_id, "match")?;
        require_scope_manager(ctx, Scope::Match(match_id)).await?;

        let data = CreateLineupEntry {
            match_id,
            team_id: parse_id(&input.team_id, "team")?,
            participant_id: parse_id(&input.participant_id, "participant")?,
            is_starting: input.is_starting,
            shirt_number: input.shirt_number,
            minutes_played: input.minutes_played,
        };
        let entry = service::set_lineup_entry(&state.db, data).await.into_gql()?;
        Ok(entry.into())
    }

    async fn remove_lineup_entry(
        &self,
        ctx: &Context<'_>,
        match_id: ID,
        participant_id: ID,
    ) -> Result<MatchLineupEntry> {
        let state = ctx.data::<AppState>()?;
        let match_id = parse_id(&match_id, "match")?;
        let participant_id = parse_id(&participant_id, "participant")?;
        require_scope_manager(ctx, Scope::Match(match_id)).await?;

        let removed = service::remove_lineup_entry(&state.db, match_id, participant_id)
            .await
            .into_gql()?;
        Ok(removed.into())
    }
}
