use async_graphql::{Context, Error, ErrorExtensions, Result};
use uuid::Uuid;

use crate::auth::Claims;
use crate::gql::common::types::Role;
use crate::state::AppState;

/// The verified identity behind a mutation.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

fn denied(message: impl Into<String>, code: &'static str) -> Error {
    Error::new(message.into()).extend_with(|_, ext| ext.set("code", code))
}

/// Every mutation needs a bearer token.
pub fn require_auth(ctx: &Context<'_>) -> Result<Caller> {
    let claims = ctx
        .data::<Claims>()
        .map_err(|_| denied("You must be logged in to perform this action", "UNAUTHENTICATED"))?;

    let user_id = claims
        .user_id()
        .map_err(|e| denied(format!("Invalid user ID: {}", e), "UNAUTHENTICATED"))?;

    Ok(Caller {
        user_id,
        role: Role::from(claims.role.as_str()),
    })
}

/// Check that the caller organises competitions for `club_id`.
/// Admins can manage any club.
pub async fn require_club_manager(ctx: &Context<'_>, club_id: Uuid) -> Result<Caller> {
    let caller = require_auth(ctx)?;
    if caller.role == Role::Admin {
        return Ok(caller);
    }

    let state = ctx.data::<AppState>()?;
    let is_manager =
        infra::repos::club_managers::is_club_manager(&state.db, caller.user_id, club_id)
            .await
            .map_err(|e| {
                tracing::error!("Database error while checking club manager: {e}");
                denied("Internal database error", "INTERNAL")
            })?;

    if !is_manager {
        return Err(denied(
            "Access denied: only administrators and managers of this club can perform this action",
            "FORBIDDEN",
        ));
    }

    Ok(caller)
}
