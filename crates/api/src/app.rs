use std::time::Duration;

use async_graphql::{ObjectType, Schema, SubscriptionType};
use async_graphql_axum::{GraphQLProtocol, GraphQLWebSocket};
use axum::{
    extract::{Request, State, WebSocketUpgrade},
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::Claims;
use crate::error::AppError;
use crate::middleware::jwt::jwt_middleware;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Router with the health check and the GraphQL endpoint (POST for queries
/// and mutations, GET upgrade for subscriptions).
pub fn build_router<Q, M, S>(state: AppState, schema: Schema<Q, M, S>) -> Router
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/graphql",
            axum::routing::post({
                let schema = schema.clone();
                move |state, req| graphql_handler(state, req, schema)
            })
            .get({
                let schema = schema.clone();
                move |state, protocol, upgrade| graphql_ws_handler(state, protocol, upgrade, schema)
            }),
        )
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, jwt_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".to_string());

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Runs a GraphQL request with the claims the JWT middleware attached.
async fn graphql_handler<Q, M, S>(
    State(state): State<AppState>,
    req: Request,
    schema: Schema<Q, M, S>,
) -> Result<Response, AppError>
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let claims = req.extensions().get::<Claims>().cloned();

    let (_parts, body) = req.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;

    let gql_request: async_graphql::Request = serde_json::from_slice(&body_bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid GraphQL request: {}", e)))?;

    let mut gql_request = gql_request.data(state);
    if let Some(claims) = claims {
        gql_request = gql_request.data(claims);
    }

    let gql_response = schema.execute(gql_request).await;
    Ok(Json(gql_response).into_response())
}

/// Subscriptions authenticate through the `connection_init` payload:
/// `{ headers: { Authorization: "Bearer <token>" } }`.
async fn graphql_ws_handler<Q, M, S>(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
    schema: Schema<Q, M, S>,
) -> Response
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let jwt_service = state.jwt_service().clone();

    upgrade
        .protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |value: serde_json::Value| async move {
                    let mut data = async_graphql::Data::default();

                    let token = value
                        .get("headers")
                        .and_then(|h| h.get("Authorization"))
                        .and_then(|v| v.as_str())
                        .and_then(|s| s.strip_prefix("Bearer "));

                    if let Some(token) = token {
                        match jwt_service.verify_token(token) {
                            Ok(claims) => data.insert(claims),
                            Err(_) => {
                                return Err(async_graphql::Error::new("Invalid or expired token"))
                            }
                        }
                    }

                    Ok(data)
                })
                .serve()
        })
}

/// Liveness plus a database round-trip.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok("ok")
}
