#![allow(dead_code)]

use std::env;

use api::auth::{AuthConfig, Claims};
use api::config::EngineConfig;
use api::gql::AppSchema;
use api::AppState;
use async_graphql::{Request, Variables};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Connects to `TEST_DATABASE_URL` and applies the migrations. Returns `None`
/// when no test database is configured so the suite can run without one.
pub async fn setup_test_db() -> Option<AppState> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let auth = AuthConfig {
        jwt_secret: "test-secret".to_string(),
    };
    Some(AppState::from_parts(pool, EngineConfig::default(), &auth))
}

/// Helper function to execute GraphQL queries and mutations
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    auth_claims: Option<Claims>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(claims) = auth_claims {
        request = request.data(claims);
    }

    schema.execute(request).await
}

/// Run a request that must succeed and return its data as JSON.
pub async fn gql_ok(schema: &AppSchema, query: &str, variables: Value, claims: &Claims) -> Value {
    let response = execute_graphql(
        schema,
        query,
        Some(Variables::from_json(variables)),
        Some(claims.clone()),
    )
    .await;
    assert!(
        response.errors.is_empty(),
        "GraphQL errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

/// The `extensions.code` of the first error.
pub fn error_code(response: &async_graphql::Response) -> Option<String> {
    let err = response.errors.first()?;
    let ext = err.extensions.as_ref()?;
    match ext.get("code")? {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

pub fn claims_for(user_id: Uuid, role: &str) -> Claims {
    Claims {
        sub: user_id.to_string(),
        email: format!("{}@test.com", user_id),
        role: role.to_string(),
        iat: chrono::Utc::now().timestamp(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
    }
}

/// Create test club and return its ID
pub async fn create_test_club(app_state: &AppState, name: &str) -> Uuid {
    let club_id = Uuid::new_v4();

    sqlx::query("INSERT INTO clubs (id, name, city) VALUES ($1, $2, $3)")
        .bind(club_id)
        .bind(name)
        .bind("Test City")
        .execute(&app_state.db)
        .await
        .expect("Failed to create test club");

    club_id
}

/// A manager of `club_id` and their claims.
pub async fn create_club_manager(app_state: &AppState, club_id: Uuid) -> Claims {
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO club_managers (user_id, club_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(club_id)
        .execute(&app_state.db)
        .await
        .expect("Failed to create club manager relationship");

    claims_for(user_id, "manager")
}

pub async fn create_member(app_state: &AppState, club_id: Uuid, first_name: &str) -> Uuid {
    let member_id = Uuid::new_v4();

    sqlx::query("INSERT INTO members (id, club_id, first_name) VALUES ($1, $2, $3)")
        .bind(member_id)
        .bind(club_id)
        .bind(first_name)
        .execute(&app_state.db)
        .await
        .expect("Failed to create member");

    member_id
}

/// A published competition open for registration. `extra` is merged into the
/// create input.
pub async fn create_open_competition(
    schema: &AppSchema,
    claims: &Claims,
    club_id: Uuid,
    competition_type: &str,
    extra: Value,
) -> String {
    let mut input = json!({
        "clubId": club_id.to_string(),
        "name": format!("{} {}", competition_type, Uuid::new_v4()),
        "competitionType": competition_type,
        "startDate": "2026-03-01",
        "endDate": "2026-06-30",
    });
    if let (Some(base), Some(extra)) = (input.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }

    let data = gql_ok(
        schema,
        "mutation($input: CreateCompetitionInput!) { createCompetition(input: $input) { id status } }",
        json!({ "input": input }),
        claims,
    )
    .await;
    let id = data["createCompetition"]["id"].as_str().unwrap().to_string();
    assert_eq!(data["createCompetition"]["status"], "DRAFT");

    gql_ok(
        schema,
        "mutation($id: ID!) { publishCompetition(id: $id) { status } }",
        json!({ "id": id }),
        claims,
    )
    .await;
    set_competition_status(schema, claims, &id, "REGISTRATION_OPEN").await;

    id
}

pub async fn set_competition_status(schema: &AppSchema, claims: &Claims, id: &str, status: &str) -> Value {
    let data = gql_ok(
        schema,
        "mutation($id: ID!, $status: CompetitionStatus!) { updateCompetitionStatus(id: $id, status: $status) { status } }",
        json!({ "id": id, "status": status }),
        claims,
    )
    .await;
    data["updateCompetitionStatus"].clone()
}

/// Register and approve a team.
pub async fn add_confirmed_team(
    schema: &AppSchema,
    claims: &Claims,
    competition_id: &str,
    name: &str,
    seed: Option<i32>,
    group: Option<&str>,
) -> String {
    let data = gql_ok(
        schema,
        "mutation($input: RegisterTeamInput!) { registerTeam(input: $input) { id status } }",
        json!({ "input": {
            "competitionId": competition_id,
            "name": name,
            "seedNumber": seed,
            "groupName": group,
        }}),
        claims,
    )
    .await;
    let id = data["registerTeam"]["id"].as_str().unwrap().to_string();
    assert_eq!(data["registerTeam"]["status"], "REGISTERED");

    let data = gql_ok(
        schema,
        "mutation($id: ID!) { approveTeam(id: $id) { status } }",
        json!({ "id": id }),
        claims,
    )
    .await;
    assert_eq!(data["approveTeam"]["status"], "CONFIRMED");

    id
}

/// Close registration and generate a single round-robin.
pub async fn generate_league(schema: &AppSchema, claims: &Claims, competition_id: &str) -> Value {
    set_competition_status(schema, claims, competition_id, "REGISTRATION_CLOSED").await;
    let data = gql_ok(
        schema,
        r#"mutation($input: GenerateFixturesInput!) {
            generateFixtures(input: $input) {
                competition { status }
                rounds { round { id roundNumber name } matches { id homeTeamId awayTeamId status } }
            }
        }"#,
        json!({ "input": { "competitionId": competition_id, "startDate": "2026-03-07T15:00:00Z" } }),
        claims,
    )
    .await;
    data["generateFixtures"].clone()
}

/// Every match of a generated schedule, in round order.
pub fn scheduled_matches(schedule: &Value) -> Vec<Value> {
    schedule["rounds"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|r| r["matches"].as_array().unwrap().clone())
        .collect()
}

/// Find the match between two teams, either way round.
pub fn match_between(matches: &[Value], a: &str, b: &str) -> String {
    matches
        .iter()
        .find(|m| {
            (m["homeTeamId"] == a && m["awayTeamId"] == b)
                || (m["homeTeamId"] == b && m["awayTeamId"] == a)
        })
        .and_then(|m| m["id"].as_str())
        .unwrap()
        .to_string()
}

/// Record a normal result given the scores of `home` and `away` as named
/// teams, regardless of which side each was drawn on.
pub async fn record_score(
    schema: &AppSchema,
    claims: &Claims,
    matches: &[Value],
    team_a: &str,
    goals_a: i32,
    team_b: &str,
    goals_b: i32,
) -> Value {
    let m = matches
        .iter()
        .find(|m| {
            (m["homeTeamId"] == team_a && m["awayTeamId"] == team_b)
                || (m["homeTeamId"] == team_b && m["awayTeamId"] == team_a)
        })
        .unwrap();
    let (home, away) = if m["homeTeamId"] == team_a {
        (goals_a, goals_b)
    } else {
        (goals_b, goals_a)
    };

    let data = gql_ok(
        schema,
        r#"mutation($input: RecordResultInput!) {
            recordResult(input: $input) { id status result homeScore awayScore }
        }"#,
        json!({ "input": { "matchId": m["id"], "homeScore": home, "awayScore": away } }),
        claims,
    )
    .await;
    data["recordResult"].clone()
}
