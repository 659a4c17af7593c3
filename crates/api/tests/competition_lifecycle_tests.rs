mod common;

use api::gql::build_schema;
use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_competition_moves_through_registration() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Lifecycle Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id =
        create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({ "maxTeams": 2 })).await;

    add_confirmed_team(&schema, &claims, &competition_id, "Rovers", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "United", None, None).await;

    // the competition is full
    let register = r#"
        mutation($input: RegisterTeamInput!) { registerTeam(input: $input) { id } }
    "#;
    let response = execute_graphql(
        &schema,
        register,
        Some(Variables::from_json(json!({
            "input": { "competitionId": competition_id, "name": "Latecomers" }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));

    let closed = set_competition_status(&schema, &claims, &competition_id, "REGISTRATION_CLOSED").await;
    assert_eq!(closed["status"], "REGISTRATION_CLOSED");

    // registration is shut once closed
    let response = execute_graphql(
        &schema,
        register,
        Some(Variables::from_json(json!({
            "input": { "competitionId": competition_id, "name": "Too Late" }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_illegal_transitions_are_conflicts() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Transition Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let mutation = r#"
        mutation($id: ID!, $status: CompetitionStatus!) {
            updateCompetitionStatus(id: $id, status: $status) { status }
        }
    "#;
    for status in ["COMPLETED", "DRAW_COMPLETE", "IN_PROGRESS"] {
        let response = execute_graphql(
            &schema,
            mutation,
            Some(Variables::from_json(json!({ "id": competition_id, "status": status }))),
            Some(claims.clone()),
        )
        .await;
        assert_eq!(
            error_code(&response).as_deref(),
            Some("CONFLICT"),
            "moving to {} should be rejected",
            status
        );
    }
}

#[tokio::test]
async fn test_postponed_competition_resumes_where_it_was() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Postpone Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "CUP", json!({})).await;

    let postponed = set_competition_status(&schema, &claims, &competition_id, "POSTPONED").await;
    assert_eq!(postponed["status"], "POSTPONED");

    let data = gql_ok(
        &schema,
        "mutation($id: ID!) { resumeCompetition(id: $id) { status resumeStatus } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["resumeCompetition"]["status"], "REGISTRATION_OPEN");
    assert!(data["resumeCompetition"]["resumeStatus"].is_null());
}

#[tokio::test]
async fn test_publishing_requires_dates() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Publish Club").await;
    let claims = create_club_manager(&app_state, club_id).await;

    let data = gql_ok(
        &schema,
        "mutation($input: CreateCompetitionInput!) { createCompetition(input: $input) { id } }",
        json!({ "input": {
            "clubId": club_id.to_string(),
            "name": "Undated League",
            "competitionType": "LEAGUE",
        }}),
        &claims,
    )
    .await;
    let id = data["createCompetition"]["id"].as_str().unwrap().to_string();

    let response = execute_graphql(
        &schema,
        "mutation($id: ID!) { publishCompetition(id: $id) { status } }",
        Some(Variables::from_json(json!({ "id": id }))),
        Some(claims),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_mutations_require_a_club_manager() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Owned Club").await;
    let other_club = create_test_club(&app_state, "Other Club").await;
    let outsider = create_club_manager(&app_state, other_club).await;

    let mutation = r#"
        mutation($input: CreateCompetitionInput!) { createCompetition(input: $input) { id } }
    "#;
    let variables = json!({ "input": {
        "clubId": club_id.to_string(),
        "name": "Hijacked League",
        "competitionType": "LEAGUE",
    }});

    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(variables.clone())),
        None,
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));

    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(variables.clone())),
        Some(outsider),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));

    let admin = claims_for(Uuid::new_v4(), "admin");
    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(variables)),
        Some(admin),
    )
    .await;
    assert!(response.errors.is_empty(), "admins manage every club: {:?}", response.errors);
}

#[tokio::test]
async fn test_team_cap_can_be_lifted() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Capped Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id =
        create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({ "maxTeams": 2 })).await;
    add_confirmed_team(&schema, &claims, &competition_id, "North", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "South", None, None).await;

    let register = "mutation($input: RegisterTeamInput!) { registerTeam(input: $input) { id } }";
    let third = json!({ "input": { "competitionId": competition_id, "name": "East" } });
    let response = execute_graphql(
        &schema,
        register,
        Some(Variables::from_json(third.clone())),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));

    let update = r#"
        mutation($id: ID!, $input: UpdateCompetitionInput!) {
            updateCompetition(id: $id, input: $input) { maxTeams description }
        }
    "#;
    // leaving the field out keeps the cap
    let data = gql_ok(
        &schema,
        update,
        json!({ "id": competition_id, "input": { "description": "Spring league" } }),
        &claims,
    )
    .await;
    assert_eq!(data["updateCompetition"]["maxTeams"], 2);

    let data = gql_ok(
        &schema,
        update,
        json!({ "id": competition_id, "input": { "maxTeams": null } }),
        &claims,
    )
    .await;
    assert!(data["updateCompetition"]["maxTeams"].is_null());
    assert_eq!(data["updateCompetition"]["description"], "Spring league");

    gql_ok(&schema, register, third, &claims).await;
}
