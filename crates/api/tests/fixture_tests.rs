mod common;

use std::collections::HashSet;

use api::gql::build_schema;
use async_graphql::Variables;
use common::*;
use serde_json::{json, Value};

fn pair_key(m: &Value) -> (String, String) {
    let home = m["homeTeamId"].as_str().unwrap().to_string();
    let away = m["awayTeamId"].as_str().unwrap().to_string();
    if home < away {
        (home, away)
    } else {
        (away, home)
    }
}

#[tokio::test]
async fn test_league_schedule_pairs_every_team_once() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Fixture Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let mut teams = Vec::new();
    for name in ["Athletic", "Borough", "City", "Dynamo"] {
        teams.push(add_confirmed_team(&schema, &claims, &competition_id, name, None, None).await);
    }

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    assert_eq!(schedule["competition"]["status"], "DRAW_COMPLETE");

    let rounds = schedule["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 3);
    assert_eq!(rounds[0]["round"]["name"], "Round 1");

    let matches = scheduled_matches(&schedule);
    assert_eq!(matches.len(), 6);
    let pairs: HashSet<(String, String)> = matches.iter().map(pair_key).collect();
    assert_eq!(pairs.len(), 6, "no pairing may repeat");

    // every team plays once per round
    for round in rounds {
        let mut seen = HashSet::new();
        for m in round["matches"].as_array().unwrap() {
            assert!(seen.insert(m["homeTeamId"].as_str().unwrap().to_string()));
            assert!(seen.insert(m["awayTeamId"].as_str().unwrap().to_string()));
        }
        assert_eq!(seen.len(), teams.len());
    }
}

#[tokio::test]
async fn test_regeneration_needs_force_and_an_unplayed_schedule() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Regenerate Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let a = add_confirmed_team(&schema, &claims, &competition_id, "Alpha", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Bravo", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "Charlie", None, None).await;
    generate_league(&schema, &claims, &competition_id).await;

    let mutation = r#"
        mutation($input: GenerateFixturesInput!) {
            generateFixtures(input: $input) { rounds { matches { id homeTeamId awayTeamId } } }
        }
    "#;

    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({ "input": { "competitionId": competition_id } }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    let data = gql_ok(
        &schema,
        mutation,
        json!({ "input": { "competitionId": competition_id, "forceRegenerate": true } }),
        &claims,
    )
    .await;
    let matches = scheduled_matches(&data["generateFixtures"]);
    // three teams: one bye per round, no bye rows stored
    assert_eq!(matches.len(), 3);

    record_score(&schema, &claims, &matches, &a, 1, &b, 0).await;

    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({
            "input": { "competitionId": competition_id, "forceRegenerate": true }
        }))),
        Some(claims),
    )
    .await;
    assert!(!response.errors.is_empty(), "a played schedule cannot be regenerated");
}

#[tokio::test]
async fn test_home_and_away_doubles_the_schedule() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Double Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(
        &schema,
        &claims,
        club_id,
        "LEAGUE",
        json!({ "homeAndAway": true }),
    )
    .await;
    for name in ["North", "South", "East"] {
        add_confirmed_team(&schema, &claims, &competition_id, name, None, None).await;
    }

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    assert_eq!(matches.len(), 6);

    let directed: HashSet<(String, String)> = matches
        .iter()
        .map(|m| {
            (
                m["homeTeamId"].as_str().unwrap().to_string(),
                m["awayTeamId"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(directed.len(), 6, "each side hosts each opponent once");
}

#[tokio::test]
async fn test_knockout_draw_gives_byes_to_top_seeds_and_advances() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Cup Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "CUP", json!({})).await;

    let top = add_confirmed_team(&schema, &claims, &competition_id, "Top Seed", Some(1), None).await;
    let second = add_confirmed_team(&schema, &claims, &competition_id, "Second", Some(2), None).await;
    let third = add_confirmed_team(&schema, &claims, &competition_id, "Third", Some(3), None).await;
    set_competition_status(&schema, &claims, &competition_id, "REGISTRATION_CLOSED").await;

    // cups are drawn, not generated
    let response = execute_graphql(
        &schema,
        "mutation($input: GenerateFixturesInput!) { generateFixtures(input: $input) { rounds { round { id } } } }",
        Some(Variables::from_json(json!({ "input": { "competitionId": competition_id } }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));

    let data = gql_ok(
        &schema,
        r#"mutation($input: PerformDrawInput!) {
            performDraw(input: $input) {
                competition { status }
                rounds { round { name } matches { id status homeTeamId awayTeamId } }
            }
        }"#,
        json!({ "input": { "competitionId": competition_id, "startDate": "2026-03-07T15:00:00Z" } }),
        &claims,
    )
    .await;
    let draw = &data["performDraw"];
    assert_eq!(draw["competition"]["status"], "DRAW_COMPLETE");
    assert_eq!(draw["rounds"][0]["round"]["name"], "Semi-finals");

    let first_round = scheduled_matches(draw);
    assert_eq!(first_round.len(), 2);
    let bye = first_round.iter().find(|m| m["status"] == "BYE").unwrap();
    assert_eq!(bye["homeTeamId"], top.as_str());
    assert!(bye["awayTeamId"].is_null());

    record_score(&schema, &claims, &first_round, &second, 2, &third, 1).await;

    // completing the round draws the final between the bye winner and the winner
    let data = gql_ok(
        &schema,
        r#"query($id: ID!) {
            fixtureSchedule(competitionId: $id) {
                competition { status }
                rounds { round { name isComplete } matches { id status homeTeamId awayTeamId } }
            }
        }"#,
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let schedule = &data["fixtureSchedule"];
    assert_eq!(schedule["competition"]["status"], "IN_PROGRESS");
    let rounds = schedule["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0]["round"]["isComplete"], true);
    assert_eq!(rounds[1]["round"]["name"], "Final");

    let final_matches = rounds[1]["matches"].as_array().unwrap().clone();
    assert_eq!(final_matches.len(), 1);
    let finalists: HashSet<String> = [&final_matches[0]["homeTeamId"], &final_matches[0]["awayTeamId"]]
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(finalists, HashSet::from([top.clone(), second.clone()]));

    record_score(&schema, &claims, &final_matches, &second, 0, &top, 1).await;

    let data = gql_ok(
        &schema,
        r#"query($id: ID!) {
            competition(id: $id) { status }
            teams(competitionId: $id) { id status }
        }"#,
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["competition"]["status"], "COMPLETED");
    let status_of = |id: &str| {
        data["teams"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"] == id)
            .map(|t| t["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of(&top), "CHAMPION");
    assert_eq!(status_of(&second), "RUNNER_UP");
    assert_eq!(status_of(&third), "ELIMINATED");
}

#[tokio::test]
async fn test_bracket_ties_cannot_be_deleted_or_padded() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Bracket Guard Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "CUP", json!({})).await;

    let mut teams = Vec::new();
    for (i, name) in ["S1", "S2", "S3", "S4"].iter().enumerate() {
        teams.push(add_confirmed_team(&schema, &claims, &competition_id, name, Some(i as i32 + 1), None).await);
    }
    set_competition_status(&schema, &claims, &competition_id, "REGISTRATION_CLOSED").await;

    let data = gql_ok(
        &schema,
        r#"mutation($input: PerformDrawInput!) {
            performDraw(input: $input) { rounds { round { id } matches { id homeTeamId awayTeamId } } }
        }"#,
        json!({ "input": { "competitionId": competition_id } }),
        &claims,
    )
    .await;
    let draw = &data["performDraw"];
    let round_id = draw["rounds"][0]["round"]["id"].as_str().unwrap().to_string();
    let semis = scheduled_matches(draw);
    assert_eq!(semis.len(), 2);
    let top_tie = match_between(&semis, &teams[0], &teams[3]);

    let response = execute_graphql(
        &schema,
        "mutation($id: ID!) { deleteMatch(id: $id) }",
        Some(Variables::from_json(json!({ "id": top_tie }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    let response = execute_graphql(
        &schema,
        r#"mutation($input: CreateMatchInput!) { createMatch(input: $input) { id } }"#,
        Some(Variables::from_json(json!({ "input": {
            "competitionId": competition_id,
            "roundId": round_id,
            "homeTeamId": teams[0],
            "awayTeamId": teams[1],
            "scheduledDateTime": "2026-03-14T15:00:00Z",
        }}))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    // the bracket is intact and still advances
    record_score(&schema, &claims, &semis, &teams[0], 2, &teams[3], 0).await;
    record_score(&schema, &claims, &semis, &teams[1], 1, &teams[2], 0).await;

    let data = gql_ok(
        &schema,
        r#"query($id: ID!) {
            fixtureSchedule(competitionId: $id) { rounds { round { name isComplete } matches { id } } }
        }"#,
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let rounds = data["fixtureSchedule"]["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0]["round"]["isComplete"], true);
    assert_eq!(rounds[1]["round"]["name"], "Final");
    assert_eq!(rounds[1]["matches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_schedule_follows_registration_order() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Registration Order Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let mut teams = Vec::new();
    for name in ["First In", "Second In", "Third In", "Last In"] {
        teams.push(add_confirmed_team(&schema, &claims, &competition_id, name, None, None).await);
    }

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let opening: HashSet<(String, String)> = schedule["rounds"][0]["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["homeTeamId"].as_str().unwrap().to_string(),
                m["awayTeamId"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        opening,
        HashSet::from([
            (teams[0].clone(), teams[3].clone()),
            (teams[1].clone(), teams[2].clone()),
        ])
    );
}
