mod common;

use api::gql::build_schema;
use async_graphql::Variables;
use common::*;
use serde_json::json;

const WITHDRAW: &str = r#"
    mutation($input: WithdrawTeamInput!) {
        withdrawTeam(input: $input) { id status withdrawalReason }
    }
"#;

#[tokio::test]
async fn test_league_withdrawal_drops_open_fixtures_and_keeps_results() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Withdrawal Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let a = add_confirmed_team(&schema, &claims, &competition_id, "Stayers", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Leavers", None, None).await;
    let c = add_confirmed_team(&schema, &claims, &competition_id, "Others", None, None).await;
    let d = add_confirmed_team(&schema, &claims, &competition_id, "Fourth", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    record_score(&schema, &claims, &matches, &a, 0, &b, 2).await;

    let data = gql_ok(
        &schema,
        WITHDRAW,
        json!({ "input": { "teamId": b, "reason": "Folded" } }),
        &claims,
    )
    .await;
    assert_eq!(data["withdrawTeam"]["status"], "WITHDRAWN");
    assert_eq!(data["withdrawTeam"]["withdrawalReason"], "Folded");

    let data = gql_ok(
        &schema,
        "query($id: ID!) { matches(filter: { competitionId: $id }) { id status homeTeamId awayTeamId } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let remaining = data["matches"].as_array().unwrap();
    // 6 fixtures, 2 open ones of the leaver removed, its played one kept
    assert_eq!(remaining.len(), 4);
    let involving_b: Vec<_> = remaining
        .iter()
        .filter(|m| m["homeTeamId"] == b.as_str() || m["awayTeamId"] == b.as_str())
        .collect();
    assert_eq!(involving_b.len(), 1);
    assert_eq!(involving_b[0]["status"], "COMPLETED");

    // the played result still counts
    let data = gql_ok(
        &schema,
        "query($id: ID!) { standings(competitionId: $id) { standings { teamId points played } } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let table = data["standings"][0]["standings"].as_array().unwrap();
    let leaver = table.iter().find(|s| s["teamId"] == b.as_str()).unwrap();
    assert_eq!(leaver["points"], 3);

    // a second withdrawal of the same team is a conflict
    let response = execute_graphql(
        &schema,
        WITHDRAW,
        Some(Variables::from_json(json!({ "input": { "teamId": b } }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    // the rest of the league still plays out to completion
    record_score(&schema, &claims, &matches, &a, 1, &c, 0).await;
    record_score(&schema, &claims, &matches, &a, 1, &d, 0).await;
    record_score(&schema, &claims, &matches, &c, 1, &d, 0).await;

    let data = gql_ok(
        &schema,
        "query($id: ID!) { competition(id: $id) { status } teams(competitionId: $id) { id status } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["competition"]["status"], "COMPLETED");

    // the leaver finished second on points but takes no placing
    let status_of = |id: &str| {
        data["teams"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"] == id)
            .map(|t| t["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of(&a), "CHAMPION");
    assert_eq!(status_of(&b), "WITHDRAWN");
    assert_eq!(status_of(&c), "RUNNER_UP");
}

#[tokio::test]
async fn test_voiding_played_results_removes_them_from_the_table() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Void Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let a = add_confirmed_team(&schema, &claims, &competition_id, "Clean", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Banned", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "Neutral", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    record_score(&schema, &claims, &matches, &a, 0, &b, 1).await;

    let data = gql_ok(
        &schema,
        r#"mutation($input: WithdrawTeamInput!) {
            disqualifyTeam(input: $input) { status }
        }"#,
        json!({ "input": { "teamId": b, "reason": "Ineligible player", "voidPlayedResults": true } }),
        &claims,
    )
    .await;
    assert_eq!(data["disqualifyTeam"]["status"], "DISQUALIFIED");

    let played = match_between(&matches, &a, &b);
    let data = gql_ok(
        &schema,
        "query($id: ID!) { match(id: $id) { result } }",
        json!({ "id": played }),
        &claims,
    )
    .await;
    assert_eq!(data["match"]["result"], "VOID");

    let data = gql_ok(
        &schema,
        "query($id: ID!) { standings(competitionId: $id) { standings { teamId played } } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let table = data["standings"][0]["standings"].as_array().unwrap();
    assert!(
        table.iter().all(|s| s["teamId"] != b.as_str()),
        "a disqualified team without counted matches leaves the table"
    );
    let clean = table.iter().find(|s| s["teamId"] == a.as_str()).unwrap();
    assert_eq!(clean["played"], 0);
}

#[tokio::test]
async fn test_knockout_withdrawal_hands_the_tie_to_the_opponent() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Knockout Withdrawal Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "KNOCKOUT", json!({})).await;

    let mut teams = Vec::new();
    for (i, name) in ["One", "Two", "Three", "Four"].iter().enumerate() {
        teams.push(add_confirmed_team(&schema, &claims, &competition_id, name, Some(i as i32 + 1), None).await);
    }
    set_competition_status(&schema, &claims, &competition_id, "REGISTRATION_CLOSED").await;

    let data = gql_ok(
        &schema,
        r#"mutation($input: PerformDrawInput!) {
            performDraw(input: $input) { rounds { matches { id homeTeamId awayTeamId } } }
        }"#,
        json!({ "input": { "competitionId": competition_id } }),
        &claims,
    )
    .await;
    let first_round = scheduled_matches(&data["performDraw"]);
    assert_eq!(first_round.len(), 2);

    let leaver = &teams[3];
    let tie = first_round
        .iter()
        .find(|m| m["homeTeamId"] == leaver.as_str() || m["awayTeamId"] == leaver.as_str())
        .unwrap();
    let opponent_is_home = tie["awayTeamId"] == leaver.as_str();

    gql_ok(
        &schema,
        WITHDRAW,
        json!({ "input": { "teamId": leaver } }),
        &claims,
    )
    .await;

    let data = gql_ok(
        &schema,
        "query($id: ID!) { match(id: $id) { status result } }",
        json!({ "id": tie["id"] }),
        &claims,
    )
    .await;
    assert_eq!(data["match"]["status"], "WALKOVER");
    let expected = if opponent_is_home {
        "HOME_WALKOVER"
    } else {
        "AWAY_WALKOVER"
    };
    assert_eq!(data["match"]["result"], expected);

    let data = gql_ok(
        &schema,
        "query($id: ID!) { competition(id: $id) { status } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["competition"]["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn test_withdrawal_completes_rounds_left_with_only_played_matches() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Round Completion Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let a = add_confirmed_team(&schema, &claims, &competition_id, "Alpha", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Bravo", None, None).await;
    let c = add_confirmed_team(&schema, &claims, &competition_id, "Charlie", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "Delta", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    record_score(&schema, &claims, &matches, &a, 2, &b, 0).await;
    let played = match_between(&matches, &a, &b);

    gql_ok(
        &schema,
        WITHDRAW,
        json!({ "input": { "teamId": c, "reason": "No pitch" } }),
        &claims,
    )
    .await;

    let data = gql_ok(
        &schema,
        r#"query($id: ID!) {
            fixtureSchedule(competitionId: $id) { rounds { round { roundNumber isComplete } matches { id status } } }
        }"#,
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    let rounds = data["fixtureSchedule"]["rounds"].as_array().unwrap();
    let round = rounds
        .iter()
        .find(|r| r["matches"].as_array().unwrap().iter().any(|m| m["id"] == played.as_str()))
        .unwrap();
    let statuses: Vec<_> = round["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["status"].clone())
        .collect();
    assert_eq!(statuses, vec![json!("COMPLETED")]);
    assert_eq!(round["round"]["isComplete"], true);

    // rounds that still hold open fixtures stay incomplete
    assert!(rounds
        .iter()
        .filter(|r| r["round"]["roundNumber"] != round["round"]["roundNumber"])
        .all(|r| r["round"]["isComplete"] == false));
}
