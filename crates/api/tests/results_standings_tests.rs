mod common;

use std::sync::Arc;

use api::gql::build_schema;
use api::gql::common::types::{MatchNotification, NotificationKind};
use api::services::{DispatchError, NotificationDispatcher};
use async_graphql::Variables;
use async_trait::async_trait;
use common::*;
use parking_lot::Mutex;
use serde_json::json;

#[derive(Default)]
struct RecordingDispatcher {
    sent: Mutex<Vec<MatchNotification>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: MatchNotification) -> Result<(), DispatchError> {
        self.sent.lock().push(notification);
        Ok(())
    }
}

const STANDINGS: &str = r#"
    query($id: ID!) {
        standings(competitionId: $id) {
            groupName
            standings { teamId position played won drawn lost goalsFor goalsAgainst goalDifference points }
        }
    }
"#;

#[tokio::test]
async fn test_full_league_season_produces_table_and_champion() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Standings Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;

    let a = add_confirmed_team(&schema, &claims, &competition_id, "Albion", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Borough", None, None).await;
    let c = add_confirmed_team(&schema, &claims, &competition_id, "Celtic", None, None).await;
    let d = add_confirmed_team(&schema, &claims, &competition_id, "Dons", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);

    let first = record_score(&schema, &claims, &matches, &a, 2, &b, 0).await;
    assert_eq!(first["status"], "COMPLETED");

    record_score(&schema, &claims, &matches, &a, 1, &c, 0).await;
    record_score(&schema, &claims, &matches, &a, 1, &d, 1).await;
    record_score(&schema, &claims, &matches, &b, 3, &c, 1).await;
    record_score(&schema, &claims, &matches, &b, 2, &d, 0).await;

    let data = gql_ok(
        &schema,
        "query($id: ID!) { competition(id: $id) { status } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["competition"]["status"], "IN_PROGRESS");

    record_score(&schema, &claims, &matches, &c, 0, &d, 0).await;

    let data = gql_ok(&schema, STANDINGS, json!({ "id": competition_id }), &claims).await;
    let groups = data["standings"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let table = groups[0]["standings"].as_array().unwrap();

    let order: Vec<&str> = table.iter().map(|s| s["teamId"].as_str().unwrap()).collect();
    assert_eq!(order, vec![a.as_str(), b.as_str(), d.as_str(), c.as_str()]);

    let points: Vec<i64> = table.iter().map(|s| s["points"].as_i64().unwrap()).collect();
    assert_eq!(points, vec![7, 6, 2, 1]);

    assert_eq!(table[0]["won"], 2);
    assert_eq!(table[0]["drawn"], 1);
    assert_eq!(table[0]["goalDifference"], 3);
    assert_eq!(table[3]["goalsAgainst"], 4);
    for (i, line) in table.iter().enumerate() {
        assert_eq!(line["played"], 3);
        assert_eq!(line["position"], i as i64 + 1);
    }

    // the last result completes the league and settles the placings
    let data = gql_ok(
        &schema,
        "query($id: ID!) { competition(id: $id) { status } teams(competitionId: $id) { id status points } }",
        json!({ "id": competition_id }),
        &claims,
    )
    .await;
    assert_eq!(data["competition"]["status"], "COMPLETED");
    let teams = data["teams"].as_array().unwrap();
    let champion = teams.iter().find(|t| t["id"] == a.as_str()).unwrap();
    assert_eq!(champion["status"], "CHAMPION");
    assert_eq!(champion["points"], 7);
    let runner_up = teams.iter().find(|t| t["id"] == b.as_str()).unwrap();
    assert_eq!(runner_up["status"], "RUNNER_UP");
}

#[tokio::test]
async fn test_results_cannot_be_recorded_twice() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Double Entry Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Home Side", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Away Side", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "Third Side", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    let match_id = match_between(&matches, &a, &b);

    let mutation = r#"
        mutation($input: RecordResultInput!) { recordResult(input: $input) { status } }
    "#;
    gql_ok(
        &schema,
        mutation,
        json!({ "input": { "matchId": match_id, "homeScore": 1, "awayScore": 1 } }),
        &claims,
    )
    .await;

    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({
            "input": { "matchId": match_id, "homeScore": 2, "awayScore": 0 }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    // negative scores are rejected before anything is stored
    let other = match_between(&matches, &b, &matches_third(&matches, &a, &b));
    let response = execute_graphql(
        &schema,
        mutation,
        Some(Variables::from_json(json!({
            "input": { "matchId": other, "homeScore": -1, "awayScore": 0 }
        }))),
        Some(claims),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
}

/// The team that is neither `a` nor `b`.
fn matches_third(matches: &[serde_json::Value], a: &str, b: &str) -> String {
    matches
        .iter()
        .flat_map(|m| [m["homeTeamId"].as_str(), m["awayTeamId"].as_str()])
        .flatten()
        .find(|id| *id != a && *id != b)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_postponed_match_must_be_rescheduled_before_a_result() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Weather Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Frost", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Thaw", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let match_id = match_between(&scheduled_matches(&schedule), &a, &b);

    let data = gql_ok(
        &schema,
        r#"mutation($input: PostponeMatchInput!) {
            postponeMatch(input: $input) { status postponementReason }
        }"#,
        json!({ "input": { "matchId": match_id, "reason": "Frozen pitch" } }),
        &claims,
    )
    .await;
    assert_eq!(data["postponeMatch"]["status"], "POSTPONED");
    assert_eq!(data["postponeMatch"]["postponementReason"], "Frozen pitch");

    let record = r#"
        mutation($input: RecordResultInput!) { recordResult(input: $input) { status result } }
    "#;
    let response = execute_graphql(
        &schema,
        record,
        Some(Variables::from_json(json!({
            "input": { "matchId": match_id, "homeScore": 1, "awayScore": 0 }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    let data = gql_ok(
        &schema,
        r#"mutation($input: RescheduleMatchInput!) {
            rescheduleMatch(input: $input) { status scheduledDateTime }
        }"#,
        json!({ "input": { "matchId": match_id, "scheduledDateTime": "2026-03-21T15:00:00Z" } }),
        &claims,
    )
    .await;
    assert_eq!(data["rescheduleMatch"]["status"], "SCHEDULED");

    let data = gql_ok(
        &schema,
        record,
        json!({ "input": { "matchId": match_id, "homeScore": 1, "awayScore": 0 } }),
        &claims,
    )
    .await;
    assert_eq!(data["recordResult"]["status"], "COMPLETED");
    assert_eq!(data["recordResult"]["result"], "HOME_WIN");
}

#[tokio::test]
async fn test_walkover_awards_the_configured_score() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Walkover Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Present", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Absent", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    let m = &matches[0];
    let outcome = if m["homeTeamId"] == a.as_str() {
        "HOME_WALKOVER"
    } else {
        "AWAY_WALKOVER"
    };

    let data = gql_ok(
        &schema,
        r#"mutation($input: RecordResultInput!) {
            recordResult(input: $input) { status result homeScore awayScore }
        }"#,
        json!({ "input": { "matchId": m["id"], "outcome": outcome } }),
        &claims,
    )
    .await;
    let result = &data["recordResult"];
    assert_eq!(result["status"], "WALKOVER");
    assert_eq!(result["result"], outcome);

    let (winner_goals, loser_goals) = if outcome == "HOME_WALKOVER" {
        (&result["homeScore"], &result["awayScore"])
    } else {
        (&result["awayScore"], &result["homeScore"])
    };
    assert_eq!(*winner_goals, 3);
    assert_eq!(*loser_goals, 0);

    let data = gql_ok(&schema, STANDINGS, json!({ "id": competition_id }), &claims).await;
    let table = data["standings"][0]["standings"].as_array().unwrap();
    assert_eq!(table[0]["teamId"], a.as_str());
    assert_eq!(table[0]["points"], 3);
    assert_eq!(table[1]["teamId"], b.as_str());
}

#[tokio::test]
async fn test_schedule_changes_notify_the_competition() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let recorder = Arc::new(RecordingDispatcher::default());
    let app_state = app_state.with_notifier(recorder.clone());
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Notify Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Early", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Late", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    let match_id = match_between(&matches, &a, &b);

    gql_ok(
        &schema,
        "mutation($input: PostponeMatchInput!) { postponeMatch(input: $input) { status } }",
        json!({ "input": { "matchId": match_id, "reason": "Storm warning" } }),
        &claims,
    )
    .await;
    gql_ok(
        &schema,
        "mutation($input: RescheduleMatchInput!) { rescheduleMatch(input: $input) { status } }",
        json!({ "input": { "matchId": match_id, "scheduledDateTime": "2026-04-04T15:00:00Z" } }),
        &claims,
    )
    .await;
    record_score(&schema, &claims, &matches, &a, 2, &b, 1).await;

    let sent = recorder.sent.lock();
    let kinds: Vec<NotificationKind> = sent.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Postponed,
            NotificationKind::Rescheduled,
            NotificationKind::ResultRecorded,
        ]
    );
    assert_eq!(sent[0].message, "Match postponed: Storm warning");
    assert!(sent.iter().all(|n| n.competition_id.as_str() == competition_id));
    assert!(sent[1].message.contains("2026-04-04 15:00"));
}

const RECORD: &str = r#"
    mutation($input: RecordResultInput!) { recordResult(input: $input) { status } }
"#;

const TEAM_TOTALS: &str = r#"
    query($id: ID!) {
        teams(competitionId: $id) { id played won drawn lost goalsFor goalsAgainst points }
    }
"#;

#[tokio::test]
async fn test_cancelled_match_rejects_a_result_and_leaves_totals_alone() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Cancelled Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Rovers", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "United", None, None).await;
    let c = add_confirmed_team(&schema, &claims, &competition_id, "Athletic", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    record_score(&schema, &claims, &matches, &a, 3, &b, 1).await;

    let cancelled = match_between(&matches, &a, &c);
    let data = gql_ok(
        &schema,
        "mutation($input: CancelMatchInput!) { cancelMatch(input: $input) { status } }",
        json!({ "input": { "matchId": cancelled, "reason": "Pitch unavailable" } }),
        &claims,
    )
    .await;
    assert_eq!(data["cancelMatch"]["status"], "CANCELLED");

    let before = gql_ok(&schema, TEAM_TOTALS, json!({ "id": competition_id }), &claims).await;

    let response = execute_graphql(
        &schema,
        RECORD,
        Some(Variables::from_json(json!({
            "input": { "matchId": cancelled, "homeScore": 4, "awayScore": 0 }
        }))),
        Some(claims.clone()),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));

    let after = gql_ok(&schema, TEAM_TOTALS, json!({ "id": competition_id }), &claims).await;
    assert_eq!(before, after);

    let data = gql_ok(
        &schema,
        "query($id: ID!) { match(id: $id) { status homeScore awayScore } }",
        json!({ "id": cancelled }),
        &claims,
    )
    .await;
    assert_eq!(data["match"]["status"], "CANCELLED");
    assert!(data["match"]["homeScore"].is_null());
}

#[tokio::test]
async fn test_concurrent_results_on_one_match_store_exactly_one() {
    let Some(app_state) = setup_test_db().await else {
        return;
    };
    let schema = build_schema(app_state.clone());

    let club_id = create_test_club(&app_state, "Race Club").await;
    let claims = create_club_manager(&app_state, club_id).await;
    let competition_id = create_open_competition(&schema, &claims, club_id, "LEAGUE", json!({})).await;
    let a = add_confirmed_team(&schema, &claims, &competition_id, "Quick", None, None).await;
    let b = add_confirmed_team(&schema, &claims, &competition_id, "Quicker", None, None).await;
    add_confirmed_team(&schema, &claims, &competition_id, "Steady", None, None).await;

    let schedule = generate_league(&schema, &claims, &competition_id).await;
    let matches = scheduled_matches(&schedule);
    let match_id = match_between(&matches, &a, &b);

    let first = Variables::from_json(json!({
        "input": { "matchId": match_id, "homeScore": 1, "awayScore": 0 }
    }));
    let second = Variables::from_json(json!({
        "input": { "matchId": match_id, "homeScore": 0, "awayScore": 2 }
    }));
    let (left, right) = tokio::join!(
        execute_graphql(&schema, RECORD, Some(first), Some(claims.clone())),
        execute_graphql(&schema, RECORD, Some(second), Some(claims.clone())),
    );

    let codes = [error_code(&left), error_code(&right)];
    assert_eq!(codes.iter().filter(|c| c.is_none()).count(), 1, "exactly one result is stored");
    assert_eq!(codes.iter().filter(|c| c.as_deref() == Some("CONFLICT")).count(), 1);

    let data = gql_ok(
        &schema,
        "query($id: ID!) { match(id: $id) { status homeScore awayScore } }",
        json!({ "id": match_id }),
        &claims,
    )
    .await;
    assert_eq!(data["match"]["status"], "COMPLETED");
    let stored = (data["match"]["homeScore"].as_i64(), data["match"]["awayScore"].as_i64());
    let expected = if left.errors.is_empty() { (Some(1), Some(0)) } else { (Some(0), Some(2)) };
    assert_eq!(stored, expected);

    let totals = gql_ok(&schema, TEAM_TOTALS, json!({ "id": competition_id }), &claims).await;
    let played: i64 = totals["teams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["played"].as_i64().unwrap())
        .sum();
    assert_eq!(played, 2, "the match is counted once for each side");
}
