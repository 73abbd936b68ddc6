//! HTTP-level tests for public profiles and voting.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, get, post_auth, post_json, request};
use serde_json::json;
use swing_core::competition::CompetitionStatus;
use swing_db::models::competition::{Competition, CreateCompetition};

async fn active_competition(app: &common::TestApp) -> Competition {
    let now = Utc::now();
    app.store
        .competitions
        .insert(&Competition::new(CreateCompetition {
            title: "Open".to_string(),
            description: None,
            status: Some(CompetitionStatus::Active),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(7),
            max_participants: None,
            cover_image: None,
        }))
        .await
        .unwrap()
}

#[tokio::test]
async fn repeated_free_votes_are_all_recorded() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let first = post_json(app.app(), "/api/public/profile/m1/vote", json!({ "voterId": "v1" })).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    let second = post_json(app.app(), "/api/public/profile/m1/vote", json!({ "voterId": "v1" })).await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second = body_json(second).await;

    assert_ne!(first["data"]["votes"][0]["id"], second["data"]["votes"][0]["id"]);
    assert_eq!(first["data"]["votes"][0]["modelId"], "m1");
    assert_eq!(second["data"]["votes"][0]["modelId"], "m1");
    assert_eq!(second["data"]["totalVotes"], 2);
}

#[tokio::test]
async fn cooldown_rejects_second_free_vote_when_enforced() {
    let app = common::build_test_app_with(|cfg| cfg.enforce_free_vote_cooldown = true);
    app.user_with_id("m1", "m1@test.com").await;
    let uri = "/api/public/profile/m1/vote";

    assert_eq!(
        post_json(app.app(), uri, json!({ "voterId": "v1" })).await.status(),
        StatusCode::CREATED
    );

    let response = post_json(app.app(), uri, json!({ "voterId": "v1" })).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["code"], "RATE_LIMITED");

    // Premium votes and other voters are unaffected.
    assert_eq!(
        post_json(app.app(), uri, json!({ "voterId": "v1", "isPremium": true })).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post_json(app.app(), uri, json!({ "voterId": "v2" })).await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn vote_status_reflects_last_free_vote() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let status = body_json(get(app.app(), "/api/public/profile/m1/vote-status?voterId=v1").await).await;
    assert_eq!(status["data"]["canVote"], true);
    assert_eq!(status["data"]["hoursRemaining"], 0);

    post_json(app.app(), "/api/public/profile/m1/vote", json!({ "voterId": "v1" })).await;

    let status = body_json(get(app.app(), "/api/public/profile/m1/vote-status?voterId=v1").await).await;
    assert_eq!(status["data"]["canVote"], false);
    assert_eq!(status["data"]["hoursRemaining"], 24);
    assert!(status["data"]["nextVoteAt"].is_string());
}

#[tokio::test]
async fn package_appends_its_vote_count() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let response = post_json(
        app.app(),
        "/api/public/profile/m1/vote",
        json!({ "voterId": "v1", "packageId": "supporter" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let votes = json["data"]["votes"].as_array().unwrap();
    assert_eq!(votes.len(), 15);
    assert!(votes.iter().all(|v| v["isPremium"] == true));
    assert_eq!(json["data"]["totalVotes"], 15);

    let response = post_json(
        app.app(),
        "/api/public/profile/m1/vote",
        json!({ "voterId": "v1", "packageId": "platinum" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn packages_are_listed() {
    let app = common::build_test_app();
    let json = body_json(get(app.app(), "/api/public/vote-packages").await).await;
    let ids: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["starter", "supporter", "superfan"]);
}

#[tokio::test]
async fn competition_votes_update_rankings() {
    let app = common::build_test_app();
    let (ava, ava_token) = app.user("ava@test.com", "model").await;
    let (bea, bea_token) = app.user("bea@test.com", "model").await;
    let competition = active_competition(&app).await;
    let join = format!("/api/competitions/{}/join", competition.id);
    post_auth(app.app(), &join, &ava_token).await;
    post_auth(app.app(), &join, &bea_token).await;

    for voter in ["v1", "v2"] {
        let response = post_json(
            app.app(),
            &format!("/api/public/profile/{}/vote", bea.id),
            json!({ "voterId": voter, "competitionId": competition.id }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(
        get(app.app(), &format!("/api/competitions/{}/leaderboard", competition.id)).await,
    )
    .await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries[0]["modelId"], bea.id);
    assert_eq!(entries[0]["votes"], 2);
    assert_eq!(entries[0]["ranking"], 1);
    assert_eq!(entries[1]["modelId"], ava.id);
    assert_eq!(entries[1]["ranking"], 2);

    let profile = body_json(get(app.app(), &format!("/api/public/profile/{}", bea.id)).await).await;
    assert_eq!(profile["data"]["totalVotes"], 2);
    assert_eq!(profile["data"]["registrations"][0]["ranking"], 1);
}

#[tokio::test]
async fn competition_vote_requires_active_registration() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;
    let competition = active_competition(&app).await;

    let response = post_json(
        app.app(),
        "/api/public/profile/m1/vote",
        json!({ "voterId": "v1", "competitionId": competition.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_model_is_404() {
    let app = common::build_test_app();
    let response = post_json(
        app.app(),
        "/api/public/profile/ghost/vote",
        json!({ "voterId": "v1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        get(app.app(), "/api/public/profile/ghost").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn blank_voter_id_is_rejected() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;
    let response = post_json(app.app(), "/api/public/profile/m1/vote", json!({ "voterId": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_vote_body_uses_error_envelope() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let response = request(
        app.app(),
        Request::post("/api/public/profile/m1/vote")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"voterId": "#))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn missing_content_type_uses_error_envelope() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let response = request(
        app.app(),
        Request::post("/api/public/profile/m1/vote")
            .body(Body::from(r#"{"voterId": "v1"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unparsable_query_uses_error_envelope() {
    let app = common::build_test_app();
    app.user_with_id("m1", "m1@test.com").await;

    let response = get(app.app(), "/api/public/profile/m1/vote-status").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}
