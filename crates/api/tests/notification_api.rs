//! HTTP-level tests for the `/notifications` resource and the event-driven
//! notification writer.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_auth, post_json};
use serde_json::json;
use swing_core::events::KIND_SYSTEM;
use swing_db::models::notification::{CreateNotification, Notification};
use swing_events::NotificationWriter;

async fn notify(app: &common::TestApp, user_id: &str, title: &str) -> Notification {
    app.store
        .notifications
        .insert(&Notification::new(CreateNotification {
            user_id: user_id.to_string(),
            kind: KIND_SYSTEM.to_string(),
            title: title.to_string(),
            message: format!("{title} message"),
            link: None,
        }))
        .await
        .unwrap()
}

async fn unread(app: &common::TestApp, token: &str) -> i64 {
    let json = body_json(get_auth(app.app(), "/api/notifications/unread-count", token).await).await;
    json["data"]["count"].as_i64().unwrap()
}

#[tokio::test]
async fn vote_produces_notification_for_model() {
    let app = common::build_test_app();
    let (model, token) = app.user("ava@test.com", "model").await;

    let writer = NotificationWriter::new(app.store.clone());
    tokio::spawn(writer.run(app.event_bus.subscribe()));

    let response = post_json(
        app.app(),
        &format!("/api/public/profile/{}/vote", model.id),
        json!({ "voterId": "v1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut count = 0;
    for _ in 0..50 {
        count = unread(&app, &token).await;
        if count > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(count, 1);

    let json = body_json(get_auth(app.app(), "/api/notifications", &token).await).await;
    assert_eq!(json["data"][0]["kind"], "vote");
    assert_eq!(json["data"][0]["title"], "New vote");
    assert_eq!(json["data"][0]["isRead"], false);
}

#[tokio::test]
async fn read_and_read_all() {
    let app = common::build_test_app();
    let (user, token) = app.user("ava@test.com", "model").await;
    let first = notify(&app, &user.id, "First").await;
    notify(&app, &user.id, "Second").await;
    notify(&app, &user.id, "Third").await;
    assert_eq!(unread(&app, &token).await, 3);

    let uri = format!("/api/notifications/{}/read", first.id);
    assert_eq!(post_auth(app.app(), &uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(unread(&app, &token).await, 2);

    // Already read.
    assert_eq!(post_auth(app.app(), &uri, &token).await.status(), StatusCode::NOT_FOUND);

    let json = body_json(
        get_auth(app.app(), "/api/notifications?unreadOnly=true", &token).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = post_auth(app.app(), "/api/notifications/read-all", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["markedRead"], 2);
    assert_eq!(unread(&app, &token).await, 0);
}

#[tokio::test]
async fn list_is_paginated() {
    let app = common::build_test_app();
    let (user, token) = app.user("ava@test.com", "model").await;
    for i in 0..5 {
        notify(&app, &user.id, &format!("N{i}")).await;
    }

    let json = body_json(
        get_auth(app.app(), "/api/notifications?limit=2&offset=1", &token).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn users_cannot_touch_each_others_notifications() {
    let app = common::build_test_app();
    let (owner, _) = app.user("ava@test.com", "model").await;
    let (_, intruder) = app.user("eve@test.com", "model").await;
    let notification = notify(&app, &owner.id, "Private").await;

    let read = format!("/api/notifications/{}/read", notification.id);
    assert_eq!(post_auth(app.app(), &read, &intruder).await.status(), StatusCode::NOT_FOUND);

    let delete = format!("/api/notifications/{}", notification.id);
    assert_eq!(delete_auth(app.app(), &delete, &intruder).await.status(), StatusCode::NOT_FOUND);

    let json = body_json(get_auth(app.app(), "/api/notifications", &intruder).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_notification() {
    let app = common::build_test_app();
    let (user, token) = app.user("ava@test.com", "model").await;
    let notification = notify(&app, &user.id, "Bye").await;

    let uri = format!("/api/notifications/{}", notification.id);
    assert_eq!(delete_auth(app.app(), &uri, &token).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(app.app(), &uri, &token).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(unread(&app, &token).await, 0);
}
