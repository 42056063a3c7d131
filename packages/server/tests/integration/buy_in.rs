use rush_server::entity::buy_in;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn buy_in_defaults_to_tomorrow_on_own_campus() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;

    let res = app.post_with_token(routes::BUYINS, &json!({}), &user.token).await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["campusId"], campus.as_str());
    assert_eq!(res.body["userId"], user.id.as_str());
    assert_eq!(res.body["amount"], 1);
    assert_eq!(res.body["date"], "2025-05-11T00:00:00Z");
}

#[tokio::test]
async fn status_reflects_a_recorded_buy_in() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;
    let status = format!("{}?date=2025-06-01", routes::BUYIN_STATUS);

    let before = app.get_with_token(&status, &user.token).await;
    assert_eq!(before.status, 200, "{}", before.text);
    assert_eq!(before.body["hasBuyIn"], false);
    assert!(before.body["buyIn"].is_null());

    let res = app
        .post_with_token(routes::BUYINS, &json!({"date": "2025-06-01"}), &user.token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let after = app.get_with_token(&status, &user.token).await;
    assert_eq!(after.body["hasBuyIn"], true);
    assert_eq!(after.body["buyIn"]["date"], "2025-06-01T00:00:00Z");
}

#[tokio::test]
async fn status_defaults_to_today() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;
    app.post_with_token(routes::BUYINS, &json!({"date": "2025-05-10"}), &user.token)
        .await;

    let res = app.get_with_token(routes::BUYIN_STATUS, &user.token).await;

    assert_eq!(res.body["hasBuyIn"], true, "{}", res.text);
}

#[tokio::test]
async fn buying_in_twice_updates_amount_without_a_second_row() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;

    let first = app
        .post_with_token(
            routes::BUYINS,
            &json!({"date": "2025-05-11", "amount": 2}),
            &user.token,
        )
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    let second = app
        .post_with_token(
            routes::BUYINS,
            &json!({"date": "2025-05-11", "amount": 5}),
            &user.token,
        )
        .await;
    assert_eq!(second.status, 201, "{}", second.text);

    assert_eq!(second.body["amount"], 5);
    assert_eq!(buy_in::Entity::find().count(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn explicit_campus_is_honoured() {
    let app = TestApp::spawn().await;
    let home = app.create_campus("North").await;
    let away = app.create_campus("South").await;
    let user = app.create_user("alice", &home).await;

    let res = app
        .post_with_token(routes::BUYINS, &json!({"campusId": away}), &user.token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["campusId"], away.as_str());

    let home_status = app
        .get_with_token(&format!("{}?date=2025-05-11", routes::BUYIN_STATUS), &user.token)
        .await;
    assert_eq!(home_status.body["hasBuyIn"], false);
}

#[tokio::test]
async fn malformed_or_impossible_dates_are_rejected() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;

    for date in ["tomorrow", "2025-13-01", "2025-02-30", "2025-05"] {
        let res = app
            .post_with_token(routes::BUYINS, &json!({"date": date}), &user.token)
            .await;
        assert_eq!(res.status, 400, "{date}: {}", res.text);
        assert_eq!(res.code(), "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;

    let res = app
        .post_with_token(routes::BUYINS, &json!({"amount": 0}), &user.token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "INVALID_REQUEST");
}

#[tokio::test]
async fn caller_without_profile_must_name_a_campus() {
    let app = TestApp::spawn().await;
    let token = crate::common::token_for("ghost", "user");

    let res = app.post_with_token(routes::BUYINS, &json!({}), &token).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "INVALID_REQUEST");
}

#[tokio::test]
async fn unknown_campus_is_not_found() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;

    let res = app
        .post_with_token(routes::BUYINS, &json!({"campusId": "nowhere"}), &user.token)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn buy_in_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app.post_without_token(routes::BUYINS, &json!({})).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "UNAUTHENTICATED");
}
