use chrono::Duration;
use serde_json::json;

use crate::common::{TestApp, routes, token_for};

#[tokio::test]
async fn admin_schedules_and_users_list() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;
    let now = app.clock_now();
    app.create_challenge(&campus, "Second", now + Duration::days(1), now + Duration::days(2))
        .await;
    app.create_challenge(&campus, "First", now, now + Duration::hours(6))
        .await;

    let res = app
        .get_with_token(&format!("{}?campus={campus}", routes::CHALLENGES), &user.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let titles: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["First", "Second"]);
}

#[tokio::test]
async fn window_must_be_ordered() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let now = app.clock_now();

    let res = app
        .post_with_token(
            routes::CHALLENGES,
            &json!({
                "campusId": campus,
                "title": "Backwards",
                "description": "d",
                "scheduledAt": now,
                "expiresAt": now,
            }),
            &app.admin_token(),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "INVALID_REQUEST");
}

#[tokio::test]
async fn only_admins_schedule() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let now = app.clock_now();

    let res = app
        .post_with_token(
            routes::CHALLENGES,
            &json!({
                "campusId": campus,
                "title": "Nope",
                "description": "d",
                "scheduledAt": now,
                "expiresAt": now + Duration::hours(1),
            }),
            &token_for("u1", "user"),
        )
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn today_is_the_challenge_active_now() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;
    let now = app.clock_now();
    app.create_challenge(&campus, "Yesterday", now - Duration::days(1), now - Duration::hours(1))
        .await;
    app.create_todays_challenge(&campus, "Today").await;

    let res = app
        .get_with_token(&format!("{}?campus={campus}", routes::CHALLENGES_TODAY), &user.token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["title"], "Today");

    app.clock.advance(Duration::days(1));
    let res = app
        .get_with_token(&format!("{}?campus={campus}", routes::CHALLENGES_TODAY), &user.token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn featured_picks_the_earliest_bonus_challenge() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let user = app.create_user("alice", &campus).await;
    let now = app.clock_now();
    let schedule = [
        ("Plain", 0, false),
        ("Late bonus", 2, true),
        ("Early bonus", 1, true),
    ];
    for (title, offset, bonus) in schedule {
        let res = app
            .post_with_token(
                routes::CHALLENGES,
                &json!({
                    "campusId": campus,
                    "title": title,
                    "description": "d",
                    "scheduledAt": now + Duration::days(offset),
                    "expiresAt": now + Duration::days(offset + 1),
                    "isBonus": bonus,
                }),
                &app.admin_token(),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app
        .get_with_token(&format!("{}?campus={campus}", routes::CHALLENGES_FEATURED), &user.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["title"], "Early bonus");
    assert_eq!(res.body["isBonus"], true);
}

#[tokio::test]
async fn stats_count_only_verified_submissions() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let alice = app.create_user("alice", &campus).await;
    let bob = app.create_user("bob", &campus).await;
    let challenge = app.create_todays_challenge(&campus, "Cartwheel").await;
    app.buy_in_for_yesterday(&alice, &campus).await;
    app.submit_ok(&alice, &challenge, &campus).await;
    let now = app.clock_now();
    app.insert_verified_submission(&bob.id, &challenge, &campus, Some(1), None, now, Some(now))
        .await;

    let res = app
        .get_with_token(&routes::challenge_stats(&challenge), &alice.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["verifiedCount"], 1);

    let missing = app
        .get_with_token(&routes::challenge_stats("nope"), &alice.token)
        .await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn challenge_reads_are_public() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let challenge = app.create_todays_challenge(&campus, "Cartwheel").await;

    let list = app
        .get_without_token(&format!("{}?campus={campus}", routes::CHALLENGES))
        .await;
    assert_eq!(list.status, 200, "{}", list.text);
    assert_eq!(list.body[0]["id"], challenge.as_str());

    let today = app
        .get_without_token(&format!("{}?campus={campus}", routes::CHALLENGES_TODAY))
        .await;
    assert_eq!(today.status, 200);

    let featured = app
        .get_without_token(&format!("{}?campus={campus}", routes::CHALLENGES_FEATURED))
        .await;
    assert_eq!(featured.status, 404, "no bonus challenge yet");

    let stats = app
        .get_without_token(&routes::challenge_stats(&challenge))
        .await;
    assert_eq!(stats.status, 200);
    assert_eq!(stats.body["verifiedCount"], 0);
}
