use chrono::Duration;
use serde_json::Value;

use crate::common::{TestApp, TestUser, routes};

/// Five users on one campus submit one minute apart. Returns the campus,
/// a viewer, and submission ids oldest first.
async fn five_submissions(app: &TestApp) -> (String, TestUser, Vec<String>) {
    let campus = app.create_campus("North").await;
    let challenge = app.create_todays_challenge(&campus, "Cartwheel").await;
    let mut ids = Vec::new();
    let mut viewer = None;
    for name in ["ann", "ben", "cat", "dan", "eve"] {
        let user = app.create_user(name, &campus).await;
        app.buy_in_for_yesterday(&user, &campus).await;
        ids.push(app.submit_ok(&user, &challenge, &campus).await);
        app.clock.advance(Duration::minutes(1));
        viewer = Some(user);
    }
    (campus, viewer.unwrap(), ids)
}

fn item_ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn pages_walk_newest_first_without_overlap() {
    let app = TestApp::spawn().await;
    let (campus, viewer, ids) = five_submissions(&app).await;
    let url = |cursor: Option<&str>| match cursor {
        Some(c) => format!("{}?limit=2&cursor={c}", routes::feed(&campus)),
        None => format!("{}?limit=2", routes::feed(&campus)),
    };

    let page1 = app.get_with_token(&url(None), &viewer.token).await;
    assert_eq!(page1.status, 200, "{}", page1.text);
    assert_eq!(item_ids(&page1.body), [ids[4].clone(), ids[3].clone()]);
    let cursor1 = page1.body["nextCursor"].as_str().unwrap().to_string();

    let page2 = app.get_with_token(&url(Some(&cursor1)), &viewer.token).await;
    assert_eq!(item_ids(&page2.body), [ids[2].clone(), ids[1].clone()]);
    let cursor2 = page2.body["nextCursor"].as_str().unwrap().to_string();

    let page3 = app.get_with_token(&url(Some(&cursor2)), &viewer.token).await;
    assert_eq!(item_ids(&page3.body), [ids[0].clone()]);
    assert!(page3.body.get("nextCursor").is_none(), "{}", page3.text);
}

#[tokio::test]
async fn items_carry_author_and_challenge() {
    let app = TestApp::spawn().await;
    let (campus, viewer, _) = five_submissions(&app).await;

    let res = app
        .get_with_token(&format!("{}?limit=1", routes::feed(&campus)), &viewer.token)
        .await;

    let item = &res.body["items"][0];
    assert_eq!(item["user"]["username"], "eve");
    assert_eq!(item["user"]["name"], "eve Test");
    assert!(item["user"]["profileImage"].is_null());
    assert_eq!(item["challenge"]["title"], "Cartwheel");
    assert_eq!(item["challenge"]["description"], "Cartwheel description");
}

#[tokio::test]
async fn equal_timestamps_still_page_deterministically() {
    let app = TestApp::spawn().await;
    let campus = app.create_campus("North").await;
    let challenge = app.create_todays_challenge(&campus, "Cartwheel").await;
    let mut ids = Vec::new();
    let mut last = None;
    for name in ["ann", "ben", "cat"] {
        let user = app.create_user(name, &campus).await;
        app.buy_in_for_yesterday(&user, &campus).await;
        ids.push(app.submit_ok(&user, &challenge, &campus).await);
        last = Some(user);
    }
    let viewer = last.unwrap();

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let url = match &cursor {
            Some(c) => format!("{}?limit=1&cursor={c}", routes::feed(&campus)),
            None => format!("{}?limit=1", routes::feed(&campus)),
        };
        let page = app.get_with_token(&url, &viewer.token).await;
        seen.extend(item_ids(&page.body));
        match page.body["nextCursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    ids.reverse();
    assert_eq!(seen, ids);
}

#[tokio::test]
async fn limit_is_clamped_and_defaulted() {
    let app = TestApp::spawn().await;
    let (campus, viewer, _) = five_submissions(&app).await;

    let zero = app
        .get_with_token(&format!("{}?limit=0", routes::feed(&campus)), &viewer.token)
        .await;
    assert_eq!(item_ids(&zero.body).len(), 1);

    let junk = app
        .get_with_token(&format!("{}?limit=lots", routes::feed(&campus)), &viewer.token)
        .await;
    assert_eq!(item_ids(&junk.body).len(), 5);
    assert!(junk.body.get("nextCursor").is_none());
}

#[tokio::test]
async fn other_campuses_are_not_mixed_in() {
    let app = TestApp::spawn().await;
    let (_, viewer, _) = five_submissions(&app).await;
    let quiet = app.create_campus("South").await;

    let res = app.get_with_token(&routes::feed(&quiet), &viewer.token).await;

    assert_eq!(res.status, 200);
    assert!(item_ids(&res.body).is_empty());
    assert!(res.body.get("nextCursor").is_none());
}

#[tokio::test]
async fn foreign_or_unknown_cursor_is_invalid() {
    let app = TestApp::spawn().await;
    let (_, viewer, ids) = five_submissions(&app).await;
    let quiet = app.create_campus("South").await;

    let res = app
        .get_with_token(&format!("{}?cursor={}", routes::feed(&quiet), ids[0]), &viewer.token)
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "INVALID_REQUEST");

    let res = app
        .get_with_token(&format!("{}?cursor=bogus", routes::feed(&quiet)), &viewer.token)
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn feed_is_readable_without_signing_in() {
    let app = TestApp::spawn().await;
    let (campus, _, ids) = five_submissions(&app).await;

    let res = app
        .get_without_token(&format!("{}?limit=2", routes::feed(&campus)))
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(item_ids(&res.body), [ids[4].clone(), ids[3].clone()]);
}
