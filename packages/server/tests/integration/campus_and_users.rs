use serde_json::json;

use crate::common::{TestApp, routes, token_for};

mod campus {
    use super::*;

    #[tokio::test]
    async fn admin_creates_and_anyone_lists() {
        let app = TestApp::spawn().await;
        let id = app.create_campus("North").await;
        app.create_campus("East").await;

        let res = app.get_without_token(routes::CAMPUS).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["East", "North"]);
        assert!(res.body.as_array().unwrap().iter().any(|c| c["id"] == id.as_str()));
    }

    #[tokio::test]
    async fn regular_user_cannot_create_campus() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(routes::CAMPUS, &json!({"name": "Rogue"}), &token_for("u1", "user"))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(routes::CAMPUS, &json!({"name": "   "}), &app.admin_token())
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_is_an_invalid_request() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(routes::CAMPUS, &json!({"title": "x"}), &app.admin_token())
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_REQUEST");
    }
}

mod signup {
    use super::*;

    #[tokio::test]
    async fn signup_normalizes_phone() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;

        let res = app
            .post_without_token(
                routes::USERS,
                &json!({
                    "name": "Alice",
                    "username": "alice",
                    "phoneNumber": "(555) 123-4567",
                    "campusId": campus,
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["phoneNumber"], "+15551234567");
        assert_eq!(res.body["campusId"], campus.as_str());
    }

    #[tokio::test]
    async fn duplicate_username_is_taken() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        app.create_user("alice", &campus).await;

        let res = app
            .post_without_token(
                routes::USERS,
                &json!({"name": "Other", "username": "alice", "campusId": campus}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn unknown_campus_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::USERS,
                &json!({"name": "Alice", "username": "alice", "campusId": "nowhere"}),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_username_is_rejected() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;

        let res = app
            .post_without_token(
                routes::USERS,
                &json!({"name": "Alice", "username": "no spaces!", "campusId": campus}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_REQUEST");
    }
}

mod onboarding {
    use super::*;

    #[tokio::test]
    async fn completes_a_new_profile_under_the_callers_id() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let token = token_for("verified-phone-user", "user");

        let res = app
            .post_with_token(
                routes::USERS_COMPLETE,
                &json!({
                    "name": "Pat",
                    "username": "pat",
                    "phoneNumber": "+44 20 7946 0958",
                    "campusId": campus,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], "verified-phone-user");
        assert_eq!(res.body["phoneNumber"], "+442079460958");

        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.body["username"], "pat");
    }

    #[tokio::test]
    async fn updates_the_profile_owning_the_phone() {
        let app = TestApp::spawn().await;
        let north = app.create_campus("North").await;
        let south = app.create_campus("South").await;
        let token = token_for("u-phone", "user");
        let body = |username: &str, campus: &str| {
            json!({
                "name": "Pat",
                "username": username,
                "phoneNumber": "5551234567",
                "campusId": campus,
            })
        };
        let first = app
            .post_with_token(routes::USERS_COMPLETE, &body("pat", &north), &token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);

        let second = app
            .post_with_token(routes::USERS_COMPLETE, &body("patrick", &south), &token)
            .await;

        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.body["username"], "patrick");
        assert_eq!(second.body["campusId"], south.as_str());
    }

    #[tokio::test]
    async fn phone_owned_by_someone_else_is_denied() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let body = json!({
            "name": "Pat",
            "username": "pat",
            "phoneNumber": "5551234567",
            "campusId": campus,
        });
        app.post_with_token(routes::USERS_COMPLETE, &body, &token_for("owner", "user"))
            .await;

        let mut hijack = body.clone();
        hijack["username"] = json!("thief");
        let res = app
            .post_with_token(routes::USERS_COMPLETE, &hijack, &token_for("intruder", "user"))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn me_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn users_can_look_each_other_up() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let alice = app.create_user("alice", &campus).await;
        let bob = app.create_user("bob", &campus).await;

        let res = app.get_with_token(&routes::user(&bob.id), &alice.token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "bob");

        let missing = app.get_with_token(&routes::user("nobody"), &alice.token).await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn profiles_are_public() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let bob = app.create_user("bob", &campus).await;

        let res = app.get_without_token(&routes::user(&bob.id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["username"], "bob");
    }

    #[tokio::test]
    async fn profile_image_can_be_set() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let alice = app.create_user("alice", &campus).await;

        let res = app
            .put_with_token(
                routes::PROFILE_IMAGE,
                &json!({"profileImage": "/api/v1/media/abc"}),
                &alice.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["profileImage"], "/api/v1/media/abc");

        let board = app
            .get_with_token(&format!("{}?campus={campus}", routes::LEADERBOARD), &alice.token)
            .await;
        assert_eq!(board.body[0]["avatar"], "/api/v1/media/abc");
    }
}

mod account_deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_removes_profile_buy_ins_and_submissions() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let alice = app.create_user("alice", &campus).await;
        let bob = app.create_user("bob", &campus).await;
        let challenge = app.create_todays_challenge(&campus, "Cartwheel").await;
        for user in [&alice, &bob] {
            app.buy_in_for_yesterday(user, &campus).await;
            app.submit_ok(user, &challenge, &campus).await;
        }

        let res = app.delete_with_token(routes::ME, &alice.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert_eq!(app.get_with_token(routes::ME, &alice.token).await.status, 404);
        let feed = app.get_without_token(&routes::feed(&campus)).await;
        let authors: Vec<&str> = feed.body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["user"]["username"].as_str().unwrap())
            .collect();
        assert_eq!(authors, ["bob"]);
        let status = app
            .get_with_token(
                &format!("{}?campusId={campus}", routes::BUYIN_STATUS),
                &alice.token,
            )
            .await;
        assert_eq!(status.body["hasBuyIn"], false);
    }

    #[tokio::test]
    async fn username_is_free_again_after_deletion() {
        let app = TestApp::spawn().await;
        let campus = app.create_campus("North").await;
        let alice = app.create_user("alice", &campus).await;

        app.delete_with_token(routes::ME, &alice.token).await;

        app.create_user("alice", &campus).await;
    }

    #[tokio::test]
    async fn deleting_requires_a_profile_and_a_token() {
        let app = TestApp::spawn().await;

        let anonymous = app.delete_without_token(routes::ME).await;
        assert_eq!(anonymous.status, 401);

        let ghost = app
            .delete_with_token(routes::ME, &token_for("ghost", "user"))
            .await;
        assert_eq!(ghost.status, 404);
        assert_eq!(ghost.code(), "NOT_FOUND");
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
}
