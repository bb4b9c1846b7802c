#[path = "support/mod.rs"]
mod support;

use axum::http::StatusCode;
use reelshelf_core::api::routes::v1;
use serde_json::{Value, json};
use support::{bearer, register, spawn_app};

#[tokio::test]
async fn first_account_is_admin_and_later_ones_are_not() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let response = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "name": "trinity",
            "email": "Trinity@Example.com",
            "password": "follow-the-rabbit",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["email"], "trinity@example.com");
    assert!(body["token"].as_str().is_some_and(|t| t.len() == 43));

    let (_, token) = register(&app.server, "neo").await;
    let me = app
        .server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&token))
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<Value>()["user"]["role"], "user");
    Ok(())
}

#[tokio::test]
async fn registration_validates_and_detects_conflicts() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "morpheus").await;

    let weak = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({ "name": "tank", "email": "tank@zion.io", "password": "short" }))
        .await;
    weak.assert_status(StatusCode::BAD_REQUEST);
    assert!(
        weak.json::<Value>()["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("Password"))
    );

    app.server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "name": "MORPHEUS",
            "email": "other@zion.io",
            "password": "long-enough-password",
        }))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .post(v1::auth::REGISTER)
        .text("not json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let missing = app.server.get(v1::auth::ME).await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>()["error"]["status"], 401);

    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer("not-a-real-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get(v1::bookmarks::COLLECTION)
        .add_header("Authorization", "Token abc")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "cypher").await;

    app.server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "cypher", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "nobody", "password": "correct-horse-battery" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let ok = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "Cypher", "password": "correct-horse-battery" }))
        .await;
    ok.assert_status_ok();
    assert_eq!(ok.json::<Value>()["user"]["username"], "cypher");
    Ok(())
}

#[tokio::test]
async fn change_password_revokes_other_sessions() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let (_, first) = register(&app.server, "switch").await;

    let second = app
        .server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "switch", "password": "correct-horse-battery" }))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    app.server
        .put(v1::auth::CHANGE_PASSWORD)
        .add_header("Authorization", bearer(&first))
        .json(&json!({ "currentPassword": "nope-nope-nope", "newPassword": "brand-new-secret" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .put(v1::auth::CHANGE_PASSWORD)
        .add_header("Authorization", bearer(&first))
        .json(&json!({
            "currentPassword": "correct-horse-battery",
            "newPassword": "brand-new-secret",
        }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&second))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&first))
        .await
        .assert_status_ok();

    app.server
        .post(v1::auth::LOGIN)
        .json(&json!({ "username": "switch", "password": "brand-new-secret" }))
        .await
        .assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn profile_update_and_logout() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    register(&app.server, "apoc").await;
    let (_, token) = register(&app.server, "mouse").await;

    let updated = app
        .server
        .put(v1::auth::UPDATE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "username": "mouse_2",
            "avatar_url": "https://cdn.example.com/mouse.png",
        }))
        .await;
    updated.assert_status_ok();
    let user = &updated.json::<Value>()["user"];
    assert_eq!(user["username"], "mouse_2");
    assert_eq!(user["avatar_url"], "https://cdn.example.com/mouse.png");

    app.server
        .put(v1::auth::UPDATE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "username": "apoc" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .put(v1::auth::UPDATE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "avatar_url": "ftp://nope" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post(v1::auth::LOGOUT)
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(v1::auth::ME)
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn startup_hook_purges_expired_sessions() -> anyhow::Result<()> {
    use reelshelf_server::infra::startup::{ProdStartupHooks, StartupHooks};
    use std::time::Duration;

    let app = spawn_app().await?;
    register(&app.server, "oracle").await;

    ProdStartupHooks::with_purge_interval(Duration::from_millis(20))
        .run(&app.state)
        .await?;
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Live sessions survive the purge loop.
    let purged = app.state.auth_service.purge_expired_sessions().await?;
    assert_eq!(purged, 0);
    Ok(())
}
