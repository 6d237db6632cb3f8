//! HTTP-level integration tests for registration, login and account updates.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, post_json, put_json_auth, register, register_and_login,
    TEST_PASSWORD,
};
use serde_json::json;

#[tokio::test]
async fn register_returns_created_user_without_password() {
    let (test, _) = common::build_test_app();

    let response = register(test.app(), "alice").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["image_file"], "default.jpg");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_validation_error() {
    let (test, _) = common::build_test_app();
    register(test.app(), "alice").await;

    let response = post_json(
        test.app(),
        "/register",
        json!({
            "username": "alice",
            "email": "other@example.com",
            "password": TEST_PASSWORD,
            "confirm_password": TEST_PASSWORD,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("username is taken"));
}

#[tokio::test]
async fn duplicate_email_is_a_validation_error() {
    let (test, _) = common::build_test_app();
    register(test.app(), "alice").await;

    let response = post_json(
        test.app(),
        "/register",
        json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
            "confirm_password": TEST_PASSWORD,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn mismatched_password_confirmation_is_rejected() {
    let (test, _) = common::build_test_app();

    let response = post_json(
        test.app(),
        "/register",
        json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "password123",
            "confirm_password": "password124",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("do not match"));
}

#[tokio::test]
async fn login_returns_bearer_token() {
    let (test, _) = common::build_test_app();
    register(test.app(), "alice").await;

    let response = post_json(
        test.app(),
        "/login",
        json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (test, _) = common::build_test_app();
    register(test.app(), "alice").await;

    let response = post_json(
        test.app(),
        "/login",
        json!({ "email": "alice@example.com", "password": "not-the-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let (test, _) = common::build_test_app();

    let response = post_json(
        test.app(),
        "/login",
        json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_requires_a_token() {
    let (test, _) = common::build_test_app();

    let response = get(test.app(), "/account").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(test.app(), "/account", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_returns_the_caller() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;

    let response = get_auth(test.app(), "/account", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "alice");
}

#[tokio::test]
async fn account_update_may_keep_own_values() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;

    let response = put_json_auth(
        test.app(),
        "/account",
        json!({ "username": "alice", "email": "alice@new.example.com" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["email"], "alice@new.example.com");
}

#[tokio::test]
async fn account_update_cannot_take_another_username() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;
    register(test.app(), "bob").await;

    let response =
        put_json_auth(test.app(), "/account", json!({ "username": "bob" }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
