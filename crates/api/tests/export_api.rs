//! HTTP-level integration tests for asynchronous user data export.

mod common;

use askbox_db::models::export_job::SubmitExportJob;
use askbox_db::JobQueue;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use common::{body_json, get, post_auth, post_question, put_json_auth, register_and_login};

async fn request_export(test: &common::TestApp, token: &str, username: &str) -> String {
    let response = post_auth(test.app(), &format!("/user/download/{username}"), token).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let location = response
        .headers()
        .get(LOCATION)
        .expect("202 must carry a Location header")
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Pending");
    assert_eq!(json["data"]["status_url"], location.as_str());
    location
}

#[tokio::test]
async fn export_requires_login() {
    let (test, _) = common::build_test_app();

    let response =
        common::post_json(test.app(), "/user/download/alice", serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn export_of_unknown_user_is_404() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;

    let response = post_auth(test.app(), "/user/download/nobody", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_is_pending_then_ready_with_newest_first_records() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;
    post_question(&test, &token, "Q1").await;
    post_question(&test, &token, "Q2").await;

    let location = request_export(&test, &token, "alice").await;
    assert!(location.starts_with("/task/"));

    let json = body_json(get(test.app(), &location).await).await;
    assert_eq!(json["data"], "Pending");

    let response = get(test.app(), &format!("{location}/result")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert!(test.worker.run_once().await.unwrap());

    let json = body_json(get(test.app(), &location).await).await;
    assert_eq!(json["data"], "Ready");

    let response = get(test.app(), &format!("{location}/result")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Question"], "Q2");
    assert_eq!(records[1]["Question"], "Q1");
    assert_eq!(records[0]["username"], "alice");
    assert_eq!(records[0]["Description"], "details about Q2");
    assert!(records[0]["date_posted"].is_string());
}

#[tokio::test]
async fn any_user_may_export_another_users_questions() {
    let (test, _) = common::build_test_app();
    let alice = register_and_login(&test, "alice").await;
    let bob = register_and_login(&test, "bob").await;
    post_question(&test, &alice, "Alice's question").await;

    let location = request_export(&test, &bob, "alice").await;
    assert!(test.worker.run_once().await.unwrap());

    let json = body_json(get(test.app(), &format!("{location}/result")).await).await;
    assert_eq!(json["data"][0]["username"], "alice");
}

#[tokio::test]
async fn failed_job_reports_failed_status() {
    let (test, _) = common::build_test_app();
    // The user vanished between enqueue and execution.
    let job = test
        .queue
        .submit(&SubmitExportJob {
            user_id: 9999,
            username: "ghost".into(),
            requested_by: 1,
        })
        .await
        .unwrap();

    assert!(test.worker.run_once().await.unwrap());

    let json = body_json(get(test.app(), &format!("/task/{}", job.id)).await).await;
    assert_eq!(json["data"], "Failed");

    let response = get(test.app(), &format!("/task/{}/result", job.id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn export_survives_rename_before_it_runs() {
    let (test, _) = common::build_test_app();
    let token = register_and_login(&test, "alice").await;
    post_question(&test, &token, "Q1").await;
    let location = request_export(&test, &token, "alice").await;

    let response = put_json_auth(
        test.app(),
        "/account",
        serde_json::json!({ "username": "alicia" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(test.worker.run_once().await.unwrap());

    let json = body_json(get(test.app(), &format!("{location}/result")).await).await;
    assert_eq!(json["data"][0]["username"], "alicia");
    assert_eq!(json["data"][0]["Question"], "Q1");
}

#[tokio::test]
async fn unknown_task_is_404() {
    let (test, _) = common::build_test_app();

    let response = get(test.app(), "/task/00000000-0000-0000-0000-000000000000").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
