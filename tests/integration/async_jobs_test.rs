// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, create_test_app_with, start_single_page_site, test_settings, wait_until,
};
use axum::http::StatusCode;
use email_crawler::queue::job_queue::JobQueue;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_webhook_receiver() -> MockServer {
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&receiver)
        .await;
    receiver
}

#[tokio::test]
async fn async_scan_completes_and_notifies_webhook() {
    let site = start_single_page_site().await;
    let receiver = start_webhook_receiver().await;
    let app = create_test_app().await;

    let response = app
        .server
        .post("/scan/async")
        .json(&json!({
            "url": format!("{}/", site.uri()),
            "webhook_url": format!("{}/hook", receiver.uri()),
            "callback_id": "order-7",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let accepted: Value = response.json();
    let job_id = accepted["job_id"].as_str().unwrap().to_string();
    assert_eq!(accepted["status"], "queued");
    assert_eq!(
        accepted["check_status_url"],
        format!("/scan/status/{}", job_id)
    );

    let status_url = format!("/scan/status/{}", job_id);
    let completed = wait_until(Duration::from_secs(10), || async {
        let job: Value = app.server.get(&status_url).await.json();
        job["status"] == "completed"
    })
    .await;
    assert!(completed, "job did not complete in time");

    let job: Value = app.server.get(&status_url).await.json();
    assert_eq!(job["emails"], json!(["info@example.com"]));
    assert_eq!(job["callback_id"], "order-7");
    assert!(job["completed_at"].is_string());

    let delivered = wait_until(Duration::from_secs(5), || async {
        receiver
            .received_requests()
            .await
            .map_or(false, |requests| !requests.is_empty())
    })
    .await;
    assert!(delivered, "webhook was not delivered");

    app.shutdown().await;
}

#[tokio::test]
async fn async_scan_requires_url_and_webhook() {
    let app = create_test_app_with(test_settings(), false).await;

    let missing_url = app
        .server
        .post("/scan/async")
        .json(&json!({ "webhook_url": "https://hooks.example.com" }))
        .await;
    assert_eq!(missing_url.status_code(), StatusCode::BAD_REQUEST);

    let missing_webhook = app
        .server
        .post("/scan/async")
        .json(&json!({ "url": "https://example.com" }))
        .await;
    assert_eq!(missing_webhook.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = missing_webhook.json();
    assert!(body["error"].as_str().unwrap().contains("webhook_url"));
}

#[tokio::test]
async fn full_queue_rejects_new_jobs() {
    let mut settings = test_settings();
    settings.async_jobs.queue_capacity = 1;
    let app = create_test_app_with(settings, false).await;
    let request = json!({
        "url": "https://example.com",
        "webhook_url": "https://hooks.example.com",
    });

    let first = app.server.post("/scan/async").json(&request).await;
    assert_eq!(first.status_code(), StatusCode::ACCEPTED);

    let second = app.server.post("/scan/async").json(&request).await;
    assert_eq!(second.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

/// 排队中的任务可以取消，重复取消返回409，未知任务返回404
#[tokio::test]
async fn cancel_queued_job() {
    let app = create_test_app_with(test_settings(), false).await;
    let accepted: Value = app
        .server
        .post("/scan/async")
        .json(&json!({
            "url": "https://example.com",
            "webhook_url": "https://hooks.example.com",
        }))
        .await
        .json();
    let job_id = accepted["job_id"].as_str().unwrap();

    let response = app
        .server
        .delete(&format!("/scan/cancel/{}", job_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["job_id"], job_id);

    let job: Value = app
        .server
        .get(&format!("/scan/status/{}", job_id))
        .await
        .json();
    assert_eq!(job["status"], "cancelled");

    let again = app
        .server
        .delete(&format!("/scan/cancel/{}", job_id))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    let unknown = app.server.delete("/scan/cancel/does-not-exist").await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

/// 处理中的任务不能取消
#[tokio::test]
async fn processing_job_cannot_be_cancelled() {
    let app = create_test_app_with(test_settings(), false).await;
    let accepted: Value = app
        .server
        .post("/scan/async")
        .json(&json!({
            "url": "https://example.com",
            "webhook_url": "https://hooks.example.com",
        }))
        .await
        .json();
    let job_id = accepted["job_id"].as_str().unwrap();

    // Pull the job as a worker would, without running it
    let queue = app.state.queue.clone().unwrap();
    let job = queue
        .dequeue(Duration::from_millis(100))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.id, job_id);

    let response = app
        .server
        .delete(&format!("/scan/cancel/{}", job_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn jobs_overview_reports_queue_and_workers() {
    let app = create_test_app_with(test_settings(), false).await;
    let accepted: Value = app
        .server
        .post("/scan/async")
        .json(&json!({
            "url": "https://example.com",
            "webhook_url": "https://hooks.example.com",
        }))
        .await
        .json();

    let overview: Value = app.server.get("/scan/jobs").await.json();

    assert_eq!(overview["async_enabled"], true);
    assert_eq!(overview["queue_stats"]["queue_depth"], 1);
    assert_eq!(overview["queue_stats"]["active_jobs"], 1);
    assert_eq!(
        overview["queue_stats"]["active_job_ids"],
        json!([accepted["job_id"]])
    );
    assert_eq!(overview["workers"], 2);
    assert_eq!(overview["job_timeout"], "300s");
}

#[tokio::test]
async fn unknown_job_status_is_not_found() {
    let app = create_test_app_with(test_settings(), false).await;

    let response = app.server.get("/scan/status/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
