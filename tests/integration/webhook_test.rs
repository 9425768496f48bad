// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, start_single_page_site, wait_until};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 回调端点一直返回500：恰好尝试3次，任务状态保持不变
#[tokio::test]
async fn failing_webhook_is_attempted_three_times_without_touching_job() {
    let site = start_single_page_site().await;
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&receiver)
        .await;

    let app = create_test_app().await;
    let accepted: Value = app
        .server
        .post("/scan/async")
        .json(&json!({
            "url": format!("{}/", site.uri()),
            "webhook_url": format!("{}/hook", receiver.uri()),
        }))
        .await
        .json();
    let status_url = format!("/scan/status/{}", accepted["job_id"].as_str().unwrap());

    // Backoff base is 1s, so three attempts span about 3s
    let attempted = wait_until(Duration::from_secs(10), || async {
        receiver
            .received_requests()
            .await
            .map_or(false, |requests| requests.len() >= 3)
    })
    .await;
    assert!(attempted, "webhook was not retried");

    tokio::time::sleep(Duration::from_millis(500)).await;
    let job: Value = app.server.get(&status_url).await.json();
    assert_eq!(job["status"], "completed");
    assert_eq!(job["emails"], json!(["info@example.com"]));

    app.shutdown().await;
    receiver.verify().await;
}
