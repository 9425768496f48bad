// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::helpers::{create_test_app_with, test_settings};
use axum::http::StatusCode;

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app_with(test_settings(), false).await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let app = create_test_app_with(test_settings(), false).await;

    let response = app.server.get("/v1/version").await;

    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

/// 关闭异步扫描后相关路由不存在
#[tokio::test]
async fn async_routes_absent_when_disabled() {
    let mut settings = test_settings();
    settings.async_jobs.enabled = false;
    let app = create_test_app_with(settings, false).await;

    let response = app.server.get("/scan/jobs").expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(app.workers.is_none());
}
