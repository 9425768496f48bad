// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use email_crawler::app;
use email_crawler::config::settings::Settings;
use email_crawler::presentation::state::AppState;
use email_crawler::workers::manager::WorkerManager;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub workers: Option<WorkerManager>,
}

impl TestApp {
    pub async fn shutdown(mut self) {
        if let Some(workers) = self.workers.as_mut() {
            workers.shutdown().await;
        }
    }
}

/// 使用进程内存储的测试配置
pub fn test_settings() -> Settings {
    let mut settings = Settings::defaults().unwrap();
    settings.redis.url = app::MEMORY_STORE_URL.to_string();
    settings.crawler.page_timeout_secs = 5;
    settings.async_jobs.workers = 2;
    settings.async_jobs.poll_timeout_secs = 1;
    settings.webhook.timeout_secs = 2;
    settings.webhook.backoff_secs = 1;
    settings
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(test_settings(), true).await
}

pub async fn create_test_app_with(settings: Settings, start_workers: bool) -> TestApp {
    let store = app::connect_store(&settings.redis.url).unwrap();
    let fetcher = app::default_fetcher(&settings).unwrap();
    let mut application = app::build_application(&settings, store, fetcher)
        .await
        .unwrap();

    if start_workers {
        if let Some(workers) = application.workers.as_mut() {
            workers.start_workers(settings.async_jobs.workers);
        }
    }

    let server = TestServer::new(application.router).unwrap();
    TestApp {
        server,
        state: application.state,
        workers: application.workers,
    }
}

/// 单页站点：正文里只有一个联系邮箱
pub async fn start_single_page_site() -> MockServer {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Contact: Info@Example.com</p></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&site)
        .await;
    site
}

/// 轮询直到条件成立或超时
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
