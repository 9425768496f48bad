// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with, start_single_page_site, test_settings};
use axum::http::StatusCode;
use serde_json::Value;

/// 未命中缓存的单页站点返回小写邮箱，再次扫描命中缓存
#[tokio::test]
async fn scan_single_page_then_hits_cache() {
    let site = start_single_page_site().await;
    let app = create_test_app_with(test_settings(), false).await;
    let target = format!("{}/", site.uri());

    let first = app.server.get("/scan").add_query_param("url", &target).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let body: Value = first.json();
    assert_eq!(body["emails"], serde_json::json!(["info@example.com"]));
    assert_eq!(body["from_cache"], false);
    assert!(body["crawl_time"].is_string());

    let second = app.server.get("/scan").add_query_param("url", &target).await;
    let body: Value = second.json();
    assert_eq!(body["emails"], serde_json::json!(["info@example.com"]));
    assert_eq!(body["from_cache"], true);

    let stats: Value = app.server.get("/cache/stats").await.json();
    assert_eq!(stats["enabled"], true);
    assert_eq!(stats["cached_urls"], 1);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
}

#[tokio::test]
async fn scan_without_url_is_bad_request() {
    let app = create_test_app_with(test_settings(), false).await;

    let response = app.server.get("/scan").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn scan_with_unsupported_scheme_is_bad_request() {
    let app = create_test_app_with(test_settings(), false).await;

    let response = app
        .server
        .get("/scan")
        .add_query_param("url", "ftp://example.com")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

/// 删除单条缓存后重新爬取，不带参数时清空全部
#[tokio::test]
async fn invalidate_cache_forces_recrawl() {
    let site = start_single_page_site().await;
    let app = create_test_app_with(test_settings(), false).await;
    let target = format!("{}/", site.uri());

    app.server.get("/scan").add_query_param("url", &target).await;

    let response = app
        .server
        .delete("/cache/invalidate")
        .add_query_param("url", &target)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = app
        .server
        .get("/scan")
        .add_query_param("url", &target)
        .await
        .json();
    assert_eq!(body["from_cache"], false);

    app.server.delete("/cache/invalidate").await;
    let stats: Value = app.server.get("/cache/stats").await.json();
    assert_eq!(stats["cached_urls"], 0);
}

/// 关闭缓存后每次都重新爬取
#[tokio::test]
async fn disabled_cache_never_serves_hits() {
    let site = start_single_page_site().await;
    let mut settings = test_settings();
    settings.cache.enabled = false;
    let app = create_test_app_with(settings, false).await;
    let target = format!("{}/", site.uri());

    app.server.get("/scan").add_query_param("url", &target).await;
    let body: Value = app
        .server
        .get("/scan")
        .add_query_param("url", &target)
        .await
        .json();

    assert_eq!(body["from_cache"], false);
    let stats: Value = app.server.get("/cache/stats").await.json();
    assert_eq!(stats["enabled"], false);
}

/// 不带协议、带末尾斜杠的地址删除的是扫描时写入的同一条缓存
#[tokio::test]
async fn invalidate_accepts_scheme_less_url() {
    let app = create_test_app_with(test_settings(), false).await;
    let cache = app.state.scanner.cache().clone();
    cache
        .set("https://example.com/", &["info@example.com".to_string()], 3, 1)
        .await
        .unwrap();

    let response = app
        .server
        .delete("/cache/invalidate")
        .add_query_param("url", "example.com/")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.state.scanner.lookup("https://example.com").await.is_none());
}
