// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{cache_handler, job_handler, scan_handler};
use crate::presentation::state::AppState;
use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// 异步扫描相关路由只在启用时挂载
pub fn routes(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/scan", get(scan_handler::scan))
        .route("/cache/stats", get(cache_handler::cache_stats))
        .route("/cache/invalidate", delete(cache_handler::invalidate_cache));

    if state.async_enabled() {
        router = router
            .route("/scan/async", post(job_handler::create_async_scan))
            .route("/scan/status/{job_id}", get(job_handler::get_job_status))
            .route("/scan/cancel/{job_id}", delete(job_handler::cancel_job))
            .route("/scan/jobs", get(job_handler::list_jobs));
    }

    router
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
