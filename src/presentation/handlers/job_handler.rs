// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan_job::{AsyncScanRequest, AsyncScanResponse, ScanJob};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;
use crate::queue::job_queue::{JobQueue, QueueStats};
use crate::utils::url_utils::parse_scan_url;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct JobsOverview {
    pub async_enabled: bool,
    pub queue_stats: QueueStats,
    pub workers: usize,
    pub job_timeout: String,
}

fn queue(state: &AppState) -> Result<&Arc<dyn JobQueue>, AppError> {
    state
        .queue
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Async scanning is disabled".to_string()))
}

/// 提交异步扫描
///
/// 校验参数后入队，返回202；队列已满时返回503
pub async fn create_async_scan(
    Extension(state): Extension<AppState>,
    Json(mut request): Json<AsyncScanRequest>,
) -> Result<(StatusCode, Json<AsyncScanResponse>), AppError> {
    let queue = queue(&state)?;

    if request.url.trim().is_empty() {
        return Err(AppError::BadRequest("url is required".to_string()));
    }
    let url = parse_scan_url(&request.url).map_err(AppError::BadRequest)?;
    if request.webhook_url.trim().is_empty() {
        return Err(AppError::BadRequest("webhook_url is required".to_string()));
    }
    let webhook = url::Url::parse(request.webhook_url.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook_url: {}", e)))?;
    if !matches!(webhook.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(
            "Invalid webhook_url: only http and https are supported".to_string(),
        ));
    }

    let depth = queue.queue_depth().await?;
    if depth >= state.jobs.queue_capacity {
        warn!(depth, capacity = state.jobs.queue_capacity, "Job queue is full");
        return Err(AppError::ServiceUnavailable(
            "Job queue is full, try again later".to_string(),
        ));
    }

    request.url = url.to_string();
    request.webhook_url = webhook.to_string();
    let job = queue.enqueue(&request).await?;

    Ok((StatusCode::ACCEPTED, Json(AsyncScanResponse::accepted(&job))))
}

/// 查询任务状态
pub async fn get_job_status(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ScanJob>, AppError> {
    let job = queue(&state)?.get_job(&job_id).await?;
    Ok(Json(job))
}

/// 取消排队中的任务
pub async fn cancel_job(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let job = queue(&state)?.cancel_job(&job_id).await?;
    Ok(Json(json!({
        "message": "Job cancelled",
        "job_id": job.id,
    })))
}

/// 队列与工作器概况
pub async fn list_jobs(
    Extension(state): Extension<AppState>,
) -> Result<Json<JobsOverview>, AppError> {
    let queue_stats = queue(&state)?.stats().await?;
    Ok(Json(JobsOverview {
        async_enabled: state.async_enabled(),
        queue_stats,
        workers: state.jobs.workers,
        job_timeout: format!("{}s", state.jobs.job_timeout_secs),
    }))
}
