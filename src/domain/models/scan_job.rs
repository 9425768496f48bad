// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// 扫描任务实体
///
/// 表示一次异步邮箱扫描的完整生命周期。任务由任务存储持有，
/// 只有工作器和取消路径会修改其状态。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    /// 任务唯一标识符
    #[serde(rename = "job_id")]
    pub id: String,
    /// 扫描起始URL
    pub url: String,
    /// 结果回调地址
    pub webhook_url: String,
    /// 调用方自定义的回调标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    /// 任务状态
    pub status: JobStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 开始处理时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// 进入终态的时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// 耗时的可读表示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
    /// 失败原因
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 发现的邮箱
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    /// 成功抓取的页面数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_visited: Option<usize>,
}

impl ScanJob {
    /// 根据请求创建一个处于排队状态的新任务
    pub fn new(request: &AsyncScanRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: request.url.clone(),
            webhook_url: request.webhook_url.clone(),
            callback_id: request.callback_id.clone().filter(|id| !id.is_empty()),
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            crawl_time: None,
            error: None,
            emails: None,
            pages_visited: None,
        }
    }

    /// 任务是否已进入终态
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Processing → Completed/Failed，或 Queued → Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已入队
    #[default]
    Queued,
    /// 处理中
    Processing,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
    /// 已取消
    Cancelled,
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// 是否允许迁移到目标状态
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Queued, JobStatus::Cancelled)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
                // Jobs that cannot even be parsed are failed straight from the queue
                | (JobStatus::Queued, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 异步扫描请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsyncScanRequest {
    /// 待扫描的网站
    #[serde(default)]
    pub url: String,
    /// 结果回调地址
    #[serde(default)]
    pub webhook_url: String,
    /// 调用方自定义的回调标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
}

/// 异步扫描受理响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncScanResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub estimated_time: String,
    pub webhook_url: String,
    pub check_status_url: String,
}

impl AsyncScanResponse {
    pub fn accepted(job: &ScanJob) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            estimated_time: "30-60s".to_string(),
            webhook_url: job.webhook_url.clone(),
            check_status_url: format!("/scan/status/{}", job.id),
        }
    }
}

/// Webhook 回调负载
///
/// 终态任务在某一时刻的快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    pub status: JobStatus,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_visited: Option<usize>,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ScanJob> for WebhookPayload {
    fn from(job: &ScanJob) -> Self {
        Self {
            job_id: job.id.clone(),
            callback_id: job.callback_id.clone(),
            status: job.status,
            url: job.url.clone(),
            emails: job.emails.clone(),
            crawl_time: job.crawl_time.clone(),
            pages_visited: job.pages_visited,
            completed_at: job.completed_at.unwrap_or_else(Utc::now),
            error: job.error.clone(),
        }
    }
}

/// 耗时的可读表示，例如 `1.52s`
pub fn format_crawl_time(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
