// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan_job::{
    format_crawl_time, AsyncScanRequest, JobStatus, ScanJob,
};
use crate::infrastructure::cache::store::{SharedStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const JOB_KEY_PREFIX: &str = "crawler:job:";
const QUEUE_KEY: &str = "crawler:job_queue";
const ACTIVE_KEY: &str = "crawler:active_jobs";

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 存储错误
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// 任务不存在
    #[error("Job not found: {0}")]
    NotFound(String),

    /// 任务处理中，不能取消
    #[error("Job {0} is already processing and cannot be cancelled")]
    NotCancellable(String),

    /// 任务已进入终态
    #[error("Job {0} is already finished")]
    AlreadyFinished(String),

    /// 非法状态迁移
    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// 队列统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStats {
    /// 等待处理的任务数
    pub queue_depth: u64,
    /// 尚未进入终态的任务数
    pub active_jobs: usize,
    /// 尚未进入终态的任务ID
    pub active_job_ids: Vec<String>,
}

/// 任务队列特质
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队任务
    async fn enqueue(&self, request: &AsyncScanRequest) -> Result<ScanJob, QueueError>;

    /// 阻塞等待下一个任务，超时返回 `Ok(None)`
    async fn dequeue(&self, timeout: Duration) -> Result<Option<ScanJob>, QueueError>;

    /// 查询任务
    async fn get_job(&self, job_id: &str) -> Result<ScanJob, QueueError>;

    /// 持久化任务记录
    async fn update_job(&self, job: &ScanJob) -> Result<(), QueueError>;

    /// 完成任务
    async fn complete_job(
        &self,
        job: &mut ScanJob,
        emails: Vec<String>,
        pages_visited: usize,
        crawl_time: Duration,
    ) -> Result<(), QueueError>;

    /// 失败任务
    async fn fail_job(&self, job: &mut ScanJob, message: &str) -> Result<(), QueueError>;

    /// 取消排队中的任务
    async fn cancel_job(&self, job_id: &str) -> Result<ScanJob, QueueError>;

    /// 尚未进入终态的任务ID
    async fn active_jobs(&self) -> Result<Vec<String>, QueueError>;

    /// 等待处理的任务数
    async fn queue_depth(&self) -> Result<u64, QueueError>;

    /// 队列统计
    async fn stats(&self) -> Result<QueueStats, QueueError> {
        let mut active_job_ids = self.active_jobs().await?;
        active_job_ids.sort();
        Ok(QueueStats {
            queue_depth: self.queue_depth().await?,
            active_jobs: active_job_ids.len(),
            active_job_ids,
        })
    }
}

/// 基于键值存储的任务队列
///
/// 任务记录保存在 `crawler:job:{id}`，待处理ID在列表 `crawler:job_queue`，
/// 未终结的ID在集合 `crawler:active_jobs`
pub struct KvJobQueue {
    store: SharedStore,
    retention: Duration,
}

impl KvJobQueue {
    /// 创建新的任务队列实例
    ///
    /// # 参数
    ///
    /// * `store` - 底层存储
    /// * `retention` - 任务记录的保留时间
    pub fn new(store: SharedStore, retention: Duration) -> Self {
        Self { store, retention }
    }

    fn job_key(job_id: &str) -> String {
        format!("{}{}", JOB_KEY_PREFIX, job_id)
    }

    async fn load(&self, job_id: &str) -> Result<Option<ScanJob>, QueueError> {
        match self.store.get(&Self::job_key(job_id)).await? {
            Some(raw) => {
                let job = serde_json::from_str(&raw).map_err(StoreError::from)?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, job: &ScanJob) -> Result<(), QueueError> {
        let raw = serde_json::to_string(job).map_err(StoreError::from)?;
        self.store
            .set_ex(&Self::job_key(&job.id), &raw, self.retention)
            .await?;
        Ok(())
    }

    fn transition(job: &mut ScanJob, next: JobStatus) -> Result<(), QueueError> {
        if job.status.is_terminal() {
            return Err(QueueError::AlreadyFinished(job.id.clone()));
        }
        if !job.status.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                id: job.id.clone(),
                from: job.status,
                to: next,
            });
        }
        job.status = next;
        Ok(())
    }

    /// 以存储中的状态为准拒绝终态任务，内存副本可能已经过期
    async fn ensure_not_finished(&self, job: &ScanJob) -> Result<(), QueueError> {
        match self.load(&job.id).await? {
            Some(stored) if stored.is_terminal() => {
                Err(QueueError::AlreadyFinished(job.id.clone()))
            }
            _ => Ok(()),
        }
    }

    async fn finish(&self, job: &ScanJob) -> Result<(), QueueError> {
        self.save(job).await?;
        self.store.srem(ACTIVE_KEY, &job.id).await?;
        Ok(())
    }
}

#[async_trait]
impl JobQueue for KvJobQueue {
    async fn enqueue(&self, request: &AsyncScanRequest) -> Result<ScanJob, QueueError> {
        let job = ScanJob::new(request);
        self.save(&job).await?;
        self.store.lpush(QUEUE_KEY, &job.id).await?;
        self.store.sadd(ACTIVE_KEY, &job.id).await?;

        info!(job_id = %job.id, url = %job.url, "Job enqueued");
        Ok(job)
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<ScanJob>, QueueError> {
        let Some(job_id) = self.store.brpop(QUEUE_KEY, timeout).await? else {
            return Ok(None);
        };

        let Some(mut job) = self.load(&job_id).await? else {
            warn!(job_id = %job_id, "Dequeued job has no record, skipping");
            self.store.srem(ACTIVE_KEY, &job_id).await?;
            return Ok(None);
        };
        if job.status != JobStatus::Queued {
            debug!(job_id = %job_id, status = %job.status, "Dequeued job is no longer queued, skipping");
            return Ok(None);
        }

        Self::transition(&mut job, JobStatus::Processing)?;
        job.started_at = Some(Utc::now());
        self.save(&job).await?;
        Ok(Some(job))
    }

    async fn get_job(&self, job_id: &str) -> Result<ScanJob, QueueError> {
        self.load(job_id)
            .await?
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))
    }

    async fn update_job(&self, job: &ScanJob) -> Result<(), QueueError> {
        self.save(job).await
    }

    async fn complete_job(
        &self,
        job: &mut ScanJob,
        emails: Vec<String>,
        pages_visited: usize,
        crawl_time: Duration,
    ) -> Result<(), QueueError> {
        // The caller's job only changes once the new state is persisted
        let mut updated = job.clone();
        Self::transition(&mut updated, JobStatus::Completed)?;
        self.ensure_not_finished(job).await?;
        updated.completed_at = Some(Utc::now());
        updated.emails = Some(emails);
        updated.pages_visited = Some(pages_visited);
        updated.crawl_time = Some(format_crawl_time(crawl_time));
        updated.error = None;
        self.finish(&updated).await?;
        *job = updated;

        info!(job_id = %job.id, pages_visited, "Job completed");
        Ok(())
    }

    async fn fail_job(&self, job: &mut ScanJob, message: &str) -> Result<(), QueueError> {
        let mut updated = job.clone();
        Self::transition(&mut updated, JobStatus::Failed)?;
        self.ensure_not_finished(job).await?;
        updated.completed_at = Some(Utc::now());
        updated.error = Some(message.to_string());
        self.finish(&updated).await?;
        *job = updated;

        warn!(job_id = %job.id, error = message, "Job failed");
        Ok(())
    }

    async fn cancel_job(&self, job_id: &str) -> Result<ScanJob, QueueError> {
        let mut job = self.get_job(job_id).await?;
        match job.status {
            JobStatus::Processing => return Err(QueueError::NotCancellable(job.id)),
            status if status.is_terminal() => return Err(QueueError::AlreadyFinished(job.id)),
            _ => {}
        }

        Self::transition(&mut job, JobStatus::Cancelled)?;
        job.completed_at = Some(Utc::now());
        self.save(&job).await?;
        self.store.lrem(QUEUE_KEY, &job.id).await?;
        self.store.srem(ACTIVE_KEY, &job.id).await?;

        info!(job_id = %job.id, "Job cancelled");
        Ok(job)
    }

    async fn active_jobs(&self) -> Result<Vec<String>, QueueError> {
        Ok(self.store.smembers(ACTIVE_KEY).await?)
    }

    async fn queue_depth(&self) -> Result<u64, QueueError> {
        Ok(self.store.llen(QUEUE_KEY).await?)
    }
}

#[cfg(test)]
#[path = "job_queue_test.rs"]
mod tests;
