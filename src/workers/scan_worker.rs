// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan_job::{JobStatus, ScanJob};
use crate::domain::services::scan_service::ScanService;
use crate::infrastructure::cache::cache_manager::CacheManager;
use crate::queue::job_queue::{JobQueue, QueueError};
use crate::utils::url_utils::parse_scan_url;
use crate::workers::webhook_dispatcher::WebhookDispatcher;
use metrics::counter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument};

/// 存储出错后的等待时间
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// 扫描工作器
///
/// 从任务队列取出任务，走缓存优先的扫描流程，并在结束后投递回调
pub struct ScanWorker {
    worker_id: usize,
    queue: Arc<dyn JobQueue>,
    scanner: Arc<ScanService>,
    dispatcher: WebhookDispatcher,
    job_timeout: Duration,
    poll_timeout: Duration,
}

impl ScanWorker {
    pub fn new(
        worker_id: usize,
        queue: Arc<dyn JobQueue>,
        scanner: Arc<ScanService>,
        dispatcher: WebhookDispatcher,
        job_timeout: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            worker_id,
            queue,
            scanner,
            dispatcher,
            job_timeout,
            poll_timeout,
        }
    }

    /// 运行工作循环，直到收到停止信号
    ///
    /// 停止信号只在两次出队之间检查，出队等待由 `poll_timeout` 限定；
    /// 已弹出的任务总会被处理完
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        info!("Scan worker {} started", self.worker_id);

        while !*stop.borrow() {
            match self.queue.dequeue(self.poll_timeout).await {
                Ok(Some(job)) => {
                    self.process_job(job).await;
                }
                Ok(None) => {
                    debug!(worker_id = self.worker_id, "No job available");
                }
                Err(e) => {
                    error!(worker_id = self.worker_id, error = %e, "Error dequeuing job");
                    // Nothing is in flight here, so the stop signal may cut the backoff short
                    tokio::select! {
                        _ = sleep(ERROR_BACKOFF) => {}
                        _ = stop.changed() => {}
                    }
                }
            }
        }

        info!("Scan worker {} stopped", self.worker_id);
    }

    /// 处理单个任务
    ///
    /// 任务总会进入终态（除非存储不可用），随后调用一次回调投递；
    /// 记录已被其他路径终结时保留存储中的状态且不投递
    #[instrument(skip(self, job), fields(worker_id = self.worker_id, job_id = %job.id, url = %job.url))]
    pub async fn process_job(&self, mut job: ScanJob) -> ScanJob {
        info!("Processing job");
        let started = Instant::now();

        match self.execute(&mut job, started).await {
            Ok(()) => {}
            Err(QueueError::AlreadyFinished(_)) => {
                // Someone else finalized the record while the crawl ran; that state wins
                info!("Job was finished elsewhere, dropping result");
                return self.queue.get_job(&job.id).await.unwrap_or(job);
            }
            Err(e) => {
                error!(error = %e, "Failed to persist job result");
                if !job.is_terminal() {
                    if let Err(e) = self.queue.fail_job(&mut job, &e.to_string()).await {
                        error!(error = %e, "Failed to mark job as failed");
                    }
                }
            }
        }

        match job.status {
            JobStatus::Completed => counter!("jobs_completed_total").increment(1),
            JobStatus::Failed => counter!("jobs_failed_total").increment(1),
            _ => {}
        }

        self.dispatcher.deliver(&job).await;
        job
    }

    async fn execute(&self, job: &mut ScanJob, started: Instant) -> Result<(), QueueError> {
        if let Some(cached) = self.scanner.lookup(&job.url).await {
            info!(emails = cached.emails.len(), "Completing job from cache");
            return self
                .queue
                .complete_job(
                    job,
                    cached.emails,
                    cached.crawl_info.pages_visited,
                    started.elapsed(),
                )
                .await;
        }

        let url = match parse_scan_url(&job.url) {
            Ok(url) => url,
            Err(message) => return self.queue.fail_job(job, &message).await,
        };

        match timeout(self.job_timeout, self.scanner.crawl_and_store(&url)).await {
            Ok(outcome) => {
                let emails = CacheManager::deduplicate_emails(&outcome.emails);
                self.queue
                    .complete_job(job, emails, outcome.pages_visited, started.elapsed())
                    .await
            }
            Err(_) => {
                let message = format!("Job timed out after {}s", self.job_timeout.as_secs());
                self.queue.fail_job(job, &message).await
            }
        }
    }
}

#[cfg(test)]
#[path = "scan_worker_test.rs"]
mod tests;
