// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::scan_service::ScanService;
use crate::queue::job_queue::JobQueue;
use crate::workers::scan_worker::ScanWorker;
use crate::workers::webhook_dispatcher::WebhookDispatcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    scanner: Arc<ScanService>,
    dispatcher: WebhookDispatcher,
    job_timeout: Duration,
    poll_timeout: Duration,
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        scanner: Arc<ScanService>,
        dispatcher: WebhookDispatcher,
        job_timeout: Duration,
        poll_timeout: Duration,
    ) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            queue,
            scanner,
            dispatcher,
            job_timeout,
            poll_timeout,
            stop,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        let first_id = self.handles.len();
        for worker_id in first_id..first_id + count {
            let worker = ScanWorker::new(
                worker_id,
                self.queue.clone(),
                self.scanner.clone(),
                self.dispatcher.clone(),
                self.job_timeout,
                self.poll_timeout,
            );

            let stop = self.stop.subscribe();
            let handle = tokio::spawn(async move {
                worker.run(stop).await;
            });
            self.handles.push(handle);
        }
        info!("Started {} scan workers", count);
    }

    /// 正在运行的工作进程数量
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 关闭工作进程
    ///
    /// 发出停止信号并等待所有工作进程退出，处理中的任务会先完成
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.stop.send_replace(true);

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Worker task ended abnormally: {}", e);
            }
        }

        info!("Workers shut down successfully");
    }
}
