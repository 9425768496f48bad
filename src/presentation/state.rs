// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::AsyncJobSettings;
use crate::domain::services::scan_service::ScanService;
use crate::queue::job_queue::JobQueue;
use std::sync::Arc;

/// 处理器共享状态，通过 `Extension` 注入
#[derive(Clone)]
pub struct AppState {
    /// 同步扫描和缓存
    pub scanner: Arc<ScanService>,
    /// 任务队列，异步扫描关闭时为 `None`
    pub queue: Option<Arc<dyn JobQueue>>,
    /// 异步任务配置
    pub jobs: AsyncJobSettings,
}

impl AppState {
    pub fn async_enabled(&self) -> bool {
        self.jobs.enabled && self.queue.is_some()
    }
}
