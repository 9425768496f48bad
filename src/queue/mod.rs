// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 异步扫描任务的持久化记录、待处理队列和活跃任务索引
pub mod job_queue;
