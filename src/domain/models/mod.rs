// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 缓存结果（cached_result）：一次爬取的可复用结果
/// - 扫描任务（scan_job）：异步扫描任务及其状态机、回调负载
pub mod cached_result;
pub mod scan_job;
