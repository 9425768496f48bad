// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含与外部系统交互的技术实现：
/// - 缓存（cache）：键值存储抽象、Redis与内存实现、结果缓存
/// - 指标（metrics）：Prometheus指标导出
pub mod cache;
pub mod metrics;
