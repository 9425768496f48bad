// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：扫描任务、缓存结果等数据结构
/// - 服务（services）：爬取、链接分类和扫描流程
pub mod models;
pub mod services;
