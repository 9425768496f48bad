// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用组装
///
/// 根据配置把存储、缓存、爬虫、队列和路由连接起来
pub mod app;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含扫描任务模型、爬取与扫描服务
pub mod domain;

/// 引擎模块
///
/// 页面获取接口及其reqwest实现
pub mod engines;

/// 基础设施模块
///
/// 键值存储、结果缓存和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 队列模块
///
/// 异步扫描任务的存储与排队
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理和工作器管理
pub mod workers;
