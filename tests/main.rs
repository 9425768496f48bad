// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 测试主模块
///
/// 通过HTTP接口验证同步扫描、结果缓存、异步任务和Webhook投递
mod integration;
