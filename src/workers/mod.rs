// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 后台扫描工作器、工作器生命周期管理和Webhook投递
pub mod manager;
pub mod scan_worker;
pub mod webhook_dispatcher;
