// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 键值存储抽象及其Redis、内存实现，以及基于它的结果缓存
pub mod cache_manager;
pub mod memory_store;
pub mod redis_client;
pub mod store;
