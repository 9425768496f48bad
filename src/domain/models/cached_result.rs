// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 缓存的爬取结果
///
/// 由一次完成的爬取生成，重新爬取时覆盖，过期由存储负责
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResult {
    /// 已去重排序的邮箱列表
    pub emails: Vec<String>,
    /// 写入时间
    pub timestamp: DateTime<Utc>,
    /// 爬取参数和统计
    pub crawl_info: CrawlInfo,
}

/// 爬取统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrawlInfo {
    /// 爬取深度
    pub depth: usize,
    /// 访问的页面数
    pub pages_visited: usize,
}
