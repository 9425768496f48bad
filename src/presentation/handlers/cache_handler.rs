// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::cache::cache_manager::CacheStatsSnapshot;
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;
use crate::utils::url_utils::ensure_scheme;
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub url: Option<String>,
}

/// 缓存统计
pub async fn cache_stats(Extension(state): Extension<AppState>) -> Json<CacheStatsSnapshot> {
    Json(state.scanner.cache().stats().await)
}

/// 删除单个URL的缓存，不带 `url` 时清空全部
///
/// 与扫描一样先补全协议，保证两边得到同一个缓存键
pub async fn invalidate_cache(
    Extension(state): Extension<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<Value>, AppError> {
    let cache = state.scanner.cache();
    match query.url.filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            cache.invalidate(&ensure_scheme(&url)).await?;
            Ok(Json(json!({
                "message": format!("Cache invalidated for {}", url),
                "url": url,
            })))
        }
        None => {
            cache.clear_all().await?;
            Ok(Json(json!({ "message": "All cache entries cleared" })))
        }
    }
}
