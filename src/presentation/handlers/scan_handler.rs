// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::scan_service::{ScanError, ScanResponse};
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    pub url: Option<String>,
}

/// 同步扫描
///
/// `GET /scan?url=`，调用方阻塞直到爬取结束或命中缓存
pub async fn scan(
    Extension(state): Extension<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanResponse>, AppError> {
    let url = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ScanError::InvalidUrl("URL parameter is required".to_string()))?;

    let response = state.scanner.scan(&url).await?;
    Ok(Json(response))
}
