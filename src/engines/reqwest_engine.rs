// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{EngineError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("static selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));
static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[http-equiv]").expect("static selector"));

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，使用scraper解析HTML
#[derive(Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建新的抓取引擎
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求使用的User-Agent
    /// * `timeout` - 单页请求超时时间
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 非2xx响应不会返回错误，而是返回只带状态码的空页面，由调用方决定如何处理
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, EngineError> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout
            } else {
                EngineError::RequestFailed(e)
            }
        })?;

        let status_code = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(FetchedPage {
                status_code,
                ..FetchedPage::default()
            });
        }

        let content = response.text().await?;
        let mut page = parse_page(&content);
        page.status_code = status_code;

        debug!(
            url = %url,
            links = page.links.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// 从HTML中提取可见文本、链接和元刷新目标
pub fn parse_page(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    // Join text nodes with a space so adjacent nodes never glue into one token
    let text = document
        .select(&BODY_SELECTOR)
        .flat_map(|body| body.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let links = document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect();

    let meta_refresh = document
        .select(&META_SELECTOR)
        .find(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .and_then(parse_meta_refresh);

    FetchedPage {
        status_code: 0,
        text,
        links,
        meta_refresh,
    }
}

/// 解析 `content="0; url=https://example.com/es/"` 形式的元刷新声明
///
/// 没有 `url=` 部分时返回 None
pub fn parse_meta_refresh(content: &str) -> Option<String> {
    content.split(';').skip(1).find_map(|part| {
        let part = part.trim();
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("url") {
            return None;
        }
        let target = value.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        (!target.is_empty()).then(|| target.to_string())
    })
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
