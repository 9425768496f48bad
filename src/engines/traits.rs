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

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
}

/// 抓取到的页面
///
/// 页面获取与HTML解析的结果，爬虫只关心可见文本、超链接和元刷新目标
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status_code: u16,
    /// `<body>` 中的可见文本
    pub text: String,
    /// 所有 `<a href>` 的原始值，按文档顺序
    pub links: Vec<String>,
    /// `<meta http-equiv="refresh">` 中声明的跳转目标（未解析的原始值）
    pub meta_refresh: Option<String>,
}

impl FetchedPage {
    /// 状态码是否为2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 页面获取特质
///
/// 爬虫引擎只通过该接口访问网络
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取并解析页面
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, EngineError> {
        (**self).fetch(url).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
