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

use crate::domain::services::link_classifier::is_contact_link;
use crate::engines::traits::PageFetcher;
use crate::utils::url_utils;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("static email regex")
});

/// 一次爬取的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// 小写、去重并排序后的邮箱
    pub emails: Vec<String>,
    /// 成功抓取的页面数
    pub pages_visited: usize,
}

/// 使用动态页面获取器的爬虫，服务与工作器共享
pub type DynCrawler = EmailCrawler<Arc<dyn PageFetcher>>;

/// 邮箱爬虫
///
/// 从起始URL出发，在同一主机内做有界深度优先遍历，优先进入联系页
pub struct EmailCrawler<F: PageFetcher> {
    /// 页面获取器
    fetcher: F,
    /// 最大深度
    max_depth: usize,
}

impl<F: PageFetcher> EmailCrawler<F> {
    /// 创建新的邮箱爬虫
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面获取器
    /// * `max_depth` - 最大遍历深度，起始页为0
    pub fn new(fetcher: F, max_depth: usize) -> Self {
        Self { fetcher, max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 执行一次完整爬取
    ///
    /// 单页的抓取或解析失败只会被记录，不会中断整个爬取，因此该方法不返回错误
    #[instrument(skip(self, start_url), fields(start = %start_url, max_depth = self.max_depth))]
    pub async fn crawl(&self, start_url: &Url) -> CrawlOutcome {
        let started = Instant::now();
        let mut session = CrawlSession::new(start_url, self.max_depth);

        while let Some((url, depth)) = session.next_target() {
            debug!(depth, url = %url, "Crawling");

            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %url, error = %e, "Error fetching page");
                    continue;
                }
            };

            if !page.is_success() {
                warn!(url = %url, status = page.status_code, "Non-success status");
                continue;
            }
            session.pages_visited += 1;
            counter!("crawl_pages_fetched_total").increment(1);

            if let Some(target) = page.meta_refresh.as_deref() {
                if let Ok(redirect) = url_utils::resolve_url(&url, target) {
                    debug!(from = %url, to = %redirect, "Following meta refresh");
                    // Redirects keep the depth of the page that declared them
                    session.push(redirect, depth);
                    continue;
                }
            }

            let found = session.record_emails(&page.text);
            if found > 0 {
                debug!(url = %url, found, "Found emails");
            }

            session.schedule_links(&url, &page.links, depth);
        }

        let outcome = session.finish();
        histogram!("crawl_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            emails = outcome.emails.len(),
            pages_visited = outcome.pages_visited,
            "Crawl finished"
        );
        outcome
    }
}

/// 单次爬取的执行上下文
///
/// 访问集合与邮箱集合只属于一次爬取，不会在爬取之间共享
struct CrawlSession {
    base_host: Option<String>,
    base_port: Option<u16>,
    max_depth: usize,
    frontier: Vec<(Url, usize)>,
    visited: HashSet<String>,
    emails: HashSet<String>,
    pages_visited: usize,
}

impl CrawlSession {
    fn new(start_url: &Url, max_depth: usize) -> Self {
        Self {
            base_host: start_url.host_str().map(str::to_string),
            base_port: start_url.port(),
            max_depth,
            frontier: vec![(start_url.clone(), 0)],
            visited: HashSet::new(),
            emails: HashSet::new(),
            pages_visited: 0,
        }
    }

    fn push(&mut self, url: Url, depth: usize) {
        self.frontier.push((url, depth));
    }

    /// 取出下一个可访问的目标并标记为已访问
    fn next_target(&mut self) -> Option<(Url, usize)> {
        while let Some((mut url, depth)) = self.frontier.pop() {
            url.set_fragment(None);
            if depth > self.max_depth || !self.same_host(&url) {
                continue;
            }
            // Marked before fetching so another edge to the same page is ignored
            if !self.visited.insert(url.to_string()) {
                continue;
            }
            return Some((url, depth));
        }
        None
    }

    fn same_host(&self, url: &Url) -> bool {
        url.host_str().is_some()
            && url.host_str() == self.base_host.as_deref()
            && url.port() == self.base_port
    }

    fn record_emails(&mut self, text: &str) -> usize {
        let before = self.emails.len();
        for email in extract_emails(text) {
            self.emails.insert(email);
        }
        self.emails.len() - before
    }

    /// 将页面链接加入待访问列表
    ///
    /// 逆序压栈，保证按文档顺序出栈；联系页链接不增加深度
    fn schedule_links(&mut self, current: &Url, links: &[String], depth: usize) {
        for href in links.iter().rev() {
            let Ok(next) = url_utils::resolve_url(current, href) else {
                continue;
            };
            let next_depth = if is_contact_link(&url_utils::decoded_path(&next)) {
                depth
            } else {
                depth + 1
            };
            if next_depth > self.max_depth {
                continue;
            }
            self.push(next, next_depth);
        }
    }

    fn finish(self) -> CrawlOutcome {
        let mut emails: Vec<String> = self.emails.into_iter().collect();
        emails.sort();
        CrawlOutcome {
            emails,
            pages_visited: self.pages_visited,
        }
    }
}

/// 从文本中提取邮箱，结果已转为小写
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
