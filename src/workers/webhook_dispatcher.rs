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

use crate::config::settings::WebhookSettings;
use crate::domain::models::scan_job::{JobStatus, ScanJob, WebhookPayload};
use crate::utils::retry_policy::RetryPolicy;
use hmac::{Hmac, Mac};
use metrics::{counter, histogram};
use reqwest::{header, Client};
use sha2::Sha256;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Email-Crawler-Signature";
pub const EVENT_HEADER: &str = "X-Email-Crawler-Event";

/// 一次投递的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 任务没有回调地址
    Skipped,
    /// 在第 `attempts` 次尝试时成功
    Delivered { attempts: u32 },
    /// 用尽所有尝试仍失败
    Exhausted { attempts: u32 },
}

/// Webhook投递器
///
/// 将终态任务的快照POST到调用方提供的地址，失败时线性退避重试。
/// 投递结果不会回写到任务记录
#[derive(Clone)]
pub struct WebhookDispatcher {
    /// HTTP客户端
    client: Client,
    /// 重试策略
    policy: RetryPolicy,
    /// 签名密钥
    secret: Option<String>,
}

impl WebhookDispatcher {
    /// 创建新的Webhook投递器
    ///
    /// # 参数
    ///
    /// * `settings` - 超时、重试次数、退避基数和可选的签名密钥
    pub fn new(settings: &WebhookSettings) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!(
                "Email-Crawler-Webhook/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            policy: RetryPolicy::new(settings.retries, settings.backoff()),
            secret: settings.secret.clone().filter(|s| !s.is_empty()),
        })
    }

    /// 替换重试策略
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 投递任务结果
    pub async fn deliver(&self, job: &ScanJob) -> DeliveryOutcome {
        if job.webhook_url.trim().is_empty() {
            return DeliveryOutcome::Skipped;
        }

        let payload = WebhookPayload::from(job);
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to serialize webhook payload");
                return DeliveryOutcome::Exhausted { attempts: 0 };
            }
        };
        let signature = self.sign(&body);

        let mut attempt = 1;
        loop {
            info!(job_id = %job.id, attempt, webhook_url = %job.webhook_url, "Delivering webhook");
            match self
                .attempt(&job.webhook_url, job.status, &body, signature.as_deref())
                .await
            {
                Ok(()) => {
                    info!(job_id = %job.id, attempt, "Webhook delivered successfully");
                    counter!("webhook_delivery_success_total").increment(1);
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Err(reason) => {
                    warn!(job_id = %job.id, attempt, reason = %reason, "Webhook delivery failed");
                }
            }

            if !self.policy.should_retry(attempt) {
                error!(
                    job_id = %job.id,
                    attempts = attempt,
                    "Webhook delivery exhausted all attempts"
                );
                counter!("webhook_dead_letter_total").increment(1);
                return DeliveryOutcome::Exhausted { attempts: attempt };
            }

            let backoff = self.policy.backoff_for(attempt);
            debug!(job_id = %job.id, backoff_ms = backoff.as_millis() as u64, "Waiting before next webhook attempt");
            sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        url: &str,
        status: JobStatus,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<(), String> {
        counter!("webhook_delivery_attempts_total").increment(1);
        let start = Instant::now();

        let mut request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(EVENT_HEADER, event_name(status))
            .body(body.to_vec());
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request.send().await;
        histogram!("webhook_delivery_duration_seconds").record(start.elapsed().as_secs_f64());

        match response {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => {
                counter!("webhook_delivery_failed_total", "reason" => "http_error").increment(1);
                Err(format!("status {}", resp.status()))
            }
            Err(e) => {
                counter!("webhook_delivery_failed_total", "reason" => "network_error").increment(1);
                Err(e.to_string())
            }
        }
    }

    fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_ref()?;
        match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(body);
                Some(hex::encode(mac.finalize().into_bytes()))
            }
            Err(e) => {
                warn!(error = %e, "Invalid webhook secret, sending unsigned");
                None
            }
        }
    }
}

/// 回调事件名
pub fn event_name(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Completed => "job.completed",
        JobStatus::Cancelled => "job.cancelled",
        _ => "job.failed",
    }
}

#[cfg(test)]
#[path = "webhook_dispatcher_test.rs"]
mod tests;
