// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::Settings;
use std::time::Duration;

#[test]
fn test_defaults_match_documented_values() {
    let settings = Settings::defaults().expect("defaults should deserialize");

    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.crawler.max_depth, 3);
    assert!(settings.crawler.deduplicate_emails);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl(), Duration::from_secs(31_104_000));
    assert!(settings.async_jobs.enabled);
    assert_eq!(settings.async_jobs.workers, 3);
    assert_eq!(settings.async_jobs.queue_capacity, 100);
    assert_eq!(settings.async_jobs.job_timeout(), Duration::from_secs(300));
    assert_eq!(settings.async_jobs.retention(), Duration::from_secs(86_400));
    assert_eq!(settings.webhook.retries, 3);
    assert_eq!(settings.webhook.backoff(), Duration::from_secs(2));
    assert!(settings.webhook.secret.is_none());
    assert!(!settings.metrics.enabled);
}

#[test]
fn test_environment_overrides_defaults() {
    std::env::set_var("EMAIL_CRAWLER__CRAWLER__MAX_DEPTH", "5");
    std::env::set_var("EMAIL_CRAWLER__ASYNC_JOBS__ENABLED", "false");

    let settings = Settings::new().expect("settings should load");

    std::env::remove_var("EMAIL_CRAWLER__CRAWLER__MAX_DEPTH");
    std::env::remove_var("EMAIL_CRAWLER__ASYNC_JOBS__ENABLED");

    assert_eq!(settings.crawler.max_depth, 5);
    assert!(!settings.async_jobs.enabled);
    assert_eq!(settings.listen_addr(), "0.0.0.0:8080");
}
