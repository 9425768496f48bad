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

use email_crawler::app;
use email_crawler::config::settings::Settings;
use email_crawler::infrastructure::metrics;
use email_crawler::utils::telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting email-crawler...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Connect to the backing store
    let store = app::connect_store(&settings.redis.url)?;
    let fetcher = app::default_fetcher(&settings)?;

    // 4. Wire services and routes
    let mut application = app::build_application(&settings, store, fetcher).await?;

    // 5. Start workers
    if let Some(workers) = application.workers.as_mut() {
        workers.start_workers(settings.async_jobs.workers);
    }

    // 6. Start HTTP server
    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, application.router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(mut workers) = application.workers.take() {
        workers.shutdown().await;
    }
    info!("email-crawler stopped");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
