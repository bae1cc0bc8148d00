//! Download worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mdl_queue::{TaskQueue, TaskStore};
use mdl_worker::{
    NoopNotifier, Notifier, ProcessingContext, RetentionSweeper, TaskExecutor, TelegramNotifier,
    WorkerConfig,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("mdl=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting mdl-worker");

    // Load configuration
    let config = WorkerConfig::from_env();
    info!(
        "Worker config: max_jobs={}, download_dir={}, retention={}s",
        config.max_concurrent_jobs,
        config.download_dir.display(),
        config.retention_max_age.as_secs()
    );

    // Create queue and store clients
    let queue = match TaskQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create task queue: {}", e);
            std::process::exit(1);
        }
    };

    let store = match TaskStore::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create task store: {}", e);
            std::process::exit(1);
        }
    };

    // Notifications are optional; run silent when unconfigured
    let notifier: Arc<dyn Notifier> = match TelegramNotifier::from_env() {
        Some(n) => Arc::new(n),
        None => Arc::new(NoopNotifier),
    };

    // Ensure the artifact directory exists before anything writes into it
    if let Err(e) = tokio::fs::create_dir_all(&config.download_dir).await {
        error!(
            "Failed to create download dir {}: {}",
            config.download_dir.display(),
            e
        );
        std::process::exit(1);
    }

    // Start the retention sweeper
    let sweeper = RetentionSweeper::new(
        config.download_dir.clone(),
        config.retention_max_age,
        config.sweep_interval,
    );
    tokio::spawn(sweeper.run());

    let ctx = ProcessingContext::new(config.clone(), store, notifier);
    let executor = Arc::new(TaskExecutor::new(config, queue, ctx));

    // Setup signal handler for graceful shutdown
    let executor_signal = Arc::clone(&executor);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        executor_signal.shutdown();
    });

    // Run executor
    if let Err(e) = executor.run().await {
        error!("Executor error: {}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}
