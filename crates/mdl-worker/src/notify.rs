//! Task lifecycle notifications.
//!
//! Notifications are strictly best-effort: a delivery failure is logged and
//! never affects the outcome of the task that triggered it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use mdl_models::{DownloadJob, TaskState};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Observer for task lifecycle events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn task_started(&self, job: &DownloadJob) -> Result<(), NotifyError>;

    async fn task_finished(&self, job: &DownloadJob, state: &TaskState) -> Result<(), NotifyError>;
}

/// Notifier that does nothing, used when no channel is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn task_started(&self, _job: &DownloadJob) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn task_finished(
        &self,
        _job: &DownloadJob,
        _state: &TaskState,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Telegram bot notifier.
pub struct TelegramNotifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Build from environment, `None` when either credential is missing.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty())?;
        info!("Telegram notifications enabled");
        Some(Self::new(bot_token, chat_id))
    }

    async fn send(&self, text: String) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, body)));
        }

        debug!("Telegram notification sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn task_started(&self, job: &DownloadJob) -> Result<(), NotifyError> {
        self.send(format!(
            "Download started\nTask: {}\nFormat: {}\nURL: {}",
            job.task_id, job.format, job.source_url
        ))
        .await
    }

    async fn task_finished(&self, job: &DownloadJob, state: &TaskState) -> Result<(), NotifyError> {
        let text = match state {
            TaskState::Success { artifact_filename } => format!(
                "Download finished\nTask: {}\nArtifact: {}",
                job.task_id, artifact_filename
            ),
            TaskState::Failure { reason, .. } => format!(
                "Download failed\nTask: {}\nURL: {}\nReason: {}",
                job.task_id, job.source_url, reason
            ),
            other => format!("Task {} is {}", job.task_id, other),
        };
        self.send(text).await
    }
}
