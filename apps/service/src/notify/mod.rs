/// Outbound notification boundary.
///
/// The monitoring core only needs a "send message to recipient" capability;
/// the Telegram transport below is one implementation of it.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::database::models::MonitoredService;
use crate::monitoring::types::ProbeOutcome;

/// Transport fault while handing a message to the notification channel.
/// Logged by the caller, never escalated or retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification rejected by transport: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError>;
}

/// Telegram Bot API transport; recipients are chat ids.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&SendMessage { chat_id: recipient, text, parse_mode: "Markdown" })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}

/// Fallback when no transport is configured: transitions only reach the
/// service log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        info!(recipient, %text, "transition notification");
        Ok(())
    }
}

/// Render the owner-facing message for a status transition.
pub fn transition_message(
    service: &MonitoredService,
    outcome: ProbeOutcome,
    at: DateTime<Utc>,
) -> String {
    let when = at.format("%Y-%m-%d %H:%M:%S");
    if outcome.is_up {
        format!(
            "✅ *SERVICE RECOVERED*\n\
             *Name:* {}\n\
             *URL:* {}\n\
             *Status code:* {}\n\
             *Time:* {when}",
            service.name, service.url, outcome.status_code
        )
    } else {
        let code = if outcome.status_code == 0 {
            "N/A".to_string()
        } else {
            outcome.status_code.to_string()
        };
        format!(
            "🚨 *SERVICE DOWN*\n\
             *Name:* {}\n\
             *URL:* {}\n\
             *Status code:* {code}\n\
             *Time:* {when}",
            service.name, service.url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::ServiceStatus;

    fn service() -> MonitoredService {
        MonitoredService {
            id: 7,
            name: "api".to_string(),
            url: "https://example.com".to_string(),
            owner: "12345".to_string(),
            is_active: true,
            check_interval: 300,
            last_checked: None,
            last_status: ServiceStatus::Up,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn recovered_message_includes_code() {
        let text =
            transition_message(&service(), ProbeOutcome::from_status_code(200), Utc::now());
        assert!(text.contains("SERVICE RECOVERED"));
        assert!(text.contains("api"));
        assert!(text.contains("https://example.com"));
        assert!(text.contains("200"));
    }

    #[test]
    fn down_message_uses_na_for_unreachable() {
        let text = transition_message(&service(), ProbeOutcome::unreachable(), Utc::now());
        assert!(text.contains("SERVICE DOWN"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn down_message_keeps_error_status_code() {
        let text =
            transition_message(&service(), ProbeOutcome::from_status_code(503), Utc::now());
        assert!(text.contains("SERVICE DOWN"));
        assert!(text.contains("503"));
    }
}
