//! Outbound email notifications. Delivery is best-effort; callers decide what a failure means.

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Greeting sent after an account is created.
    pub fn welcome(to: impl Into<String>, name: Option<&str>) -> Self {
        let greeting = match name {
            Some(name) if !name.trim().is_empty() => format!("Hi {},", name.trim()),
            _ => "Hi,".to_string(),
        };
        Email {
            to: to.into(),
            subject: "Welcome aboard!".to_string(),
            body: format!(
                "{}\n\nYour account has been created. You can now sign in and finish setting up your profile.",
                greeting
            ),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Posts each email as JSON to a transactional mail API.
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    sender: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>, sender: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(HttpNotifier {
            client,
            url: url.into(),
            api_key,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let message = OutboundMessage {
            from: &self.sender,
            to: [&email.to],
            subject: &email.subject,
            text: &email.body,
        };
        let mut request = self.client.post(&self.url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        tracing::debug!(to = %email.to, "notification delivered");
        Ok(())
    }
}

/// Logs emails instead of sending them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        tracing::info!(to = %email.to, subject = %email.subject, "notification not sent (no mail API configured)");
        Ok(())
    }
}
