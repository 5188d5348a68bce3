//! OTP delivery abstractions.
//!
//! The auth flows persist a challenge code and only then hand an
//! `EmailMessage` to an `EmailSender`. The sender decides how to deliver
//! (HTTP API, log) and returns `Ok`/`Err`; a failed send is surfaced to the
//! caller as a delivery failure and the stored code is left in place, so the
//! store never disagrees with "was a challenge issued".
//!
//! The default sender for local dev is `LogEmailSender`, which logs delivery
//! metadata and returns `Ok(())`. `HttpEmailSender` posts to a
//! SendGrid-compatible JSON endpoint configured via the CLI.

use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;
use url::Url;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub body_html: String,
}

/// Delivery abstraction used by the OTP issuance path.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error to surface a delivery failure.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs instead of sending real email.
///
/// The body embeds the challenge code, so only the envelope is logged.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            "email delivery stub"
        );
        Ok(())
    }
}

/// Sender that posts messages to a SendGrid-compatible mail API.
pub struct HttpEmailSender {
    client: Client,
    endpoint: Url,
    api_key: SecretString,
    from_email: String,
}

impl HttpEmailSender {
    /// Build a sender for the given endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: &str, api_key: SecretString, from_email: String) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid email API endpoint: {endpoint}"))?;

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build email API client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            from_email,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": message.to_email }] }],
            "from": { "email": self.from_email },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.body_html }],
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("Email API request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Email API returned {}", response.status()));
        }

        Ok(())
    }
}
