use salon_common::http::client::HTTP_CLIENT;
use salon_common::{BoxFuture, EmailMessage, Notifier, ServiceError};
use salon_config::MailConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Mail API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Mail configuration missing or incomplete: {0}")]
    ConfigError(String),
}

impl From<MailError> for ServiceError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::ConfigError(msg) => ServiceError::ConfigError(msg),
            MailError::RequestError(e) => e.into(),
            other => ServiceError::ExternalServiceError {
                service_name: "mail".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[derive(Serialize, Debug)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Sends mail through a JSON HTTP API (Resend-style `POST {from, to, subject, html}` with a
/// bearer key).
pub struct HttpMailNotifier {
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MailError::ConfigError("mail.api_key is not set".to_string()))?;
        if config.api_url.trim().is_empty() {
            return Err(MailError::ConfigError("mail.api_url is empty".to_string()));
        }
        Ok(Self {
            api_url: config.api_url.clone(),
            api_key,
            from: config.from.clone(),
        })
    }

    pub async fn send_email(&self, message: &EmailMessage) -> Result<(), MailError> {
        let body = SendEmailBody {
            from: &self.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let resp = HTTP_CLIENT
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!("Mail API returned {}: {}", status, text);
            return Err(MailError::ApiError {
                status_code: status.as_u16(),
                message: text,
            });
        }

        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

impl Notifier for HttpMailNotifier {
    fn send(&self, message: EmailMessage) -> BoxFuture<'_, (), ServiceError> {
        Box::pin(async move { Ok(self.send_email(&message).await?) })
    }
}
