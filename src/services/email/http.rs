use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use super::{EmailError, EmailMessage, EmailProvider};
use crate::services::retry::FailureKind;

pub const DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Delivers through a SendGrid-compatible v3 JSON API.
pub struct HttpEmailProvider {
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
    client: reqwest::Client,
}

impl HttpEmailProvider {
    pub fn new(api_url: String, api_key: String, from_email: String, from_name: String) -> Self {
        Self {
            api_url,
            api_key,
            from_email,
            from_name,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html }],
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::new(classify_transport(&e), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(EmailError::new(
            classify_status(status),
            format!("email API returned {status}: {body}"),
        ))
    }
}

fn classify_transport(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::DeadlineExceeded
    } else if err.is_connect() || err.is_request() {
        FailureKind::Unavailable
    } else {
        FailureKind::Other
    }
}

fn classify_status(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::PermissionDenied,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::PAYLOAD_TOO_LARGE => {
            FailureKind::InvalidArgument
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::DeadlineExceeded,
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => FailureKind::Unavailable,
        _ => FailureKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), FailureKind::PermissionDenied);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), FailureKind::PermissionDenied);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), FailureKind::NotFound);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), FailureKind::InvalidArgument);
        assert_eq!(classify_status(StatusCode::GATEWAY_TIMEOUT), FailureKind::DeadlineExceeded);
        assert_eq!(classify_status(StatusCode::SERVICE_UNAVAILABLE), FailureKind::Unavailable);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), FailureKind::Other);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let provider = HttpEmailProvider::new(
            "http://127.0.0.1:9/v3/mail/send".to_string(),
            "key".to_string(),
            "no-reply@gymsynergy.local".to_string(),
            "GymSynergy".to_string(),
        );
        let msg = EmailMessage {
            to: "a@x.com".to_string(),
            subject: "s".to_string(),
            html: "<p>h</p>".to_string(),
        };
        let err = provider.send(&msg).await.unwrap_err();
        assert!(matches!(
            crate::services::retry::Classify::kind(&err),
            FailureKind::Unavailable | FailureKind::DeadlineExceeded
        ));
    }
}
