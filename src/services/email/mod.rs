pub mod http;
pub mod smtp;
pub mod templates;

use async_trait::async_trait;

use crate::auth::{LinkPurpose, LinkSigner};
use crate::models::UserRole;
use crate::services::retry::{retry, Classify, FailureKind, RetryPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery failure. Displays as the user-facing message for its kind; the
/// vendor detail is kept for logs only.
#[derive(Debug)]
pub struct EmailError {
    kind: FailureKind,
    detail: String,
}

impl EmailError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.user_message())
    }
}

impl std::error::Error for EmailError {}

impl Classify for EmailError {
    fn kind(&self) -> FailureKind {
        self.kind
    }
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogEmailProvider;

#[async_trait]
impl EmailProvider for LogEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "email not delivered (log provider)"
        );
        Ok(())
    }
}

pub struct Mailer {
    provider: Box<dyn EmailProvider>,
    retry: RetryPolicy,
    client_url: String,
    links: LinkSigner,
}

impl Mailer {
    pub fn new(
        provider: Box<dyn EmailProvider>,
        retry: RetryPolicy,
        client_url: impl Into<String>,
        links: LinkSigner,
    ) -> Self {
        Self {
            provider,
            retry,
            client_url: client_url.into().trim_end_matches('/').to_string(),
            links,
        }
    }

    pub fn links(&self) -> &LinkSigner {
        &self.links
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let result = retry(&self.retry, || self.provider.send(message)).await;

        match &result {
            Ok(()) => tracing::info!(to = %message.to, subject = %message.subject, "email sent"),
            Err(e) => tracing::error!(
                to = %message.to,
                subject = %message.subject,
                kind = ?e.kind(),
                detail = %e.detail(),
                "email delivery failed"
            ),
        }

        result
    }

    pub async fn send_welcome(&self, to: &str, name: &str, role: UserRole) -> Result<(), EmailError> {
        self.send(&templates::welcome(to, name, role)).await
    }

    /// `password_hash` is the account's current hash; the link dies once it changes.
    pub async fn send_password_reset(&self, to: &str, password_hash: &str) -> Result<(), EmailError> {
        let link = self.link_for("reset-password", LinkPurpose::PasswordReset, to, password_hash);
        self.send(&templates::password_reset(to, &link)).await
    }

    pub async fn send_verification(&self, to: &str) -> Result<(), EmailError> {
        let link = self.link_for("verify-email", LinkPurpose::EmailVerification, to, "");
        self.send(&templates::verification(to, &link)).await
    }

    fn link_for(&self, page: &str, purpose: LinkPurpose, email: &str, account_state: &str) -> String {
        format!(
            "{}/{}?token={}",
            self.client_url,
            page,
            self.links.sign(purpose, email, account_state)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct FlakyProvider {
        failures: Mutex<Vec<FailureKind>>,
        sent: Arc<Mutex<Vec<EmailMessage>>>,
    }

    #[async_trait]
    impl EmailProvider for FlakyProvider {
        async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
            if let Some(kind) = self.failures.lock().unwrap().pop() {
                return Err(EmailError::new(kind, "vendor said no"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn mailer(failures: Vec<FailureKind>) -> (Mailer, Arc<Mutex<Vec<EmailMessage>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let provider = FlakyProvider {
            failures: Mutex::new(failures),
            sent: sent.clone(),
        };
        let mailer = Mailer::new(
            Box::new(provider),
            RetryPolicy::new(3, Duration::from_millis(1)),
            "http://localhost:5173/",
            LinkSigner::new("secret").unwrap(),
        );
        (mailer, sent)
    }

    #[test]
    fn test_error_displays_user_message() {
        let err = EmailError::new(FailureKind::Unavailable, "connection refused");
        assert_eq!(
            err.to_string(),
            "You appear to be offline. Please check your internet connection and try again."
        );
        assert_eq!(err.detail(), "connection refused");
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let (mailer, sent) = mailer(vec![FailureKind::Unavailable]);
        mailer
            .send_welcome("ana@example.com", "Ana", UserRole::Client)
            .await
            .unwrap();
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_is_not_retried() {
        let (mailer, sent) = mailer(vec![FailureKind::PermissionDenied]);
        let err = mailer
            .send_welcome("ana@example.com", "Ana", UserRole::Client)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::PermissionDenied);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_link_carries_verifiable_token() {
        let (mailer, sent) = mailer(vec![]);
        mailer
            .send_password_reset("ana@example.com", "$2b$04$hash")
            .await
            .unwrap();

        let sent = sent.lock().unwrap();
        let html = &sent[0].html;
        let prefix = "http://localhost:5173/reset-password?token=";
        let start = html.find(prefix).unwrap() + prefix.len();
        let token: String = html[start..].chars().take_while(|c| *c != '"').collect();

        let claims = mailer.links().verify(LinkPurpose::PasswordReset, &token).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert!(mailer.links().ensure_bound(&claims, "$2b$04$hash").is_ok());
    }

    #[tokio::test]
    async fn test_verification_link_points_at_verify_page() {
        let (mailer, sent) = mailer(vec![]);
        mailer.send_verification("ana@example.com").await.unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Verify Your GymSynergy Email");
        assert!(sent[0].html.contains("http://localhost:5173/verify-email?token="));
    }
}
