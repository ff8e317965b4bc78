use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailError, EmailMessage, EmailProvider};
use crate::services::retry::FailureKind;

pub struct SmtpEmailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailProvider {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: Mailbox,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("invalid SMTP relay {host}"))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let to: Mailbox = message.to.parse().map_err(|e| {
            EmailError::new(
                FailureKind::InvalidArgument,
                format!("bad recipient {}: {e}", message.to),
            )
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| EmailError::new(FailureKind::InvalidArgument, e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| EmailError::new(classify(&e), e.to_string()))?;

        Ok(())
    }
}

fn classify(err: &lettre::transport::smtp::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::DeadlineExceeded;
    }
    if err.is_permanent() {
        let code = err.status().map(|code| code.to_string());
        return classify_permanent_code(code.as_deref());
    }
    if err.is_transient() {
        return FailureKind::Unavailable;
    }
    if err.is_client() {
        return FailureKind::InvalidArgument;
    }
    // connection, TLS and network failures
    FailureKind::Unavailable
}

fn classify_permanent_code(code: Option<&str>) -> FailureKind {
    match code {
        Some("530") | Some("535") | Some("534") => FailureKind::PermissionDenied,
        Some("550") | Some("551") => FailureKind::NotFound,
        _ => FailureKind::InvalidArgument,
    }
}
