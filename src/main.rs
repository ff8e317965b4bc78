use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use lettre::message::Mailbox;
use tracing_subscriber::EnvFilter;

use gymsynergy::auth::{LinkSigner, TokenService};
use gymsynergy::config::AppConfig;
use gymsynergy::db;
use gymsynergy::routes;
use gymsynergy::services::email::http::HttpEmailProvider;
use gymsynergy::services::email::smtp::SmtpEmailProvider;
use gymsynergy::services::email::{EmailProvider, LogEmailProvider, Mailer};
use gymsynergy::services::retry::RetryPolicy;
use gymsynergy::state::AppState;

fn email_provider(config: &AppConfig) -> anyhow::Result<Box<dyn EmailProvider>> {
    match config.email_provider.as_str() {
        "smtp" => {
            anyhow::ensure!(!config.smtp_host.is_empty(), "SMTP_HOST must be set when EMAIL_PROVIDER=smtp");
            anyhow::ensure!(
                !config.smtp_username.is_empty() && !config.smtp_password.is_empty(),
                "SMTP_USERNAME and SMTP_PASSWORD must be set when EMAIL_PROVIDER=smtp"
            );
            let from: Mailbox = format!("{} <{}>", config.email_from_name, config.email_from)
                .parse()
                .context("EMAIL_FROM is not a valid address")?;
            tracing::info!("using SMTP email provider (host: {}:{})", config.smtp_host, config.smtp_port);
            Ok(Box::new(SmtpEmailProvider::new(
                &config.smtp_host,
                config.smtp_port,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                from,
            )?))
        }
        "http" => {
            anyhow::ensure!(!config.email_api_key.is_empty(), "EMAIL_API_KEY must be set when EMAIL_PROVIDER=http");
            tracing::info!("using HTTP email provider (url: {})", config.email_api_url);
            Ok(Box::new(HttpEmailProvider::new(
                config.email_api_url.clone(),
                config.email_api_key.clone(),
                config.email_from.clone(),
                config.email_from_name.clone(),
            )))
        }
        "log" => {
            tracing::info!("using log email provider, messages will not be delivered");
            Ok(Box::new(LogEmailProvider))
        }
        other => anyhow::bail!("unknown EMAIL_PROVIDER '{other}' (expected log, smtp or http)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.jwt_secret == "changeme" {
        tracing::warn!("JWT_SECRET is not set, using the development default");
    }

    let conn = db::init_db(&config.database_url)?;

    let mailer = Mailer::new(
        email_provider(&config)?,
        RetryPolicy::new(
            config.retry_max_attempts,
            Duration::from_millis(config.retry_base_delay_ms),
        ),
        config.client_url.clone(),
        LinkSigner::new(&config.link_secret)?,
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
        config: config.clone(),
        mailer,
    });

    let app = routes::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
