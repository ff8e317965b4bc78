use super::EmailMessage;
use crate::models::UserRole;

const BUTTON_STYLE: &str = "display: inline-block; background-color: #007bff; color: white; \
padding: 12px 24px; text-decoration: none; border-radius: 4px; margin: 16px 0;";

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #333;">{heading}</h1>
{body}
  <p>Best regards,<br>The GymSynergy Team</p>
</div>"#
    )
}

fn button(href: &str, label: &str) -> String {
    format!(r#"  <a href="{href}" style="{BUTTON_STYLE}">{label}</a>"#)
}

fn bullet_list(items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!("    <li>{item}</li>\n"))
        .collect();
    format!("  <ul>\n{items}  </ul>")
}

pub fn welcome(to: &str, name: &str, role: UserRole) -> EmailMessage {
    let (intro, who, items) = match role {
        UserRole::Client => (
            "Thank you for joining GymSynergy! We're excited to help you achieve your fitness goals.",
            "a client",
            [
                "Browse and book sessions with our expert instructors",
                "Access workout videos and training materials",
                "Track your progress and set fitness goals",
                "Connect with our fitness community",
            ],
        ),
        UserRole::Instructor => (
            "Welcome to the GymSynergy instructor team! We're thrilled to have you on board.",
            "an instructor",
            [
                "Create and manage your training schedule",
                "Upload workout videos and training content",
                "Connect with clients and track their progress",
                "Build your personal training business",
            ],
        ),
    };

    let body = format!(
        "  <p>{intro}</p>\n  <p>As {who}, you can:</p>\n{list}\n  <p>Please verify your email address to get started.</p>",
        list = bullet_list(&items),
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to GymSynergy!".to_string(),
        html: layout(&format!("Welcome to GymSynergy, {name}!"), &body),
    }
}

pub fn password_reset(to: &str, link: &str) -> EmailMessage {
    let body = format!(
        "  <p>We received a request to reset your GymSynergy password.</p>\n  \
<p>Click the button below to reset your password:</p>\n{}\n  \
<p>If you didn't request this password reset, you can safely ignore this email.</p>",
        button(link, "Reset Password")
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Reset Your GymSynergy Password".to_string(),
        html: layout("Reset Your Password", &body),
    }
}

pub fn verification(to: &str, link: &str) -> EmailMessage {
    let body = format!(
        "  <p>Thank you for signing up with GymSynergy! Please verify your email address to get started.</p>\n  \
<p>Click the button below to verify your email:</p>\n{}\n  \
<p>If you didn't create a GymSynergy account, you can safely ignore this email.</p>",
        button(link, "Verify Email")
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Verify Your GymSynergy Email".to_string(),
        html: layout("Verify Your Email", &body),
    }
}
