use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Email a one-time sign-in link. The token is single use and expires
    /// quickly, so the message leans on urgency rather than ceremony.
    pub async fn send_magic_link_email(&self, to_email: &str, token: &str, ttl_minutes: i64) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping magic link email to {}", to_email);
            return Ok(());
        }

        let link = format!("{}?token={}", self.config.magic_link_url, token);
        let subject = "Your Ripl sign-in link";
        let html_body = self.magic_link_html(&link, ttl_minutes);
        let text_body = self.magic_link_text(&link, ttl_minutes);

        self.send_email(to_email, subject, &html_body, &text_body).await
    }

    fn magic_link_html(&self, link: &str, ttl_minutes: i64) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Your Ripl sign-in link</title>
</head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; color: #141517; line-height: 1.6;">
    <h1 style="font-size: 20px;">Sign in to Ripl</h1>
    <p>Click the button below to sign in. This link works once and expires in {ttl_minutes} minutes.</p>
    <p>
        <a href="{link}" style="display: inline-block; padding: 10px 18px; background: #0b7285; color: #ffffff; border-radius: 6px; text-decoration: none;">Sign in</a>
    </p>
    <p>If the button doesn't work, paste this into your browser:</p>
    <p><a href="{link}">{link}</a></p>
    <p style="color: #868e96; font-size: 13px;">Didn't request this? You can safely ignore this email.</p>
</body>
</html>
"#
        )
    }

    fn magic_link_text(&self, link: &str, ttl_minutes: i64) -> String {
        format!(
            "Sign in to Ripl\n\n\
             Open this link to sign in. It works once and expires in {ttl_minutes} minutes:\n\n\
             {link}\n\n\
             Didn't request this? You can safely ignore this email.\n"
        )
    }

    async fn send_email(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text_body.to_string()))
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html_body.to_string())),
            )?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // Blocking transport, so sending moves off the async workers.
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))??;

        Ok(())
    }
}
