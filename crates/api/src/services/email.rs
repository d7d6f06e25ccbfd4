//! Email delivery for the password reset flow.
//!
//! Providers are selected by configuration. The default `console`
//! provider writes the message to the log, which is what development
//! and test environments want; real SMTP delivery sits behind the same
//! trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EmailConfig;

/// An outbound email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Abstraction over email delivery backends.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Error type for email operations.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Mailer that logs messages instead of sending them.
pub struct ConsoleMailer {
    sender_email: String,
    sender_name: String,
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            from = %format!("{} <{}>", self.sender_name, self.sender_email),
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (console provider)"
        );
        Ok(())
    }
}

/// Builds the mailer named by configuration.
///
/// Unknown providers fall back to console with a warning rather than
/// failing startup.
pub fn mailer_from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    match config.provider.as_str() {
        "console" => {}
        other => {
            tracing::warn!(provider = %other, "Unknown email provider, using console");
        }
    }
    Arc::new(ConsoleMailer {
        sender_email: config.sender_email.clone(),
        sender_name: config.sender_name.clone(),
    })
}

/// Sends the password-reset OTP email.
pub async fn send_reset_otp(
    mailer: &dyn Mailer,
    to: &str,
    name: &str,
    otp: &str,
) -> Result<(), EmailError> {
    let message = EmailMessage {
        to: to.to_string(),
        subject: "Your password reset code".to_string(),
        body: format!(
            "Hi {},\n\nYour password reset code is {}. It expires in {} minutes.\n\n\
             If you did not request a reset, you can ignore this email.",
            name,
            otp,
            shared::otp::OTP_VALIDITY_MINUTES
        ),
    };
    mailer.send(message).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(provider: &str) -> EmailConfig {
        EmailConfig {
            provider: provider.to_string(),
            sender_email: "noreply@example.com".to_string(),
            sender_name: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_console_mailer_send_succeeds() {
        let mailer = mailer_from_config(&test_config("console"));
        let result = mailer
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                subject: "Test".to_string(),
                body: "Body".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_falls_back_to_console() {
        let mailer = mailer_from_config(&test_config("smtp-unconfigured"));
        let result = send_reset_otp(mailer.as_ref(), "user@example.com", "User", "123456").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reset_otp_body_mentions_code_and_expiry() {
        // The body format is part of the user-facing contract
        struct Capture(std::sync::Mutex<Option<EmailMessage>>);

        #[async_trait]
        impl Mailer for Capture {
            async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
                *self.0.lock().unwrap() = Some(message);
                Ok(())
            }
        }

        let capture = Capture(std::sync::Mutex::new(None));
        send_reset_otp(&capture, "user@example.com", "Asha", "042933")
            .await
            .unwrap();

        let message = capture.0.lock().unwrap().take().unwrap();
        assert_eq!(message.to, "user@example.com");
        assert!(message.body.contains("042933"));
        assert!(message.body.contains("10 minutes"));
        assert!(message.body.contains("Asha"));
    }
}
