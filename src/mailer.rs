//! Mailer — outbound email behind a mockable trait.
//!
//! DESIGN
//! ======
//! Every email the platform sends (access codes, booking lifecycle notices,
//! group invites) goes through [`Mailer`]. The production implementation is
//! Resend; tests substitute a recording mock. A missing mail configuration
//! disables delivery rather than failing startup.

use async_trait::async_trait;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mailer not configured")]
    NotConfigured,
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Async mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML email.
    ///
    /// # Errors
    ///
    /// Returns a [`MailError`] if the provider rejects the send.
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

// =============================================================================
// RESEND IMPLEMENTATION
// =============================================================================

pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    /// Build from `RESEND_API_KEY` and `MAIL_FROM`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::NotConfigured`] if either variable is absent.
    pub fn from_env() -> Result<Self, MailError> {
        let api_key = std::env::var("RESEND_API_KEY").map_err(|_| MailError::NotConfigured)?;
        let from = std::env::var("MAIL_FROM").map_err(|_| MailError::NotConfigured)?;
        Ok(Self { client: Resend::new(&api_key), from })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let email = CreateEmailBaseOptions::new(&self.from, [to], subject).with_html(html);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// TEST MOCK
// =============================================================================

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Records sends; optionally fails every call.
    #[derive(Default)]
    pub struct MockMailer {
        pub sent: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Delivery("mock failure".into()));
            }
            self.sent
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((to.to_owned(), subject.to_owned()));
            Ok(())
        }
    }
}
