//! Transactional email to candidates.
//!
//! Callers treat delivery as best-effort: a failed send is logged and the
//! review state that triggered it is kept.

use async_trait::async_trait;
use thiserror::Error;

pub mod smtp;
pub mod templates;

pub use templates::EmailTemplate;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Carried in `AppState` as `Arc<dyn NotificationService>`.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_email(&self, to: &str, template: &EmailTemplate) -> Result<(), NotifyError>;
}
