// Collaborator seams: credential storage and outbound email

use crate::core::errors::VerifyError;
use crate::core::models::PendingVerification;

/// Durable keyed storage over the two credential collections.
///
/// The verification engine is the only writer. Lookups are exact-field
/// matches; no ordering guarantee exists when several pending records match
/// (nothing deduplicates concurrent issues for one address).
#[async_trait::async_trait]
pub trait MemberStore: Send + Sync {
    async fn insert_pending(&self, record: &PendingVerification) -> Result<(), VerifyError>;
    async fn find_pending_by_code(
        &self,
        email: &str,
        otp: i32,
    ) -> Result<Option<PendingVerification>, VerifyError>;
    async fn find_pending_by_link(
        &self,
        magic_link: &str,
    ) -> Result<Option<PendingVerification>, VerifyError>;
    async fn delete_pending_by_code(&self, email: &str, otp: i32) -> Result<(), VerifyError>;
    async fn delete_pending_by_link(&self, magic_link: &str) -> Result<(), VerifyError>;
    async fn insert_verified(&self, email: &str) -> Result<(), VerifyError>;
    async fn ping(&self) -> Result<(), VerifyError>;
}

/// Transactional email delivery through an external provider.
///
/// One attempt per call; failures are surfaced, not retried.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), VerifyError>;
}
