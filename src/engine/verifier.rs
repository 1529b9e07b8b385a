// Verification state machine: issue a challenge, consume it exactly once

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

use crate::core::errors::{Credential, VerifyError};
use crate::core::models::{IssuedChallenge, PendingVerification};
use crate::core::traits::{MemberStore, Notifier};

/// Subject line for every verification email.
pub const AUTH_EMAIL_SUBJECT: &str = "MedipolDAO Authentication Code";

/// Length of the magic-link bearer token.
pub const MAGIC_LINK_LEN: usize = 256;

const OTP_MIN: i32 = 100_000;
const OTP_MAX: i32 = 999_999;

/// The pending -> verified state machine.
///
/// Stateless between calls except through the [`MemberStore`]; safe to share
/// behind an `Arc`. Exactly one store write and one notification dispatch per
/// successful `issue_challenge`; consume operations perform a
/// delete-pending + insert-verified pair on success.
pub struct VerificationEngine {
    store: Arc<dyn MemberStore>,
    notifier: Arc<dyn Notifier>,
    accepted_domains: Vec<String>,
    website_domain: String,
    freshness_secs: i64,
}

impl VerificationEngine {
    pub fn new(
        store: Arc<dyn MemberStore>,
        notifier: Arc<dyn Notifier>,
        accepted_domains: Vec<String>,
        website_domain: String,
        freshness_secs: i64,
    ) -> Self {
        Self {
            store,
            notifier,
            accepted_domains,
            website_domain: website_domain.trim_end_matches('/').to_string(),
            freshness_secs,
        }
    }

    /// Issue a one-time code and companion magic link for `email`.
    ///
    /// Persists one pending record, then dispatches one email carrying both
    /// credentials. Nothing deduplicates repeated issues for the same
    /// address: each call mints an independent pending record.
    pub async fn issue_challenge(&self, email: &str) -> Result<IssuedChallenge, VerifyError> {
        if !self.is_accepted_email(email) {
            warn!(email = %email, "Rejected OTP request for non-university address");
            return Err(VerifyError::InvalidDomain);
        }

        let otp = generate_otp();
        let magic_link = generate_magic_link();

        let record = PendingVerification {
            email: email.to_string(),
            otp,
            magic_link: magic_link.clone(),
            issued_at: Utc::now().timestamp(),
        };
        self.store.insert_pending(&record).await?;

        let body = self.challenge_email_body(otp, &magic_link);
        self.notifier.send(email, AUTH_EMAIL_SUBJECT, &body).await?;

        info!(email = %email, "Verification challenge issued");

        Ok(IssuedChallenge { otp, magic_link })
    }

    /// Complete verification with the emailed code.
    pub async fn consume_by_code(&self, email: &str, otp: i32) -> Result<(), VerifyError> {
        let pending = self
            .store
            .find_pending_by_code(email, otp)
            .await?
            .ok_or(VerifyError::NotFound(Credential::Otp))?;

        self.confirm(pending, Credential::Otp).await
    }

    /// Complete verification with the magic-link token; the verified email is
    /// whatever the matching pending record carries.
    pub async fn consume_by_link(&self, magic_link: &str) -> Result<(), VerifyError> {
        let pending = self
            .store
            .find_pending_by_link(magic_link)
            .await?
            .ok_or(VerifyError::NotFound(Credential::MagicLink))?;

        self.confirm(pending, Credential::MagicLink).await
    }

    /// Freshness gate plus the pending -> verified transition.
    ///
    /// Stale records are left in place: only a successful consume deletes.
    /// The delete and the insert are two independent store calls with no
    /// transaction around them.
    async fn confirm(
        &self,
        pending: PendingVerification,
        credential: Credential,
    ) -> Result<(), VerifyError> {
        let elapsed = Utc::now().timestamp() - pending.issued_at;
        if elapsed >= self.freshness_secs {
            warn!(
                email = %pending.email,
                elapsed_secs = elapsed,
                "Verification attempt with expired credential"
            );
            return Err(VerifyError::Expired(credential));
        }

        match credential {
            Credential::Otp => {
                self.store
                    .delete_pending_by_code(&pending.email, pending.otp)
                    .await?
            }
            Credential::MagicLink => {
                self.store
                    .delete_pending_by_link(&pending.magic_link)
                    .await?
            }
        }

        self.store.insert_verified(&pending.email).await?;

        info!(email = %pending.email, "User verified");

        Ok(())
    }

    // TODO: decide whether this should be a strict suffix match; substring
    // matching also accepts addresses that merely contain an accepted domain
    // somewhere in the string.
    fn is_accepted_email(&self, email: &str) -> bool {
        self.accepted_domains
            .iter()
            .any(|domain| email.contains(domain.as_str()))
    }

    fn challenge_email_body(&self, otp: i32, magic_link: &str) -> String {
        let verify_url = format!("{}/verify/{}", self.website_domain, magic_link);
        let ttl_minutes = self.freshness_secs / 60;
        format!(
            "<h1>Auth Code: <b>{otp}</b></h1>\n\
             <p>Auth Code will expire in {ttl_minutes} minutes.</p>\n\
             <br>\n\
             <h1><a href=\"{verify_url}\">Click here</a> to \
             automatically verify your account</h1>\n\
             <a href=\"{verify_url}\">{verify_url}</a>"
        )
    }
}

/// 6-digit code, uniform over [100000, 999999].
fn generate_otp() -> i32 {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX)
}

/// 256 characters drawn uniformly from letters and digits.
fn generate_magic_link() -> String {
    rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(MAGIC_LINK_LEN)
        .map(char::from)
        .collect()
}
