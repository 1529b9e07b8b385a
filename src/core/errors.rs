// Domain error types - engine outcomes are kinds, the facade maps them to HTTP

use thiserror::Error;

/// Which one-time credential a verification attempt presented.
///
/// The OTP code and the magic link are interchangeable proofs of the same
/// pending request; only the client-facing wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Otp,
    MagicLink,
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Otp => write!(f, "OTP"),
            Credential::MagicLink => write!(f, "Magic link"),
        }
    }
}

/// Main error type for the verification service
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Email does not contain any accepted domain (HTTP 400)
    #[error("Email is not a valid university email.")]
    InvalidDomain,

    /// No pending record matched the presented credential (HTTP 400)
    #[error("{0} is not valid.")]
    NotFound(Credential),

    /// A pending record matched but its freshness window has passed (HTTP 400)
    #[error("{0} has expired.")]
    Expired(Credential),

    /// Email provider rejected or failed the dispatch (HTTP 502)
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Store connectivity or query failure (HTTP 500)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl VerifyError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            VerifyError::InvalidDomain => 400,
            VerifyError::NotFound(_) => 400,
            VerifyError::Expired(_) => 400,
            VerifyError::Provider(_) => 502,
            VerifyError::Store(_) => 500,
            VerifyError::Configuration(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            VerifyError::InvalidDomain
            | VerifyError::NotFound(_)
            | VerifyError::Expired(_) => self.to_string(),
            VerifyError::Provider(_) => "Email was not sent.".to_string(),
            VerifyError::Store(_) => "Internal error".to_string(),
            VerifyError::Configuration(_) => "Internal error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(VerifyError::InvalidDomain.status_code(), 400);
        assert_eq!(VerifyError::NotFound(Credential::Otp).status_code(), 400);
        assert_eq!(VerifyError::Expired(Credential::MagicLink).status_code(), 400);
        assert_eq!(VerifyError::Provider("quota".to_string()).status_code(), 502);
        assert_eq!(VerifyError::Store("down".to_string()).status_code(), 500);
    }

    #[test]
    fn test_credential_wording() {
        assert_eq!(
            VerifyError::NotFound(Credential::Otp).user_message(),
            "OTP is not valid."
        );
        assert_eq!(
            VerifyError::Expired(Credential::Otp).user_message(),
            "OTP has expired."
        );
        assert_eq!(
            VerifyError::NotFound(Credential::MagicLink).user_message(),
            "Magic link is not valid."
        );
        assert_eq!(
            VerifyError::Expired(Credential::MagicLink).user_message(),
            "Magic link has expired."
        );
    }

    #[test]
    fn test_user_messages_no_sensitive_data() {
        // Store and provider details are for logs, never for the caller
        let err = VerifyError::Store("mongodb://admin:hunter2@db:27017 unreachable".to_string());
        let user_msg = err.user_message();

        assert!(!user_msg.contains("hunter2"));
        assert_eq!(user_msg, "Internal error");

        let err = VerifyError::Provider("api key SG.abc123 rejected".to_string());
        assert!(!err.user_message().contains("SG.abc123"));
    }
}
