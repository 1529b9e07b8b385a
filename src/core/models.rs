// Persisted document shapes for the two credential collections

use serde::{Deserialize, Serialize};

/// An unconsumed verification challenge awaiting confirmation.
///
/// `otp` and `magic_link` are minted together and either one alone is enough
/// to complete verification. `issued_at` is unix seconds; freshness is judged
/// against it at consume time, never at issue time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingVerification {
    pub email: String,
    pub otp: i32,
    pub magic_link: String,
    pub issued_at: i64,
}

/// A member whose email ownership has been proven.
///
/// Insert-only: nothing deduplicates a second successful verification for the
/// same address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedMember {
    pub email: String,
}

/// What `issue_challenge` hands back to the facade.
///
/// The magic link only ever travels by email; whether the OTP is also echoed
/// in the HTTP response is a facade-level configuration decision.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub otp: i32,
    pub magic_link: String,
}
