// Verification engine layer

pub mod verifier;

pub use verifier::VerificationEngine;
