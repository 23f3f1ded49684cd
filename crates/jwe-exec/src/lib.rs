//! Execution seam between the JWE conformance harness and the
//! decryption implementation under test.
//!
//! The harness never talks to a JOSE library directly. It requires exactly
//! two collaborators, expressed as traits here:
//! - [`JwkParser`]: turn a JWK JSON string into [`KeyMaterial`].
//! - [`JweDecrypter`]: attempt to decrypt a serialized JWE with a resolved
//!   key, failing with the designated [`DecryptError::InvalidInput`] signal
//!   for malformed or cryptographically bad input.
//!
//! This crate also ships a minimal reference backend ([`DirectJwe`] +
//! [`StandardJwkParser`]) so the harness can be exercised end to end
//! without an external JOSE dependency.

#![forbid(unsafe_code)]

pub mod direct;
pub mod jwk;

use thiserror::Error;

pub use direct::DirectJwe;
pub use jwk::StandardJwkParser;

/// Key material resolved for one decryption attempt.
///
/// `secret` holds the raw decryption-capable bytes (a symmetric secret or a
/// private scalar); `jwk` keeps the originating JWK text for failure
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionKey {
    /// Raw key bytes handed to the decrypter.
    pub secret: Vec<u8>,
    /// The JWK this key was derived from.
    pub jwk: String,
}

/// Shape of a parsed JWK: a plain key, or a public/private pair.
///
/// Decryption always uses the private half, so a pair carries the private
/// key pre-extracted alongside the public JWK text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// A single key (e.g. an `oct` symmetric secret).
    Plain(DecryptionKey),
    /// A public/private key pair (e.g. an `EC` or `OKP` JWK with `d`).
    Pair {
        /// The public half, rendered as JWK JSON without private members.
        public_jwk: String,
        /// The private half used for decryption.
        private: DecryptionKey,
    },
}

impl KeyMaterial {
    /// Select the decryption-capable key.
    #[must_use]
    pub fn into_decryption_key(self) -> DecryptionKey {
        match self {
            Self::Plain(key) => key,
            Self::Pair { private, .. } => private,
        }
    }
}

/// Failure to parse a JWK into [`KeyMaterial`].
///
/// In a well-formed corpus this never fires; the harness treats it as a
/// corpus defect, not a verdict on the implementation under test.
#[derive(Debug, Error)]
pub enum KeyParseError {
    #[error("JWK is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported key type '{kty}'")]
    UnsupportedKeyType { kty: String },
    #[error("JWK member '{member}' is not valid base64url: {reason}")]
    Encoding { member: &'static str, reason: String },
    #[error("JWK is missing required member '{0}'")]
    MissingMember(&'static str),
}

/// Failure modes of one decryption attempt.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// The designated "this input is invalid" rejection. Expected and
    /// required for malformed, truncated, or forged inputs.
    #[error("invalid JWE input: {0}")]
    InvalidInput(String),
    /// Any other failure. The harness classifies this as an unexpected
    /// implementation failure regardless of the expected result.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Parses a JWK JSON string into key material.
pub trait JwkParser {
    fn parse(&self, jwk_json: &str) -> Result<KeyMaterial, KeyParseError>;
}

/// Attempts to decrypt a compact- or JSON-serialized JWE.
pub trait JweDecrypter {
    /// Returns the recovered plaintext bytes, or [`DecryptError::InvalidInput`]
    /// when the input must be rejected.
    fn decrypt(&self, serialized_jwe: &str, key: &DecryptionKey) -> Result<Vec<u8>, DecryptError>;
}
