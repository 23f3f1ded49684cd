//! Key resolution.
//!
//! Converts a group's JWK description into the decryption key the
//! implementation under test expects. Decryption always uses the private
//! half of a pair. A parse failure here is a corpus defect and aborts the
//! run; it is never attributed to the implementation under test.

use jwe_exec::{DecryptionKey, JwkParser};

use crate::error::HarnessError;

/// Resolve the decryption key for a group JWK.
pub fn resolve_decryption_key(
    parser: &impl JwkParser,
    jwk_json: &str,
) -> Result<DecryptionKey, HarnessError> {
    let material = parser.parse(jwk_json).map_err(|e| {
        HarnessError::CorpusDefect(format!("group JWK failed to parse: {e} (jwk: {jwk_json})"))
    })?;
    Ok(material.into_decryption_key())
}
