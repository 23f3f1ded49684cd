//! Reference JWE decryption backend.
//!
//! Supports direct key agreement (`alg: dir`) with A128GCM/A256GCM content
//! encryption, in both compact and JSON serialization. This exists so the
//! harness has a real implementation to run corpora against; it is not a
//! general JOSE library.
//!
//! Every malformed, truncated, undecodable, or cryptographically bad input
//! maps to [`DecryptError::InvalidInput`]: the backend fails closed and the
//! harness sees a clean rejection rather than a crash.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::KeyInit;
use aes_gcm::{AeadInPlace, Aes128Gcm, Aes256Gcm};
use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use serde::Deserialize;

use crate::{DecryptError, DecryptionKey, JweDecrypter};

/// Minimal `dir` + AES-GCM decryption backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectJwe;

impl JweDecrypter for DirectJwe {
    fn decrypt(&self, serialized_jwe: &str, key: &DecryptionKey) -> Result<Vec<u8>, DecryptError> {
        let segments = parse_segments(serialized_jwe)?;

        let header_bytes = decode_segment(&segments.protected, "protected header")?;
        let header: Header = serde_json::from_slice(&header_bytes).map_err(|e| {
            DecryptError::InvalidInput(format!("protected header is not valid JSON: {e}"))
        })?;

        if header.alg != "dir" {
            return Err(DecryptError::InvalidInput(format!(
                "unsupported key management algorithm '{}'",
                header.alg
            )));
        }
        // RFC 7518 §4.5: direct encryption uses an empty encrypted key.
        if !segments.encrypted_key.is_empty() {
            return Err(DecryptError::InvalidInput(
                "direct encryption must not carry an encrypted key".to_string(),
            ));
        }

        let iv = decode_segment(&segments.iv, "iv")?;
        let ciphertext = decode_segment(&segments.ciphertext, "ciphertext")?;
        let tag = decode_segment(&segments.tag, "tag")?;

        // AAD is the encoded protected header verbatim (RFC 7516 §5.1 step
        // 14), extended with the encoded AAD member in JSON serialization
        // (§5.2). Re-encoding would mask non-canonical-header vectors.
        let aad = match &segments.aad {
            Some(extra) => format!("{}.{extra}", segments.protected),
            None => segments.protected.clone(),
        };

        match header.enc.as_str() {
            "A128GCM" => {
                open_detached::<Aes128Gcm>(&key.secret, &iv, aad.as_bytes(), &ciphertext, &tag)
            }
            "A256GCM" => {
                open_detached::<Aes256Gcm>(&key.secret, &iv, aad.as_bytes(), &ciphertext, &tag)
            }
            other => Err(DecryptError::InvalidInput(format!(
                "unsupported content encryption algorithm '{other}'"
            ))),
        }
    }
}

/// Build a valid compact JWE under `dir` key management.
///
/// The nonce is caller-supplied so vector construction stays deterministic;
/// `enc` must be `A128GCM` or `A256GCM`.
pub fn seal_compact(
    key: &[u8],
    nonce: &[u8; 12],
    plaintext: &[u8],
    enc: &str,
) -> Result<String, DecryptError> {
    let header = format!(r#"{{"alg":"dir","enc":"{enc}"}}"#);
    let protected = Base64::encode_string(header.as_bytes());
    let (ciphertext, tag) = match enc {
        "A128GCM" => seal_detached::<Aes128Gcm>(key, nonce, protected.as_bytes(), plaintext)?,
        "A256GCM" => seal_detached::<Aes256Gcm>(key, nonce, protected.as_bytes(), plaintext)?,
        other => {
            return Err(DecryptError::InvalidInput(format!(
                "unsupported content encryption algorithm '{other}'"
            )));
        }
    };
    Ok(format!(
        "{protected}..{}.{}.{}",
        Base64::encode_string(nonce),
        Base64::encode_string(&ciphertext),
        Base64::encode_string(&tag)
    ))
}

/// The five JWE parts plus the optional JSON-serialization AAD, all still
/// base64url-encoded.
struct Segments {
    protected: String,
    encrypted_key: String,
    iv: String,
    ciphertext: String,
    tag: String,
    aad: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
    enc: String,
}

#[derive(Debug, Deserialize)]
struct JsonJwe {
    protected: Option<String>,
    encrypted_key: Option<String>,
    iv: Option<String>,
    ciphertext: Option<String>,
    tag: Option<String>,
    aad: Option<String>,
    recipients: Option<Vec<JsonRecipient>>,
}

#[derive(Debug, Deserialize)]
struct JsonRecipient {
    encrypted_key: Option<String>,
}

fn parse_segments(serialized: &str) -> Result<Segments, DecryptError> {
    if serialized.trim_start().starts_with('{') {
        return parse_json_segments(serialized);
    }

    let parts: Vec<&str> = serialized.split('.').collect();
    if parts.len() != 5 {
        return Err(DecryptError::InvalidInput(format!(
            "compact serialization has {} parts, expected 5",
            parts.len()
        )));
    }
    Ok(Segments {
        protected: parts[0].to_string(),
        encrypted_key: parts[1].to_string(),
        iv: parts[2].to_string(),
        ciphertext: parts[3].to_string(),
        tag: parts[4].to_string(),
        aad: None,
    })
}

fn parse_json_segments(serialized: &str) -> Result<Segments, DecryptError> {
    let jwe: JsonJwe = serde_json::from_str(serialized)
        .map_err(|e| DecryptError::InvalidInput(format!("JSON serialization is invalid: {e}")))?;

    // Flattened form carries encrypted_key at top level; general form puts
    // it on the (single) recipient.
    let recipient_key = jwe
        .recipients
        .as_ref()
        .and_then(|r| r.first())
        .and_then(|r| r.encrypted_key.clone());

    Ok(Segments {
        protected: jwe
            .protected
            .ok_or_else(|| missing_json_member("protected"))?,
        encrypted_key: jwe.encrypted_key.or(recipient_key).unwrap_or_default(),
        iv: jwe.iv.ok_or_else(|| missing_json_member("iv"))?,
        ciphertext: jwe
            .ciphertext
            .ok_or_else(|| missing_json_member("ciphertext"))?,
        tag: jwe.tag.ok_or_else(|| missing_json_member("tag"))?,
        aad: jwe.aad,
    })
}

fn missing_json_member(member: &str) -> DecryptError {
    DecryptError::InvalidInput(format!("JSON serialization is missing '{member}'"))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, DecryptError> {
    Base64::decode_vec(segment)
        .map_err(|e| DecryptError::InvalidInput(format!("{what} is not valid base64url: {e}")))
}

fn open_detached<C: KeyInit + AeadInPlace>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, DecryptError> {
    check_sizes::<C>(key, iv, tag)?;
    let mut buffer = ciphertext.to_vec();
    C::new(GenericArray::from_slice(key))
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            aad,
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| {
            DecryptError::InvalidInput("authentication tag verification failed".to_string())
        })?;
    Ok(buffer)
}

fn seal_detached<C: KeyInit + AeadInPlace>(
    key: &[u8],
    nonce: &[u8; 12],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), DecryptError> {
    check_sizes::<C>(key, nonce, &[0u8; 16])?;
    let mut buffer = plaintext.to_vec();
    let tag = C::new(GenericArray::from_slice(key))
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, &mut buffer)
        .map_err(|e| DecryptError::Backend(format!("encryption failed: {e}")))?;
    Ok((buffer, tag.to_vec()))
}

/// GenericArray::from_slice panics on length mismatch, so every length is
/// checked up front and surfaced as a clean rejection.
fn check_sizes<C: KeyInit + AeadInPlace>(
    key: &[u8],
    iv: &[u8],
    tag: &[u8],
) -> Result<(), DecryptError> {
    if key.len() != C::key_size() {
        return Err(DecryptError::InvalidInput(format!(
            "key size {} does not match the content encryption algorithm",
            key.len()
        )));
    }
    if iv.len() != 12 {
        return Err(DecryptError::InvalidInput(format!(
            "iv must be 12 bytes, got {}",
            iv.len()
        )));
    }
    if tag.len() != 16 {
        return Err(DecryptError::InvalidInput(format!(
            "tag must be 16 bytes, got {}",
            tag.len()
        )));
    }
    Ok(())
}
