//! JWK (RFC 7517) parsing for the reference backend.
//!
//! The corpus hands each test group a private-key JWK. `oct` keys resolve to
//! a plain symmetric secret; `EC`, `OKP`, and `RSA` keys carry a `d` member
//! and resolve to a key pair whose private half drives decryption.

use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use serde_json::{Map, Value};

use crate::{DecryptionKey, JwkParser, KeyMaterial, KeyParseError};

/// JWK members that must not appear in the public half of a pair.
const PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi", "k", "oth"];

/// Default JWK parser covering the key shapes the vector corpus uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardJwkParser;

impl JwkParser for StandardJwkParser {
    fn parse(&self, jwk_json: &str) -> Result<KeyMaterial, KeyParseError> {
        let value: Value = serde_json::from_str(jwk_json)?;
        let obj = value
            .as_object()
            .ok_or(KeyParseError::MissingMember("kty"))?;
        let kty = obj
            .get("kty")
            .and_then(Value::as_str)
            .ok_or(KeyParseError::MissingMember("kty"))?;

        match kty {
            "oct" => {
                let secret = decode_member(obj, "k")?;
                Ok(KeyMaterial::Plain(DecryptionKey {
                    secret,
                    jwk: value.to_string(),
                }))
            }
            "EC" | "OKP" | "RSA" => {
                let secret = decode_member(obj, "d")?;
                Ok(KeyMaterial::Pair {
                    public_jwk: public_half(obj),
                    private: DecryptionKey {
                        secret,
                        jwk: value.to_string(),
                    },
                })
            }
            other => Err(KeyParseError::UnsupportedKeyType {
                kty: other.to_string(),
            }),
        }
    }
}

fn decode_member(obj: &Map<String, Value>, member: &'static str) -> Result<Vec<u8>, KeyParseError> {
    let raw = obj
        .get(member)
        .and_then(Value::as_str)
        .ok_or(KeyParseError::MissingMember(member))?;
    Base64::decode_vec(raw).map_err(|e| KeyParseError::Encoding {
        member,
        reason: e.to_string(),
    })
}

/// Render the public half of a pair JWK by dropping private members.
fn public_half(obj: &Map<String, Value>) -> String {
    let public: Map<String, Value> = obj
        .iter()
        .filter(|(name, _)| !PRIVATE_MEMBERS.contains(&name.as_str()))
        .map(|(name, v)| (name.clone(), v.clone()))
        .collect();
    Value::Object(public).to_string()
}
