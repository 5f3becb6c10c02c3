//! Compact HS256 credential tokens
//!
//! Format is a JWS compact serialization:
//! `base64url(header).base64url(payload).base64url(HMAC_SHA256(secret, header.payload))`,
//! so tokens stay readable by standard JWT tooling.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::core::types::{ChatId, ConversationId, UserId};

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const ALGORITHM: &str = "HS256";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token must have three dot-separated parts")]
    Malformed,
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("signature does not match")]
    BadSignature,
    #[error("invalid base64url segment: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("signing key rejected")]
    InvalidKey,
}

/// What a credential binds together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
    #[serde(rename = "chatId")]
    pub conversation_id: i64,
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(rename = "createdAt")]
    pub issued_at: DateTime<Utc>,
    /// Issued-at in seconds, as JWT consumers expect
    #[serde(default)]
    pub iat: i64,
}

impl CredentialPayload {
    pub fn new(conversation: ConversationId, user: UserId, issued_at: DateTime<Utc>) -> Self {
        Self {
            conversation_id: conversation.0,
            user_id: user.0,
            issued_at,
            iat: issued_at.timestamp(),
        }
    }

    pub fn conversation(&self) -> ConversationId {
        ChatId(self.conversation_id)
    }

    pub fn user(&self) -> UserId {
        UserId(self.user_id)
    }
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

fn mac_for(secret: &[u8], signing_input: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Signs `payload` with `secret`
pub fn sign(payload: &CredentialPayload, secret: &[u8]) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(HEADER_JSON);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);
    let signing_input = format!("{header}.{body}");

    let signature = mac_for(secret, &signing_input)?.finalize().into_bytes();
    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Checks the signature of `token` and returns its payload
pub fn verify(token: &str, secret: &[u8]) -> Result<CredentialPayload, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(body), Some(signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let decoded_header: Header = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)?;
    if decoded_header.alg != ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(decoded_header.alg));
    }

    let signature = URL_SAFE_NO_PAD.decode(signature)?;
    mac_for(secret, &format!("{header}.{body}"))?
        .verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    Ok(serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body)?)?)
}
