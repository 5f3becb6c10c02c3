use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use super::token::{self, CredentialPayload, TokenError};
use crate::core::types::{ConversationId, InboundUpdate, UserId};
use crate::session::Session;

/// Why a stored token was thrown away
#[derive(Debug)]
pub enum Rejection {
    /// Signature or encoding did not check out
    Invalid(TokenError),
    /// Token was issued for another conversation
    ConversationMismatch {
        expected: ConversationId,
        found: ConversationId,
    },
}

/// Result of running the gate over a session
#[derive(Debug)]
pub enum TokenVerdict {
    /// Not a private conversation; the gate does not apply
    Skipped,
    /// No token was present; a new one was stored
    Issued,
    /// Existing token is valid for this conversation
    Verified,
    /// Existing token was rejected and replaced in the same pass
    Reissued(Rejection),
}

impl TokenVerdict {
    /// Whether `session.token` was changed and needs persisting
    pub fn changed_session(&self) -> bool {
        matches!(self, TokenVerdict::Issued | TokenVerdict::Reissued(_))
    }
}

/// Issues and verifies per-conversation credentials
pub struct TokenGate {
    secret: SecretString,
    verbose: bool,
}

impl TokenGate {
    pub fn new(secret: SecretString, verbose: bool) -> Self {
        Self { secret, verbose }
    }

    fn key(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    pub fn issue(
        &self,
        conversation: ConversationId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        token::sign(&CredentialPayload::new(conversation, user, now), self.key())
    }

    /// Valid signature and bound to `conversation`
    pub fn verify(&self, token: &str, conversation: ConversationId) -> Result<CredentialPayload, Rejection> {
        let payload = token::verify(token, self.key()).map_err(Rejection::Invalid)?;
        if payload.conversation() != conversation {
            return Err(Rejection::ConversationMismatch {
                expected: conversation,
                found: payload.conversation(),
            });
        }
        Ok(payload)
    }

    /// Leaves `session.token` holding a valid credential for this
    /// conversation. An invalid or foreign token is dropped and replaced
    /// right away; callers never see the rejection as an error.
    pub fn vet(&self, session: &mut Session, update: &InboundUpdate) -> Result<TokenVerdict, TokenError> {
        self.vet_at(session, update, Utc::now())
    }

    pub fn vet_at(
        &self,
        session: &mut Session,
        update: &InboundUpdate,
        now: DateTime<Utc>,
    ) -> Result<TokenVerdict, TokenError> {
        if !update.is_private() {
            return Ok(TokenVerdict::Skipped);
        }

        let conversation = update.chat_id;
        let user = update.sender.id;

        let rejection = match session.token.as_deref() {
            None => None,
            Some(existing) => match self.verify(existing, conversation) {
                Ok(_) => {
                    if self.verbose {
                        log::debug!("Token verified for user {} in chat {}", user, conversation);
                    }
                    return Ok(TokenVerdict::Verified);
                }
                Err(rejection) => Some(rejection),
            },
        };

        if let Some(rejection) = &rejection {
            if self.verbose {
                log::debug!("Dropping token for chat {}: {:?}", conversation, rejection);
            }
            session.token = None;
        }

        session.token = Some(self.issue(conversation, user, now)?);
        if self.verbose {
            log::debug!("Token stored for user {} in chat {}", user, conversation);
        }

        Ok(match rejection {
            Some(rejection) => TokenVerdict::Reissued(rejection),
            None => TokenVerdict::Issued,
        })
    }
}
