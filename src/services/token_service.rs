//! Signed, time-boxed claims for sessions and signup gating.
//!
//! Tokens are HS256 JWTs. The time window is checked here against an
//! injectable [`Clock`] rather than by the JWT library, so verification is
//! deterministic under test.

use chrono::{DateTime, Duration, Months, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::clock::Clock;
use crate::config::TokenConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,

    /// Login id; session tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Requester address; signup tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Seconds since the epoch; signup tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    pub exp: i64,
}

impl Claims {
    /// A signup token carries `source` and no `sub`.
    #[must_use]
    pub const fn is_signup(&self) -> bool {
        self.sub.is_none() && self.source.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidReason {
    BadSignature,
    Expired,
    NotYetValid,
    Malformed,
}

impl InvalidReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadSignature => "badSignature",
            Self::Expired => "expired",
            Self::NotYetValid => "notYetValid",
            Self::Malformed => "malformed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(Claims),
    Invalid(InvalidReason),
}

/// How long a session token lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifetime {
    OneMonth,
    Days(u32),
}

pub struct TokenService {
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    session_lifetime: SessionLifetime,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    #[must_use]
    pub fn new(issuer: impl Into<String>, secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: issuer.into(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            session_lifetime: SessionLifetime::OneMonth,
            clock,
        }
    }

    /// Builds the service from config. An empty secret is replaced by a
    /// random one, so tokens do not survive a restart.
    #[must_use]
    pub fn from_config(config: &TokenConfig, clock: Arc<dyn Clock>) -> Self {
        let service = if config.signing_secret.is_empty() {
            warn!("tokens.signing_secret is empty; using a random per-process secret");
            let secret: [u8; 32] = rand::rng().random();
            Self::new(&config.issuer, &secret, clock)
        } else {
            Self::new(&config.issuer, config.signing_secret.as_bytes(), clock)
        };

        let lifetime = match config.session_lifetime_days {
            0 => SessionLifetime::OneMonth,
            days => SessionLifetime::Days(days),
        };
        service.with_session_lifetime(lifetime)
    }

    #[must_use]
    pub const fn with_session_lifetime(mut self, lifetime: SessionLifetime) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// A token usable from `min_delay_seconds` after issuance until
    /// `max_lifetime_seconds` after issuance.
    pub fn issue_signup_token(
        &self,
        source: &str,
        min_delay_seconds: u32,
        max_lifetime_seconds: u32,
    ) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: None,
            source: Some(source.to_string()),
            nbf: Some((now + Duration::seconds(i64::from(min_delay_seconds))).timestamp()),
            exp: (now + Duration::seconds(i64::from(max_lifetime_seconds))).timestamp(),
        };

        self.encode(&claims)
    }

    pub fn issue_session_token(&self, login_id: &str) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: Some(login_id.to_string()),
            source: None,
            nbf: None,
            exp: self.session_expiry(now).timestamp(),
        };

        self.encode(&claims)
    }

    fn session_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.session_lifetime {
            SessionLifetime::OneMonth => now
                .checked_add_months(Months::new(1))
                .unwrap_or_else(|| now + Duration::days(30)),
            SessionLifetime::Days(days) => now + Duration::days(i64::from(days)),
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Check signature, issuer and time window. Pure; performs no I/O.
    #[must_use]
    pub fn verify(&self, token: &str) -> TokenVerdict {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();
        validation.set_issuer(&[&self.issuer]);

        let claims = match jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        InvalidReason::BadSignature
                    }
                    _ => InvalidReason::Malformed,
                };
                return TokenVerdict::Invalid(reason);
            }
        };

        let now = self.clock.now().timestamp();
        if now > claims.exp {
            return TokenVerdict::Invalid(InvalidReason::Expired);
        }
        if claims.nbf.is_some_and(|nbf| now < nbf) {
            return TokenVerdict::Invalid(InvalidReason::NotYetValid);
        }

        TokenVerdict::Valid(claims)
    }
}
