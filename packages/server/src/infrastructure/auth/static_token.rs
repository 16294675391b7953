//! Static bearer-token authenticator.
//!
//! Maps opaque tokens to user identities from a fixed table. Token issuance
//! and verification (JWT etc.) belong to an external service; this
//! implementation exists so the hub can run stand-alone.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AuthError, Authenticator, Credentials, UserId, ValueObjectError};

/// Errors when parsing a `TOKEN=USER` pair
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenPairError {
    #[error("expected TOKEN=USER, got '{0}'")]
    MissingSeparator(String),
    #[error("token must not be empty")]
    EmptyToken,
    #[error(transparent)]
    InvalidUser(#[from] ValueObjectError),
}

#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuthenticator {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }

    /// Build from `TOKEN=USER` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, TokenPairError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = HashMap::new();
        for pair in pairs {
            let (token, user_id) = parse_token_pair(pair.as_ref())?;
            tokens.insert(token, user_id);
        }
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn parse_token_pair(pair: &str) -> Result<(String, UserId), TokenPairError> {
    let (token, user) = pair
        .split_once('=')
        .ok_or_else(|| TokenPairError::MissingSeparator(pair.to_string()))?;
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenPairError::EmptyToken);
    }
    Ok((token.to_string(), UserId::new(user.trim().to_string())?))
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, AuthError> {
        let token = credentials
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
