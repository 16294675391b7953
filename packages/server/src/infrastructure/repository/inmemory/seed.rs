//! Command-line seeds for the in-memory collaborator.
//!
//! A seed has the form `ID=USER,USER,...`, e.g. `general=alice,bob`.

use std::str::FromStr;

use thiserror::Error;

use crate::domain::{ConversationId, UserId, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("expected ID=USER,USER,... but no '=' was found")]
    MissingSeparator,
    #[error("a conversation needs at least one participant")]
    NoParticipants,
    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),
}

/// A conversation to register at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSeed {
    pub id: ConversationId,
    pub participants: Vec<UserId>,
}

impl FromStr for ConversationSeed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, users) = s.split_once('=').ok_or(SeedError::MissingSeparator)?;
        let id = ConversationId::new(id.trim().to_string())?;
        let participants = users
            .split(',')
            .filter(|user| !user.trim().is_empty())
            .map(|user| UserId::new(user.trim().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        if participants.is_empty() {
            return Err(SeedError::NoParticipants);
        }
        Ok(Self { id, participants })
    }
}
