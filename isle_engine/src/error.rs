use isle_formats::FormatError;
use thiserror::Error;

use crate::world::ActorId;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state `{0}` already exists in the game state registry")]
    AlreadyExists(String),
    #[error("no state type is known for tag `{0}`")]
    UnknownType(String),
    #[error("state entry id {0} appears more than once")]
    DuplicateEntryId(u8),
    #[error("unsupported save version {found:#x} (expected {expected:#x})")]
    BadVersion { found: u32, expected: u32 },
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("scripted action {object_id} is missing its {field}")]
    MissingDescriptorData { object_id: u32, field: &'static str },
    #[error("unknown actor class `{0}`")]
    UnknownClass(String),
    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("actor {0} is not alive in this world")]
    ActorNotFound(ActorId),
    #[error("actor {0} does not run a mission")]
    NoMission(ActorId),
    #[error("actor has not bound its `{0}`")]
    Unbound(&'static str),
    #[error("pizza mission state has no entry for actor id {0}")]
    MissingEntry(u8),
}
