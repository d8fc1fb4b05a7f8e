use thiserror::Error;

use crate::event::EventStatus;
use crate::id::{EventId, SwapRequestId, UserId};

/// A reference to a stored record, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    User(UserId),
    Event(EventId),
    SwapRequest(SwapRequestId),
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::User(id) => write!(f, "{}", id),
            EntityRef::Event(id) => write!(f, "{}", id),
            EntityRef::SwapRequest(id) => write!(f, "{}", id),
        }
    }
}

impl From<UserId> for EntityRef {
    fn from(id: UserId) -> Self {
        EntityRef::User(id)
    }
}

impl From<EventId> for EntityRef {
    fn from(id: EventId) -> Self {
        EntityRef::Event(id)
    }
}

impl From<SwapRequestId> for EntityRef {
    fn from(id: SwapRequestId) -> Self {
        EntityRef::SwapRequest(id)
    }
}

/// Coarse classification of a [`SwapError`], one per observable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    NotOwner,
    SelfSwap,
    InvalidState,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotOwner => "not_owner",
            ErrorKind::SelfSwap => "self_swap",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Storage => "storage_error",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SwapError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(EntityRef),

    #[error("{actor} does not own {entity}")]
    NotOwner { actor: UserId, entity: EntityRef },

    #[error("Cannot swap two slots owned by the same user ({0})")]
    SelfSwap(UserId),

    #[error("Invalid state for {entity}: {reason}")]
    InvalidState { entity: EntityRef, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SwapError {
    pub fn not_found(entity: impl Into<EntityRef>) -> Self {
        SwapError::NotFound(entity.into())
    }

    pub fn not_owner(actor: UserId, entity: impl Into<EntityRef>) -> Self {
        SwapError::NotOwner {
            actor,
            entity: entity.into(),
        }
    }

    pub fn invalid_state(entity: impl Into<EntityRef>, reason: impl Into<String>) -> Self {
        SwapError::InvalidState {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::Validation(_) => ErrorKind::Validation,
            SwapError::NotFound(_) => ErrorKind::NotFound,
            SwapError::NotOwner { .. } => ErrorKind::NotOwner,
            SwapError::SelfSwap(_) => ErrorKind::SelfSwap,
            SwapError::InvalidState { .. } => ErrorKind::InvalidState,
            SwapError::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long: {0} characters (max 200)")]
    TitleTooLong(usize),

    #[error("End time {end} must be after start time {start}")]
    EndNotAfterStart { start: String, end: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Credential cannot be empty")]
    EmptyCredential,

    #[error("Status {0} cannot be set directly")]
    UnsupportedStatus(EventStatus),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, SwapError>;
