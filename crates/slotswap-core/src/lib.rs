//! SlotSwap Core - Domain records, validation, and the entity store.
//!
//! This crate holds the records the swap engine protects (users, calendar
//! events, swap requests), the error taxonomy, and the arena store with its
//! pending-request index. It has no dependencies on other SlotSwap crates.

pub mod error;
pub mod event;
pub mod id;
pub mod storage;
pub mod swap;
pub mod user;
pub mod validation;

// Re-exports for convenience
pub use error::{EntityRef, ErrorKind, Result, StorageError, SwapError, ValidationError};
pub use event::{Event, EventStatus};
pub use id::{EventId, SwapRequestId, UserId};
pub use storage::memory::InMemoryStore;
pub use storage::{Store, Tables};
pub use swap::{SwapRequest, SwapRequestStatus};
pub use user::{User, UserSummary};
pub use validation::Validator;
