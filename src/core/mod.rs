//! Conversation core
//!
//! Slot memory, intent resolution and turn dispatch. Nothing in here talks to
//! the network directly; collaborators come in through `crate::providers`.

mod chat;
mod dispatch;
mod memory;
mod render;
mod resolver;
mod sessions;

pub use chat::{ChatEngine, TurnOutcome};
pub use dispatch::TurnDispatcher;
pub use memory::SessionMemory;
pub use resolver::IntentResolver;
pub use sessions::SessionStore;
