//! Storage traits for the authorization core.
//!
//! The persistent client-details store is an external collaborator; this
//! module defines its interface and ships an in-memory implementation
//! for tests and static configurations. Production backends implement
//! [`ClientDetailsStore`] in their own crates.

pub mod client;
pub mod memory;

pub use client::{ClientDetailsStore, ClientRecord};
pub use memory::MemoryClientStore;
