//! Domain types for the authorization core.

pub mod client;
pub mod principal;

pub use client::{ClientDescriptor, ClientValidationError, GrantType, UnknownGrantType};
pub use principal::Principal;
