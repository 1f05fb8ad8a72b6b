//! Shared domain types for the Colloquy session store.
//!
//! This crate contains the types exchanged across the store boundary:
//! `Session`, `SessionAgent`, `SessionMessage`, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod error;
pub mod session;
