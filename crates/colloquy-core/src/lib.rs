//! Repository trait definitions for the Colloquy session store.
//!
//! This crate defines the "ports" (repository traits) that the storage layer
//! implements. It depends only on `colloquy-types` -- never on
//! `colloquy-store` or any database/IO crate.

pub mod repository;
