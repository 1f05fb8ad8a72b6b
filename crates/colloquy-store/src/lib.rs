//! SQLite storage layer for Colloquy.
//!
//! Implements the repository traits defined in `colloquy-core` using sqlx
//! with WAL mode and split read/write connection pools. The calling
//! framework constructs a [`sqlite::pool::DatabasePool`] once, hands it to
//! [`sqlite::SqliteSessionStore`], and talks to the store exclusively
//! through the `colloquy-core` traits.

pub mod sqlite;

pub use sqlite::SqliteSessionStore;
pub use sqlite::pool::DatabasePool;
