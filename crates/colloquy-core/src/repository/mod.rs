//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (colloquy-store) implements. The core crate never depends on any specific
//! storage technology.

pub mod agent;
pub mod message;
pub mod session;

pub use agent::AgentRepository;
pub use message::MessageRepository;
pub use session::SessionRepository;

/// The full capability set a session storage backend provides.
///
/// Blanket-implemented for anything that implements all three repository
/// traits, so a caller generic over `SessionStore` can swap storage backends
/// without caring which concrete type sits behind it.
pub trait SessionStore: SessionRepository + AgentRepository + MessageRepository {}

impl<T: SessionRepository + AgentRepository + MessageRepository> SessionStore for T {}
