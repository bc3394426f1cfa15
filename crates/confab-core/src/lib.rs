//! Core building blocks for the Confab client.
//!
//! Everything here is runtime-free: pure state machines and abstractions
//! that work identically in production and in deterministic tests.
//!
//! # Components
//!
//! - [`env::Environment`]: time and randomness abstraction, generic over the
//!   `Instant` type so tests can run on virtual time
//! - [`error::ClientError`]: the client-wide error taxonomy; every failure
//!   surfaces to the UI through one channel
//! - [`session::Session`]: per-conversation connection lifecycle state
//!   machine (the heart of the connection manager)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod session;

pub use env::Environment;
pub use error::ClientError;
pub use session::{Credentials, Session, SessionAction, SessionConfig, SessionState};
