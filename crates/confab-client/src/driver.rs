//! Action execution boundary.
//!
//! The client state machine is pure; a [`Driver`] is the impure half that
//! carries its actions out against the real world: the message broker
//! connection, the history endpoint, the notification surface, the renderer.
//! Hosts implement this once per platform; tests implement it with a
//! recording stub.

use crate::event::ClientAction;

/// Executes [`ClientAction`]s against the host platform.
pub trait Driver {
    /// Error from executing a single action.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute one action.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when the action cannot be carried out.
    /// The runtime logs the failure and continues; a driver error never
    /// tears down the event loop.
    fn execute(
        &mut self,
        action: ClientAction,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}
