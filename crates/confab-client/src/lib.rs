//! Client
//!
//! Action-based messaging client for the Confab conversation service.
//! Manages the live conversation channel, optimistic send reconciliation,
//! typing presence, and visibility-gated notifications.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and Action-Based patterns as
//! [`confab_core`]. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`Client`]: Top-level state machine for one mounted chat surface
//! - [`Reconciler`]: Optimistic sends, echo replacement, duplicate drops
//! - [`TypingTracker`]: Server-driven typing presence
//! - [`Notifier`]: Visibility-gated native notifications
//! - [`Runtime`]: Tokio event loop wiring a [`Client`] to a [`Driver`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod driver;
mod event;
mod notifier;
mod reconciler;
mod router;
mod runtime;
mod system_env;
mod typing;

pub use client::{Client, ClientConfig};
pub use confab_core::{ClientError, Credentials, Environment, SessionState};
pub use driver::Driver;
pub use event::{ClientAction, ClientEvent};
pub use notifier::{NOTIFICATION_BODY_LIMIT, Notification, Notifier};
pub use reconciler::{DEFAULT_SEND_TIMEOUT, Message, Reconciler};
pub use router::{RoutedFrame, route};
pub use runtime::{Runtime, TICK_INTERVAL};
pub use system_env::SystemEnv;
pub use typing::TypingTracker;
