//! Async runtime.
//!
//! Event loop that drives the client state machine. Uses `tokio::select!` to
//! interleave host events (UI intents, transport callbacks, inbound frames)
//! with a periodic tick that feeds the deadline checks. Each event becomes a
//! batch of actions which the [`Driver`] executes in order; driver failures
//! are logged and the loop continues.

use std::time::Duration;

use confab_core::Environment;
use tokio::sync::mpsc;

use crate::{client::Client, driver::Driver, event::ClientEvent};

/// Cadence of the deadline-check tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the host event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Async runtime wrapping a [`Client`] and a [`Driver`].
///
/// The host holds the [`mpsc::Sender`] half and pushes [`ClientEvent`]s; the
/// runtime owns everything else. The loop ends when the sender is dropped.
pub struct Runtime<D, E: Environment> {
    client: Client<E>,
    env: E,
    driver: D,
    events: mpsc::Receiver<ClientEvent<E::Instant>>,
}

impl<D: Driver, E: Environment> Runtime<D, E> {
    /// Create a runtime and the sender the host pushes events through.
    pub fn new(
        client: Client<E>,
        env: E,
        driver: D,
    ) -> (Self, mpsc::Sender<ClientEvent<E::Instant>>) {
        let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { client, env, driver, events }, tx)
    }

    /// Run the event loop until the host drops its sender.
    pub async fn run(mut self) {
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_event = self.events.recv() => {
                    match maybe_event {
                        Some(event) => self.dispatch(event).await,
                        None => break,
                    }
                }

                _ = tick.tick() => {
                    let now = self.env.now();
                    self.dispatch(ClientEvent::Tick { now }).await;
                }
            }
        }

        // Drop the channel before running teardown actions.
        let actions = self.client.handle(ClientEvent::CloseConversation);
        for action in actions {
            if let Err(e) = self.driver.execute(action).await {
                tracing::warn!(error = %e, "driver failed during shutdown");
            }
        }
    }

    async fn dispatch(&mut self, event: ClientEvent<E::Instant>) {
        for action in self.client.handle(event) {
            if let Err(e) = self.driver.execute(action).await {
                tracing::warn!(error = %e, "driver failed to execute action");
            }
        }
    }
}
