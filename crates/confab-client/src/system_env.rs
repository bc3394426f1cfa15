//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` is the production implementation of the Environment trait
//! using real system time and the OS RNG. Production behavior is therefore
//! non-deterministic; tests use the mock environment from `confab-core`
//! instead.

use std::time::Duration;

use confab_core::Environment;

/// Production environment using system time and OS randomness.
///
/// Uses `std::time::Instant::now()` for time, `tokio::time::sleep()` for
/// async sleeping, and getrandom for randomness (provisional id nonces).
///
/// # Panics
///
/// Panics if the OS RNG fails. RNG failure indicates OS-level issues and the
/// client cannot mint collision-resistant provisional ids without it.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable for id generation");
    }
}
