//! Property-based tests for the session lifecycle.
//!
//! Drives a [`Session`] through arbitrary interleavings of transport
//! outcomes, closes, and ticks, and checks the lifecycle invariants hold in
//! every reachable state.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use confab_core::{ClientError, Credentials, Session, SessionConfig, SessionState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    HandshakeComplete,
    HandshakeFailed,
    TransportClosed,
    Close,
    AdvanceAndTick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::HandshakeComplete),
        1 => Just(Op::HandshakeFailed),
        1 => Just(Op::TransportClosed),
        1 => Just(Op::Close),
        3 => (0u64..20).prop_map(Op::AdvanceAndTick),
    ]
}

proptest! {
    /// Subscriptions exist exactly while connected, the handshake timer
    /// fires at most once, and close is always safe.
    #[test]
    fn lifecycle_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let start = Instant::now();
        let config = SessionConfig { connect_timeout: Duration::from_secs(15) };
        let (mut session, actions) =
            Session::open(42, &Credentials::new("7", "token"), start, config).unwrap();
        prop_assert_eq!(actions.len(), 1);

        let mut now = start;
        let mut timeouts_fired = 0u32;

        for op in ops {
            match op {
                Op::HandshakeComplete => {
                    let actions = session.handshake_complete();
                    // Only a pending handshake yields subscriptions.
                    prop_assert!(actions.len() == 4 || actions.is_empty());
                },
                Op::HandshakeFailed => {
                    let err = session.handshake_failed("fuzzed failure");
                    prop_assert!(
                        matches!(err, ClientError::Connection { .. }),
                        "expected ClientError::Connection, got {:?}",
                        err
                    );
                    prop_assert_eq!(session.state(), SessionState::Failed);
                },
                Op::TransportClosed => session.transport_closed(),
                Op::Close => {
                    session.close();
                    prop_assert_eq!(session.state(), SessionState::Disconnected);
                    // Idempotent: a second close yields nothing.
                    prop_assert!(session.close().is_empty());
                },
                Op::AdvanceAndTick(secs) => {
                    now += Duration::from_secs(secs);
                    if session.tick(now).is_some() {
                        timeouts_fired += 1;
                        prop_assert_eq!(session.state(), SessionState::Failed);
                    }
                },
            }

            // Subscriptions are held exactly while connected.
            prop_assert_eq!(
                session.subscriptions().len(),
                if session.is_connected() { 4 } else { 0 }
            );
        }

        prop_assert!(timeouts_fired <= 1, "handshake timeout fired twice");
    }
}
