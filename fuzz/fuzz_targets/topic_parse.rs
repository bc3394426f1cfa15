//! Fuzz target for topic string parsing
//!
//! # Invariants
//!
//! - Parsing never panics on arbitrary strings
//! - An accepted topic round-trips through its canonical name

#![no_main]

use confab_proto::Topic;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(topic) = Topic::parse(input) {
        let canonical = topic.name();
        assert_eq!(Topic::parse(&canonical), Ok(topic));
    }
});
