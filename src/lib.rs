//! Workspace meta-package.
//!
//! Exists so workspace-level dev tooling (git hooks via cargo-husky) has a
//! package to attach to. All functionality lives in the `crates/` members.
