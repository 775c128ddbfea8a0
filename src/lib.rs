//! `PayDesk` - a chat-driven payment and deposit ledger
//!
//! This crate implements the core of a two-channel bookkeeping bot: messages from
//! a payment group become ledger entries directly, messages from a deposit group
//! become approval candidates that privileged users confirm or reject via inline
//! buttons. Aggregates are bucketed by business date in a fixed operating timezone
//! and exposed as reply strings and as a dashboard snapshot. The chat transport
//! and the HTTP presentation layer are thin adapters that call into this crate.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Configuration management - settings file and database connection
pub mod config;
/// Core business logic - extraction, approval state machine, aggregation, notifier
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Transport-facing layer - ingestion, button actions, and commands
pub mod service;

#[cfg(test)]
pub mod test_utils;
