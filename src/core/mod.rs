//! Core business logic - framework-agnostic and transport-agnostic.
//!
//! Every function in this tree operates over an injected `&DatabaseConnection`
//! and returns structured data; the service layer turns outcomes into reply
//! strings and the adapters render them. No component caches ledger state
//! across calls - the store is the only owner.

/// Privilege registry - membership checks, grant/revoke, address capture
pub mod admin;
/// Business-date resolution in the fixed operating timezone
pub mod clock;
/// Deposit approval state machine
pub mod deposit;
/// Monetary amount extraction from free text
pub mod extract;
/// Daily aggregates, merged recent-transaction views, dashboard snapshot
pub mod ledger;
/// Daily summary rendering, fan-out, and scheduling
pub mod notify;
/// Payment entries
pub mod payment;
