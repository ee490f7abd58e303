//! Core business logic - framework-agnostic operations over the entity store.
//!
//! Every operation takes the database connection explicitly and either
//! commits all of its writes or fails before writing anything.

/// Access rules for organizing, managing and viewing clubs
pub mod access;
/// Cascade deletion of clubs and events
pub mod cascade;
/// Club management
pub mod club;
/// Events, registration and event payments
pub mod event;
/// Income, expenses and club balances
pub mod finance;
/// Club memberships
pub mod membership;
/// Monthly contribution generation and settlement
pub mod monthly;
/// Application statistics and ledger export
pub mod report;
/// Weekly club schedules
pub mod schedule;
/// Accounts and session
pub mod user;
