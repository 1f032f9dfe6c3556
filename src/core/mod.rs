//! Core business logic - framework-agnostic scheduling and ledger operations.
//!
//! Everything in this module takes a database connection (and, for mutations,
//! a notifier plus the caller's identity) and returns plain data. No HTTP,
//! auth or transport concerns live here.

/// Enrollment credits: creation, legacy normalization, atomic deduction
pub mod enrollment;
/// Recurring series expansion into concrete occurrence datetimes
pub mod expansion;
/// Student ledger aggregation (read-only projection)
pub mod ledger;
/// Lesson lifecycle: create, update, cancel, reactivate, mark attended
pub mod lesson;
/// Payment records: create, delete, lookup
pub mod payment;
/// Recurring series creation and cascade cancellation
pub mod series;
/// Student records: creation and lookup targets for validation
pub mod student;
/// Teacher records: creation and lookup targets for validation
pub mod teacher;
