//! Domain logic for the CiviTrack complaint-tracking platform.
//!
//! This crate is pure: no I/O, no database, no HTTP. It holds the state
//! machines for reports and assignments, the routing-advisor policy, the
//! points/redemption rules, and the shared error type. The `db` and `api`
//! crates build on top of it.

pub mod error;
pub mod execution;
pub mod points;
pub mod redemption;
pub mod roles;
pub mod routing;
pub mod status;
pub mod types;
