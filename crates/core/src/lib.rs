//! Core business logic for peekhour.
//!
//! Services own the rules (nesting limits, approval states, moderator
//! permissions) and talk to the database only through `peekhour-db`
//! repositories.

pub mod services;

pub use services::*;
