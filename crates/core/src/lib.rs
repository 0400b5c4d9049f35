//! Domain logic for the Clarity coaching platform.
//!
//! This crate has zero internal deps so the API layer, repositories, and any
//! future CLI tooling can all share the same rules. Anything that talks to
//! the database or the network lives in the `db` and `api` crates instead.

pub mod clock;
pub mod debounce;
pub mod error;
pub mod hashing;
pub mod invites;
pub mod journey;
pub mod roles;
pub mod types;
pub mod workbook;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
