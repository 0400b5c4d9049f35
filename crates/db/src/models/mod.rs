//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where patching exists

pub mod company;
pub mod event;
pub mod invite;
pub mod journey;
pub mod role;
pub mod session;
pub mod training;
pub mod user;
pub mod workbook;
