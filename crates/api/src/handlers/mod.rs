//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod companies;
pub mod employees;
pub mod events;
pub mod invites;
pub mod journey;
pub mod training;
pub mod users;
pub mod workbook;
