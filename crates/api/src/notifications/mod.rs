//! Toast notification routing.
//!
//! The [`ToastRouter`] subscribes to the event bus and pushes critical
//! events to the affected users' open WebSocket connections.

pub mod router;

pub use router::ToastRouter;
