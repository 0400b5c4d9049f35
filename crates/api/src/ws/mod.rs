//! WebSocket infrastructure for real-time features.
//!
//! Connections authenticate with a JWT at upgrade time and are tracked by
//! the [`manager::WsManager`]. Two things flow outward over a connection:
//! toast notifications routed from the event bus, and the per-second
//! journey countdown for employees who subscribe to it.

mod countdown;
mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
