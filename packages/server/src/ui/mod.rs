//! WebSocket chat relay server: routes, handlers and the runner.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
