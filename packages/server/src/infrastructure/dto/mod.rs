//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: frames exchanged over `/ws`
//! - `http`: admin API requests and responses

pub mod conversion;
pub mod http;
pub mod websocket;
