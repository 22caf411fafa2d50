//! Roomhub: a multi-room WebSocket chat relay.
//!
//! Layers, inner to outer:
//! - `domain`: the room/session/presence state machine, free of I/O
//! - `usecase`: locking, effect dispatch and the persistence queue
//! - `infrastructure`: wire codec, DTOs, WebSocket pusher, message store
//! - `ui`: axum routes and handlers

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
