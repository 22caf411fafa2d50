//! Infrastructure layer: wire codec, DTOs, delivery and storage adapters.

pub mod codec;
pub mod dto;
pub mod message_pusher;
pub mod repository;
