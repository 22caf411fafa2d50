//! Utilities shared by the Roomhub packages.

pub mod logger;
pub mod time;
