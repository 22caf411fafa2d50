//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::{
    domain::{RoomName, ValueError},
    infrastructure::codec::WireFormat,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Parser, Debug, Clone)]
#[command(name = "roomhub-server")]
#[command(about = "Multi-room WebSocket chat relay", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROOMHUB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROOMHUB_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Name of the room that always exists and cannot be deleted
    #[arg(long, env = "ROOMHUB_DEFAULT_ROOM", default_value = "默认聊天室")]
    pub default_room: String,

    /// Number of recent messages replayed to a joining client
    #[arg(long, env = "ROOMHUB_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Encoding of outbound frames: `hex` (legacy client) or `json`
    #[arg(long, env = "ROOMHUB_WIRE_FORMAT", default_value_t = WireFormat::Hex)]
    pub wire_format: WireFormat,

    /// SQLite file keeping chat history across restarts; in-memory when omitted
    #[arg(long, env = "ROOMHUB_DATABASE")]
    pub database: Option<PathBuf>,

    /// Default log level, overridden by `RUST_LOG`
    #[arg(long, env = "ROOMHUB_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid default room: {0}")]
    DefaultRoom(#[from] ValueError),

    #[error("history limit must be greater than zero")]
    HistoryLimit,
}

/// Validated server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub default_room: RoomName,
    pub history_limit: usize,
    pub wire_format: WireFormat,
    pub database: Option<PathBuf>,
}

impl ServerConfig {
    /// Settings for a server on `host:port` with the default history limit
    /// and wire format.
    pub fn new(host: impl Into<String>, port: u16, default_room: RoomName) -> Self {
        Self {
            host: host.into(),
            port,
            default_room,
            history_limit: DEFAULT_HISTORY_LIMIT,
            wire_format: WireFormat::default(),
            database: None,
        }
    }

    pub fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let default_room = RoomName::new(args.default_room)?;
        if args.history_limit == 0 {
            return Err(ConfigError::HistoryLimit);
        }
        Ok(Self {
            host: args.host,
            port: args.port,
            default_room,
            history_limit: args.history_limit,
            wire_format: args.wire_format,
            database: args.database,
        })
    }
}
