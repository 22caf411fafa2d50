//! Wire framing of WebSocket text frames.
//!
//! The legacy browser client hex-encodes the UTF-8 JSON of every frame in
//! both directions. Inbound frames are accepted either way; outbound frames
//! use the configured [`WireFormat`].

use std::{fmt, str::FromStr};

use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{InboundMessage, MessagePushError, ServerEvent},
    infrastructure::dto::websocket::{ClientMessageDto, ServerMessageDto},
};

/// Encoding of outbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// Hex of the UTF-8 JSON, understood by the legacy client.
    #[default]
    Hex,
    /// Plain JSON.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown wire format '{0}' (expected 'hex' or 'json')")]
pub struct UnknownWireFormat(String);

impl FromStr for WireFormat {
    type Err = UnknownWireFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "json" => Ok(Self::Json),
            _ => Err(UnknownWireFormat(value.to_string())),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex => write!(f, "hex"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is neither JSON nor hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("hex payload is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed message: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec {
    format: WireFormat,
}

impl WireCodec {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn encode(&self, event: &ServerEvent) -> Result<String, MessagePushError> {
        let json = serde_json::to_string(&ServerMessageDto::from(event))
            .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))?;
        Ok(match self.format {
            WireFormat::Hex => hex::encode(json),
            WireFormat::Json => json,
        })
    }

    /// Decode one inbound text frame. JSON is recognised by its leading `{`;
    /// anything else is treated as hex.
    ///
    /// Only unreadable JSON is an error. Missing or mistyped fields are
    /// defaulted by [`ClientMessageDto::from_value`].
    pub fn decode(&self, frame: &str) -> Result<InboundMessage, DecodeError> {
        let frame = frame.trim();
        let value: Value = if frame.starts_with('{') {
            serde_json::from_str(frame)?
        } else {
            let json = String::from_utf8(hex::decode(frame)?)?;
            serde_json::from_str(&json)?
        };
        Ok(ClientMessageDto::from_value(&value).into())
    }
}
