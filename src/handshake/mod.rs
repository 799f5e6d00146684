//! # Port Handshake Module
//!
//! Discovery of the WebSocket port TMM listens on.
//!
//! This module handles:
//! - Encoding the port request as base64 JSON in a `tmmsocketserverport://` URL
//! - Decoding TMM's response URL back into a port
//! - Sending requests through an injected URL-scheme transport

pub mod codec;
pub mod protocol;
pub mod transport;

pub use codec::{
    build_request_url, build_response_url, decode_response_url, try_decode_response_url,
    HandshakeError,
};
pub use protocol::{PortRequest, PortResponse};
pub use transport::{ConsoleTransport, PortDiscovery, UrlSchemeTransport};
