//! # Port Handshake Constants and Types
//!
//! Fixed contract with the TMM companion application for the WebSocket port
//! request/response exchange.

use serde::{Deserialize, Serialize};

/// URL scheme TMM registers for port requests
pub const TMM_REQUEST_SCHEME: &str = "tmmsocketserverport";

/// Host part of the TMM port request URL
pub const TMM_REQUEST_HOST: &str = "trimble.TMM.ios";

/// TMM serves its WebSocket on the loopback interface only
pub const TMM_SOCKET_HOST: &str = "127.0.0.1";

/// Return URL used when none is configured
pub const DEFAULT_RETURN_URL: &str = "socketport://spp4d.playground.ios";

/// Port request sent to TMM
///
/// Serializes as `{"returl":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRequest {
    /// URL TMM opens to deliver its response
    pub returl: String,
}

/// Port response delivered by TMM through the return URL
///
/// Deserializes from `{"port": <int>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResponse {
    /// WebSocket port chosen by TMM
    pub port: u64,
}

impl PortResponse {
    /// WebSocket URL of the TMM telemetry stream (`ws://127.0.0.1:<port>`)
    pub fn websocket_url(&self) -> String {
        self.websocket_url_on(TMM_SOCKET_HOST)
    }

    /// WebSocket URL of the TMM telemetry stream on a given host
    pub fn websocket_url_on(&self, host: &str) -> String {
        format!("ws://{}:{}", host, self.port)
    }
}
