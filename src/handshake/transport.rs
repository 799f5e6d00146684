//! # URL-Scheme Transport
//!
//! The handshake travels through the OS URL-scheme dispatcher, which this
//! crate treats as an opaque channel: requests go out through a
//! [`UrlSchemeTransport`], responses come back as URLs delivered by the host
//! application to [`PortDiscovery::handle_incoming`].

use std::io::{self, Write};

use tracing::{info, warn};

use super::codec::{build_request_url, try_decode_response_url};
use super::protocol::PortResponse;
use crate::error::{Result, TmmError};

/// Outgoing side of the URL-scheme channel
#[cfg_attr(test, mockall::automock)]
pub trait UrlSchemeTransport {
    /// Hand `url` to whatever opens custom-scheme URLs
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Transport that writes each URL as a line, for a person or script to open
pub struct ConsoleTransport<W: Write> {
    writer: W,
}

impl ConsoleTransport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> UrlSchemeTransport for ConsoleTransport<W> {
    fn open(&mut self, url: &str) -> Result<()> {
        writeln!(self.writer, "{}", url)
            .and_then(|_| self.writer.flush())
            .map_err(|e| TmmError::Transport(format!("Failed to write URL: {}", e)))
    }
}

/// Client side of the TMM port handshake
///
/// Holds no handshake state: every request and every incoming URL is handled
/// on its own.
pub struct PortDiscovery<T: UrlSchemeTransport> {
    transport: T,
    return_url: String,
}

impl<T: UrlSchemeTransport> PortDiscovery<T> {
    /// Create a handshake client
    ///
    /// # Arguments
    ///
    /// * `transport` - Channel used to send the request URL
    /// * `return_url` - URL TMM should open to deliver its response
    pub fn new(transport: T, return_url: impl Into<String>) -> Self {
        Self {
            transport,
            return_url: return_url.into(),
        }
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    /// Send a port request to TMM
    ///
    /// # Returns
    ///
    /// * `Result<String>` - The request URL that was sent
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be encoded or the transport fails
    pub fn request_port(&mut self) -> Result<String> {
        let url = build_request_url(&self.return_url)?;
        self.transport.open(&url)?;
        info!("Requested TMM WebSocket port (returning to {})", self.return_url);
        Ok(url)
    }

    /// Handle a URL delivered to the application by the OS
    ///
    /// # Returns
    ///
    /// * `Option<PortResponse>` - The announced port, or `None` if the URL is not a valid response
    pub fn handle_incoming(&self, url: &str) -> Option<PortResponse> {
        match try_decode_response_url(url) {
            Ok(response) => {
                info!("TMM WebSocket available at {}", response.websocket_url());
                Some(response)
            }
            Err(e) => {
                warn!("Ignoring URL {}: {}", url, e);
                None
            }
        }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
