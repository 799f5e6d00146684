//! # TMM Telemetry Library
//!
//! Decode GNSS receiver telemetry streamed by Trimble Mobile Manager (TMM).
//!
//! This library provides the two pure building blocks a TMM client needs:
//! strict decoding of the JSON telemetry messages into validated records, and
//! the base64 URL-scheme handshake used to discover TMM's WebSocket port.

pub mod config;
pub mod error;
pub mod handshake;
pub mod telemetry;
