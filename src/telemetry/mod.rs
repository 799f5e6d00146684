//! # Telemetry Module
//!
//! Decoding of the GNSS telemetry TMM streams over its local WebSocket.
//!
//! This module handles:
//! - Strict decoding of one JSON message into a validated record
//! - Mapping of the diff status, subscription and constellation codes
//! - Collecting decoded records and counting rejected messages

pub mod decoder;
pub mod feed;
pub mod record;

pub use decoder::{decode, DecodeError};
pub use feed::{ingest_lines, TelemetryFeed};
pub use record::{
    ConstellationType, DiffStatus, SatelliteInfo, SubscriptionType, TelemetryRecord,
};
