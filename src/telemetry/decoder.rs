//! # Telemetry Message Decoder
//!
//! Decodes one TMM JSON telemetry message into a [`TelemetryRecord`].
//!
//! Decoding runs in two stages: `serde_json` checks presence and primitive
//! types of every field against the wire layout, then the enumerated codes
//! are mapped into their typed variants.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::record::*;

/// Telemetry decoding failure. No partial record is ever produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Not a JSON object, or a required field is missing or has the wrong type
    #[error("malformed telemetry message: {0}")]
    Malformed(String),

    /// Code outside the fixed set of an enumeration without fallback
    #[error("unmapped {field} code: {value}")]
    UnmappedEnum { field: &'static str, value: i64 },
}

/// Wire layout of a telemetry message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTelemetry {
    latitude: f64,
    longitude: f64,
    altitude: f64,

    speed: f32,
    bearing: f32,

    accuracy: f32,
    #[serde(rename = "verticalAccuracyMeters")]
    vertical_accuracy: f32,
    hdop: f32,
    vdop: f32,
    pdop: f32,

    diff_age: f32,
    #[serde(deserialize_with = "lenient_code")]
    diff_status: Option<i64>,

    vrms: f32,
    hrms: f32,

    receiver_model: String,
    mock_provider: String,
    battery: Option<i32>,

    msl_height: Option<f64>,
    undulation: Option<f64>,
    geoid_model: Option<String>,

    utc_time: f32,
    gps_time_stamp: String,
    utc_time_stamp: String,

    #[serde(deserialize_with = "lenient_code")]
    subscription_type: Option<i64>,

    satellites: i32,
    total_sat_in_view: i32,
    satellite_view: Vec<WireSatellite>,
}

/// Wire layout of one satellite view entry
#[derive(Debug, Deserialize)]
struct WireSatellite {
    #[serde(rename = "Id")]
    id: i32,
    #[serde(rename = "Elv")]
    elevation: i32,
    #[serde(rename = "Azm")]
    azimuth: i32,
    #[serde(rename = "Snr")]
    signal_to_noise: i32,
    #[serde(rename = "Use")]
    is_used: bool,
    #[serde(rename = "Type")]
    constellation_type: i64,
}

/// Read a required code whose value may be of any JSON type.
///
/// Integers yield `Some(code)`; anything else yields `None`, which the
/// fallback enumerations turn into `Unknown`. The key itself stays required.
fn lenient_code<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Integer(i64),
        Other(IgnoredAny),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Integer(code) => Some(code),
        Code::Other(_) => None,
    })
}

impl TryFrom<WireSatellite> for SatelliteInfo {
    type Error = DecodeError;

    fn try_from(wire: WireSatellite) -> std::result::Result<Self, Self::Error> {
        let constellation_type = ConstellationType::try_from(wire.constellation_type)
            .map_err(|value| DecodeError::UnmappedEnum { field: "Type", value })?;

        Ok(SatelliteInfo {
            id: wire.id,
            elevation: wire.elevation,
            azimuth: wire.azimuth,
            signal_to_noise: wire.signal_to_noise,
            is_used: wire.is_used,
            constellation_type,
        })
    }
}

impl TryFrom<WireTelemetry> for TelemetryRecord {
    type Error = DecodeError;

    fn try_from(wire: WireTelemetry) -> std::result::Result<Self, Self::Error> {
        let satellite_view = wire
            .satellite_view
            .into_iter()
            .map(SatelliteInfo::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TelemetryRecord {
            id: Uuid::new_v4(),
            latitude: wire.latitude,
            longitude: wire.longitude,
            altitude: wire.altitude,
            speed: wire.speed,
            bearing: wire.bearing,
            accuracy: wire.accuracy,
            vertical_accuracy: wire.vertical_accuracy,
            hdop: wire.hdop,
            vdop: wire.vdop,
            pdop: wire.pdop,
            diff_age: wire.diff_age,
            diff_status: wire.diff_status.map_or(DiffStatus::Unknown, DiffStatus::from_code),
            vrms: wire.vrms,
            hrms: wire.hrms,
            receiver_model: wire.receiver_model,
            mock_provider: wire.mock_provider,
            battery: wire.battery,
            msl_height: wire.msl_height,
            undulation: wire.undulation,
            geoid_model: wire.geoid_model,
            utc_time: wire.utc_time,
            gps_time_stamp: wire.gps_time_stamp,
            utc_time_stamp: wire.utc_time_stamp,
            subscription_type: wire
                .subscription_type
                .map_or(SubscriptionType::Unknown, SubscriptionType::from_code),
            satellites: wire.satellites,
            total_sat_in_view: wire.total_sat_in_view,
            satellite_view,
        })
    }
}

/// Decode a complete TMM telemetry message
///
/// # Arguments
///
/// * `text` - One JSON object, as carried by a single WebSocket text frame
///
/// # Returns
///
/// * `Result<TelemetryRecord, DecodeError>` - Decoded record, or error if invalid
///
/// # Errors
///
/// Returns error if:
/// - Text is not a JSON object
/// - A required field is missing or has the wrong type
/// - A satellite carries a constellation code outside 0..=7
///
/// # Examples
///
/// ```no_run
/// use tmm_telemetry::telemetry::decode;
///
/// let text = std::fs::read_to_string("testdata/catalyst_sample.json")?;
/// let record = decode(&text)?;
/// println!("{:.5} {:.5}", record.latitude, record.longitude);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(text: &str) -> std::result::Result<TelemetryRecord, DecodeError> {
    let result = serde_json::from_str::<WireTelemetry>(text)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
        .and_then(TelemetryRecord::try_from);

    if let Err(ref e) = result {
        warn!("Failed to decode telemetry message: {}", e);
        debug!("Rejected message: {}", text);
    }

    result
}
