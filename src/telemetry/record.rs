//! # Telemetry Record Types
//!
//! Validated in-memory form of one TMM telemetry message, plus the three
//! enumerated codes it carries.

use chrono::NaiveDateTime;
use uuid::Uuid;

/// Format of `gpsTimeStamp` / `utcTimeStamp` (e.g. `2024-02-14T10:21:07.1230000`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Differential correction status of a fix
///
/// | Code | Variant      |
/// |------|--------------|
/// | 1    | `Autonomous` |
/// | 2    | `Dgps`       |
/// | 4    | `Fixed`      |
/// | 5    | `Float`      |
/// | else | `Unknown`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffStatus {
    Autonomous,
    Dgps,
    Fixed,
    Float,
    Unknown,
}

impl DiffStatus {
    /// Map a wire code to a status. Never fails.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Autonomous,
            2 => Self::Dgps,
            4 => Self::Fixed,
            5 => Self::Float,
            _ => Self::Unknown,
        }
    }

    /// Wire code of this status, `None` for `Unknown`
    pub fn code(self) -> Option<i64> {
        match self {
            Self::Autonomous => Some(1),
            Self::Dgps => Some(2),
            Self::Fixed => Some(4),
            Self::Float => Some(5),
            Self::Unknown => None,
        }
    }
}

/// TMM subscription tier reported with each message
///
/// | Code | Variant             |
/// |------|---------------------|
/// | 0    | `Free`              |
/// | 1    | `Meter`             |
/// | 2    | `Submeter`          |
/// | 3    | `Decimeter`         |
/// | 4    | `Precision`         |
/// | 5    | `PrecisionOnDemand` |
/// | 100  | `Gnss`              |
/// | else | `Unknown`           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionType {
    Free,
    Meter,
    Submeter,
    Decimeter,
    Precision,
    PrecisionOnDemand,
    Gnss,
    Unknown,
}

impl SubscriptionType {
    /// Map a wire code to a tier. Never fails.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Free,
            1 => Self::Meter,
            2 => Self::Submeter,
            3 => Self::Decimeter,
            4 => Self::Precision,
            5 => Self::PrecisionOnDemand,
            100 => Self::Gnss,
            _ => Self::Unknown,
        }
    }

    /// Wire code of this tier, `None` for `Unknown`
    pub fn code(self) -> Option<i64> {
        match self {
            Self::Free => Some(0),
            Self::Meter => Some(1),
            Self::Submeter => Some(2),
            Self::Decimeter => Some(3),
            Self::Precision => Some(4),
            Self::PrecisionOnDemand => Some(5),
            Self::Gnss => Some(100),
            Self::Unknown => None,
        }
    }
}

/// GNSS constellation of a satellite
///
/// Codes 0..=7 in declaration order. There is no fallback variant: any other
/// code is rejected by [`ConstellationType::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstellationType {
    Gps,
    Sbas,
    Glonass,
    Omnistar,
    Galileo,
    Beidou,
    Qzss,
    Irnss,
}

impl ConstellationType {
    /// Wire code of this constellation
    pub fn code(self) -> i64 {
        match self {
            Self::Gps => 0,
            Self::Sbas => 1,
            Self::Glonass => 2,
            Self::Omnistar => 3,
            Self::Galileo => 4,
            Self::Beidou => 5,
            Self::Qzss => 6,
            Self::Irnss => 7,
        }
    }
}

impl TryFrom<i64> for ConstellationType {
    /// The unmapped code
    type Error = i64;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Gps),
            1 => Ok(Self::Sbas),
            2 => Ok(Self::Glonass),
            3 => Ok(Self::Omnistar),
            4 => Ok(Self::Galileo),
            5 => Ok(Self::Beidou),
            6 => Ok(Self::Qzss),
            7 => Ok(Self::Irnss),
            other => Err(other),
        }
    }
}

/// One entry of the satellite view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteInfo {
    /// Satellite PRN / slot number
    pub id: i32,

    /// Elevation in degrees
    pub elevation: i32,

    /// Azimuth in degrees
    pub azimuth: i32,

    /// Signal to noise ratio in dB-Hz
    pub signal_to_noise: i32,

    /// Whether the satellite contributes to the fix
    pub is_used: bool,

    /// Constellation the satellite belongs to
    pub constellation_type: ConstellationType,
}

/// One decoded TMM telemetry message
///
/// Every record gets a fresh identity when it is built, so equality compares
/// identities only: decoding the same text twice yields two distinct records.
#[derive(Debug, Clone)]
pub struct TelemetryRecord {
    pub(crate) id: Uuid,

    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,

    /// Ground speed in m/s
    pub speed: f32,
    /// Bearing in degrees
    pub bearing: f32,

    /// Horizontal accuracy in meters
    pub accuracy: f32,
    /// Vertical accuracy in meters (wire key `verticalAccuracyMeters`)
    pub vertical_accuracy: f32,
    pub hdop: f32,
    pub vdop: f32,
    pub pdop: f32,

    /// Age of the last correction message in seconds
    pub diff_age: f32,
    pub diff_status: DiffStatus,

    pub vrms: f32,
    pub hrms: f32,

    pub receiver_model: String,
    pub mock_provider: String,
    /// Receiver battery percentage, not reported by every receiver
    pub battery: Option<i32>,

    /// Height above mean sea level in meters
    pub msl_height: Option<f64>,
    /// Geoid undulation in meters
    pub undulation: Option<f64>,
    pub geoid_model: Option<String>,

    /// Free-running time counter. Not known to be wall-clock epoch time.
    pub utc_time: f32,
    pub gps_time_stamp: String,
    pub utc_time_stamp: String,

    pub subscription_type: SubscriptionType,

    /// Satellites used in the fix
    pub satellites: i32,
    /// Satellites in view as reported by the receiver. May differ from
    /// `satellite_view.len()`.
    pub total_sat_in_view: i32,
    pub satellite_view: Vec<SatelliteInfo>,
}

impl PartialEq for TelemetryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TelemetryRecord {}

impl TelemetryRecord {
    /// All-zero placeholder shown before the first message arrives
    pub fn zero() -> Self {
        Self {
            id: Uuid::new_v4(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            speed: 0.0,
            bearing: 0.0,
            accuracy: 0.0,
            vertical_accuracy: 0.0,
            hdop: 0.0,
            vdop: 0.0,
            pdop: 0.0,
            diff_age: 0.0,
            diff_status: DiffStatus::Unknown,
            vrms: 0.0,
            hrms: 0.0,
            receiver_model: String::new(),
            mock_provider: String::new(),
            battery: None,
            msl_height: None,
            undulation: None,
            geoid_model: None,
            utc_time: 0.0,
            gps_time_stamp: String::new(),
            utc_time_stamp: String::new(),
            subscription_type: SubscriptionType::Free,
            satellites: 0,
            total_sat_in_view: 0,
            satellite_view: Vec::new(),
        }
    }

    /// Locally generated identity of this record
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of satellite view entries flagged as used in the fix
    pub fn used_satellites(&self) -> usize {
        self.satellite_view.iter().filter(|sat| sat.is_used).count()
    }

    /// Whether `satellites` agrees with the used entries of the satellite view
    pub fn is_fix_consistent(&self) -> bool {
        usize::try_from(self.satellites).map_or(false, |n| n == self.used_satellites())
    }

    /// `gpsTimeStamp` parsed as a naive date-time, if well formed
    pub fn gps_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.gps_time_stamp)
    }

    /// `utcTimeStamp` parsed as a naive date-time, if well formed
    pub fn utc_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.utc_time_stamp)
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_diff_status_mapping() {
        assert_eq!(DiffStatus::from_code(1), DiffStatus::Autonomous);
        assert_eq!(DiffStatus::from_code(2), DiffStatus::Dgps);
        assert_eq!(DiffStatus::from_code(4), DiffStatus::Fixed);
        assert_eq!(DiffStatus::from_code(5), DiffStatus::Float);
    }

    #[test]
    fn test_diff_status_unknown_codes() {
        for code in [-1, 0, 3, 6, 100] {
            assert_eq!(DiffStatus::from_code(code), DiffStatus::Unknown, "code {}", code);
        }
        assert_eq!(DiffStatus::Unknown.code(), None);
    }

    #[test]
    fn test_subscription_type_mapping() {
        let expected = [
            (0, SubscriptionType::Free),
            (1, SubscriptionType::Meter),
            (2, SubscriptionType::Submeter),
            (3, SubscriptionType::Decimeter),
            (4, SubscriptionType::Precision),
            (5, SubscriptionType::PrecisionOnDemand),
            (100, SubscriptionType::Gnss),
        ];
        for (code, tier) in expected {
            assert_eq!(SubscriptionType::from_code(code), tier);
            assert_eq!(tier.code(), Some(code));
        }
        assert_eq!(SubscriptionType::from_code(6), SubscriptionType::Unknown);
        assert_eq!(SubscriptionType::from_code(99), SubscriptionType::Unknown);
    }

    #[test]
    fn test_constellation_codes() {
        for code in 0_i64..=7 {
            let constellation = ConstellationType::try_from(code).unwrap();
            assert_eq!(constellation.code(), code);
        }
        assert_eq!(ConstellationType::try_from(2_i64), Ok(ConstellationType::Glonass));
        assert_eq!(ConstellationType::try_from(7_i64), Ok(ConstellationType::Irnss));
    }

    #[test]
    fn test_constellation_rejects_unmapped() {
        assert_eq!(ConstellationType::try_from(8_i64), Err(8));
        assert_eq!(ConstellationType::try_from(9_i64), Err(9));
        assert_eq!(ConstellationType::try_from(-1_i64), Err(-1));
    }

    #[test]
    fn test_zero_record() {
        let zero = TelemetryRecord::zero();
        assert_eq!(zero.latitude, 0.0);
        assert_eq!(zero.subscription_type, SubscriptionType::Free);
        assert_eq!(zero.diff_status, DiffStatus::Unknown);
        assert!(zero.battery.is_none());
        assert!(zero.satellite_view.is_empty());
        assert!(zero.is_fix_consistent());
    }

    #[test]
    fn test_records_compare_by_identity() {
        let a = TelemetryRecord::zero();
        let b = TelemetryRecord::zero();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_used_satellites() {
        let mut record = TelemetryRecord::zero();
        let sat = SatelliteInfo {
            id: 5,
            elevation: 40,
            azimuth: 120,
            signal_to_noise: 42,
            is_used: true,
            constellation_type: ConstellationType::Gps,
        };
        record.satellite_view = vec![sat, SatelliteInfo { is_used: false, ..sat }, sat];
        record.satellites = 2;
        assert_eq!(record.used_satellites(), 2);
        assert!(record.is_fix_consistent());

        record.satellites = -1;
        assert!(!record.is_fix_consistent());
    }

    #[test]
    fn test_timestamp_parsing() {
        let mut record = TelemetryRecord::zero();
        record.gps_time_stamp = "2024-02-14T10:21:07.1230000".to_string();
        record.utc_time_stamp = "not a timestamp".to_string();

        let gps = record.gps_time().unwrap();
        assert_eq!(gps.year(), 2024);
        assert_eq!(gps.month(), 2);
        assert_eq!(gps.second(), 7);
        assert_eq!(gps.nanosecond(), 123_000_000);
        assert!(record.utc_time().is_none());
    }
}
