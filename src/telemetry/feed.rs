//! # Telemetry Feed
//!
//! Collects decoded records and counts rejected messages, the way a display
//! surface consumes the TMM WebSocket stream.

use std::collections::VecDeque;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use super::decoder::{decode, DecodeError};
use super::record::TelemetryRecord;
use crate::error::Result;

/// Decoded records plus a count of messages that failed to decode
#[derive(Debug, Default)]
pub struct TelemetryFeed {
    records: VecDeque<TelemetryRecord>,
    failures: u64,
    /// Maximum records kept, 0 for unbounded
    capacity: usize,
}

impl TelemetryFeed {
    /// Create an unbounded feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a feed keeping at most `capacity` records (0 for unbounded)
    ///
    /// When full, the oldest record is dropped for each new one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            failures: 0,
            capacity,
        }
    }

    /// Decode one message and append it, or count it as a failure
    ///
    /// # Arguments
    ///
    /// * `text` - One JSON telemetry message
    ///
    /// # Returns
    ///
    /// * `Result<&TelemetryRecord, DecodeError>` - The appended record, or the decode error
    pub fn ingest(&mut self, text: &str) -> std::result::Result<&TelemetryRecord, DecodeError> {
        match decode(text) {
            Ok(record) => {
                if self.capacity > 0 && self.records.len() >= self.capacity {
                    self.records.pop_front();
                }
                self.records.push_back(record);
                Ok(&self.records[self.records.len() - 1])
            }
            Err(e) => {
                self.failures += 1;
                Err(e)
            }
        }
    }

    /// Records in arrival order
    pub fn records(&self) -> impl Iterator<Item = &TelemetryRecord> {
        self.records.iter()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of messages that failed to decode
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Drop all records and reset the failure count (e.g. on reconnect)
    pub fn clear(&mut self) {
        self.records.clear();
        self.failures = 0;
    }
}

/// Feed newline-delimited telemetry messages from `reader` into `feed`
///
/// Each non-blank line is one message. Decode failures are counted by the
/// feed and do not stop the loop; only I/O errors do.
///
/// # Returns
///
/// * `Result<u64>` - Number of messages read
///
/// # Examples
///
/// ```no_run
/// use tmm_telemetry::telemetry::{ingest_lines, TelemetryFeed};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
///     let mut feed = TelemetryFeed::new();
///     let count = ingest_lines(stdin, &mut feed).await?;
///     println!("{} messages, {} failures", count, feed.failures());
///     Ok(())
/// }
/// ```
pub async fn ingest_lines<R>(reader: R, feed: &mut TelemetryFeed) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        count += 1;
        if let Ok(record) = feed.ingest(line) {
            debug!(
                "Telemetry {:.5}, {:.5} ({} satellites)",
                record.latitude, record.longitude, record.satellites
            );
        }
    }

    info!("Read {} telemetry messages, {} failed to decode", count, feed.failures());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const SAMPLE: &str = include_str!("../../testdata/catalyst_sample.json");

    fn sample_line() -> String {
        let value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value.to_string()
    }

    #[test]
    fn test_ingest_success_and_failure() {
        let mut feed = TelemetryFeed::new();

        assert!(feed.ingest(&sample_line()).is_ok());
        assert!(feed.ingest("{\"latitude\": 1.0}").is_err());
        assert!(feed.ingest("not json").is_err());

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.failures(), 2);
    }

    #[test]
    fn test_latest_is_last_appended() {
        let mut feed = TelemetryFeed::new();
        assert!(feed.latest().is_none());

        let first = feed.ingest(&sample_line()).unwrap().id();
        let second = feed.ingest(&sample_line()).unwrap().id();

        assert_ne!(first, second);
        assert_eq!(feed.latest().unwrap().id(), second);
        let ids: Vec<_> = feed.records().map(|r| r.id()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut feed = TelemetryFeed::with_capacity(2);
        let first = feed.ingest(&sample_line()).unwrap().id();
        feed.ingest(&sample_line()).unwrap();
        feed.ingest(&sample_line()).unwrap();

        assert_eq!(feed.len(), 2);
        assert!(feed.records().all(|r| r.id() != first));
    }

    #[test]
    fn test_clear_resets() {
        let mut feed = TelemetryFeed::new();
        feed.ingest(&sample_line()).unwrap();
        let _ = feed.ingest("{}");

        feed.clear();
        assert!(feed.is_empty());
        assert_eq!(feed.failures(), 0);
    }

    #[tokio::test]
    async fn test_ingest_lines() {
        let line = sample_line();
        let input = format!("{}\n\n{{\"bad\": true}}\n{}\n", line, line);
        let reader = Builder::new().read(input.as_bytes()).build();
        let reader = tokio::io::BufReader::new(reader);

        let mut feed = TelemetryFeed::new();
        let count = ingest_lines(reader, &mut feed).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.failures(), 1);
    }

    #[tokio::test]
    async fn test_ingest_lines_split_reads() {
        let line = sample_line();
        let (head, tail) = line.split_at(line.len() / 2);
        let reader = Builder::new()
            .read(head.as_bytes())
            .read(tail.as_bytes())
            .read(b"\n")
            .build();
        let reader = tokio::io::BufReader::new(reader);

        let mut feed = TelemetryFeed::new();
        let count = ingest_lines(reader, &mut feed).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.failures(), 0);
    }

    #[tokio::test]
    async fn test_ingest_lines_io_error() {
        let reader = Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            .build();
        let reader = tokio::io::BufReader::new(reader);

        let mut feed = TelemetryFeed::new();
        assert!(ingest_lines(reader, &mut feed).await.is_err());
    }
}
