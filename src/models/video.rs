//! Video data models.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Timestamp layouts the device script is known to emit.
const CREATION_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a creation timestamp.
///
/// RFC 3339 values keep their wall-clock time; the offset is dropped.
pub fn parse_creation_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    CREATION_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn deserialize_creation_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_creation_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable creation_date '{}'", raw)))
}

/// A video found on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoBasicInfo {
    /// Size in megabytes.
    pub size_mb: u64,
    /// Creation timestamp.
    #[serde(deserialize_with = "deserialize_creation_date")]
    pub creation_date: NaiveDateTime,
    /// File name on the device, extension included.
    pub original_name: String,
}

/// A video with its final name and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoNamedTarget {
    pub video: VideoBasicInfo,
    /// Final file name.
    pub new_name: String,
    /// Final path in the local filesystem namespace.
    pub path: PathBuf,
}

/// Sort videos by creation time, oldest first. Ties keep their order.
pub fn sort_by_creation(videos: &mut [VideoBasicInfo]) {
    videos.sort_by_key(|v| v.creation_date);
}
