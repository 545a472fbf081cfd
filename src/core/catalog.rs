//! Event catalog loading.
//!
//! The events file is YAML with a top-level `events` mapping:
//!
//! ```yaml
//! events:
//!   football:
//!     event_start: "18:20"
//!     event_stop: "20:05"
//!     event_timezone: "Romance Standard Time"
//!     video_title: "Wednesday football"
//!     complex_naming: false
//!     title_end_with_date: true
//!     ...
//! ```
//!
//! Events are returned in file order.

use crate::models::event::{Event, EventRecord};
use crate::Result;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EventsFile {
    events: serde_yaml::Mapping,
}

/// Parse an events document.
pub fn parse_events(content: &str) -> Result<Vec<Event>> {
    let file: EventsFile = serde_yaml::from_str(content)
        .map_err(|e| crate::Error::InvalidEventsFile(e.to_string()))?;

    let mut events = Vec::with_capacity(file.events.len());
    for (key, value) in file.events {
        let key = key.as_str().ok_or_else(|| {
            crate::Error::InvalidEventsFile(format!("event key {:?} is not a string", key))
        })?;
        let record: EventRecord = serde_yaml::from_value(value).map_err(|e| {
            crate::Error::InvalidEventsFile(format!("event '{}': {}", key, e))
        })?;
        events.push(Event::from_record(key, record)?);
    }

    if events.is_empty() {
        return Err(crate::Error::InvalidEventsFile("no events defined".to_string()));
    }
    Ok(events)
}

/// Load the events file.
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    if !path.exists() {
        return Err(crate::Error::EventsFileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let events = parse_events(&content)?;
    tracing::info!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}
