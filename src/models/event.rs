//! Event model.
//!
//! An event is a reusable template for a recurring recording occasion: the
//! time window to search on the device, how videos get named, and where they
//! get uploaded. Events are validated as a whole when they are built; an
//! [`Event`] value always satisfies every dependent-field rule.

use crate::error::Violations;
use crate::Result;
use chrono::NaiveTime;
use serde::Deserialize;

/// Storage classes accepted by S3 `PutObject`.
pub const KNOWN_STORAGE_CLASSES: &[&str] = &[
    "STANDARD",
    "REDUCED_REDUNDANCY",
    "STANDARD_IA",
    "ONEZONE_IA",
    "INTELLIGENT_TIERING",
    "GLACIER",
    "DEEP_ARCHIVE",
    "OUTPOSTS",
    "GLACIER_IR",
    "SNOW",
    "EXPRESS_ONEZONE",
];

/// Event fields as written in the events file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    pub event_start: String,
    pub event_stop: String,
    pub event_timezone: String,
    pub complex_naming: bool,
    pub video_title: String,
    #[serde(default)]
    pub complex_name_format_helper: Option<String>,
    pub title_end_with_date: bool,
    pub validation_videos_found: bool,
    #[serde(rename = "S3_upload")]
    pub s3_upload: bool,
    #[serde(rename = "S3_storage_class", default)]
    pub s3_storage_class: Option<String>,
    pub nextcloud_upload: bool,
    #[serde(default)]
    pub nextcloud_folder: Option<String>,
    #[serde(default)]
    pub nextcloud_public_share: Option<bool>,
    #[serde(default)]
    pub nextcloud_telegram_notification: Option<bool>,
    #[serde(default)]
    pub delete_source_files: bool,
}

/// How the video title is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Naming {
    /// The base title is used as is.
    Simple,
    /// The operator completes the base title each run.
    Complex { format_helper: String },
}

/// S3 upload settings of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub storage_class: String,
}

/// Nextcloud upload settings of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextcloudSettings {
    /// Remote folder, relative to the user's root.
    pub folder: String,
    /// Create a public share link per uploaded video.
    pub public_share: bool,
    /// Announce the share links on Telegram.
    pub telegram_notification: bool,
}

/// A validated event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    key: String,
    event_start: String,
    event_stop: String,
    event_timezone: String,
    video_title: String,
    naming: Naming,
    title_end_with_date: bool,
    validation_videos_found: bool,
    s3: Option<S3Settings>,
    nextcloud: Option<NextcloudSettings>,
    delete_source_files: bool,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::is_empty).unwrap_or(true)
}

impl Event {
    /// Build an event, checking every rule at once.
    ///
    /// The returned error lists all broken rules, not just the first one.
    pub fn from_record(key: &str, record: EventRecord) -> Result<Self> {
        let mut violations = Violations::new(format!("event '{}'", key));

        for (field, value) in [
            ("event_start", &record.event_start),
            ("event_stop", &record.event_stop),
        ] {
            if NaiveTime::parse_from_str(value, "%H:%M").is_err() {
                violations.push(format!("{} '{}' is not a HH:MM time", field, value));
            }
        }
        if record.event_timezone.trim().is_empty() {
            violations.push("event_timezone must not be empty");
        }
        if record.video_title.is_empty() {
            violations.push("video_title must not be empty");
        }
        if record.complex_naming && is_blank(&record.complex_name_format_helper) {
            violations.push("complex_name_format_helper is mandatory when complex_naming is true");
        }
        if record.s3_upload {
            match record.s3_storage_class.as_deref() {
                None | Some("") => {
                    violations.push("S3_storage_class is mandatory when S3_upload is true")
                }
                Some(class) if !KNOWN_STORAGE_CLASSES.contains(&class) => violations.push(
                    format!("S3_storage_class '{}' is not a known storage class", class),
                ),
                Some(_) => {}
            }
        }
        if record.nextcloud_upload {
            if is_blank(&record.nextcloud_folder) {
                violations.push("nextcloud_folder is mandatory when nextcloud_upload is true");
            }
            if record.nextcloud_public_share.is_none() {
                violations.push("nextcloud_public_share is mandatory when nextcloud_upload is true");
            }
            if record.nextcloud_telegram_notification.is_none() {
                violations.push(
                    "nextcloud_telegram_notification is mandatory when nextcloud_upload is true",
                );
            }
        }
        violations.into_result()?;

        let naming = if record.complex_naming {
            Naming::Complex {
                format_helper: record.complex_name_format_helper.unwrap_or_default(),
            }
        } else {
            Naming::Simple
        };
        let s3 = record.s3_upload.then(|| S3Settings {
            storage_class: record.s3_storage_class.unwrap_or_default(),
        });
        let nextcloud = record.nextcloud_upload.then(|| NextcloudSettings {
            folder: record.nextcloud_folder.unwrap_or_default(),
            public_share: record.nextcloud_public_share.unwrap_or_default(),
            telegram_notification: record.nextcloud_telegram_notification.unwrap_or_default(),
        });

        Ok(Self {
            key: key.to_string(),
            event_start: record.event_start,
            event_stop: record.event_stop,
            event_timezone: record.event_timezone,
            video_title: record.video_title,
            naming,
            title_end_with_date: record.title_end_with_date,
            validation_videos_found: record.validation_videos_found,
            s3,
            nextcloud,
            delete_source_files: record.delete_source_files,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn event_start(&self) -> &str {
        &self.event_start
    }

    pub fn event_stop(&self) -> &str {
        &self.event_stop
    }

    pub fn event_timezone(&self) -> &str {
        &self.event_timezone
    }

    /// Base title, before any suffix or date.
    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn complex_naming(&self) -> bool {
        matches!(self.naming, Naming::Complex { .. })
    }

    pub fn format_helper(&self) -> Option<&str> {
        match &self.naming {
            Naming::Complex { format_helper } => Some(format_helper),
            Naming::Simple => None,
        }
    }

    pub fn title_end_with_date(&self) -> bool {
        self.title_end_with_date
    }

    /// Whether the operator must confirm the videos found on the device.
    pub fn validation_videos_found(&self) -> bool {
        self.validation_videos_found
    }

    pub fn s3(&self) -> Option<&S3Settings> {
        self.s3.as_ref()
    }

    pub fn nextcloud(&self) -> Option<&NextcloudSettings> {
        self.nextcloud.as_ref()
    }

    pub fn delete_source_files(&self) -> bool {
        self.delete_source_files
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;

    pub(crate) fn simple_record(title: &str) -> EventRecord {
        EventRecord {
            event_start: "18:20".to_string(),
            event_stop: "20:05".to_string(),
            event_timezone: "Romance Standard Time".to_string(),
            video_title: title.to_string(),
            ..Default::default()
        }
    }

    fn messages(err: Error) -> Vec<String> {
        match err {
            Error::ConfigValidation(v) => v.messages,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_simple_event() {
        let event = Event::from_record("football", simple_record("Wednesday football")).unwrap();
        assert_eq!(event.key(), "football");
        assert_eq!(event.video_title(), "Wednesday football");
        assert!(!event.complex_naming());
        assert_eq!(event.format_helper(), None);
        assert!(event.s3().is_none());
        assert!(event.nextcloud().is_none());
    }

    #[test]
    fn test_complex_naming_requires_helper() {
        for helper in [None, Some(String::new())] {
            let record = EventRecord {
                complex_naming: true,
                complex_name_format_helper: helper,
                ..simple_record("Match vs ")
            };
            let msgs = messages(Event::from_record("match", record).unwrap_err());
            assert_eq!(
                msgs,
                vec!["complex_name_format_helper is mandatory when complex_naming is true"]
            );
        }

        let record = EventRecord {
            complex_naming: true,
            complex_name_format_helper: Some("<team> - <score>".to_string()),
            ..simple_record("Match vs ")
        };
        let event = Event::from_record("match", record).unwrap();
        assert!(event.complex_naming());
        assert_eq!(event.format_helper(), Some("<team> - <score>"));
    }

    #[test]
    fn test_helper_ignored_without_complex_naming() {
        let record = EventRecord {
            complex_name_format_helper: None,
            ..simple_record("Friday")
        };
        assert!(Event::from_record("friday", record).is_ok());
    }

    #[test]
    fn test_s3_storage_class_rules() {
        let record = EventRecord {
            s3_upload: true,
            ..simple_record("Friday")
        };
        let msgs = messages(Event::from_record("friday", record).unwrap_err());
        assert_eq!(msgs, vec!["S3_storage_class is mandatory when S3_upload is true"]);

        let record = EventRecord {
            s3_upload: true,
            s3_storage_class: Some("FROZEN".to_string()),
            ..simple_record("Friday")
        };
        let msgs = messages(Event::from_record("friday", record).unwrap_err());
        assert!(msgs[0].contains("'FROZEN' is not a known storage class"));

        let record = EventRecord {
            s3_upload: true,
            s3_storage_class: Some("DEEP_ARCHIVE".to_string()),
            ..simple_record("Friday")
        };
        let event = Event::from_record("friday", record).unwrap();
        assert_eq!(event.s3().unwrap().storage_class, "DEEP_ARCHIVE");
    }

    #[test]
    fn test_nextcloud_reports_every_missing_field() {
        let record = EventRecord {
            nextcloud_upload: true,
            ..simple_record("Friday")
        };
        let msgs = messages(Event::from_record("friday", record).unwrap_err());
        assert_eq!(
            msgs,
            vec![
                "nextcloud_folder is mandatory when nextcloud_upload is true",
                "nextcloud_public_share is mandatory when nextcloud_upload is true",
                "nextcloud_telegram_notification is mandatory when nextcloud_upload is true",
            ]
        );
    }

    #[test]
    fn test_nextcloud_settings_built() {
        let record = EventRecord {
            nextcloud_upload: true,
            nextcloud_folder: Some("Videos/Football".to_string()),
            nextcloud_public_share: Some(true),
            nextcloud_telegram_notification: Some(false),
            ..simple_record("Friday")
        };
        let event = Event::from_record("friday", record).unwrap();
        let nc = event.nextcloud().unwrap();
        assert_eq!(nc.folder, "Videos/Football");
        assert!(nc.public_share);
        assert!(!nc.telegram_notification);
    }

    #[test]
    fn test_unrelated_violations_collected_together() {
        let record = EventRecord {
            event_start: "6pm".to_string(),
            complex_naming: true,
            s3_upload: true,
            ..simple_record("Friday")
        };
        let msgs = messages(Event::from_record("friday", record).unwrap_err());
        assert_eq!(msgs.len(), 3);
        assert!(msgs[0].starts_with("event_start '6pm'"));
    }
}
