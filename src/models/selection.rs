//! Selection model: the operator's choices for one archive run.

use super::event::Event;
use crate::error::Violations;
use crate::Result;
use chrono::NaiveDate;

/// Day format used by the device script and in titles.
pub const DAY_FORMAT: &str = "%d/%m/%Y";

/// Check a `DD/MM/YYYY` day string.
pub fn is_valid_day(day: &str) -> bool {
    let shaped = regex::Regex::new(r"^\d{2}/\d{2}/\d{4}$")
        .map(|re| re.is_match(day))
        .unwrap_or(false);
    shaped && NaiveDate::parse_from_str(day, DAY_FORMAT).is_ok()
}

/// Format a date as `DD/MM/YYYY`.
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// One run's day, event and title suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    day: String,
    event: Event,
    suffix: Option<String>,
}

impl Selection {
    /// Build a selection.
    ///
    /// The suffix is required (and must be non-empty) when the event uses
    /// complex naming. For simple events it is dropped.
    pub fn new(day: impl Into<String>, event: Event, suffix: Option<String>) -> Result<Self> {
        let day = day.into();
        let mut violations = Violations::new(format!("selection for event '{}'", event.key()));

        if !is_valid_day(&day) {
            violations.push(format!("day '{}' is not a valid DD/MM/YYYY date", day));
        }

        let suffix = if event.complex_naming() {
            if suffix.as_deref().map(str::is_empty).unwrap_or(true) {
                violations.push("title suffix is required when complex_naming is true in the event");
            }
            suffix
        } else {
            if suffix.as_deref().is_some_and(|s| !s.is_empty()) {
                tracing::debug!("Ignoring title suffix for simple event {}", event.key());
            }
            None
        };
        violations.into_result()?;

        Ok(Self { day, event, suffix })
    }

    /// Day in `DD/MM/YYYY` form.
    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::simple_record;
    use crate::models::event::EventRecord;

    fn complex_event() -> Event {
        let record = EventRecord {
            complex_naming: true,
            complex_name_format_helper: Some("<opponent>".to_string()),
            ..simple_record("Match vs ")
        };
        Event::from_record("match", record).unwrap()
    }

    fn simple_event() -> Event {
        Event::from_record("friday", simple_record("Friday")).unwrap()
    }

    #[test]
    fn test_day_validation() {
        assert!(is_valid_day("12/05/2024"));
        assert!(!is_valid_day("1/5/2024"));
        assert!(!is_valid_day("31/02/2024"));
        assert!(!is_valid_day("2024-05-12"));
        assert!(!is_valid_day("12/05/2024 extra"));
    }

    #[test]
    fn test_format_day() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
        assert_eq!(format_day(date), "03/04/2024");
    }

    #[test]
    fn test_complex_event_requires_suffix() {
        assert!(Selection::new("01/01/2024", complex_event(), None).is_err());
        assert!(Selection::new("01/01/2024", complex_event(), Some(String::new())).is_err());

        let selection =
            Selection::new("01/01/2024", complex_event(), Some("Lyon".to_string())).unwrap();
        assert_eq!(selection.suffix(), Some("Lyon"));
    }

    #[test]
    fn test_simple_event_drops_suffix() {
        let selection =
            Selection::new("01/01/2024", simple_event(), Some("ignored".to_string())).unwrap();
        assert_eq!(selection.suffix(), None);

        let selection = Selection::new("01/01/2024", simple_event(), Some(String::new())).unwrap();
        assert_eq!(selection.suffix(), None);
    }

    #[test]
    fn test_invalid_day_rejected() {
        let err = Selection::new("2024/01/01", simple_event(), None).unwrap_err();
        assert!(err.to_string().contains("not a valid DD/MM/YYYY date"));
    }
}
