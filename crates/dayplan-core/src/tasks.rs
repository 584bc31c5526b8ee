use std::{fmt, str::FromStr};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

/// Day format used in storage and on screen (en-GB short date).
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// 24h time-of-day format for `from`/`to`.
pub const TIME_FORMAT: &str = "%H:%M";

/// Errors produced by task model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Input rejected before any mutation happened.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    /// Nothing matched the lookup.
    #[error("not found: {what}")]
    NotFound { what: String },
}

/// Errors produced when reading dates, times and priorities from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date `{0}`, expected DD/MM/YYYY")]
    Date(String),
    #[error("invalid time `{0}`, expected HH:MM")]
    Time(String),
    #[error("invalid priority `{0}`, expected high, medium or low")]
    Priority(String),
}

/// Priority bucket of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Lenient mapping used for stored and copied records: a case-insensitive
    /// substring match on "high", then "medium", anything else is low.
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("high") {
            Priority::High
        } else if lowered.contains("medium") {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseError::Priority(s.to_string())),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Priority::normalize).unwrap_or_default())
    }
}

/// Calendar day a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskDate(NaiveDate);

impl TaskDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Current local day.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Following calendar day (saturates at the end of the supported range).
    pub fn succ(self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// Preceding calendar day (saturates at the start of the supported range).
    pub fn pred(self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for TaskDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| ParseError::Date(s.to_string()))
    }
}

impl Serialize for TaskDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Time of day in minutes precision, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Self)
            .map_err(|_| ParseError::Time(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Task entity, persisted verbatim as one element of the stored JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    pub date: TaskDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub completed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_time"
    )]
    pub from: Option<TimeOfDay>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_time"
    )]
    pub to: Option<TimeOfDay>,
}

impl Task {
    /// Builds a fresh, incomplete task from editor input.
    pub fn from_input(id: u64, input: TaskInput) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            date: input.date,
            priority: input.priority,
            completed: false,
            from: input.from,
            to: input.to,
        }
    }

    /// `HH:MM - HH:MM` or `HH:MM`, when a time range is set.
    pub fn time_label(&self) -> Option<String> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(format!("{from} - {to}")),
            (Some(from), None) => Some(from.to_string()),
            _ => None,
        }
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Blank or unreadable times decode as absent; the rest of the record is kept.
fn optional_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TimeOfDay>, D::Error> {
    let raw = match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };
    match raw.parse() {
        Ok(time) => Ok(Some(time)),
        Err(err) => {
            warn!("dropping stored time: {err}");
            Ok(None)
        }
    }
}

/// Editor fields for creating or overwriting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub date: TaskDate,
    pub priority: Priority,
    pub from: Option<TimeOfDay>,
    pub to: Option<TimeOfDay>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>, date: TaskDate, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            priority,
            from: None,
            to: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_range(mut self, from: Option<TimeOfDay>, to: Option<TimeOfDay>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Checks the edit-boundary rules: a non-blank title and a well-formed time range.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::Validation {
                field: "title",
                reason: "a title is required",
            });
        }
        validate_time_range(self.from, self.to)
    }
}

/// `from` is required when `to` is set, and must be strictly earlier.
pub fn validate_time_range(
    from: Option<TimeOfDay>,
    to: Option<TimeOfDay>,
) -> Result<(), TaskError> {
    match (from, to) {
        (None, Some(_)) => Err(TaskError::Validation {
            field: "from",
            reason: "a start time is required when an end time is set",
        }),
        (Some(from), Some(to)) if from >= to => Err(TaskError::Validation {
            field: "to",
            reason: "the end time must be after the start time",
        }),
        _ => Ok(()),
    }
}

/// Durable owner of the whole task list: one slot, replaced wholesale.
///
/// Implementations never fail towards the caller. Read problems degrade to an
/// empty list and write problems are logged and dropped.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn load(&self) -> Vec<Task>;
    async fn replace(&self, tasks: &[Task]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, m: u32, y: i32) -> TaskDate {
        TaskDate::from_ymd(y, m, d).expect("valid date")
    }

    #[test]
    fn dates_use_day_month_year() {
        let date: TaskDate = "01/02/2025".parse().expect("parse");
        assert_eq!(date, day(1, 2, 2025));
        assert_eq!(date.to_string(), "01/02/2025");
        assert!("2025-02-01".parse::<TaskDate>().is_err());
    }

    #[test]
    fn date_steps_cross_month_and_year() {
        assert_eq!(day(31, 12, 2024).succ(), day(1, 1, 2025));
        assert_eq!(day(1, 3, 2024).pred(), day(29, 2, 2024));
    }

    #[test]
    fn priority_normalizes_loosely_but_parses_strictly() {
        assert_eq!(Priority::normalize("High"), Priority::High);
        assert_eq!(Priority::normalize("very HIGH"), Priority::High);
        assert_eq!(Priority::normalize("Medium Priority"), Priority::Medium);
        assert_eq!(Priority::normalize("Completed"), Priority::Low);
        assert_eq!("MEDIUM".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn rejects_blank_title() {
        let input = TaskInput::new("   ", day(1, 1, 2025), Priority::High);
        assert!(matches!(
            input.validate(),
            Err(TaskError::Validation { field: "title", .. })
        ));
    }

    #[test]
    fn time_range_rules() {
        let t = |s: &str| Some(s.parse::<TimeOfDay>().expect("time"));
        assert!(validate_time_range(None, None).is_ok());
        assert!(validate_time_range(t("09:00"), None).is_ok());
        assert!(validate_time_range(t("09:00"), t("09:30")).is_ok());
        assert!(validate_time_range(None, t("09:30")).is_err());
        assert!(validate_time_range(t("10:00"), t("10:00")).is_err());
        assert!(validate_time_range(t("11:00"), t("10:00")).is_err());
    }

    #[test]
    fn decodes_sparse_records() {
        let json = r#"{"id":3,"title":"Stretch","date":"05/06/2025","priority":"Medium","description":null}"#;
        let task: Task = serde_json::from_str(json).expect("decode");
        assert_eq!(task.id, 3);
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert_eq!(task.from, None);
        assert_eq!(task.to, None);
    }

    #[test]
    fn encodes_field_names_verbatim() {
        let task = Task {
            id: 1,
            title: "Run".into(),
            description: "5k".into(),
            date: day(2, 1, 2025),
            priority: Priority::High,
            completed: true,
            from: TimeOfDay::from_hm(7, 5),
            to: TimeOfDay::from_hm(7, 45),
        };
        let value = serde_json::to_value(&task).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "title": "Run",
                "description": "5k",
                "date": "02/01/2025",
                "priority": "high",
                "completed": true,
                "from": "07:05",
                "to": "07:45"
            })
        );
        let back: Task = serde_json::from_value(value).expect("decode");
        assert_eq!(back, task);
    }

    #[test]
    fn empty_time_strings_are_absent() {
        let json = r#"{"id":1,"title":"A","date":"01/01/2025","from":"","to":""}"#;
        let task: Task = serde_json::from_str(json).expect("decode");
        assert_eq!(task.time_label(), None);
    }

    #[test]
    fn unreadable_times_are_absent() {
        let json = r#"{"id":2,"title":"B","date":"01/01/2025","from":"9am","to":"10:00"}"#;
        let task: Task = serde_json::from_str(json).expect("decode");
        assert_eq!(task.from, None);
        assert_eq!(task.to, TimeOfDay::from_hm(10, 0));
        assert_eq!(task.title, "B");
    }
}
