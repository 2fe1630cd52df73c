//! Study tasks

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{TaskError, TaskResult};


/// An opaque, unique and immutable task identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}
impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}
impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}
impl FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority {:?}", other)),
        }
    }
}


/// A task is either pending or completed. There is no other state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }

    /// The status a completion checkbox switches to
    pub fn toggled(&self) -> Self {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}
impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Completed => write!(f, "completed"),
        }
    }
}


/// The fields of a task a user may edit.
///
/// This is what a creation or edition form submits.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskFields {
    pub name: String,
    pub category: String,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
}

impl TaskFields {
    /// Fields for an uncategorized, medium-priority task without a due time
    pub fn new<S: Into<String>>(name: S, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            due_date,
            due_time: None,
            priority: Priority::Medium,
        }
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_due_time(mut self, due_time: NaiveTime) -> Self {
        self.due_time = Some(due_time);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Trims the category and rejects blank names
    pub(crate) fn validated(mut self) -> TaskResult<Self> {
        if self.name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        self.category = self.category.trim().to_string();
        Ok(self)
    }
}


/// A study task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    name: String,
    /// Possibly empty
    #[serde(default, deserialize_with = "blank_as_default")]
    category: String,
    due_date: NaiveDate,
    /// Stored as `HH:MM`, or as an empty string when the task has no time.
    /// Older records may lack this field entirely.
    #[serde(default, with = "due_time_format")]
    due_time: Option<NaiveTime>,
    priority: Priority,
    /// Older records may lack this field (or hold `null` or `""`), they are pending then.
    #[serde(default, deserialize_with = "blank_as_default")]
    status: Status,
}

impl Task {
    /// Create a pending task
    pub fn new(id: TaskId, fields: TaskFields) -> Self {
        Self {
            id,
            name: fields.name,
            category: fields.category,
            due_date: fields.due_date,
            due_time: fields.due_time,
            priority: fields.priority,
            status: Status::Pending,
        }
    }

    pub fn id(&self) -> &TaskId         { &self.id       }
    pub fn name(&self) -> &str          { &self.name     }
    pub fn category(&self) -> &str      { &self.category }
    pub fn due_date(&self) -> NaiveDate { self.due_date  }
    pub fn due_time(&self) -> Option<NaiveTime> { self.due_time }
    pub fn priority(&self) -> Priority  { self.priority  }
    pub fn status(&self) -> Status      { self.status    }
    pub fn completed(&self) -> bool     { self.status.is_completed() }

    /// The instant this task is due, used for reminders only.
    /// Seconds and sub-seconds are ignored.
    ///
    /// Tasks without a due time have no due instant.
    pub fn due_instant(&self) -> Option<NaiveDateTime> {
        let time = self.due_time?;
        let time = time.with_second(0)?.with_nanosecond(0)?;
        Some(self.due_date.and_time(time))
    }

    /// Replace every field but the id and the status
    pub(crate) fn apply(&mut self, fields: TaskFields) {
        self.name = fields.name;
        self.category = fields.category;
        self.due_date = fields.due_date;
        self.due_time = fields.due_time;
        self.priority = fields.priority;
    }

    pub(crate) fn set_status(&mut self, new_status: Status) {
        self.status = new_status;
    }
}


/// Reads `null` and `""` as the default value, like a missing field
fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::de::DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::Null => Ok(T::default()),
        serde_json::Value::String(ref s) if s.is_empty() => Ok(T::default()),
        other => serde_json::from_value(other).map_err(serde::de::Error::custom),
    }
}


/// (De)serializes an optional time of the day as `HH:MM`, or as an empty string when it is missing
mod due_time_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            None => serializer.serialize_str(""),
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let raw = match raw {
            None => return Ok(None),
            Some(s) if s.trim().is_empty() => return Ok(None),
            Some(s) => s,
        };

        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
