//! Calendar event types.
//!
//! An [`Event`] is what the store persists, the grid buckets and the access
//! evaluator judges. Legacy shapes seen at the JSON boundary (the old
//! `startdate`/`enddate` field names, attachments encoded as a JSON string) are
//! normalized here during deserialization so nothing downstream has to care.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{SharecalError, SharecalResult};

/// Identifier of a persisted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        EventId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        EventId(uuid)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = SharecalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(EventId)
            .map_err(|_| SharecalError::InvalidInput(format!("'{}' is not a valid event id", s)))
    }
}

/// Per-event tag gating who may edit it and how it is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "edit")]
    Edit,
    #[serde(rename = "readonly")]
    ReadOnly,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Admin, AccessLevel::Edit, AccessLevel::ReadOnly];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Edit => "edit",
            AccessLevel::ReadOnly => "readonly",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = SharecalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(AccessLevel::Admin),
            "edit" => Ok(AccessLevel::Edit),
            "readonly" | "read-only" | "read_only" => Ok(AccessLevel::ReadOnly),
            other => Err(SharecalError::InvalidInput(format!(
                "Unknown access level '{}'. Expected admin, edit or readonly",
                other
            ))),
        }
    }
}

/// A file attached to an event.
///
/// `path` is relative to the attachment store. `public_url` is derived from the
/// path by the store and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl Attachment {
    pub fn new(path: impl Into<String>, filename: impl Into<String>) -> Self {
        Attachment {
            path: path.into(),
            filename: filename.into(),
            public_url: None,
        }
    }
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `None` until the event has been created in the store.
    #[serde(default)]
    pub id: Option<EventId>,
    pub name: String,
    #[serde(alias = "startdate")]
    pub start: DateTime<Utc>,
    /// Inclusive end of the event.
    #[serde(alias = "enddate")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "deserialize_access_level")]
    pub access_level: Option<AccessLevel>,
    #[serde(default, deserialize_with = "deserialize_attachment")]
    pub attachment: Option<Attachment>,
}

impl Event {
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            id: None,
            name: name.into(),
            start,
            end,
            cost: String::new(),
            location: String::new(),
            created_by: None,
            access_level: None,
            attachment: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Check the event is fit to be written to the store.
    pub fn validate(&self) -> SharecalResult<()> {
        if self.name.trim().is_empty() {
            return Err(SharecalError::InvalidInput("Event name must not be empty".into()));
        }
        if self.start > self.end {
            return Err(SharecalError::InvalidRange(self.name.clone()));
        }
        Ok(())
    }

    /// Drop sub-second precision, which the ICS representation cannot carry.
    pub fn truncate_to_seconds(&mut self) {
        self.start = self.start.trunc_subsecs(0);
        self.end = self.end.trunc_subsecs(0);
    }

    /// First and last calendar day of the event as seen in `tz`.
    pub fn date_span<Tz: TimeZone>(&self, tz: &Tz) -> (NaiveDate, NaiveDate) {
        (
            self.start.with_timezone(tz).date_naive(),
            self.end.with_timezone(tz).date_naive(),
        )
    }

    /// Whether the event covers `date` (inclusive, compared by calendar day).
    /// An event that ends before it starts covers nothing.
    pub fn covers_date<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> bool {
        let (first, last) = self.date_span(tz);
        first <= date && date <= last
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Unrecognized access levels deserialize to `None` instead of failing.
fn deserialize_access_level<'de, D>(deserializer: D) -> Result<Option<AccessLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttachmentShape {
    Structured(RawAttachment),
    Encoded(String),
}

#[derive(Deserialize)]
struct RawAttachment {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

impl RawAttachment {
    fn into_attachment(self) -> Option<Attachment> {
        let path = self.path.filter(|p| !p.trim().is_empty())?;
        let filename = self
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());
        Some(Attachment::new(path, filename))
    }
}

/// Accepts an attachment either as an object or as a JSON string holding one.
fn deserialize_attachment<'de, D>(deserializer: D) -> Result<Option<Attachment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<AttachmentShape>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(AttachmentShape::Structured(raw)) => raw,
        Some(AttachmentShape::Encoded(text)) => {
            if text.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str::<RawAttachment>(&text)
                .map_err(<D::Error as serde::de::Error>::custom)?
        }
    };
    Ok(raw.into_attachment())
}
