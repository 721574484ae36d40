//! ICS file generation.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property};

use crate::error::{SharecalError, SharecalResult};
use crate::event::{Attachment, Event};
use crate::ics::{PROP_ACCESS, PROP_ATTACHMENT_NAME, PROP_ATTACHMENT_PATH, PROP_COST, PROP_CREATOR};

const PRODID: &str = "PRODID:-//sharecal//EN";

/// Generate the .ics content the store writes for a single event.
pub fn generate_ics(event: &Event) -> SharecalResult<String> {
    let id = event.id.ok_or_else(|| {
        SharecalError::IcsGenerate(format!("Event '{}' has no id", event.name))
    })?;

    let mut ics_event = base_vevent(event);
    ics_event.uid(&id.to_string());

    if !event.cost.is_empty() {
        ics_event.add_property(PROP_COST, &event.cost);
    }
    if let Some(ref creator) = event.created_by {
        ics_event.add_property(PROP_CREATOR, creator);
    }
    if let Some(level) = event.access_level {
        ics_event.add_property(PROP_ACCESS, level.as_str());
    }
    if let Some(ref attachment) = event.attachment {
        ics_event.add_property(PROP_ATTACHMENT_PATH, &attachment.path);
        ics_event.add_property(PROP_ATTACHMENT_NAME, &attachment.filename);
    }

    let mut cal = Calendar::new();
    cal.push(ics_event.done());

    Ok(strip_ics_bloat(&cal.done().to_string()))
}

/// Export events as one calendar for other apps.
///
/// `attachment_url` turns an attachment into the URL placed in ATTACH; events
/// whose attachment yields `None` are exported without one.
pub fn export_calendar<F>(events: &[Event], attachment_url: F) -> SharecalResult<String>
where
    F: Fn(&Attachment) -> Option<String>,
{
    let mut cal = Calendar::new();

    for event in events {
        let mut ics_event = base_vevent(event);

        if let Some(id) = event.id {
            ics_event.uid(&id.to_string());
        }

        if let Some(description) = export_description(event) {
            ics_event.description(&description);
        }

        if let Some(level) = event.access_level {
            ics_event.add_property(PROP_ACCESS, level.as_str());
        }
        if !event.cost.is_empty() {
            ics_event.add_property(PROP_COST, &event.cost);
        }

        if let Some(ref attachment) = event.attachment {
            if let Some(url) = attachment_url(attachment) {
                let mut prop = Property::new("ATTACH", &url);
                prop.add_parameter("FILENAME", &attachment.filename);
                ics_event.append_multi_property(prop);
            }
        }

        cal.push(ics_event.done());
    }

    let output = strip_ics_bloat(&cal.done().to_string());
    if !output.contains("BEGIN:VCALENDAR") {
        return Err(SharecalError::IcsGenerate("Calendar output is empty".into()));
    }

    Ok(output)
}

/// Fields shared by stored and exported events.
fn base_vevent(event: &Event) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();

    let summary = if event.name.trim().is_empty() {
        "Untitled Event"
    } else {
        event.name.as_str()
    };
    ics_event.summary(summary);

    // DTSTAMP is required by RFC 5545; stable output matters more than the
    // actual generation time, so use the event start.
    ics_event.add_property("DTSTAMP", format_utc(&event.start));
    ics_event.add_property("DTSTART", format_utc(&event.start));
    ics_event.add_property("DTEND", format_utc(&event.end));

    if !event.location.is_empty() {
        ics_event.location(&event.location);
    }

    ics_event
}

/// `Cost: ...` and `Location: ...` lines, each left out when empty.
fn export_description(event: &Event) -> Option<String> {
    let mut lines = Vec::new();
    if !event.cost.is_empty() {
        lines.push(format!("Cost: {}", event.cost));
    }
    if !event.location.is_empty() {
        lines.push(format!("Location: {}", event.location));
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
