//! ICS file parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{SharecalError, SharecalResult};
use crate::event::{AccessLevel, Attachment, Event, EventId};
use crate::ics::{PROP_ACCESS, PROP_ATTACHMENT_NAME, PROP_ATTACHMENT_PATH, PROP_COST, PROP_CREATOR};

/// Parse a stored .ics file into an Event.
pub fn parse_event(content: &str) -> Option<Event> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vevent = calendar.components.iter().find(|c| c.name == "VEVENT")?;
    event_from_vevent(vevent)
}

/// Parse every VEVENT of a calendar, e.g. one exported by another app.
///
/// VEVENTs without a usable DTSTART are skipped.
pub fn parse_calendar(content: &str) -> SharecalResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| SharecalError::IcsParse(e.to_string()))?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(|vevent| {
            let event = event_from_vevent(vevent);
            if event.is_none() {
                let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
                tracing::warn!(uid = ?uid, "Skipping VEVENT without a usable start");
            }
            event
        })
        .collect();

    Ok(events)
}

fn event_from_vevent(vevent: &Component) -> Option<Event> {
    let start = to_utc(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?)?;
    let end = match vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
    {
        Some(DatePerhapsTime::Date(d)) => all_day_end(d)?.max(start),
        Some(dpt) => to_utc(dpt)?,
        None => start,
    };

    let name = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "Untitled Event".to_string());

    let id = vevent
        .find_prop("UID")
        .and_then(|p| p.val.as_ref().parse::<EventId>().ok());

    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| p.val.as_ref().replace("\\n", "\n"));

    let location = vevent
        .find_prop("LOCATION")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    // Exports from the web app only carry the cost inside DESCRIPTION.
    let cost = vevent
        .find_prop(PROP_COST)
        .map(|p| p.val.to_string())
        .or_else(|| description.as_deref().and_then(cost_from_description))
        .unwrap_or_default();

    let created_by = vevent.find_prop(PROP_CREATOR).map(|p| p.val.to_string());

    let access_level = vevent
        .find_prop(PROP_ACCESS)
        .and_then(|p| p.val.as_ref().parse::<AccessLevel>().ok());

    let attachment = vevent
        .find_prop(PROP_ATTACHMENT_PATH)
        .map(|p| p.val.to_string())
        .filter(|path| !path.is_empty())
        .map(|path| {
            let filename = vevent
                .find_prop(PROP_ATTACHMENT_NAME)
                .map(|p| p.val.to_string())
                .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());
            Attachment::new(path, filename)
        });

    Some(Event {
        id,
        name,
        start,
        end,
        cost,
        location,
        created_by,
        access_level,
        attachment,
    })
}

/// Convert icalendar's DatePerhapsTime to an instant.
///
/// Dates start at midnight, floating times are read as UTC and unknown TZIDs
/// make the value unusable.
fn to_utc(dpt: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match dpt {
        DatePerhapsTime::Date(d) => Some(d.and_hms_opt(0, 0, 0)?.and_utc()),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => Some(dt),
            CalendarDateTime::Floating(naive) => Some(naive.and_utc()),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                let tz: chrono_tz::Tz = tzid.parse().ok()?;
                let local = tz.from_local_datetime(&date_time).earliest()?;
                Some(local.with_timezone(&Utc))
            }
        },
    }
}

/// All-day DTEND is exclusive: the event ends the moment before that day.
fn all_day_end(exclusive: NaiveDate) -> Option<DateTime<Utc>> {
    Some(exclusive.pred_opt()?.and_hms_opt(23, 59, 59)?.and_utc())
}

fn cost_from_description(description: &str) -> Option<String> {
    description
        .lines()
        .find_map(|line| line.trim().strip_prefix("Cost:"))
        .map(|cost| cost.trim().to_string())
        .filter(|cost| !cost.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::{export_calendar, generate_ics};

    #[test]
    fn test_store_roundtrip_keeps_sharecal_fields() {
        let mut event = Event::new(
            "Board Meeting",
            Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 16, 0, 0).unwrap(),
        );
        event.id = Some(EventId::new());
        event.cost = "Free".into();
        event.location = "Room 4".into();
        event.created_by = Some("alice".into());
        event.access_level = Some(AccessLevel::ReadOnly);
        event.attachment = Some(Attachment::new("d41d8cd9/agenda.pdf", "agenda.pdf"));

        let ics = generate_ics(&event).unwrap();
        let parsed = parse_event(&ics).expect("Should parse generated ICS");

        assert_eq!(parsed, event);
    }

    #[test]
    fn test_parse_all_day_end_is_exclusive() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:holiday-1\r\n\
SUMMARY:Holiday\r\n\
DTSTART;VALUE=DATE:20241224\r\n\
DTEND;VALUE=DATE:20241227\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let event = parse_event(ics).expect("Should parse");

        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 12, 24, 0, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 12, 26, 23, 59, 59).unwrap());
        // Non-UUID UIDs from other apps get a fresh id on import.
        assert_eq!(event.id, None);
    }

    #[test]
    fn test_parse_tzid_is_converted_to_utc() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:zoned-1\r\n\
SUMMARY:Standup\r\n\
DTSTART;TZID=America/New_York:20240115T090000\r\n\
DTEND;TZID=America/New_York:20240115T093000\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let event = parse_event(ics).expect("Should parse");

        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_missing_dtend_and_summary() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:bare-1\r\n\
DTSTART:20240301T120000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let event = parse_event(ics).expect("Should parse");

        assert_eq!(event.name, "Untitled Event");
        assert_eq!(event.start, event.end);
    }

    #[test]
    fn test_parse_calendar_skips_events_without_start() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:good\r\n\
SUMMARY:Good\r\n\
DTSTART:20240301T120000Z\r\n\
DTEND:20240301T130000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:bad\r\n\
SUMMARY:No start\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let events = parse_calendar(ics).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Good");
    }

    #[test]
    fn test_export_then_parse_recovers_cost() {
        let mut event = Event::new(
            "Gala",
            Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap(),
        );
        event.id = Some(EventId::new());
        event.cost = "40".into();
        event.created_by = Some("bob".into());

        let ics = export_calendar(std::slice::from_ref(&event), |_| None).unwrap();
        let parsed = parse_calendar(&ics).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, event.id);
        assert_eq!(parsed[0].cost, "40");
        assert_eq!(parsed[0].created_by, None);
    }

    #[test]
    fn test_cost_from_description() {
        assert_eq!(
            cost_from_description("Cost: 12 USD\nLocation: Park"),
            Some("12 USD".to_string())
        );
        assert_eq!(cost_from_description("Location: Park"), None);
        assert_eq!(cost_from_description("Cost: "), None);
    }
}
