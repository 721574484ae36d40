//! Human-readable filenames for stored events.

use std::io;
use std::path::Path;

use crate::error::{SharecalError, SharecalResult};
use crate::event::{Event, EventId};
use crate::ics;

/// Pick the filename for an event in `dir`.
/// Handles collisions by adding numeric suffixes (-2, -3, etc).
pub fn filename_for(event: &Event, dir: &Path) -> SharecalResult<String> {
    let base_filename = base_filename(event);
    unique_filename(&base_filename, dir, event.id)
}

/// `2025-03-20T1500__board-meeting.ics`
fn base_filename(event: &Event) -> String {
    let slug = match slugify(&event.name) {
        s if s.is_empty() => "untitled".to_string(),
        s => s,
    };
    format!("{}__{}.ics", event.start.format("%Y-%m-%dT%H%M"), slug)
}

/// Convert a string to a filename-safe slug
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}

/// Return `base_filename` or the first free `-N` variant of it. A file that
/// already holds the same event counts as free.
fn unique_filename(base_filename: &str, dir: &Path, own_id: Option<EventId>) -> SharecalResult<String> {
    let base = base_filename.trim_end_matches(".ics");

    let candidates = std::iter::once(base_filename.to_string())
        .chain((2..=100).map(|n| format!("{}-{}.ics", base, n)));

    for candidate in candidates {
        let path = dir.join(&candidate);
        if !path.exists() || holds_event(&path, own_id) {
            return Ok(candidate);
        }
    }

    Err(SharecalError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("Too many filename collisions for {}", base_filename),
    )))
}

fn holds_event(path: &Path, own_id: Option<EventId>) -> bool {
    let Some(own_id) = own_id else {
        return false;
    };
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| ics::parse_event(&content))
        .is_some_and(|event| event.id == Some(own_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_test_event() -> Event {
        let mut event = Event::new(
            "Board Meeting",
            Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 16, 0, 0).unwrap(),
        );
        event.id = Some(EventId::new());
        event
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Team Standup"), "team-standup");
        assert_eq!(slugify("Meeting: Q4 Review!"), "meeting-q4-review");
        assert_eq!(slugify("  Lots   of   spaces  "), "lots-of-spaces");
        assert_eq!(slugify(&"a".repeat(100)).len(), 50);
    }

    #[test]
    fn test_base_filename() {
        let mut event = make_test_event();
        assert_eq!(base_filename(&event), "2025-03-20T1500__board-meeting.ics");

        event.name = "!!!".into();
        assert_eq!(base_filename(&event), "2025-03-20T1500__untitled.ics");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let first = make_test_event();
        let second = make_test_event();

        let name = filename_for(&first, dir.path()).unwrap();
        std::fs::write(dir.path().join(&name), ics::generate_ics(&first).unwrap()).unwrap();

        // The same event keeps its file, another event with the same
        // title and start gets a suffix.
        assert_eq!(filename_for(&first, dir.path()).unwrap(), name);
        assert_eq!(
            filename_for(&second, dir.path()).unwrap(),
            "2025-03-20T1500__board-meeting-2.ics"
        );
    }
}
