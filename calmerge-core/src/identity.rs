//! Duplicate detection: the canonical timing key of an event.

use crate::event::VEvent;

/// Identity of an event's timing. Two events with the same key are the
/// same occurrence seen through different sources.
///
/// The key is computed on the *stated* representation of start and end;
/// no timezone database is consulted. The same instant written in two
/// different zones yields two different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
}

impl EventKey {
    /// Compute the key for an event.
    pub fn of(event: &VEvent) -> EventKey {
        EventKey {
            start: event.start().to_iso8601(),
            end: event.end().map(|t| t.to_iso8601()),
            all_day: event.is_all_day(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;

    fn event(body: &str) -> VEvent {
        let ics = format!(
            "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:k\r\n{}END:VEVENT\r\nEND:VCALENDAR\r\n",
            body
        );
        let feed = Feed::parse(ics.as_bytes()).expect("fixture should parse");
        let event = feed.events().next().unwrap().clone();
        event
    }

    #[test]
    fn identical_timing_yields_identical_keys() {
        let a = event("DTSTART:20240101T100000Z\r\nDTEND:20240101T110000Z\r\nSUMMARY:A\r\n");
        let b = event("DTSTART:20240101T100000Z\r\nDTEND:20240101T110000Z\r\nSUMMARY:B\r\n");
        assert_eq!(EventKey::of(&a), EventKey::of(&b), "summary must not affect the key");
    }

    #[test]
    fn same_instant_different_stated_zone_is_a_different_key() {
        // 10:00 UTC and 11:00 Berlin are the same instant; the keys still
        // differ because identity follows the stated representation.
        let utc = event("DTSTART:20240101T100000Z\r\n");
        let berlin = event("DTSTART;TZID=Europe/Berlin:20240101T110000\r\n");
        assert_ne!(EventKey::of(&utc), EventKey::of(&berlin));
    }

    #[test]
    fn all_day_flag_is_part_of_the_key() {
        let all_day = event("DTSTART;VALUE=DATE:20240101\r\n");
        let midnight = event("DTSTART:20240101T000000\r\n");

        let day_key = EventKey::of(&all_day);
        let midnight_key = EventKey::of(&midnight);
        assert!(day_key.all_day);
        assert!(!midnight_key.all_day);
        assert_ne!(day_key, midnight_key);
    }

    #[test]
    fn missing_end_is_kept_distinct_from_any_end() {
        let open = event("DTSTART:20240101T100000Z\r\n");
        let closed = event("DTSTART:20240101T100000Z\r\nDTEND:20240101T100000Z\r\n");
        assert_eq!(EventKey::of(&open).end, None);
        assert_ne!(EventKey::of(&open), EventKey::of(&closed));
    }
}
