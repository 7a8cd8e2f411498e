//! Temporal filters: recency pruning and the maximum-duration cutoff.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::event::{EventTime, VEvent};
use crate::feed::{Feed, FeedComponent};

/// Days of history kept by the per-source refresh.
pub const RECENT_DAYS: i64 = 7;

/// Maximum event span, in days, allowed into the merged feed.
pub const MAX_EVENT_DAYS: f64 = 2.0;

/// True when the event starts at or after the cutoff.
///
/// Date-only starts compare by calendar date. Floating times compare
/// against the cutoff with its offset stripped. Zoned times resolve
/// their TZID where recognized and otherwise fall back to the floating
/// rule.
pub fn keep_if_recent(event: &VEvent, cutoff: DateTime<Utc>) -> bool {
    match event.start() {
        EventTime::Date(date) => *date >= cutoff.date_naive(),
        EventTime::Utc(dt) => *dt >= cutoff,
        EventTime::Floating(dt) => *dt >= cutoff.naive_utc(),
        EventTime::Zoned { datetime, tzid } => match tzid.parse::<Tz>() {
            Ok(tz) => match tz.from_local_datetime(datetime).earliest() {
                Some(local) => local.with_timezone(&Utc) >= cutoff,
                None => *datetime >= cutoff.naive_utc(),
            },
            Err(_) => *datetime >= cutoff.naive_utc(),
        },
    }
}

/// A copy of the feed containing only recent events.
///
/// Feed properties and non-event components carry over unchanged; the
/// source feed itself is never mutated.
pub fn filter_recent(feed: &Feed, cutoff: DateTime<Utc>) -> Feed {
    Feed {
        properties: feed.properties.clone(),
        components: feed
            .components
            .iter()
            .filter(|component| match component {
                FeedComponent::Event(event) => keep_if_recent(event, cutoff),
                FeedComponent::Other(_) => true,
            })
            .cloned()
            .collect(),
    }
}

/// Event span in days, fractional for timed events.
///
/// The end is DTEND when present, else DTSTART plus DURATION, else the
/// start itself (zero length). All-day spans count whole days with the
/// conventional exclusive end date. Arithmetic runs on stated clock
/// times; offsets are not reconciled across mixed representations.
pub fn duration_days(event: &VEvent) -> f64 {
    if let Some(end) = event.end() {
        if event.is_all_day() {
            return (end.date() - event.start().date()).num_days() as f64;
        }
        let delta = end.naive() - event.start().naive();
        return delta.num_seconds() as f64 / 86_400.0;
    }

    match event.duration() {
        Some(duration) => duration.num_seconds() as f64 / 86_400.0,
        None => 0.0,
    }
}

/// True when the event fits the duration cutoff (inclusive bound).
pub fn keep_if_short_enough(event: &VEvent, max_days: f64) -> bool {
    duration_days(event) <= max_days
}
