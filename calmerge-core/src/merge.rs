//! The merge engine: combine N source feeds into one deduplicated feed.

use std::collections::HashMap;

use crate::event::VEvent;
use crate::feed::{Feed, FeedComponent};
use crate::filter::{keep_if_short_enough, MAX_EVENT_DAYS};
use crate::identity::EventKey;

/// Product identifier stamped on merged output.
const MERGED_PRODID: &str = "-//calmerge//EN";

/// Separator between folded duplicate summaries.
const SUMMARY_SEPARATOR: &str = ", ";

/// Accumulates events from source feeds, in order, deduplicating on the
/// timing key.
///
/// Not thread-safe: feeds must be added in source-list order, and the
/// first seen representation of a key wins. Later duplicates only ever
/// extend the stored summary; timing fields never change once a key is
/// inserted.
#[derive(Debug)]
pub struct Merger {
    max_days: f64,
    seen: HashMap<EventKey, usize>,
    merged: Feed,
}

impl Merger {
    /// Merger with the standard duration cutoff.
    pub fn new() -> Merger {
        Merger::with_max_days(MAX_EVENT_DAYS)
    }

    /// Merger with a custom duration cutoff in days.
    pub fn with_max_days(max_days: f64) -> Merger {
        Merger {
            max_days,
            seen: HashMap::new(),
            merged: Feed::default(),
        }
    }

    /// Fold one source feed into the accumulator.
    ///
    /// Non-event components pass through unchanged. Events are cloned
    /// (the source feed is never mutated), dropped when longer than the
    /// cutoff, prefixed, then either folded into an already-seen
    /// occurrence or appended in first-seen order.
    pub fn add_feed(&mut self, feed: &Feed, prefix: &str) {
        for component in &feed.components {
            match component {
                FeedComponent::Other(other) => self
                    .merged
                    .components
                    .push(FeedComponent::Other(other.clone())),
                FeedComponent::Event(event) => self.add_event(event.clone(), prefix),
            }
        }
    }

    fn add_event(&mut self, mut event: VEvent, prefix: &str) {
        if !keep_if_short_enough(&event, self.max_days) {
            return;
        }

        // Idempotent prefixing: an already-prefixed summary stays as is.
        let summary = event.summary().unwrap_or_default();
        let prefixed = if summary.starts_with(prefix) {
            summary.to_string()
        } else {
            format!("{prefix}{summary}")
        };
        event.set_summary(&prefixed);

        let key = EventKey::of(&event);
        if let Some(&index) = self.seen.get(&key) {
            if let FeedComponent::Event(existing) = &mut self.merged.components[index] {
                fold_summary(existing, &prefixed);
            }
            return;
        }

        self.merged.components.push(FeedComponent::Event(event));
        self.seen.insert(key, self.merged.components.len() - 1);
    }

    /// Finalize the merged feed. Its metadata is set fresh, never
    /// inherited from any source.
    pub fn into_feed(mut self) -> Feed {
        self.merged.set_property("PRODID", MERGED_PRODID);
        self.merged.set_property("VERSION", "2.0");
        self.merged
    }
}

impl Default for Merger {
    fn default() -> Merger {
        Merger::new()
    }
}

/// Append a duplicate's summary unless it is already one of the parts.
fn fold_summary(existing: &mut VEvent, addition: &str) {
    let current = existing.summary().unwrap_or_default().to_string();
    if current.split(SUMMARY_SEPARATOR).any(|part| part == addition) {
        return;
    }

    let folded = if current.is_empty() {
        addition.to_string()
    } else {
        format!("{current}{SUMMARY_SEPARATOR}{addition}")
    };
    existing.set_summary(&folded);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(events: &[&str]) -> Feed {
        let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Src//EN\r\n");
        for body in events {
            ics.push_str("BEGIN:VEVENT\r\n");
            ics.push_str(body);
            ics.push_str("END:VEVENT\r\n");
        }
        ics.push_str("END:VCALENDAR\r\n");
        Feed::parse(ics.as_bytes()).expect("fixture should parse")
    }

    fn summaries(feed: &Feed) -> Vec<String> {
        feed.events()
            .map(|e| e.summary().unwrap_or_default().to_string())
            .collect()
    }

    const STANDUP_A: &str =
        "UID:a1\r\nDTSTART:20240101T100000Z\r\nDTEND:20240101T110000Z\r\nSUMMARY:Standup\r\n";
    const STANDUP_B: &str =
        "UID:b1\r\nDTSTART:20240101T100000Z\r\nDTEND:20240101T110000Z\r\nSUMMARY:Daily Sync\r\n";

    #[test]
    fn duplicates_across_sources_fold_into_one_summary() {
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[STANDUP_A]), "[A] ");
        merger.add_feed(&feed(&[STANDUP_B]), "[B] ");

        let merged = merger.into_feed();
        assert_eq!(summaries(&merged), vec!["[A] Standup, [B] Daily Sync"]);
    }

    #[test]
    fn fold_order_follows_source_order() {
        let mut forward = Merger::new();
        forward.add_feed(&feed(&[STANDUP_A]), "[A] ");
        forward.add_feed(&feed(&[STANDUP_B]), "[B] ");
        assert_eq!(summaries(&forward.into_feed()), vec!["[A] Standup, [B] Daily Sync"]);

        let mut reverse = Merger::new();
        reverse.add_feed(&feed(&[STANDUP_B]), "[B] ");
        reverse.add_feed(&feed(&[STANDUP_A]), "[A] ");
        assert_eq!(summaries(&reverse.into_feed()), vec!["[B] Daily Sync, [A] Standup"]);
    }

    #[test]
    fn folding_the_same_summary_twice_adds_it_once() {
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[STANDUP_A]), "[A] ");
        merger.add_feed(&feed(&[STANDUP_A]), "[A] ");

        assert_eq!(summaries(&merger.into_feed()), vec!["[A] Standup"]);
    }

    #[test]
    fn prefixing_is_idempotent() {
        let prefixed =
            "UID:p1\r\nDTSTART:20240101T100000Z\r\nSUMMARY:[A] Standup\r\n";
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[prefixed]), "[A] ");

        assert_eq!(summaries(&merger.into_feed()), vec!["[A] Standup"]);
    }

    #[test]
    fn overlong_events_never_reach_the_output() {
        let five_days =
            "UID:long\r\nDTSTART:20240101T000000Z\r\nDTEND:20240106T000000Z\r\nSUMMARY:Offsite\r\n";
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[five_days, STANDUP_A]), "[A] ");

        let merged = merger.into_feed();
        assert_eq!(summaries(&merged), vec!["[A] Standup"]);
    }

    #[test]
    fn first_seen_timing_representation_wins() {
        let utc = "UID:u\r\nDTSTART:20240101T100000Z\r\nSUMMARY:One\r\n";
        let zoned = "UID:z\r\nDTSTART;TZID=Europe/Berlin:20240101T110000\r\nSUMMARY:Two\r\n";

        let mut merger = Merger::new();
        merger.add_feed(&feed(&[utc]), "");
        merger.add_feed(&feed(&[zoned]), "");

        // Same instant, different stated zones: both survive, each with
        // the representation of the source that produced it.
        let merged = merger.into_feed();
        let starts: Vec<String> = merged.events().map(|e| e.start().to_iso8601()).collect();
        assert_eq!(
            starts,
            vec![
                "2024-01-01T10:00:00+00:00".to_string(),
                "2024-01-01T11:00:00[Europe/Berlin]".to_string(),
            ]
        );
    }

    #[test]
    fn passthrough_components_survive_the_merge() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\nTZID:Europe/London\r\nEND:VTIMEZONE\r\n\
BEGIN:VEVENT\r\nUID:e\r\nDTSTART:20240101T100000Z\r\nSUMMARY:S\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";
        let source = Feed::parse(ics.as_bytes()).unwrap();

        let mut merger = Merger::new();
        merger.add_feed(&source, "");

        let merged = merger.into_feed();
        assert!(matches!(
            &merged.components[0],
            FeedComponent::Other(c) if c.name == "VTIMEZONE"
        ));
    }

    #[test]
    fn merged_metadata_is_fixed_not_inherited() {
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[STANDUP_A]), "[A] ");

        let merged = merger.into_feed();
        assert_eq!(merged.property_value("PRODID"), Some(MERGED_PRODID));
        assert_eq!(merged.property_value("VERSION"), Some("2.0"));
    }

    #[test]
    fn merging_never_mutates_the_source_feed() {
        let source = feed(&[STANDUP_A]);
        let before = source.clone();

        let mut merger = Merger::new();
        merger.add_feed(&source, "[A] ");
        merger.into_feed();

        assert_eq!(source, before);
    }

    #[test]
    fn events_without_summary_get_the_bare_prefix() {
        let untitled = "UID:n\r\nDTSTART:20240101T100000Z\r\n";
        let mut merger = Merger::new();
        merger.add_feed(&feed(&[untitled]), "[A] ");

        assert_eq!(summaries(&merger.into_feed()), vec!["[A] "]);
    }
}
