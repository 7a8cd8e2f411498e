//! In-memory feed model and wire-format parsing.
//!
//! A [`Feed`] is the ordered content of one VCALENDAR: its feed-level
//! properties and its top-level components. Events are parsed into
//! [`VEvent`]s; everything else (VTIMEZONE, vendor extensions, ...) is
//! carried verbatim as a [`RawComponent`] so that serialization loses
//! nothing the merge logic never looked at.

use icalendar::parser::{read_calendar, unfold};

use crate::error::{CalMergeError, CalMergeResult};
use crate::event::VEvent;

/// A parsed calendar document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    /// Feed-level properties (PRODID, VERSION, calendar name, ...).
    pub properties: Vec<RawProperty>,
    /// Top-level components in source order.
    pub components: Vec<FeedComponent>,
}

/// One top-level component of a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedComponent {
    Event(VEvent),
    Other(RawComponent),
}

/// A component kept verbatim, nested children included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawComponent {
    pub name: String,
    pub properties: Vec<RawProperty>,
    pub components: Vec<RawComponent>,
}

/// A single content line: name, parameters and the raw text value.
///
/// Values are kept in wire-escaped form; the core never unescapes what
/// it does not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProperty {
    pub name: String,
    pub params: Vec<RawParam>,
    pub value: String,
}

/// A property parameter such as `TZID=Europe/London`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParam {
    pub name: String,
    pub value: Option<String>,
}

impl Feed {
    /// Parse raw .ics bytes into a feed.
    ///
    /// Input bytes are decoded leniently; structural problems (unclosed
    /// components, events without a usable DTSTART) fail the whole feed
    /// so the caller can skip this source and continue with the rest.
    pub fn parse(raw: &[u8]) -> CalMergeResult<Feed> {
        let text = String::from_utf8_lossy(raw);
        let unfolded = unfold(&text);
        let calendar =
            read_calendar(&unfolded).map_err(|e| CalMergeError::Parse(e.to_string()))?;

        let mut feed = Feed {
            properties: calendar.properties.iter().map(convert_property).collect(),
            components: Vec::new(),
        };
        for component in &calendar.components {
            append_component(&mut feed, component)?;
        }
        Ok(feed)
    }

    /// Iterate over the events of the feed.
    pub fn events(&self) -> impl Iterator<Item = &VEvent> {
        self.components.iter().filter_map(|component| match component {
            FeedComponent::Event(event) => Some(event),
            FeedComponent::Other(_) => None,
        })
    }

    /// Value of a feed-level property, if present.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    /// Replace a feed-level property, appending it when absent.
    pub fn set_property(&mut self, name: &str, value: &str) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(prop) => {
                prop.value = value.to_string();
                prop.params.clear();
            }
            None => self.properties.push(RawProperty {
                name: name.to_string(),
                params: Vec::new(),
                value: value.to_string(),
            }),
        }
    }
}

impl RawComponent {
    /// First property with the given name.
    pub fn property(&self, name: &str) -> Option<&RawProperty> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Mutable access to the first property with the given name.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut RawProperty> {
        self.properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl RawProperty {
    /// Value of a named parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.value.as_deref())
    }
}

/// Append one parsed component to the feed.
///
/// The VCALENDAR container itself never becomes a component of the
/// model: its properties are hoisted to the feed level and its children
/// unwrapped into the top-level sequence.
fn append_component(feed: &mut Feed, component: &icalendar::parser::Component) -> CalMergeResult<()> {
    if component.name == "VCALENDAR" {
        for property in &component.properties {
            feed.properties.push(convert_property(property));
        }
        for child in &component.components {
            append_component(feed, child)?;
        }
        return Ok(());
    }

    let raw = convert_component(component);
    if component.name == "VEVENT" {
        feed.components.push(FeedComponent::Event(VEvent::from_raw(raw)?));
    } else {
        feed.components.push(FeedComponent::Other(raw));
    }
    Ok(())
}

fn convert_component(component: &icalendar::parser::Component) -> RawComponent {
    RawComponent {
        name: component.name.to_string(),
        properties: component.properties.iter().map(convert_property).collect(),
        components: component.components.iter().map(convert_component).collect(),
    }
}

fn convert_property(property: &icalendar::parser::Property) -> RawProperty {
    RawProperty {
        name: property.name.to_string(),
        params: property
            .params
            .iter()
            .map(|param| RawParam {
                name: param.key.to_string(),
                value: param.val.as_ref().map(|v| v.to_string()),
            })
            .collect(),
        value: property.val.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::to_ics_string;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Feed//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/London\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19701025T020000\r\n\
TZOFFSETFROM:+0100\r\n\
TZOFFSETTO:+0000\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:sample-1\r\n\
DTSTART;TZID=Europe/London:20240101T100000\r\n\
DTEND;TZID=Europe/London:20240101T110000\r\n\
SUMMARY:Planning\r\n\
X-CUSTOM-FLAG;X-PARAM=yes:opaque payload\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parse_splits_events_and_passthrough() {
        let feed = Feed::parse(SAMPLE.as_bytes()).expect("sample should parse");

        assert_eq!(feed.components.len(), 2);
        assert!(matches!(&feed.components[0], FeedComponent::Other(c) if c.name == "VTIMEZONE"));
        assert!(matches!(&feed.components[1], FeedComponent::Event(_)));
        assert_eq!(feed.property_value("PRODID"), Some("-//Example//Feed//EN"));
    }

    #[test]
    fn parse_keeps_nested_components_attached() {
        let feed = Feed::parse(SAMPLE.as_bytes()).unwrap();

        let tz = match &feed.components[0] {
            FeedComponent::Other(c) => c,
            other => panic!("expected passthrough component, got {:?}", other),
        };
        assert_eq!(tz.components.len(), 1, "STANDARD should stay inside VTIMEZONE");
        assert_eq!(tz.components[0].name, "STANDARD");
    }

    #[test]
    fn parse_preserves_opaque_properties_and_params() {
        let feed = Feed::parse(SAMPLE.as_bytes()).unwrap();

        let event = feed.events().next().unwrap();
        let custom = event
            .component()
            .property("X-CUSTOM-FLAG")
            .expect("opaque property should survive");
        assert_eq!(custom.value, "opaque payload");
        assert_eq!(custom.param("X-PARAM"), Some("yes"));

        let start = event.component().property("DTSTART").unwrap();
        assert_eq!(start.param("TZID"), Some("Europe/London"));
    }

    #[test]
    fn parse_fails_on_unterminated_calendar() {
        let broken = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\n";
        assert!(Feed::parse(broken.as_bytes()).is_err());
    }

    #[test]
    fn parse_fails_on_event_without_dtstart() {
        let input = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:no-start\r\n\
SUMMARY:Broken\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let err = Feed::parse(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("DTSTART"), "got: {err}");
    }

    #[test]
    fn set_property_replaces_existing_value() {
        let mut feed = Feed::parse(SAMPLE.as_bytes()).unwrap();

        feed.set_property("PRODID", "-//Other//EN");
        feed.set_property("X-NEW", "1");

        assert_eq!(feed.property_value("PRODID"), Some("-//Other//EN"));
        assert_eq!(feed.property_value("X-NEW"), Some("1"));
        // Replacement must not duplicate the property.
        let prodid_count = feed
            .properties
            .iter()
            .filter(|p| p.name == "PRODID")
            .count();
        assert_eq!(prodid_count, 1);
    }

    #[test]
    fn serialize_parse_round_trip_is_stable() {
        let once = Feed::parse(SAMPLE.as_bytes()).unwrap();
        let first = to_ics_string(&once);

        let twice = Feed::parse(first.as_bytes()).unwrap();
        let second = to_ics_string(&twice);

        assert_eq!(once, twice, "re-parsing serialized output must round-trip");
        assert_eq!(first, second, "serialization must be deterministic");
    }
}
