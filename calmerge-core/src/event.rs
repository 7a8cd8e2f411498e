//! Event timing values and the event wrapper.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CalMergeError, CalMergeResult};
use crate::feed::{RawComponent, RawProperty};

/// A point in time exactly as stated by the source feed.
///
/// The representation is preserved as declared; the core never converts
/// between zones.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// Date-only value (all-day).
    Date(NaiveDate),
    /// UTC date-time (`...Z`).
    Utc(DateTime<Utc>),
    /// Naive date-time with no declared zone.
    Floating(NaiveDateTime),
    /// Local date-time tagged with a TZID parameter.
    Zoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Interpret a DTSTART/DTEND-style property value.
    pub(crate) fn from_property(prop: &RawProperty) -> CalMergeResult<EventTime> {
        let value = prop.value.trim();
        let bad = |what: &str| {
            CalMergeError::Parse(format!("bad {} value {:?}: {}", prop.name, value, what))
        };

        let is_date = prop
            .param("VALUE")
            .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
            || (value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()));
        if is_date {
            let date = NaiveDate::parse_from_str(value, "%Y%m%d")
                .map_err(|e| bad(&e.to_string()))?;
            return Ok(EventTime::Date(date));
        }

        if let Some(tzid) = prop.param("TZID") {
            let datetime = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
                .map_err(|e| bad(&e.to_string()))?;
            return Ok(EventTime::Zoned {
                datetime,
                tzid: tzid.to_string(),
            });
        }

        if let Some(stripped) = value.strip_suffix('Z') {
            let datetime = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
                .map_err(|e| bad(&e.to_string()))?;
            return Ok(EventTime::Utc(datetime.and_utc()));
        }

        let datetime = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .map_err(|e| bad(&e.to_string()))?;
        Ok(EventTime::Floating(datetime))
    }

    /// True when the value carries no time of day.
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Calendar date of the value.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(date) => *date,
            EventTime::Utc(dt) => dt.date_naive(),
            EventTime::Floating(dt) => dt.date(),
            EventTime::Zoned { datetime, .. } => datetime.date(),
        }
    }

    /// The stated clock time; dates map to midnight.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(date) => date.and_hms_opt(0, 0, 0).unwrap(),
            EventTime::Utc(dt) => dt.naive_utc(),
            EventTime::Floating(dt) => *dt,
            EventTime::Zoned { datetime, .. } => *datetime,
        }
    }

    /// ISO-8601 rendering of the stated representation.
    ///
    /// Zoned values keep their zone name as a suffix tag rather than
    /// being resolved to an offset.
    pub fn to_iso8601(&self) -> String {
        match self {
            EventTime::Date(date) => date.format("%Y-%m-%d").to_string(),
            EventTime::Utc(dt) => dt.to_rfc3339(),
            EventTime::Floating(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            EventTime::Zoned { datetime, tzid } => {
                format!("{}[{}]", datetime.format("%Y-%m-%dT%H:%M:%S"), tzid)
            }
        }
    }
}

/// A single VEVENT: parsed timing plus the verbatim component payload.
///
/// Everything except the summary is frozen after parse; the merge engine
/// only ever rewrites SUMMARY.
#[derive(Debug, Clone, PartialEq)]
pub struct VEvent {
    start: EventTime,
    end: Option<EventTime>,
    duration: Option<Duration>,
    component: RawComponent,
}

impl VEvent {
    pub(crate) fn from_raw(component: RawComponent) -> CalMergeResult<VEvent> {
        let start = component
            .property("DTSTART")
            .ok_or_else(|| CalMergeError::Parse("VEVENT without DTSTART".to_string()))
            .and_then(EventTime::from_property)?;
        let end = component
            .property("DTEND")
            .map(EventTime::from_property)
            .transpose()?;
        let duration = component
            .property("DURATION")
            .map(parse_duration)
            .transpose()?;

        Ok(VEvent {
            start,
            end,
            duration,
            component,
        })
    }

    pub fn start(&self) -> &EventTime {
        &self.start
    }

    pub fn end(&self) -> Option<&EventTime> {
        self.end.as_ref()
    }

    /// Explicit DURATION, when the event has one instead of a DTEND.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    /// Raw SUMMARY text, if any.
    pub fn summary(&self) -> Option<&str> {
        self.component.property("SUMMARY").map(|p| p.value.as_str())
    }

    /// Rewrite SUMMARY, inserting the property when missing.
    pub fn set_summary(&mut self, summary: &str) {
        match self.component.property_mut("SUMMARY") {
            Some(prop) => prop.value = summary.to_string(),
            None => self.component.properties.push(RawProperty {
                name: "SUMMARY".to_string(),
                params: Vec::new(),
                value: summary.to_string(),
            }),
        }
    }

    /// The verbatim component, summary edits included.
    pub fn component(&self) -> &RawComponent {
        &self.component
    }
}

/// Parse an iCalendar DURATION value (`PT1H30M`, `-P1D`, `P2W`).
fn parse_duration(prop: &RawProperty) -> CalMergeResult<Duration> {
    let value = prop.value.trim();
    let negative = value.starts_with('-');
    let body = value.trim_start_matches(['-', '+']);

    let parsed = iso8601::duration(body)
        .map_err(|e| CalMergeError::Parse(format!("bad DURATION value {:?}: {}", value, e)))?;
    let std: std::time::Duration = parsed.into();
    let duration = Duration::from_std(std)
        .map_err(|e| CalMergeError::Parse(format!("DURATION out of range: {}", e)))?;

    Ok(if negative { -duration } else { duration })
}
