//! Deterministic wire-format output (RFC 5545 content lines).

use crate::feed::{Feed, FeedComponent, RawComponent, RawProperty};

/// Maximum content-line length in octets, excluding the line break.
const MAX_LINE_OCTETS: usize = 75;

/// Render a feed as .ics bytes.
pub fn to_ics_bytes(feed: &Feed) -> Vec<u8> {
    to_ics_string(feed).into_bytes()
}

/// Render a feed as .ics text.
///
/// Output order is the model's order, so serializing the same feed
/// twice yields identical bytes.
pub fn to_ics_string(feed: &Feed) -> String {
    let mut out = String::new();
    fold_line(&mut out, "BEGIN:VCALENDAR");
    for property in &feed.properties {
        fold_line(&mut out, &property_line(property));
    }
    for component in &feed.components {
        match component {
            FeedComponent::Event(event) => write_component(&mut out, event.component()),
            FeedComponent::Other(other) => write_component(&mut out, other),
        }
    }
    fold_line(&mut out, "END:VCALENDAR");
    out
}

fn write_component(out: &mut String, component: &RawComponent) {
    fold_line(out, &format!("BEGIN:{}", component.name));
    for property in &component.properties {
        fold_line(out, &property_line(property));
    }
    for child in &component.components {
        write_component(out, child);
    }
    fold_line(out, &format!("END:{}", component.name));
}

fn property_line(property: &RawProperty) -> String {
    let mut line = property.name.clone();
    for param in &property.params {
        line.push(';');
        line.push_str(&param.name);
        if let Some(value) = &param.value {
            line.push('=');
            line.push_str(&quote_param_value(value));
        }
    }
    line.push(':');
    line.push_str(&property.value);
    line
}

/// Quote a parameter value when it contains characters that would
/// otherwise terminate the parameter.
fn quote_param_value(value: &str) -> String {
    let needs_quoting =
        value.chars().any(|c| matches!(c, ':' | ';' | ',')) && !value.starts_with('"');
    if needs_quoting {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Fold a content line at the octet limit, splitting only on UTF-8
/// boundaries; continuation lines start with a single space.
fn fold_line(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;
    while rest.len() > limit {
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n ");
        rest = &rest[cut..];
        limit = MAX_LINE_OCTETS - 1;
    }
    out.push_str(rest);
    out.push_str("\r\n");
}
