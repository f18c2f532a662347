//! Minimal iCalendar (RFC 5545) reader.
//!
//! Turns feed text into a keyed map of top-level components. Only the
//! structure is checked here: a document that is not a balanced
//! `VCALENDAR` fails as a whole, while odd properties inside a component
//! are kept verbatim and left for the adapter to judge.

use super::models::{RawComponent, RawProperty};
use crate::error::{decode_error, BoardResult};
use std::collections::BTreeMap;
use tracing::debug;

/// Decode a feed into its top-level components keyed by UID
pub fn decode_calendar(input: &str) -> BoardResult<BTreeMap<String, RawComponent>> {
    let lines = unfold_lines(input);
    if lines.is_empty() {
        return Err(decode_error("empty calendar feed"));
    }

    let mut stack: Vec<RawComponent> = Vec::new();
    let mut root: Option<RawComponent> = None;

    for (line_num, line) in lines.iter().enumerate() {
        let Some(prop) = parse_content_line(line) else {
            debug!("Skipping unparsable content line {}", line_num + 1);
            continue;
        };

        match prop.name.as_str() {
            "BEGIN" => {
                if stack.is_empty() && root.is_some() {
                    return Err(decode_error("content after END:VCALENDAR"));
                }
                stack.push(RawComponent::new(prop.value.trim()));
            }
            "END" => {
                let component = stack.pop().ok_or_else(|| {
                    decode_error(&format!("unexpected END:{} at line {}", prop.value, line_num + 1))
                })?;
                if !component.kind.eq_ignore_ascii_case(prop.value.trim()) {
                    return Err(decode_error(&format!(
                        "END:{} does not close BEGIN:{}",
                        prop.value, component.kind
                    )));
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(component),
                    None => root = Some(component),
                }
            }
            _ => match stack.last_mut() {
                Some(current) => current.properties.push(prop),
                None => return Err(decode_error("property outside of any component")),
            },
        }
    }

    if let Some(open) = stack.last() {
        return Err(decode_error(&format!("missing END:{}", open.kind)));
    }

    let root = root.ok_or_else(|| decode_error("missing BEGIN:VCALENDAR"))?;
    if root.kind != "VCALENDAR" {
        return Err(decode_error(&format!("root component is {}, expected VCALENDAR", root.kind)));
    }

    let mut components = BTreeMap::new();
    for (index, component) in root.children.into_iter().enumerate() {
        let base = component
            .property("UID")
            .map(|uid| uid.value.clone())
            .unwrap_or_else(|| format!("{}-{}", component.kind, index));

        let mut key = base.clone();
        let mut suffix = 1;
        while components.contains_key(&key) {
            key = format!("{}#{}", base, suffix);
            suffix += 1;
        }
        components.insert(key, component);
    }

    debug!("Decoded {} calendar components", components.len());
    Ok(components)
}

/// Split into logical lines, joining folded continuations
fn unfold_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !raw.trim().is_empty() {
            lines.push(raw.to_string());
        }
    }
    lines
}

/// Parse `NAME;PARAM=VALUE;PARAM="QUOTED":VALUE`
fn parse_content_line(line: &str) -> Option<RawProperty> {
    let mut in_quotes = false;
    let mut colon = None;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                colon = Some(idx);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut parts = split_unquoted(head, ';').into_iter();
    let name = parts.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }

    let params = parts
        .filter_map(|param| {
            let (key, val) = param.split_once('=')?;
            Some((key.trim().to_ascii_uppercase(), val.trim_matches('"').to_string()))
        })
        .collect();

    Some(RawProperty {
        name,
        params,
        value: value.to_string(),
    })
}

fn split_unquoted(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            parts.push(&input[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Undo TEXT escaping (`\,` `\;` `\n` `\\`)
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
