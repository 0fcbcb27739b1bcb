//! Template parsing and text normalization shared by query building and
//! proof matching.

use std::fmt;

use crate::constants::{NO_PREDICATE_SENTINEL, OBJECT_PLACEHOLDER, SUBJECT_PLACEHOLDER};

/// Placeholder slot in a pattern template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Subject,
    Object,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Subject => write!(f, "subject"),
            Slot::Object => write!(f, "object"),
        }
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart<'a> {
    Slot(Slot),
    Text(&'a str),
}

fn alias_slot(token: &str) -> Option<Slot> {
    match token {
        "X" => Some(Slot::Subject),
        "Y" => Some(Slot::Object),
        _ => None,
    }
}

/// Splits a template into slots and literal words.
///
/// Placeholders glued to text (`?D?'s`) are split off. A template without any
/// placeholder reads as `?D? <template> ?R?`. The sentinel yields no parts.
pub fn template_parts(template: &str) -> Vec<TemplatePart<'_>> {
    if template.trim() == NO_PREDICATE_SENTINEL {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for chunk in template.split_whitespace() {
        if let Some(slot) = alias_slot(chunk) {
            parts.push(TemplatePart::Slot(slot));
            continue;
        }

        let mut rest = chunk;
        while !rest.is_empty() {
            let next = [
                (rest.find(SUBJECT_PLACEHOLDER), Slot::Subject),
                (rest.find(OBJECT_PLACEHOLDER), Slot::Object),
            ]
            .into_iter()
            .filter_map(|(pos, slot)| pos.map(|p| (p, slot)))
            .min_by_key(|(pos, _)| *pos);

            match next {
                Some((pos, slot)) => {
                    if pos > 0 {
                        parts.push(TemplatePart::Text(&rest[..pos]));
                    }
                    parts.push(TemplatePart::Slot(slot));
                    // both placeholders are three bytes
                    rest = &rest[pos + SUBJECT_PLACEHOLDER.len()..];
                }
                None => {
                    parts.push(TemplatePart::Text(rest));
                    rest = "";
                }
            }
        }
    }

    if !parts.iter().any(|p| matches!(p, TemplatePart::Slot(_))) {
        parts.insert(0, TemplatePart::Slot(Slot::Subject));
        parts.push(TemplatePart::Slot(Slot::Object));
    }

    parts
}

fn is_possessive_suffix(text: &str) -> bool {
    text.starts_with("'s") || text.starts_with("\u{2019}s")
}

/// Substitutes labels into a template and cleans the result into a query.
pub fn render_query(template: &str, subject: &str, object: &str) -> String {
    let parts = template_parts(template);
    if parts.is_empty() {
        return clean_query(&format!("{} {}", subject, object));
    }

    let mut out = String::new();
    for part in parts {
        let text = match part {
            TemplatePart::Slot(Slot::Subject) => subject,
            TemplatePart::Slot(Slot::Object) => object,
            TemplatePart::Text(text) => text,
        };
        if !out.is_empty() && !is_possessive_suffix(text) {
            out.push(' ');
        }
        out.push_str(text);
    }

    clean_query(&out)
}

/// Drops commas and backticks, spells out `&` and collapses whitespace.
pub fn clean_query(query: &str) -> String {
    let replaced = query.replace([',', '`'], "").replace('&', " and ");
    collapse_whitespace(&replaced)
}

/// Predicate text of a template with placeholders and noise removed.
pub fn normalize_predicate(template: &str) -> String {
    let text = template_parts(template)
        .into_iter()
        .filter_map(|p| match p {
            TemplatePart::Text(t) => Some(t),
            TemplatePart::Slot(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ");

    let text = text.replace([',', '`'], "").replace(" 's", "'s");
    let text = collapse_whitespace(&text);
    let text = strip_stray_apostrophes(&text);
    collapse_whitespace(&text.replace('&', "and"))
}

/// Lowercased, whitespace-collapsed form used in cache keys.
pub fn normalize_query_key(query: &str) -> String {
    collapse_whitespace(&query.to_lowercase())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// An apostrophe not starting a possessive `'s` is removed with the character after it.
fn strip_stray_apostrophes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            match chars.peek() {
                Some('s') => out.push(c),
                Some(_) => {
                    chars.next();
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}
