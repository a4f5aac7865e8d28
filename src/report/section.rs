//! Marker-delimited report section.
//!
//! Lets the report live inside a hand-written document: only the text
//! between the two markers is ever replaced.

pub const START_MARKER: &str = "<!-- quota-trend:start -->";
pub const END_MARKER: &str = "<!-- quota-trend:end -->";

fn wrap(body: &str) -> String {
    let mut section = String::with_capacity(body.len() + START_MARKER.len() + END_MARKER.len() + 3);
    section.push_str(START_MARKER);
    section.push('\n');
    section.push_str(body);
    if !body.ends_with('\n') {
        section.push('\n');
    }
    section.push_str(END_MARKER);
    section.push('\n');
    section
}

/// Replace the marked section of `existing` with `body`, or append a new
/// section when the document has none.
pub fn splice(existing: Option<&str>, body: &str) -> String {
    let section = wrap(body);
    let Some(doc) = existing.filter(|d| !d.trim().is_empty()) else {
        return section;
    };

    if let Some(start) = doc.find(START_MARKER) {
        if let Some(end_rel) = doc[start..].find(END_MARKER) {
            let end = start + end_rel + END_MARKER.len();
            let rest = doc[end..].strip_prefix('\n').unwrap_or(&doc[end..]);
            return format!("{}{section}{rest}", &doc[..start]);
        }
    }

    let mut out = doc.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&section);
    out
}
