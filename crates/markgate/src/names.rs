//! Conversion between hyphenated CSS property names and the camelCase
//! form the allowlist stores.

/// Convert a hyphenated CSS property name to its camelCase allowlist form.
///
/// Empty segments from repeated hyphens are dropped. A second segment of
/// exactly `ms` stays lower-case so the historical `-ms-` vendor prefix
/// keeps its conventional spelling. Names that start with a hyphen keep a
/// single leading hyphen so vendor-prefixed entries remain distinguishable
/// in the allowlist.
pub fn to_normalized(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.starts_with('-') {
        out.push('-');
    }
    let mut emitted = false;
    for (i, segment) in name.split('-').enumerate() {
        if segment.is_empty() {
            continue;
        }
        if !emitted || (i == 1 && segment == "ms") {
            out.push_str(segment);
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        emitted = true;
    }
    out
}

/// Inverse of [`to_normalized`]: insert a hyphen before every uppercase
/// letter and lower-case the result.
pub fn to_hyphenated(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
