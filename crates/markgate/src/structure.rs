//! Structural well-formedness checks that gate the policy walk.
//!
//! Two independent checks, both required: a manual open/close tag count
//! and a pass through the error-tolerant HTML parser. The count heuristic
//! catches unclosed tags the parser silently auto-closes; the parser
//! catches mis-nesting and tokenizer-level garbage the count misses.

use scraper::Html;

use crate::error::{GateError, Result};

/// Elements with no closing tag; their openings are excluded from the
/// open count. Other self-closing elements are only caught by the parser
/// pass.
pub(crate) const VOID_TAGS: &[&str] = &["img", "br", "hr"];

/// Reject markup that fails either structural check. The count heuristic
/// runs first so unclosed-tag inputs report `MismatchedTags` regardless
/// of how the parser treats end-of-input recovery.
pub fn validate_structure(markup: &str) -> Result<()> {
    let (opened, closed) = count_tags(markup);
    if opened != closed {
        return Err(GateError::MismatchedTags { opened, closed });
    }
    let parsed = Html::parse_fragment(markup);
    if let Some(err) = parsed.errors.first() {
        return Err(GateError::MalformedMarkup(err.to_string()));
    }
    Ok(())
}

/// Count tag-opening and tag-closing sequences in the raw text, skipping
/// openings of void elements.
fn count_tags(markup: &str) -> (usize, usize) {
    let bytes = markup.as_bytes();
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        let closing = j < bytes.len() && bytes[j] == b'/';
        if closing {
            j += 1;
        }
        let name_start = j;
        while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if j == name_start || !bytes[name_start].is_ascii_alphabetic() {
            // Not a tag: comment, text "<", or stray punctuation.
            i += 1;
            continue;
        }
        let name = markup[name_start..j].to_ascii_lowercase();
        if closing {
            closed += 1;
        } else if !VOID_TAGS.contains(&name.as_str()) {
            opened += 1;
        }
        i = j;
    }
    (opened, closed)
}
