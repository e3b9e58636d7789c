//! Declaration-level policy for inline styles and embedded stylesheets.
//!
//! Both paths funnel into the same per-declaration check: the forbidden
//! `position: fixed` rule fires before the allowlist test, so it rejects
//! even though `position` itself is an allowed property.

use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use tracing::info;

use crate::diagnostics::diagnostics_enabled;
use crate::error::{GateError, Result};
use crate::names;
use crate::policy::Policy;

/// One `property: value` pair, both trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// Validate the raw value of a `style` attribute.
///
/// Candidate declarations are split on `;` with empty segments dropped
/// (trailing separators are common), then each is split on the first `:`.
/// The first failing declaration aborts the whole check.
pub fn check_inline_style(policy: &Policy, raw: &str) -> Result<()> {
    check_declaration_block(policy, raw)
}

/// Validate the text content of a `<style>` element.
///
/// Three stages: the external CSS validator, an independent brace-balance
/// count, then a rule-by-rule walk applying the declaration policy in
/// document order. The first failing declaration anywhere aborts.
pub fn check_stylesheet(policy: &Policy, css: &str) -> Result<()> {
    if let Err(err) = StyleSheet::parse(css, ParserOptions::default()) {
        return Err(GateError::InvalidCss(err.kind.to_string()));
    }
    let open = css.matches('{').count();
    let close = css.matches('}').count();
    if open != close {
        return Err(GateError::UnbalancedBraces { open, close });
    }
    let rules = split_rules(css);
    if diagnostics_enabled("css") {
        info!(rules = rules.len(), "diagnostics: embedded stylesheet rules");
    }
    for (_selector, body) in rules {
        check_declaration_block(policy, &body)?;
    }
    Ok(())
}

fn check_declaration_block(policy: &Policy, source: &str) -> Result<()> {
    for segment in source.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        // A segment with no separator names nothing recognizable; reject it
        // rather than skip it.
        let Some((property, value)) = segment.split_once(':') else {
            return Err(GateError::DisallowedCssProperty(segment.to_string()));
        };
        let declaration = Declaration {
            property: property.trim().to_string(),
            value: value.trim().to_string(),
        };
        check_declaration(policy, &declaration)?;
    }
    Ok(())
}

fn check_declaration(policy: &Policy, declaration: &Declaration) -> Result<()> {
    let normalized = names::to_normalized(&declaration.property);
    if normalized == "position" && declaration.value == "fixed" {
        return Err(GateError::ForbiddenValue {
            property: declaration.property.clone(),
            value: declaration.value.clone(),
        });
    }
    if !policy.allows_css_property(&normalized) {
        return Err(GateError::DisallowedCssProperty(declaration.property.clone()));
    }
    Ok(())
}

// Minimal CSS block splitter: yields (selectors, body) in source order.
fn split_rules(css: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let source = flatten_block_at_rules(&strip_css_comments(css));
    for raw in source.split('}') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((selector, body)) = trimmed.split_once('{') {
            let selector = selector.trim();
            let body = body.trim();
            if !selector.is_empty() && !body.is_empty() {
                out.push((selector.to_string(), body.to_string()));
            }
        }
    }
    out
}

fn strip_css_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_comment = false;
    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '*' {
                if let Some('/') = chars.peek().copied() {
                    chars.next();
                    in_comment = false;
                }
            }
        } else {
            if ch == '/' {
                if let Some('*') = chars.peek().copied() {
                    chars.next();
                    in_comment = true;
                    continue;
                }
            }
            out.push(ch);
        }
    }
    out
}

// Unwrap at-rules that nest further rules (@media, @supports) so the inner
// rules still get walked, keep at-rules whose body is a declaration list
// (@page, @font-face, @property) as ordinary rules so their declarations
// flow through the policy, and drop statement at-rules (@import, @charset)
// through the ';'. Declarations are never skipped, only rule wrappers.
fn flatten_block_at_rules(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut wrappers: Vec<bool> = Vec::new();
    let mut copied = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'@' => {
                out.push_str(&source[copied..i]);
                let mut j = i;
                while j < bytes.len() && bytes[j] != b'{' && bytes[j] != b';' {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'{' {
                    if block_has_nested_rules(bytes, j + 1) {
                        // Drop the prelude and its braces; inner rules stand
                        // on their own.
                        wrappers.push(true);
                    } else {
                        // Declaration-bodied at-rule: the prelude doubles as
                        // the selector.
                        out.push_str(&source[i..=j]);
                        wrappers.push(false);
                    }
                }
                i = (j + 1).min(bytes.len());
                copied = i;
            }
            b'{' => {
                wrappers.push(false);
                i += 1;
            }
            b'}' => {
                if wrappers.pop() == Some(true) {
                    out.push_str(&source[copied..i]);
                    copied = i + 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[copied..]);
    out
}

// Does the block starting after a '{' open another block before it closes?
fn block_has_nested_rules(bytes: &[u8], mut i: usize) -> bool {
    while i < bytes.len() {
        match bytes[i] {
            b'{' => return true,
            b'}' => return false,
            _ => {}
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_allows_listed_properties() {
        let policy = Policy::default();
        assert!(check_inline_style(&policy, "color: red; padding: 4px;").is_ok());
    }

    #[test]
    fn inline_rejects_unlisted_property() {
        let policy = Policy::default();
        assert_eq!(
            check_inline_style(&policy, "color: red; cursor: pointer"),
            Err(GateError::DisallowedCssProperty("cursor".to_string()))
        );
    }

    #[test]
    fn position_fixed_is_forbidden_before_the_allowlist_test() {
        let policy = Policy::default();
        // `position` is allowlisted, so only the forbidden-value rule can
        // reject this.
        assert!(policy.allows_css_property("position"));
        assert_eq!(
            check_inline_style(&policy, "position: fixed"),
            Err(GateError::ForbiddenValue {
                property: "position".to_string(),
                value: "fixed".to_string(),
            })
        );
        assert!(check_inline_style(&policy, "position: absolute").is_ok());
    }

    #[test]
    fn declaration_without_separator_is_rejected() {
        let policy = Policy::default();
        assert_eq!(
            check_inline_style(&policy, "color red"),
            Err(GateError::DisallowedCssProperty("color red".to_string()))
        );
    }

    #[test]
    fn trailing_separator_is_tolerated() {
        let policy = Policy::default();
        assert!(check_inline_style(&policy, "color:red;;").is_ok());
        assert!(check_inline_style(&policy, "").is_ok());
    }

    #[test]
    fn hyphenated_properties_normalize_before_lookup() {
        let policy = Policy::default();
        assert!(check_inline_style(&policy, "background-color: blue").is_ok());
        assert!(check_inline_style(&policy, "z-index: 3").is_ok());
    }

    #[test]
    fn stylesheet_rejects_forbidden_declaration_in_any_rule() {
        let policy = Policy::default();
        assert_eq!(
            check_stylesheet(&policy, "p{color:red} div{position:fixed}"),
            Err(GateError::ForbiddenValue {
                property: "position".to_string(),
                value: "fixed".to_string(),
            })
        );
    }

    #[test]
    fn stylesheet_accepts_allowed_rules() {
        let policy = Policy::default();
        assert!(check_stylesheet(&policy, "div{color:red}").is_ok());
        assert!(check_stylesheet(&policy, "/* note */ p { padding: 2px 4px; }").is_ok());
    }

    #[test]
    fn stylesheet_inside_media_block_is_still_walked() {
        let policy = Policy::default();
        assert_eq!(
            check_stylesheet(
                &policy,
                "@media screen and (min-width: 100px) { div { position: fixed } }"
            ),
            Err(GateError::ForbiddenValue {
                property: "position".to_string(),
                value: "fixed".to_string(),
            })
        );
    }

    #[test]
    fn declaration_bodied_at_rules_are_still_walked() {
        let policy = Policy::default();
        assert_eq!(
            check_stylesheet(&policy, "@page { position: fixed }"),
            Err(GateError::ForbiddenValue {
                property: "position".to_string(),
                value: "fixed".to_string(),
            })
        );
        assert_eq!(
            check_stylesheet(&policy, "@page { cursor: pointer }"),
            Err(GateError::DisallowedCssProperty("cursor".to_string()))
        );
    }

    #[test]
    fn font_face_declarations_go_through_the_allowlist() {
        let policy = Policy::default();
        assert!(check_stylesheet(&policy, "@font-face { font-family: serif }").is_ok());
        assert_eq!(
            check_stylesheet(&policy, "@font-face { font-family: x; src: url(a.woff2) }"),
            Err(GateError::DisallowedCssProperty("src".to_string()))
        );
    }

    #[test]
    fn at_rule_nested_inside_media_is_still_walked() {
        let policy = Policy::default();
        assert_eq!(
            check_stylesheet(&policy, "@media print { @page { position: fixed } }"),
            Err(GateError::ForbiddenValue {
                property: "position".to_string(),
                value: "fixed".to_string(),
            })
        );
    }

    #[test]
    fn unbalanced_braces_are_rejected_independently() {
        let policy = Policy::default();
        assert!(matches!(
            check_stylesheet(&policy, "div{color:red"),
            Err(GateError::InvalidCss(_) | GateError::UnbalancedBraces { .. })
        ));
    }

    #[test]
    fn invalid_css_is_rejected_by_the_validator() {
        let policy = Policy::default();
        assert!(matches!(
            check_stylesheet(&policy, "div { color }"),
            Err(GateError::InvalidCss(_))
        ));
    }
}
