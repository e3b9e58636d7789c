//! Pre-render trust gate for attacker-supplied markup.
//!
//! Decides whether HTML (with inline and embedded CSS) is safe to hand to
//! a downstream renderer by rejecting anything not explicitly permitted:
//! allowlisted tags, attributes and CSS properties, balanced structure, a
//! forbidden `position: fixed` rule and a scheme restriction on `href`.
//! It rejects; it never repairs or strips.

pub mod builder;
mod diagnostics;
pub mod error;
pub mod names;
pub mod policy;
pub mod structure;
pub mod style;

pub use builder::{Checker, SafeChild, SafeDocument, SafeNode};
pub use error::{GateError, Result};
pub use policy::Policy;

/// Check markup against the stock policy.
pub fn check(markup: &str) -> Result<SafeDocument> {
    Checker::default().check(markup)
}
