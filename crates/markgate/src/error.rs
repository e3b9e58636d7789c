//! Error types for the markup trust gate.

use thiserror::Error;

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

/// Every way a piece of markup can be rejected.
///
/// The first violation encountered in document order is the only one
/// reported; a failed check never carries partial output. Callers must
/// treat any variant as "unsafe to render".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The HTML parser reported an error while consuming the input.
    #[error("markup failed to parse: {0}")]
    MalformedMarkup(String),

    /// Open and close tag counts do not balance after discounting void elements.
    #[error("mismatched tags: {opened} opened, {closed} closed")]
    MismatchedTags { opened: usize, closed: usize },

    /// The tag is not in the allowed-tags set.
    #[error("{0} tag is not allowed")]
    DisallowedTag(String),

    /// An attribute name is not in the allowed-attributes set.
    #[error("{0} attribute is not allowed")]
    DisallowedAttribute(String),

    /// A CSS property is not in the allowed-properties set.
    #[error("{0} property is not allowed")]
    DisallowedCssProperty(String),

    /// A property carries a value that is forbidden outright.
    #[error("{value} value is not allowed for {property}")]
    ForbiddenValue { property: String, value: String },

    /// An attribute value uses a URI scheme outside the allowed set.
    #[error("{0} does not start with an allowed scheme")]
    DisallowedScheme(String),

    /// The CSS validator rejected an embedded stylesheet.
    #[error("embedded stylesheet failed to parse: {0}")]
    InvalidCss(String),

    /// Brace counts in an embedded stylesheet do not balance.
    #[error("unbalanced braces in stylesheet: {open} opening, {close} closing")]
    UnbalancedBraces { open: usize, close: usize },
}
