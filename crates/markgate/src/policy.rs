//! Allowlist configuration for the trust gate.
//!
//! A [`Policy`] holds the four allowlists as an immutable value injected
//! into the checker at construction. [`Policy::default`] carries the
//! stock tables; deployments that need a different surface build their
//! own with [`Policy::new`].

use std::collections::{HashMap, HashSet};

use crate::error::{GateError, Result};

/// Tags permitted to appear in checked markup. Matched case-insensitively.
const DEFAULT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "div", "img", "span", "strong", "a", "style", "p", "ul",
    "li", "ol", "table", "thead", "tbody", "tr", "td", "th", "blockquote", "pre", "br",
];

/// Attribute names permitted on any allowed tag. Matched case-sensitively.
const DEFAULT_ATTRIBUTES: &[&str] = &["href", "src", "color", "style", "class"];

/// CSS properties permitted in style attributes and embedded stylesheets,
/// stored in normalized camelCase form. Vendor-prefixed entries keep a
/// single leading hyphen.
const DEFAULT_CSS_PROPERTIES: &[&str] = &[
    "display",
    "position",
    "inset",
    "backgroundColor",
    "backgroundImage",
    "backgroundRepeat",
    "backgroundSize",
    "backgroundPosition",
    "color",
    "top",
    "bottom",
    "left",
    "right",
    "width",
    "height",
    "minHeight",
    "minWidth",
    "maxHeight",
    "maxWidth",
    "border",
    "borderRadius",
    "boxShadow",
    "textShadow",
    "overflow",
    "textOverflow",
    "overflowWrap",
    "transition",
    "transform",
    "textDecoration",
    "padding",
    "paddingTop",
    "paddingBottom",
    "paddingLeft",
    "paddingRight",
    "margin",
    "marginTop",
    "marginBottom",
    "marginLeft",
    "marginRight",
    "flex",
    "flexShrink",
    "flexDirection",
    "gap",
    "flexGrow",
    "justifyContent",
    "justifyItems",
    "justifySelf",
    "alignItems",
    "alignContent",
    "alignSelf",
    "whiteSpace",
    "fontFamily",
    "fontSize",
    "fontWeight",
    "zIndex",
    "textAlign",
    "borderColor",
    "verticalAlign",
    "lineHeight",
    "backdropFilter",
    "backgroundClip",
    "-webkitBackgroundClip",
    "-webkitTextFillColor",
    "-msOverflowStyle",
];

/// URI scheme prefixes an `href` value may start with.
const DEFAULT_HREF_SCHEMES: &[&str] = &["http://", "https://"];

/// A per-attribute value validator. Rules are keyed by attribute name so
/// new ones can be added without branching inside the tree walk.
pub type AttributeValueRule = fn(&Policy, &str) -> Result<()>;

/// The four allowlists plus per-attribute value rules. Immutable once
/// handed to a checker; shared freely across concurrent checks.
#[derive(Clone)]
pub struct Policy {
    allowed_tags: HashSet<String>,
    allowed_attributes: HashSet<String>,
    allowed_css_properties: HashSet<String>,
    allowed_href_schemes: Vec<String>,
    value_rules: HashMap<String, AttributeValueRule>,
}

impl Policy {
    /// Build a policy from explicit tables. CSS property names are expected
    /// in their normalized camelCase form. The `href` scheme rule is always
    /// installed; callers can add more with [`Policy::set_value_rule`].
    pub fn new(
        tags: &[&str],
        attributes: &[&str],
        css_properties: &[&str],
        href_schemes: &[&str],
    ) -> Self {
        let mut value_rules: HashMap<String, AttributeValueRule> = HashMap::new();
        value_rules.insert("href".to_string(), check_href_scheme);
        Self {
            allowed_tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            allowed_attributes: attributes.iter().map(|a| a.to_string()).collect(),
            allowed_css_properties: css_properties.iter().map(|p| p.to_string()).collect(),
            allowed_href_schemes: href_schemes.iter().map(|s| s.to_string()).collect(),
            value_rules,
        }
    }

    /// Install or replace the value rule for one attribute.
    pub fn set_value_rule(&mut self, attribute: &str, rule: AttributeValueRule) {
        self.value_rules.insert(attribute.to_string(), rule);
    }

    /// Tag lookup, case-insensitive.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Attribute-name lookup, case-sensitive.
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.allowed_attributes.contains(name)
    }

    /// Lookup of a normalized (camelCase) CSS property name.
    pub fn allows_css_property(&self, normalized: &str) -> bool {
        self.allowed_css_properties.contains(normalized)
    }

    /// Scheme prefixes accepted for `href` values.
    pub fn href_schemes(&self) -> &[String] {
        &self.allowed_href_schemes
    }

    /// Run the value rule registered for `name`, if any. Attributes with no
    /// registered rule accept any value.
    pub fn check_attribute_value(&self, name: &str, value: &str) -> Result<()> {
        match self.value_rules.get(name) {
            Some(rule) => rule(self, value),
            None => Ok(()),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TAGS,
            DEFAULT_ATTRIBUTES,
            DEFAULT_CSS_PROPERTIES,
            DEFAULT_HREF_SCHEMES,
        )
    }
}

/// `href` values must literally start with one of the allowed scheme
/// prefixes; relative links and other schemes are rejected.
fn check_href_scheme(policy: &Policy, value: &str) -> Result<()> {
    if policy
        .allowed_href_schemes
        .iter()
        .any(|scheme| value.starts_with(scheme.as_str()))
    {
        Ok(())
    } else {
        Err(GateError::DisallowedScheme(value.to_string()))
    }
}
