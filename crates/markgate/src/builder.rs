//! The tree builder: drives the policy walk over parsed markup.
//!
//! Structural validation gates the whole walk. Per element, tag and
//! attribute names are checked first, then attribute values and inline
//! styles; a `<style>` element hands its text content to the stylesheet
//! policy instead of treating it as ordinary children. The walk halts at
//! the first violation anywhere; there is no partial output and nothing
//! is ever stripped.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::Path;

use anyhow::Context;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::diagnostics_enabled;
use crate::error::{GateError, Result};
use crate::policy::Policy;
use crate::structure::{VOID_TAGS, validate_structure};
use crate::style::{check_inline_style, check_stylesheet};

/// A validated markup fragment: the input, unchanged, in tree form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeDocument {
    pub children: Vec<SafeChild>,
}

/// One validated element: tag, attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<SafeChild>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeChild {
    Element(SafeNode),
    Text(String),
}

impl SafeDocument {
    /// Re-serialize the validated tree to markup. Void elements are
    /// written without a close tag; `<style>` content is written raw.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_child(&mut out, child, false);
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The trust gate. Owns an immutable [`Policy`]; each check is a pure
/// function of its input, so one checker may serve concurrent callers.
#[derive(Clone, Default)]
pub struct Checker {
    policy: Policy,
}

impl Checker {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Decide whether `markup` is safe to render, returning the validated
    /// tree on success or the first violation encountered in document
    /// order.
    pub fn check(&self, markup: &str) -> Result<SafeDocument> {
        validate_structure(markup)?;
        let parsed = Html::parse_fragment(markup);
        let mut children = Vec::new();
        for child in fragment_root(&parsed).children() {
            if let Some(converted) = self.convert(child)? {
                children.push(converted);
            }
        }
        Ok(SafeDocument { children })
    }

    /// [`Checker::check`], re-serialized to a safe markup string.
    pub fn check_to_string(&self, markup: &str) -> Result<String> {
        Ok(self.check(markup)?.to_markup())
    }

    /// Read markup from disk and check it.
    pub fn check_file(&self, path: &Path) -> anyhow::Result<SafeDocument> {
        let markup = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read markup file '{}'", path.display()))?;
        Ok(self.check(&markup)?)
    }

    fn convert(&self, node: NodeRef<'_, Node>) -> Result<Option<SafeChild>> {
        match node.value() {
            Node::Text(text) => Ok(Some(SafeChild::Text(text.deref().to_string()))),
            Node::Element(el) => {
                let tag = el.name().to_string();
                if !self.policy.allows_tag(&tag) {
                    if diagnostics_enabled("html") {
                        info!(tag = %tag, "diagnostics: rejected tag");
                    }
                    return Err(GateError::DisallowedTag(tag));
                }
                // Names first, then values: a disallowed name wins over a
                // bad value on the same element.
                for (name, _) in el.attrs() {
                    if !self.policy.allows_attribute(name) {
                        if diagnostics_enabled("html") {
                            info!(tag = %tag, attribute = %name, "diagnostics: rejected attribute");
                        }
                        return Err(GateError::DisallowedAttribute(name.to_string()));
                    }
                }
                let mut attributes = BTreeMap::new();
                for (name, value) in el.attrs() {
                    self.policy.check_attribute_value(name, value)?;
                    if name == "style" {
                        check_inline_style(&self.policy, value)?;
                    }
                    attributes.insert(name.to_string(), value.to_string());
                }
                let mut children = Vec::new();
                if tag.eq_ignore_ascii_case("style") {
                    let css = collect_text(&node);
                    check_stylesheet(&self.policy, &css)?;
                    if !css.is_empty() {
                        children.push(SafeChild::Text(css));
                    }
                } else {
                    for child in node.children() {
                        if let Some(converted) = self.convert(child)? {
                            children.push(converted);
                        }
                    }
                }
                Ok(Some(SafeChild::Element(SafeNode {
                    tag,
                    attributes,
                    children,
                })))
            }
            // Comments, doctypes and processing instructions carry nothing
            // renderable.
            _ => Ok(None),
        }
    }
}

/// Fragment parsing wraps content in a synthetic `<html>` element; walk
/// its children rather than the wrapper itself.
fn fragment_root<'a>(parsed: &'a Html) -> NodeRef<'a, Node> {
    let root = parsed.tree.root();
    root.children()
        .find(|child| matches!(child.value(), Node::Element(el) if el.name() == "html"))
        .unwrap_or(root)
}

fn collect_text(node: &NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => text.deref().to_string(),
        _ => {
            let mut content = String::new();
            for child in node.children() {
                content.push_str(&collect_text(&child));
            }
            content
        }
    }
}

fn write_child(out: &mut String, child: &SafeChild, raw_text: bool) {
    match child {
        SafeChild::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        SafeChild::Element(node) => {
            out.push('<');
            out.push_str(&node.tag);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            let tag = node.tag.to_ascii_lowercase();
            if VOID_TAGS.contains(&tag.as_str()) && node.children.is_empty() {
                return;
            }
            let raw = tag == "style";
            for c in &node.children {
                write_child(out, c, raw);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}
