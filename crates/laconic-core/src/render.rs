//! Writing trees back out
//!
//! [`render`] produces Laconic text that parses back to the same names and
//! verbatim values. [`NodeSnapshot`] is a plain owned copy of a subtree for
//! serialization.

use serde::Serialize;

use crate::configuration::Configuration;
use crate::error::Result;
use crate::node::NodeRef;

const INDENT: &str = "  ";

/// Render a whole configuration as Laconic text
pub fn render(conf: &Configuration) -> String {
    conf.root().to_laconic()
}

/// Owned copy of a section and everything below it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSnapshot {
    pub name: String,
    pub value: Option<String>,
}

impl NodeSnapshot {
    /// Laconic text for the snapshot, with its values as captured
    pub fn to_laconic(&self) -> String {
        let mut out = String::new();
        write_snapshot(self, 0, &mut out);
        out
    }
}

impl<'a> NodeRef<'a> {
    /// Laconic text for this node; empty for a missing node
    pub fn to_laconic(&self) -> String {
        let mut out = String::new();
        if self.exists() {
            write_node(self, 0, &mut out);
        }
        out
    }

    /// Snapshot this section; values are expanded unless `verbatim`
    pub fn snapshot(&self, verbatim: bool) -> Result<NodeSnapshot> {
        let read = |node: &NodeRef<'_>| -> Result<Option<String>> {
            if verbatim {
                Ok(node.verbatim_value().map(str::to_string))
            } else {
                node.value()
            }
        };

        let attributes = self
            .attributes()
            .map(|attr| {
                Ok(AttributeSnapshot {
                    name: attr.name().to_string(),
                    value: read(&attr)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let children = self
            .children()
            .map(|child| child.snapshot(verbatim))
            .collect::<Result<Vec<_>>>()?;

        Ok(NodeSnapshot {
            name: self.name().to_string(),
            value: read(self)?,
            attributes,
            children,
        })
    }
}

fn write_node(node: &NodeRef<'_>, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    out.push_str(&pad);
    out.push_str(&quote(node.name()));

    if node.is_attribute() {
        out.push('=');
        out.push_str(&quote(node.verbatim_value().unwrap_or("")));
        out.push('\n');
        return;
    }

    if let Some(value) = node.verbatim_value() {
        out.push('=');
        out.push_str(&quote(value));
    }
    out.push('\n');
    out.push_str(&pad);
    out.push_str("{\n");
    for attr in node.attributes() {
        write_node(&attr, depth + 1, out);
    }
    for child in node.children() {
        write_node(&child, depth + 1, out);
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

fn write_snapshot(node: &NodeSnapshot, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    out.push_str(&pad);
    out.push_str(&quote(&node.name));
    if let Some(value) = &node.value {
        out.push('=');
        out.push_str(&quote(value));
    }
    out.push('\n');
    out.push_str(&pad);
    out.push_str("{\n");
    for attr in &node.attributes {
        out.push_str(&pad);
        out.push_str(INDENT);
        out.push_str(&quote(&attr.name));
        out.push('=');
        out.push_str(&quote(attr.value.as_deref().unwrap_or("")));
        out.push('\n');
    }
    for child in &node.children {
        write_snapshot(child, depth + 1, out);
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

/// Text lexes back as one identifier with the same content
fn is_plain(text: &str) -> bool {
    !text.is_empty()
        && text != "null"
        && !text.starts_with('#')
        && !text.contains("//")
        && !text.contains("/*")
        && !text.contains("|*")
        && !text.contains("$\"")
        && !text.contains("$'")
        && !text
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "{}=\"'".contains(c))
}

/// Write a name or value so that it lexes back to itself
pub(crate) fn quote(text: &str) -> String {
    if is_plain(text) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
