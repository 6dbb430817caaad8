//! Node handles and views
//!
//! The tree holds two node kinds: sections, which own ordered child sections
//! and ordered attributes, and attributes, which are leaves. Both carry a name
//! and an optional verbatim value.
//!
//! [`NodeRef`] is a read view bound to a configuration, [`NodeMut`] a write
//! view. Lookups that find nothing return one of the two sentinel handles
//! ([`NodeHandle::EmptySection`] / [`NodeHandle::EmptyAttribute`]) instead of
//! failing, so chains like `conf.root().get_child("a").attr_by_name("b")`
//! never need intermediate checks.

use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::expansion::ResolutionStack;

/// Arena slot index plus the generation of the node stored there
///
/// Slots are reused once freed; an id from an earlier generation no longer
/// resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

/// Copyable reference to a node (or a sentinel) inside a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeHandle {
    /// A section stored in the arena
    Section(NodeId),
    /// An attribute stored in the arena
    Attribute(NodeId),
    /// Non-existent section sentinel
    EmptySection,
    /// Non-existent attribute sentinel
    EmptyAttribute,
}

impl NodeHandle {
    /// Whether the handle names a section (sentinel included)
    pub fn is_section(self) -> bool {
        matches!(self, NodeHandle::Section(_) | NodeHandle::EmptySection)
    }

    /// Whether the handle names an attribute (sentinel included)
    pub fn is_attribute(self) -> bool {
        !self.is_section()
    }

    /// Whether the handle is one of the sentinels
    pub fn is_sentinel(self) -> bool {
        matches!(self, NodeHandle::EmptySection | NodeHandle::EmptyAttribute)
    }

    pub(crate) fn id(self) -> Option<NodeId> {
        match self {
            NodeHandle::Section(id) | NodeHandle::Attribute(id) => Some(id),
            NodeHandle::EmptySection | NodeHandle::EmptyAttribute => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeBody {
    Section {
        children: Vec<NodeId>,
        attributes: Vec<NodeId>,
    },
    Attribute,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) modified: bool,
    pub(crate) body: NodeBody,
}

impl NodeData {
    pub(crate) fn section(name: &str, value: Option<&str>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.trim().to_string(),
            value: value.map(str::to_string),
            parent,
            modified: false,
            body: NodeBody::Section {
                children: Vec::new(),
                attributes: Vec::new(),
            },
        }
    }

    pub(crate) fn attribute(name: &str, value: Option<&str>, parent: NodeId) -> Self {
        Self {
            name: name.trim().to_string(),
            value: value.map(str::to_string),
            parent: Some(parent),
            modified: false,
            body: NodeBody::Attribute,
        }
    }
}

/// Case-insensitive comparison used for name lookups and queries
pub(crate) fn equals_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Read view of a node
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) conf: &'a Configuration,
    pub(crate) handle: NodeHandle,
    pub(crate) verbatim: bool,
    /// Resolution stack of the expansion that handed out this view
    pub(crate) stack: Option<&'a ResolutionStack>,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("handle", &self.handle)
            .field("name", &self.name())
            .field("value", &self.verbatim_value())
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(conf: &'a Configuration, handle: NodeHandle) -> Self {
        Self {
            conf,
            handle,
            verbatim: false,
            stack: None,
        }
    }

    pub(crate) fn with_handle(&self, handle: NodeHandle) -> Self {
        Self { handle, ..*self }
    }

    /// The same view, reading values through an expansion already in progress
    pub(crate) fn with_stack<'s>(&self, stack: &'s ResolutionStack) -> NodeRef<'s>
    where
        'a: 's,
    {
        NodeRef {
            conf: self.conf,
            handle: self.handle,
            verbatim: self.verbatim,
            stack: Some(stack),
        }
    }

    pub(crate) fn data(&self) -> Option<&'a NodeData> {
        self.handle.id().and_then(|id| self.conf.data(id))
    }

    /// The handle this view wraps
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// The owning configuration
    pub fn configuration(&self) -> &'a Configuration {
        self.conf
    }

    /// Whether the node is live in the tree
    pub fn exists(&self) -> bool {
        self.data().is_some()
    }

    pub fn is_section(&self) -> bool {
        self.handle.is_section()
    }

    pub fn is_attribute(&self) -> bool {
        self.handle.is_attribute()
    }

    /// Node name; empty for sentinels
    pub fn name(&self) -> &'a str {
        self.data().map(|d| d.name.as_str()).unwrap_or("")
    }

    /// Raw value as written, before any variable expansion
    pub fn verbatim_value(&self) -> Option<&'a str> {
        self.data().and_then(|d| d.value.as_deref())
    }

    /// Whether the node changed since the last reset
    pub fn modified(&self) -> bool {
        self.data().is_some_and(|d| d.modified)
    }

    /// A view whose typed accessors read the verbatim value
    pub fn verbatim(self) -> Self {
        Self {
            verbatim: true,
            ..self
        }
    }

    /// Whether typed accessors skip variable expansion
    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// Parent section, or the empty section
    pub fn parent(&self) -> NodeRef<'a> {
        let handle = self
            .data()
            .and_then(|d| d.parent)
            .filter(|pid| self.conf.data(*pid).is_some())
            .map(NodeHandle::Section)
            .unwrap_or(NodeHandle::EmptySection);
        self.with_handle(handle)
    }

    /// True when there is no live parent
    pub fn is_root(&self) -> bool {
        !self.parent().exists()
    }

    /// Topmost section above this node
    pub fn root(&self) -> NodeRef<'a> {
        let mut node = *self;
        while node.parent().exists() {
            node = node.parent();
        }
        if node.is_section() {
            node
        } else {
            self.conf.root()
        }
    }

    /// Slash-separated path from the root
    ///
    /// The root is `/`, attributes are prefixed with `$` and repeated sibling
    /// names carry a zero-based `[i]` suffix.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut node = *self;
        while node.exists() {
            let parent = node.parent();
            if !parent.exists() {
                break;
            }
            segments.push(node.path_segment(&parent));
            node = parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn path_segment(&self, parent: &NodeRef<'a>) -> String {
        let mut segment = String::new();
        if self.is_attribute() {
            segment.push('$');
        }
        segment.push_str(self.name());

        let siblings = if self.is_attribute() {
            parent.attribute_ids()
        } else {
            parent.child_ids()
        };
        let same_name: Vec<NodeId> = siblings
            .iter()
            .copied()
            .filter(|id| {
                self.conf
                    .data(*id)
                    .is_some_and(|d| equals_ignore_case(&d.name, self.name()))
            })
            .collect();
        if same_name.len() > 1 {
            if let Some(pos) = same_name.iter().position(|id| Some(*id) == self.handle.id()) {
                segment.push_str(&format!("[{}]", pos));
            }
        }
        segment
    }

    fn child_ids(&self) -> &'a [NodeId] {
        match self.data().map(|d| &d.body) {
            Some(NodeBody::Section { children, .. }) => children,
            _ => &[],
        }
    }

    fn attribute_ids(&self) -> &'a [NodeId] {
        match self.data().map(|d| &d.body) {
            Some(NodeBody::Section { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Child sections in insertion order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let this = *self;
        self.child_ids()
            .iter()
            .map(move |id| this.with_handle(NodeHandle::Section(*id)))
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let this = *self;
        self.attribute_ids()
            .iter()
            .map(move |id| this.with_handle(NodeHandle::Attribute(*id)))
    }

    pub fn child_count(&self) -> usize {
        self.child_ids().len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attribute_ids().len()
    }

    /// First child section with a case-insensitively equal name
    pub fn get_child(&self, name: &str) -> NodeRef<'a> {
        self.children()
            .find(|c| equals_ignore_case(c.name(), name))
            .unwrap_or_else(|| self.with_handle(NodeHandle::EmptySection))
    }

    /// First attribute with a case-insensitively equal name
    pub fn attr_by_name(&self, name: &str) -> NodeRef<'a> {
        self.attributes()
            .find(|a| equals_ignore_case(a.name(), name))
            .unwrap_or_else(|| self.with_handle(NodeHandle::EmptyAttribute))
    }

    /// Child section by position
    pub fn child_by_index(&self, index: usize) -> NodeRef<'a> {
        self.children()
            .nth(index)
            .unwrap_or_else(|| self.with_handle(NodeHandle::EmptySection))
    }

    /// Attribute by position
    pub fn attr_by_index(&self, index: usize) -> NodeRef<'a> {
        self.attributes()
            .nth(index)
            .unwrap_or_else(|| self.with_handle(NodeHandle::EmptyAttribute))
    }

    /// Case-insensitive name equality with another node
    pub fn is_same_name(&self, other: &NodeRef<'_>) -> bool {
        equals_ignore_case(self.name(), other.name())
    }
}

/// Write view of a node
pub struct NodeMut<'a> {
    conf: &'a mut Configuration,
    handle: NodeHandle,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(conf: &'a mut Configuration, handle: NodeHandle) -> Self {
        Self { conf, handle }
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Read view of the same node
    pub fn as_ref(&self) -> NodeRef<'_> {
        self.conf.node(self.handle)
    }

    fn live_id(&self) -> Result<NodeId> {
        let id = self
            .handle
            .id()
            .filter(|id| self.conf.data(*id).is_some())
            .ok_or_else(Error::node_missing)?;
        if self.conf.is_read_only() {
            return Err(Error::read_only(self.as_ref().path()));
        }
        Ok(id)
    }

    fn live_section_id(&self) -> Result<NodeId> {
        let id = self.live_id()?;
        if !self.handle.is_section() {
            return Err(Error::not_a_section(self.as_ref().path()));
        }
        Ok(id)
    }

    /// Rename the node; the name is trimmed and `modified` is set only on change
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let id = self.live_id()?;
        if let Some(data) = self.conf.data_mut(id) {
            let name = name.trim();
            if data.name != name {
                data.name = name.to_string();
                data.modified = true;
            }
        }
        Ok(())
    }

    /// Replace the verbatim value
    pub fn set_value(&mut self, value: Option<&str>) -> Result<()> {
        let id = self.live_id()?;
        if let Some(data) = self.conf.data_mut(id) {
            if data.value.as_deref() != value {
                data.value = value.map(str::to_string);
                data.modified = true;
            }
        }
        Ok(())
    }

    /// Append a child section
    pub fn add_child_node(&mut self, name: &str, value: Option<&str>) -> Result<NodeHandle> {
        let id = self.live_section_id()?;
        self.conf
            .insert(id, name, value, true)
            .ok_or_else(Error::node_missing)
    }

    /// Append an attribute
    pub fn add_attribute_node(&mut self, name: &str, value: Option<&str>) -> Result<NodeHandle> {
        let id = self.live_section_id()?;
        self.conf
            .insert(id, name, value, false)
            .ok_or_else(Error::node_missing)
    }

    /// Remove a child section; returns whether it was found
    pub fn remove_child(&mut self, child: NodeHandle) -> Result<bool> {
        self.remove_member(child, true)
    }

    /// Remove an attribute; returns whether it was found
    pub fn remove_attribute(&mut self, attr: NodeHandle) -> Result<bool> {
        self.remove_member(attr, false)
    }

    fn remove_member(&mut self, member: NodeHandle, section: bool) -> Result<bool> {
        let id = self.live_section_id()?;
        let Some(target) = member.id().filter(|_| member.is_section() == section) else {
            return Ok(false);
        };

        let mut removed = false;
        if let Some(data) = self.conf.data_mut(id) {
            if let NodeBody::Section {
                children,
                attributes,
            } = &mut data.body
            {
                let list = if section { children } else { attributes };
                let before = list.len();
                list.retain(|m| *m != target);
                removed = list.len() != before;
            }
            if removed {
                data.modified = true;
            }
        }
        if removed {
            log::debug!("removing {:?} from {:?}", member, self.handle);
            self.conf.free_subtree(target);
        }
        Ok(removed)
    }

    /// Remove every child section
    pub fn clear_children(&mut self) -> Result<()> {
        self.clear_members(true)
    }

    /// Remove every attribute
    pub fn clear_attributes(&mut self) -> Result<()> {
        self.clear_members(false)
    }

    fn clear_members(&mut self, section: bool) -> Result<()> {
        let id = self.live_section_id()?;
        let mut drained = Vec::new();
        if let Some(data) = self.conf.data_mut(id) {
            if let NodeBody::Section {
                children,
                attributes,
            } = &mut data.body
            {
                let list = if section { children } else { attributes };
                drained = std::mem::take(list);
            }
            data.modified = true;
        }
        log::debug!("clearing {} members of {:?}", drained.len(), self.handle);
        for member in drained {
            self.conf.free_subtree(member);
        }
        Ok(())
    }

    /// Remove this node from the tree
    ///
    /// Deleting the root destroys the whole configuration.
    pub fn delete(self) -> Result<()> {
        let id = self.live_id()?;
        let parent = self.conf.node(self.handle).parent();
        if !parent.exists() {
            self.conf.clear_root(id);
            return Ok(());
        }
        let parent = parent.handle();
        let handle = self.handle;
        let mut parent = NodeMut::new(self.conf, parent);
        if handle.is_section() {
            parent.remove_child(handle)?;
        } else {
            parent.remove_attribute(handle)?;
        }
        Ok(())
    }

    /// Clear the modified flag on this node and everything below it
    pub fn reset_modified(&mut self) {
        let Some(id) = self.handle.id() else {
            return;
        };
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.conf.data_mut(id) {
                data.modified = false;
                if let NodeBody::Section {
                    children,
                    attributes,
                } = &data.body
                {
                    stack.extend(children.iter().chain(attributes.iter()).copied());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, MutationErrorKind};
    use crate::parse;

    fn sample() -> Configuration {
        parse(
            r#"root
            {
              a=1
              b=2
              x { v=first }
              x { v=second }
              y { }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut conf = Configuration::new();
        let root = conf.create("  root  ", None);
        let child = conf.node_mut(root).add_child_node("  child ", None).unwrap();

        assert_eq!(conf.root().name(), "root");
        assert_eq!(conf.node(child).name(), "child");
    }

    #[test]
    fn test_children_and_attributes_keep_order() {
        let conf = sample();
        let root = conf.root();

        let attrs: Vec<_> = root.attributes().map(|a| a.name()).collect();
        assert_eq!(attrs, vec!["a", "b"]);
        let kids: Vec<_> = root.children().map(|c| c.name()).collect();
        assert_eq!(kids, vec!["x", "x", "y"]);
        assert_eq!(root.child_count(), 3);
        assert_eq!(root.attribute_count(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let conf = sample();
        let root = conf.root();

        assert_eq!(root.attr_by_name("A").verbatim_value(), Some("1"));
        assert_eq!(root.get_child("Y").name(), "y");
        assert!(!root.is_same_name(&root.get_child("X")));
        assert!(root.get_child("x").is_same_name(&root.get_child("X")));
    }

    #[test]
    fn test_lookup_misses_return_sentinels() {
        let conf = sample();
        let root = conf.root();

        let missing = root.get_child("nope");
        assert!(!missing.exists());
        assert!(missing.is_section());

        let missing = root.attr_by_name("nope");
        assert!(!missing.exists());
        assert!(missing.is_attribute());

        assert!(!root.child_by_index(10).exists());
        assert!(!root.attr_by_index(10).exists());
        assert_eq!(root.child_by_index(1).attr_by_name("v").verbatim_value(), Some("second"));
    }

    #[test]
    fn test_sentinel_chain_never_fails() {
        let conf = sample();
        let deep = conf
            .root()
            .get_child("nope")
            .get_child("deeper")
            .attr_by_name("leaf");

        assert!(!deep.exists());
        assert_eq!(deep.name(), "");
        assert_eq!(deep.child_count(), 0);
        assert_eq!(deep.path(), "/");
    }

    #[test]
    fn test_paths() {
        let conf = sample();
        let root = conf.root();

        assert_eq!(root.path(), "/");
        assert_eq!(root.attr_by_name("a").path(), "/$a");
        assert_eq!(root.get_child("y").path(), "/y");
        assert_eq!(root.child_by_index(0).path(), "/x[0]");
        assert_eq!(root.child_by_index(1).path(), "/x[1]");
        assert_eq!(root.child_by_index(1).attr_by_name("v").path(), "/x[1]/$v");
    }

    #[test]
    fn test_parent_and_root() {
        let conf = sample();
        let v = conf.get("/y").unwrap();

        assert_eq!(v.parent().handle(), conf.root().handle());
        assert!(conf.root().is_root());
        assert!(!v.is_root());
        assert_eq!(v.root().handle(), conf.root().handle());
        assert_eq!(conf.root().attr_by_name("a").root().name(), "root");
    }

    #[test]
    fn test_set_value_and_name_mark_modified() {
        let mut conf = sample();
        let a = conf.root().attr_by_name("a").handle();

        assert!(!conf.node(a).modified());
        conf.node_mut(a).set_value(Some("10")).unwrap();
        assert!(conf.node(a).modified());
        assert_eq!(conf.node(a).verbatim_value(), Some("10"));

        conf.node_mut(a).set_name(" alpha ").unwrap();
        assert_eq!(conf.node(a).name(), "alpha");
    }

    #[test]
    fn test_setting_same_value_keeps_clean() {
        let mut conf = sample();
        let a = conf.root().attr_by_name("a").handle();

        conf.node_mut(a).set_value(Some("1")).unwrap();
        conf.node_mut(a).set_name("a ").unwrap();

        assert!(!conf.node(a).modified());
    }

    #[test]
    fn test_add_marks_parent_modified() {
        let mut conf = sample();
        let y = conf.get("y").unwrap().handle();

        let z = conf.node_mut(y).add_attribute_node("z", Some("9")).unwrap();

        assert!(conf.node(y).modified());
        assert!(!conf.node(z).modified());
        assert_eq!(conf.node(z).parent().handle(), y);
    }

    #[test]
    fn test_reset_modified_is_recursive() {
        let mut conf = sample();
        let y = conf.get("y").unwrap().handle();
        let z = conf.node_mut(y).add_child_node("z", None).unwrap();
        conf.node_mut(z).set_value(Some("v")).unwrap();

        conf.root_mut().reset_modified();

        assert!(!conf.node(y).modified());
        assert!(!conf.node(z).modified());
    }

    #[test]
    fn test_remove_child_and_attribute() {
        let mut conf = sample();
        let x0 = conf.get("x[0]").unwrap().handle();
        let v0 = conf.get("x[0]/$v").unwrap().handle();
        let b = conf.get("$b").unwrap().handle();

        assert!(conf.root_mut().remove_child(x0).unwrap());
        assert!(conf.root_mut().remove_attribute(b).unwrap());
        assert!(!conf.root_mut().remove_attribute(b).unwrap());

        assert!(!conf.node(x0).exists());
        assert!(!conf.node(v0).exists());
        assert_eq!(conf.root().child_count(), 2);
        assert_eq!(conf.root().attribute_count(), 1);
        assert_eq!(conf.get("x").unwrap().attr_by_name("v").verbatim_value(), Some("second"));
        assert_eq!(conf.get("x").unwrap().path(), "/x");
    }

    #[test]
    fn test_remove_wrong_kind_is_not_found() {
        let mut conf = sample();
        let a = conf.get("$a").unwrap().handle();

        assert!(!conf.root_mut().remove_child(a).unwrap());
        assert!(conf.node(a).exists());
    }

    #[test]
    fn test_clear_members() {
        let mut conf = sample();
        let x = conf.get("x").unwrap().handle();

        conf.root_mut().clear_children().unwrap();
        assert_eq!(conf.root().child_count(), 0);
        assert!(!conf.node(x).exists());

        conf.root_mut().clear_attributes().unwrap();
        assert_eq!(conf.root().attribute_count(), 0);
        assert!(conf.root().modified());
    }

    #[test]
    fn test_delete_attribute_marks_parent_modified() {
        let mut conf = sample();
        let a = conf.get("$a").unwrap().handle();

        conf.node_mut(a).delete().unwrap();

        assert!(!conf.node(a).exists());
        assert!(conf.root().modified());
        assert!(!conf.get("$a").unwrap().exists());
    }

    #[test]
    fn test_delete_section() {
        let mut conf = sample();
        let y = conf.get("y").unwrap().handle();

        conf.node_mut(y).delete().unwrap();

        assert!(!conf.node(y).exists());
        assert_eq!(conf.root().child_count(), 2);
    }

    #[test]
    fn test_delete_root_destroys_configuration() {
        let mut conf = sample();
        let a = conf.get("$a").unwrap().handle();

        conf.root_mut().delete().unwrap();

        assert!(!conf.root().exists());
        assert!(!conf.node(a).exists());
    }

    #[test]
    fn test_mutating_sentinel_fails() {
        let mut conf = sample();

        let err = conf
            .node_mut(NodeHandle::EmptySection)
            .add_child_node("a", None)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Mutation(MutationErrorKind::NodeMissing));

        let err = conf
            .node_mut(NodeHandle::EmptyAttribute)
            .set_value(Some("x"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Mutation(MutationErrorKind::NodeMissing));
    }

    #[test]
    fn test_attribute_cannot_hold_children() {
        let mut conf = sample();
        let a = conf.get("$a").unwrap().handle();

        let err = conf.node_mut(a).add_child_node("c", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Mutation(MutationErrorKind::NotASection));
    }

    #[test]
    fn test_read_only_rejects_every_mutation() {
        let mut conf = crate::parse_with_options(
            "root{ a=1 s{ } }",
            crate::ConfigOptions::read_only(),
        )
        .unwrap();
        let a = conf.get("$a").unwrap().handle();
        let s = conf.get("s").unwrap().handle();

        let read_only = ErrorKind::Mutation(MutationErrorKind::ReadOnly);
        assert_eq!(conf.node_mut(a).set_value(Some("2")).unwrap_err().kind, read_only);
        assert_eq!(conf.node_mut(a).set_name("b").unwrap_err().kind, read_only);
        assert_eq!(conf.root_mut().add_child_node("c", None).unwrap_err().kind, read_only);
        assert_eq!(conf.root_mut().add_attribute_node("c", None).unwrap_err().kind, read_only);
        assert_eq!(conf.root_mut().remove_child(s).unwrap_err().kind, read_only);
        assert_eq!(conf.root_mut().clear_attributes().unwrap_err().kind, read_only);
        assert_eq!(conf.node_mut(s).delete().unwrap_err().kind, read_only);
        assert_eq!(conf.get("$a").unwrap().verbatim_value(), Some("1"));
    }
}
