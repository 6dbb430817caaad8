//! Configuration root
//!
//! A [`Configuration`] owns the whole node tree in an arena. Nodes are
//! addressed by copyable [`NodeHandle`]s; every read or write resolves the
//! handle through the owning configuration, so handles to removed nodes (and
//! all handles after [`Configuration::destroy`]) observe a non-existent node.
//!
//! The read-only flag is the only write protection. Mutation requires
//! `&mut Configuration`, which rules out unsynchronised concurrent writers;
//! sharing one configuration between threads for writing is left to the
//! embedding application (wrap it in a lock if you need that).

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::include::IncludePreprocessor;
use crate::node::{NodeBody, NodeData, NodeHandle, NodeId, NodeMut, NodeRef};
use crate::resolver::{ResolverContext, ResolverRegistry, VariableResolver};

/// Default ceiling on variable substitutions performed by one evaluation
pub const MAX_EXPANSION_ITERATIONS: usize = 1000;

/// Source of environment variables used by `~` expansion
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Markers that drive variable expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSyntax {
    /// Opens a variable expression
    pub start: String,
    /// Closes a variable expression
    pub end: String,
    /// A value starting with this marker is returned verbatim (marker stripped)
    pub escape: String,
    /// Expression prefix for environment variables
    pub env_modifier: String,
    /// Expression prefix for explicit tree paths
    pub path_modifier: String,
}

impl Default for VariableSyntax {
    fn default() -> Self {
        Self {
            start: "$(".into(),
            end: ")".into(),
            escape: "$$".into(),
            env_modifier: "~".into(),
            path_modifier: "@".into(),
        }
    }
}

/// Configuration options
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    /// Reject every mutation once the configuration is constructed
    pub read_only: bool,
    /// Variable expansion markers
    pub variables: VariableSyntax,
    /// Ceiling on substitutions per evaluation
    pub max_expansion_iterations: usize,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            variables: VariableSyntax::default(),
            max_expansion_iterations: MAX_EXPANSION_ITERATIONS,
        }
    }
}

impl ConfigOptions {
    /// Options for a read-only configuration
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

/// Arena slot; the generation changes every time the slot is freed
#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// The configuration tree container
pub struct Configuration {
    options: ConfigOptions,
    nodes: Vec<Slot>,
    free: Vec<usize>,
    root: Option<NodeId>,
    resolvers: ResolverRegistry,
    env_lookup: EnvLookup,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("options", &self.options)
            .field("root", &self.root)
            .field("live_nodes", &self.live_nodes())
            .field("resolvers", &self.resolvers)
            .finish()
    }
}

impl Configuration {
    /// Create an empty, writable configuration (no root)
    pub fn new() -> Self {
        Self::with_options(ConfigOptions::default())
    }

    /// Create an empty configuration with custom options
    pub fn with_options(options: ConfigOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            resolvers: ResolverRegistry::new(),
            env_lookup: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Load a configuration file
    ///
    /// `#include<...>` lines are expanded relative to the file's directory
    /// before parsing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_options(path, ConfigOptions::default())
    }

    /// Load a configuration file with custom options
    pub fn load_with_options(path: impl AsRef<Path>, options: ConfigOptions) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), &e))?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        // include names may reference environment variables
        let env = Configuration::new();
        let source = IncludePreprocessor::new(base)
            .with_variables(&env)
            .process(&content)?;

        log::debug!("loading configuration from {}", path.display());
        crate::parser::parse_with_options(&source, options)
    }

    /// Whether mutations are rejected
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.options.read_only = read_only;
    }

    /// Options this configuration was created with
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Variable expansion markers
    pub fn variables(&self) -> &VariableSyntax {
        &self.options.variables
    }

    /// Create a new root section, replacing any existing tree
    pub fn create(&mut self, name: &str, value: Option<&str>) -> NodeHandle {
        self.destroy();
        let id = self.alloc(NodeData::section(name, value, None));
        self.root = Some(id);
        NodeHandle::Section(id)
    }

    /// Drop the whole tree; outstanding handles observe missing nodes
    pub fn destroy(&mut self) {
        if self.root.take().is_some() {
            log::debug!("destroying configuration tree");
        }
        for index in 0..self.nodes.len() {
            self.release(index);
        }
    }

    /// The root section, or the empty-section sentinel when there is none
    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root_handle())
    }

    /// Mutable view of the root section
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        let handle = self.root_handle();
        self.node_mut(handle)
    }

    pub(crate) fn root_handle(&self) -> NodeHandle {
        self.root
            .map(NodeHandle::Section)
            .unwrap_or(NodeHandle::EmptySection)
    }

    /// Read view of a node
    pub fn node(&self, handle: NodeHandle) -> NodeRef<'_> {
        NodeRef::new(self, handle)
    }

    /// Mutable view of a node
    pub fn node_mut(&mut self, handle: NodeHandle) -> NodeMut<'_> {
        NodeMut::new(self, handle)
    }

    /// Empty-section sentinel
    pub fn empty_section(&self) -> NodeRef<'_> {
        self.node(NodeHandle::EmptySection)
    }

    /// Empty-attribute sentinel
    pub fn empty_attribute(&self) -> NodeRef<'_> {
        self.node(NodeHandle::EmptyAttribute)
    }

    /// Navigate a path from the root
    pub fn get(&self, path: &str) -> Result<NodeRef<'_>> {
        if self.root.is_none() {
            return Ok(self.empty_section());
        }
        self.root().navigate(path)
    }

    /// Whether a node exists at `path`
    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.get(path)?.exists())
    }

    /// Resolve an environment variable by name
    pub fn resolve_env_var(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        (self.env_lookup)(name)
    }

    /// Replace the environment variable source
    pub fn set_env_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(lookup);
    }

    /// Registered custom variable resolvers
    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    /// Mutable access to the resolver registry
    pub fn resolvers_mut(&mut self) -> &mut ResolverRegistry {
        &mut self.resolvers
    }

    /// Register a custom variable resolver
    pub fn register_resolver(&mut self, resolver: Arc<dyn VariableResolver>) {
        self.resolvers.register(resolver);
    }

    /// Register a function as a custom variable resolver
    pub fn register_resolver_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.resolvers.register_fn(name, func);
    }

    // Arena plumbing

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.data.as_ref())
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.data.as_mut())
    }

    /// Number of nodes currently in the tree
    pub(crate) fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.data.is_some()).count()
    }

    /// Store a node, reusing a freed slot when there is one
    fn alloc(&mut self, data: NodeData) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.data = Some(data);
                NodeId::new(index, slot.generation)
            }
            None => {
                self.nodes.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId::new(self.nodes.len() - 1, 0)
            }
        }
    }

    /// Empty a slot and retire its generation; returns the freed data
    fn release(&mut self, index: usize) -> Option<NodeData> {
        let slot = self.nodes.get_mut(index)?;
        let data = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(data)
    }

    /// Link a new node under `parent` without mutation guards
    pub(crate) fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        value: Option<&str>,
        section: bool,
    ) -> Option<NodeHandle> {
        let data = if section {
            NodeData::section(name, value, Some(parent))
        } else {
            NodeData::attribute(name, value, parent)
        };
        if !matches!(self.data(parent)?.body, NodeBody::Section { .. }) {
            return None;
        }
        let id = self.alloc(data);
        let parent_data = self.data_mut(parent)?;
        if let NodeBody::Section {
            children,
            attributes,
        } = &mut parent_data.body
        {
            if section {
                children.push(id);
            } else {
                attributes.push(id);
            }
        }
        parent_data.modified = true;
        Some(if section {
            NodeHandle::Section(id)
        } else {
            NodeHandle::Attribute(id)
        })
    }

    /// Free a node and everything below it
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if self.data(id).is_none() {
                continue;
            }
            if let Some(NodeData {
                body: NodeBody::Section {
                    children,
                    attributes,
                },
                ..
            }) = self.release(id.index())
            {
                pending.extend(children);
                pending.extend(attributes);
            }
        }
    }

    pub(crate) fn clear_root(&mut self, id: NodeId) {
        if self.root == Some(id) {
            self.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_new_configuration_has_no_root() {
        let conf = Configuration::new();

        assert!(!conf.root().exists());
        assert!(conf.root().is_section());
        assert!(!conf.is_read_only());
        assert!(!conf.get("/anything").unwrap().exists());
    }

    #[test]
    fn test_create_root() {
        let mut conf = Configuration::new();
        conf.create("app", Some("v1"));

        let root = conf.root();
        assert!(root.exists());
        assert_eq!(root.name(), "app");
        assert_eq!(root.verbatim_value(), Some("v1"));
        assert!(root.is_root());
        assert!(!root.modified());
    }

    #[test]
    fn test_destroy_invalidates_handles() {
        let mut conf = Configuration::new();
        conf.create("root", None);
        let db = conf.root_mut().add_child_node("db", None).unwrap();
        let port = conf.node_mut(db).add_attribute_node("port", Some("1")).unwrap();

        conf.destroy();

        assert!(!conf.root().exists());
        assert!(!conf.node(db).exists());
        assert!(!conf.node(port).exists());
        assert_eq!(conf.node(port).name(), "");
        assert!(conf.node_mut(port).set_value(Some("2")).is_err());
    }

    #[test]
    fn test_create_again_does_not_revive_old_handles() {
        let mut conf = Configuration::new();
        let first = conf.create("first", None);
        let second = conf.create("second", None);

        assert!(!conf.node(first).exists());
        assert_eq!(conf.node(second).name(), "second");
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut conf = Configuration::new();
        let root = conf.create("root", None);
        for _ in 0..1000 {
            let child = conf.node_mut(root).add_child_node("tmp", None).unwrap();
            conf.node_mut(child).add_attribute_node("a", Some("1")).unwrap();
            assert!(conf.node_mut(root).remove_child(child).unwrap());
        }
        assert_eq!(conf.live_nodes(), 1);
        assert!(conf.nodes.len() <= 3);

        for _ in 0..1000 {
            conf.create("again", None);
        }
        assert_eq!(conf.live_nodes(), 1);
        assert!(conf.nodes.len() <= 3);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut conf = Configuration::new();
        let root = conf.create("root", None);
        let old = conf.node_mut(root).add_child_node("old", None).unwrap();
        conf.node_mut(root).remove_child(old).unwrap();

        let new = conf.node_mut(root).add_child_node("new", None).unwrap();

        assert_eq!(old.id().map(NodeId::index), new.id().map(NodeId::index));
        assert!(!conf.node(old).exists());
        assert!(conf.node_mut(old).set_name("x").is_err());
        assert_eq!(conf.node(new).name(), "new");
    }

    #[test]
    fn test_deep_tree_is_freed_and_addressed_iteratively() {
        let mut conf = Configuration::new();
        let root = conf.create("root", None);
        let top = conf.node_mut(root).add_child_node("a", None).unwrap();
        let mut deepest = top;
        for _ in 0..100_000 {
            deepest = conf.node_mut(deepest).add_child_node("a", None).unwrap();
        }

        assert_eq!(conf.node(deepest).path().len(), "/a".len() * 100_001);

        assert!(conf.node_mut(root).remove_child(top).unwrap());
        assert_eq!(conf.live_nodes(), 1);
        assert!(!conf.node(deepest).exists());
    }

    #[test]
    fn test_added_attribute_is_navigable() {
        let mut conf = crate::parse("root{ db{ } }").unwrap();
        let db = conf.get("db").unwrap().handle();

        conf.node_mut(db).add_attribute_node("port", Some("5432")).unwrap();

        assert_eq!(conf.root().navigate("/db/$port").unwrap().as_int(0).unwrap(), 5432);
        assert!(conf.node(db).modified());
        assert!(!conf.root().modified());
    }

    #[test]
    fn test_sentinels() {
        let conf = Configuration::new();

        let section = conf.empty_section();
        assert!(!section.exists());
        assert!(section.is_section());
        assert!(section.is_root());
        assert_eq!(section.name(), "");
        assert_eq!(section.value().unwrap(), None);

        let attr = conf.empty_attribute();
        assert!(!attr.exists());
        assert!(attr.is_attribute());
        assert!(attr.is_root());
    }

    #[test]
    fn test_exists() {
        let mut conf = Configuration::new();
        conf.create("root", None);
        conf.root_mut().add_attribute_node("a", Some("1")).unwrap();

        assert!(conf.exists("/$a").unwrap());
        assert!(!conf.exists("/$b").unwrap());
    }

    #[test]
    fn test_resolve_env_var_uses_custom_lookup() {
        let mut conf = Configuration::new();
        conf.set_env_lookup(|name| (name == "HOME_DIR").then(|| "/home/app".to_string()));

        assert_eq!(conf.resolve_env_var("HOME_DIR"), Some("/home/app".into()));
        assert_eq!(conf.resolve_env_var("OTHER"), None);
        assert_eq!(conf.resolve_env_var(""), None);
    }

    #[test]
    #[serial]
    fn test_resolve_env_var_reads_process_environment() {
        std::env::set_var("LACONIC_TEST_ENV_ROOT", "on");
        let conf = Configuration::new();

        assert_eq!(conf.resolve_env_var("LACONIC_TEST_ENV_ROOT"), Some("on".into()));

        std::env::remove_var("LACONIC_TEST_ENV_ROOT");
        assert_eq!(conf.resolve_env_var("LACONIC_TEST_ENV_ROOT"), None);
    }

    #[test]
    fn test_default_variable_syntax() {
        let conf = Configuration::new();
        let vars = conf.variables();

        assert_eq!(vars.start, "$(");
        assert_eq!(vars.end, ")");
        assert_eq!(vars.escape, "$$");
        assert_eq!(vars.env_modifier, "~");
        assert_eq!(vars.path_modifier, "@");
        assert_eq!(conf.options().max_expansion_iterations, MAX_EXPANSION_ITERATIONS);
    }

    #[test]
    fn test_load_file_with_includes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("db.laconf"), "db{ port=5432 }\n").unwrap();
        std::fs::write(
            dir.path().join("app.laconf"),
            "app\n{\n#include<db.laconf>\n  name=svc\n}\n",
        )
        .unwrap();

        let conf = Configuration::load(dir.path().join("app.laconf")).unwrap();

        assert_eq!(conf.root().name(), "app");
        assert_eq!(conf.get("db/$port").unwrap().as_int(0).unwrap(), 5432);
        assert_eq!(conf.get("$name").unwrap().as_str("").unwrap(), "svc");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Configuration::load("/definitely/not/here.laconf").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_load_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ro.laconf");
        std::fs::write(&file, "root{ a=1 }").unwrap();

        let mut conf = Configuration::load_with_options(&file, ConfigOptions::read_only()).unwrap();

        assert!(conf.is_read_only());
        assert_eq!(conf.get("$a").unwrap().as_int(0).unwrap(), 1);
        assert!(conf.root_mut().add_attribute_node("b", Some("2")).is_err());
    }
}
