//! Custom variable resolvers
//!
//! Resolvers are consulted for every `$(...)` expression before the built-in
//! environment (`~`) and path (`@` / default) handling. A resolver returns
//! `Ok(None)` to decline an expression and let the next one try.
//!
//! Resolvers are registered per [`Configuration`](crate::Configuration) and are
//! tried in registration order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::node::NodeRef;

/// Context passed to resolvers
///
/// The scope belongs to the expansion that called the resolver: nodes reached
/// from it read their values through the same cycle check, so a resolver that
/// reads back the value it is resolving fails with a recursion error.
#[derive(Debug, Clone, Copy)]
pub struct ResolverContext<'a> {
    /// Section the expression is evaluated relative to
    pub scope: NodeRef<'a>,
    /// Trimmed expression text between the variable markers
    pub expression: &'a str,
}

impl<'a> ResolverContext<'a> {
    /// Create a new resolver context
    pub fn new(scope: NodeRef<'a>, expression: &'a str) -> Self {
        Self { scope, expression }
    }

    /// Navigate a path relative to the scope
    pub fn navigate(&self, path: &str) -> Result<NodeRef<'a>> {
        self.scope.navigate(path)
    }

    /// Expanded value of the node at `path`; empty when it doesn't exist
    pub fn value_of(&self, path: &str) -> Result<String> {
        Ok(self.navigate(path)?.value()?.unwrap_or_default())
    }
}

/// Trait for variable resolver implementations
pub trait VariableResolver: Send + Sync {
    /// Resolve an expression, or `None` to pass it on
    fn resolve(&self, expression: &str, ctx: &ResolverContext<'_>) -> Result<Option<String>>;

    /// Get the name of this resolver
    fn name(&self) -> &str;
}

/// A simple function-based resolver
pub struct FnResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    /// Create a new function-based resolver
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> VariableResolver for FnResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    fn resolve(&self, expression: &str, ctx: &ResolverContext<'_>) -> Result<Option<String>> {
        (self.func)(expression, ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A resolver for expressions carrying a fixed prefix such as `chassis::`
///
/// The prefix is stripped before the wrapped function sees the expression.
pub struct PrefixResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    prefix: String,
    func: F,
}

impl<F> PrefixResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    pub fn new(prefix: impl Into<String>, func: F) -> Self {
        Self {
            prefix: prefix.into(),
            func,
        }
    }
}

impl<F> VariableResolver for PrefixResolver<F>
where
    F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync,
{
    fn resolve(&self, expression: &str, ctx: &ResolverContext<'_>) -> Result<Option<String>> {
        match expression.strip_prefix(self.prefix.as_str()) {
            Some(rest) => (self.func)(rest, ctx),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.prefix
    }
}

/// Ordered registry of resolvers
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: IndexMap<String, Arc<dyn VariableResolver>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.resolvers.keys()).finish()
    }
}

impl ResolverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver, replacing one with the same name in place
    pub fn register(&mut self, resolver: Arc<dyn VariableResolver>) {
        let name = resolver.name().to_string();
        log::debug!("registering variable resolver '{}'", name);
        self.resolvers.insert(name, resolver);
    }

    /// Register a resolver with optional force overwrite.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(Error)` if force=false and a resolver with the same name exists
    pub fn register_with_force(
        &mut self,
        resolver: Arc<dyn VariableResolver>,
        force: bool,
    ) -> Result<()> {
        if !force && self.resolvers.contains_key(resolver.name()) {
            return Err(Error::resolver_already_registered(resolver.name()));
        }
        self.register(resolver);
        Ok(())
    }

    /// Register a function as a resolver
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&str, &ResolverContext<'_>) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnResolver::new(name, func)));
    }

    /// Remove a resolver by name, keeping the order of the rest
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn VariableResolver>> {
        self.resolvers.shift_remove(name)
    }

    /// Get a resolver by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn VariableResolver>> {
        self.resolvers.get(name)
    }

    /// Check if a resolver is registered
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolvers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn VariableResolver>> {
        self.resolvers.values()
    }

    /// Offer an expression to each resolver until one answers
    pub fn resolve(&self, expression: &str, ctx: &ResolverContext<'_>) -> Result<Option<String>> {
        for resolver in self.resolvers.values() {
            if let Some(value) = resolver.resolve(expression, ctx)? {
                log::trace!("resolver '{}' resolved '{}'", resolver.name(), expression);
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
