//! Variable expansion
//!
//! Values are expanded lazily on every read. An expression `$(expr)` is
//! resolved in this order:
//!
//! 1. registered custom resolvers, in registration order
//! 2. `~NAME` / `~!NAME`: environment variable (the `!` form is required)
//! 3. `@path` or a bare `path`: value of the node at `path`
//!
//! A value starting with `$$` is returned with that marker stripped and no
//! further processing.
//!
//! Cycle detection keys on the scope node and expression text. The stack is
//! local to one top-level read and is threaded through nested reads, so a
//! chain like `a=$(b)`, `b=$(a)` fails instead of recursing forever.

use std::cell::RefCell;

use crate::error::{Error, Result};
use crate::node::{NodeHandle, NodeRef};
use crate::resolver::ResolverContext;

/// Expressions currently being resolved, outermost first
///
/// Shared by reference so that nodes handed to custom resolvers keep
/// reading through the same stack.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    frames: RefCell<Vec<(NodeHandle, String)>>,
}

impl ResolutionStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn contains(&self, key: &(NodeHandle, String)) -> bool {
        self.frames.borrow().contains(key)
    }

    fn push(&self, key: (NodeHandle, String)) {
        self.frames.borrow_mut().push(key);
    }

    fn pop(&self) {
        self.frames.borrow_mut().pop();
    }

    fn chain(&self, last: &str) -> Vec<String> {
        let mut chain: Vec<String> = self.frames.borrow().iter().map(|(_, e)| e.clone()).collect();
        chain.push(last.to_string());
        chain
    }
}

impl<'a> NodeRef<'a> {
    /// Value with variables expanded; `None` when absent or empty
    ///
    /// Sections expand relative to themselves, attributes relative to their
    /// parent section.
    pub fn value(&self) -> Result<Option<String>> {
        match self.stack {
            Some(stack) => self.value_in(stack),
            None => self.value_in(&ResolutionStack::new()),
        }
    }

    pub(crate) fn value_in(&self, stack: &ResolutionStack) -> Result<Option<String>> {
        let Some(raw) = self.verbatim_value().filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        self.expansion_scope().evaluate_in(raw, stack).map(Some)
    }

    fn expansion_scope(&self) -> NodeRef<'a> {
        if self.is_section() {
            return *self;
        }
        let parent = self.parent();
        if parent.exists() {
            parent
        } else {
            *self
        }
    }

    /// Expand variables in arbitrary text relative to this node
    pub fn evaluate(&self, raw: &str) -> Result<String> {
        match self.stack {
            Some(stack) => self.evaluate_in(raw, stack),
            None => self.evaluate_in(raw, &ResolutionStack::new()),
        }
    }

    pub(crate) fn evaluate_in(&self, raw: &str, stack: &ResolutionStack) -> Result<String> {
        let syntax = self.conf.variables();
        if !syntax.escape.is_empty() {
            if let Some(rest) = raw.strip_prefix(syntax.escape.as_str()) {
                return Ok(rest.to_string());
            }
        }
        if syntax.start.is_empty() || syntax.end.is_empty() {
            return Ok(raw.to_string());
        }

        let limit = self.conf.options().max_expansion_iterations;
        let mut result = raw.to_string();
        let mut iterations = 0;
        loop {
            let Some(open) = result.find(syntax.start.as_str()) else {
                break;
            };
            let body = open + syntax.start.len();
            let Some(close) = result[body..].find(syntax.end.as_str()).map(|i| body + i) else {
                break;
            };
            if iterations >= limit {
                return Err(Error::max_iterations(limit).with_path(self.path()));
            }
            iterations += 1;

            let expression = result[body..close].trim().to_string();
            let replacement = self.resolve_expression(&expression, stack)?;
            result.replace_range(open..close + syntax.end.len(), &replacement);
        }
        Ok(result)
    }

    fn resolve_expression(&self, expression: &str, stack: &ResolutionStack) -> Result<String> {
        let key = (self.handle, expression.to_string());
        if stack.contains(&key) {
            let chain = stack.chain(expression);
            return Err(Error::recursive_variable(expression, chain).with_path(self.path()));
        }

        stack.push(key);
        let resolved = self.resolve_variable(expression, stack);
        stack.pop();
        resolved
    }

    fn resolve_variable(&self, expression: &str, stack: &ResolutionStack) -> Result<String> {
        if expression.is_empty() {
            return Ok(String::new());
        }

        let ctx = ResolverContext::new(self.with_stack(stack), expression);
        if let Some(value) = self.conf.resolvers().resolve(expression, &ctx)? {
            return Ok(value);
        }

        let syntax = self.conf.variables();
        if let Some(name) = strip(expression, &syntax.env_modifier) {
            let (required, name) = match name.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, name),
            };
            return match self.conf.resolve_env_var(name) {
                Some(value) => Ok(value),
                None if required => Err(Error::required_env_missing(name)),
                None => {
                    log::trace!("environment variable '{}' not set", name);
                    Ok(String::new())
                }
            };
        }

        let path = strip(expression, &syntax.path_modifier).unwrap_or(expression);
        let node = self.navigate_in(path, stack)?;
        Ok(node.value_in(stack)?.unwrap_or_default())
    }
}

fn strip<'s>(text: &'s str, prefix: &str) -> Option<&'s str> {
    if prefix.is_empty() {
        None
    } else {
        text.strip_prefix(prefix)
    }
}
