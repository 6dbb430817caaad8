//! Path navigation
//!
//! Path grammar, resolved one segment at a time:
//!
//! ```text
//! !            leading: the whole path is required
//! / or \       leading: start at the configuration root
//! ..           parent section
//! name         first child section with that name
//! $name        first attribute with that name
//! [n] / $[n]   n-th child section / attribute by position
//! name[k=v]    first child `name` whose attribute `k` equals `v`
//! name[v]      first child `name` whose own value equals `v`
//! ```
//!
//! Comparisons are case-insensitive. Misses yield sentinels; only a required
//! path turns a miss into an error.

use crate::error::{Error, NavigationErrorKind, Result};
use crate::expansion::ResolutionStack;
use crate::node::{equals_ignore_case, NodeHandle, NodeRef};

impl<'a> NodeRef<'a> {
    /// Resolve a path relative to this node
    ///
    /// # Example
    ///
    /// ```
    /// let conf = laconic_core::parse("app{ db{ port=5432 } }").unwrap();
    /// let port = conf.root().navigate("db/$port").unwrap();
    /// assert_eq!(port.as_int(0).unwrap(), 5432);
    /// assert!(!conf.root().navigate("cache/$size").unwrap().exists());
    /// assert!(conf.root().navigate("!cache/$size").is_err());
    /// ```
    pub fn navigate(&self, path: &str) -> Result<NodeRef<'a>> {
        match self.stack {
            Some(stack) => self.navigate_in(path, stack),
            None => self.navigate_in(path, &ResolutionStack::new()),
        }
    }

    pub(crate) fn navigate_in(&self, path: &str, stack: &ResolutionStack) -> Result<NodeRef<'a>> {
        let working = path.trim();
        if working.is_empty() {
            return Err(Error::navigation(NavigationErrorKind::EmptyPath, path));
        }

        let (required, working) = match working.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, working),
        };

        let (mut current, working) = match working.strip_prefix(['/', '\\']) {
            Some(rest) => (self.with_handle(self.conf.root_handle()), rest),
            None => (*self, working),
        };

        for segment in working.split(['/', '\\']).filter(|s| !s.is_empty()) {
            if !current.exists() {
                break;
            }
            current = current.step(segment, path, stack)?;
        }

        if required && !current.exists() {
            log::debug!("required path '{}' not found", path);
            return Err(Error::navigation(NavigationErrorKind::RequiredNotFound, path));
        }
        Ok(current)
    }

    fn step(&self, segment: &str, path: &str, stack: &ResolutionStack) -> Result<NodeRef<'a>> {
        if segment == ".." {
            return Ok(self.parent());
        }
        if !self.is_section() {
            return Err(Error::navigation(
                NavigationErrorKind::NotASection(segment.to_string()),
                path,
            ));
        }

        let (is_attr, segment) = match segment.strip_prefix('$') {
            Some(rest) => (true, rest.trim()),
            None => (false, segment),
        };

        if segment.len() >= 2 && segment.starts_with('[') && segment.ends_with(']') {
            let text = &segment[1..segment.len() - 1];
            let index: i64 = text.trim().parse().map_err(|_| {
                Error::navigation(NavigationErrorKind::InvalidIndex(text.to_string()), path)
            })?;
            return Ok(match (usize::try_from(index), is_attr) {
                (Ok(i), true) => self.attr_by_index(i),
                (Ok(i), false) => self.child_by_index(i),
                (Err(_), true) => self.with_handle(NodeHandle::EmptyAttribute),
                (Err(_), false) => self.with_handle(NodeHandle::EmptySection),
            });
        }

        if !is_attr && segment.ends_with(']') {
            if let Some(open) = segment.find('[') {
                let name = &segment[..open];
                let query = &segment[open + 1..segment.len() - 1];
                return self.query_child(name, query, stack);
            }
        }

        Ok(if is_attr {
            self.attr_by_name(segment)
        } else {
            self.get_child(segment)
        })
    }

    /// First child named `name` matching `attr=value` or its own value
    fn query_child(&self, name: &str, query: &str, stack: &ResolutionStack) -> Result<NodeRef<'a>> {
        let (attr, expected) = match query.split_once('=') {
            Some((attr, value)) => (Some(attr), value),
            None => (None, query),
        };
        for child in self.children() {
            if !equals_ignore_case(child.name(), name) {
                continue;
            }
            let actual = match attr {
                Some(attr) => child.attr_by_name(attr).value_in(stack)?,
                None => child.value_in(stack)?,
            };
            if actual.is_some_and(|v| equals_ignore_case(&v, expected)) {
                return Ok(child);
            }
        }
        Ok(self.with_handle(NodeHandle::EmptySection))
    }
}
