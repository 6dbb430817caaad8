//! `#include<file>` preprocessing
//!
//! Runs on raw source text before parsing. A line consisting only of
//! `#include<X>` is replaced with the contents of `X`, resolved against the
//! include root. `!X` makes the file required; otherwise a missing file is
//! replaced with nothing. Included text is itself preprocessed, up to
//! [`MAX_INCLUDE_DEPTH`] levels.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::configuration::Configuration;
use crate::error::{Error, Result};

/// Maximum nesting of included files
pub const MAX_INCLUDE_DEPTH: usize = 16;

fn include_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*#include<(.+)>\s*$").expect("include pattern is a valid regex")
    })
}

/// Expands include directives relative to a root directory
#[derive(Debug, Clone)]
pub struct IncludePreprocessor<'a> {
    root: PathBuf,
    variables: Option<&'a Configuration>,
}

impl<'a> IncludePreprocessor<'a> {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            variables: None,
        }
    }

    /// Expand `$(...)` in file names against a configuration's root
    pub fn with_variables(mut self, conf: &'a Configuration) -> Self {
        self.variables = Some(conf);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace every include line in `text`
    pub fn process(&self, text: &str) -> Result<String> {
        self.process_at(text, 0)
    }

    fn process_at(&self, text: &str, depth: usize) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\r', '\n']);
            let ending = &line[content.len()..];
            match include_pattern().captures(content) {
                Some(caps) => {
                    let included = self.load(&caps[1], depth)?;
                    out.push_str(&included);
                    out.push_str(ending);
                }
                None => out.push_str(line),
            }
        }
        Ok(out)
    }

    fn load(&self, target: &str, depth: usize) -> Result<String> {
        if depth >= MAX_INCLUDE_DEPTH {
            return Err(Error::include_depth_exceeded(MAX_INCLUDE_DEPTH));
        }

        let target = target.trim();
        let (required, target) = match target.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, target),
        };
        let name = match self.variables {
            Some(conf) => conf.root().evaluate(target)?,
            None => target.to_string(),
        };

        let path = self.root().join(&name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if required {
                    return Err(Error::include_not_found(path.display().to_string()));
                }
                log::warn!("included file not found, skipping: {}", path.display());
                return Ok(String::new());
            }
            Err(e) => return Err(Error::io(path.display().to_string(), &e)),
        };

        log::debug!("including {}", path.display());
        self.process_at(&text, depth + 1)
    }
}
