//! Include directive expansion
//!
//! Specification sources pull in shared and generated fragments with
//! `include::{prefix}/path[tag=name]`. Directives whose target starts with a
//! known prefix are expanded here, recursively; anything else is left for
//! the markup processor.

use std::path::PathBuf;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::IncludeError;

/// Maximum include nesting before expansion gives up
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Matches `include::target[attributes]` on its own line
static INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^include::([^\[\s]+)\[([^\]]*)\]\s*$").unwrap());

/// Matches a leading `{prefix}` in an include target
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([\w-]+)\}(.*)$").unwrap());

#[derive(Debug, Clone)]
pub struct IncludeResolver {
    prefixes: IndexMap<String, PathBuf>,
}

impl IncludeResolver {
    /// Create a resolver from prefix names (without braces) and directories
    pub fn new(prefixes: IndexMap<String, PathBuf>) -> Self {
        Self { prefixes }
    }

    /// Map a `{prefix}/rest` target to a file, if the prefix is known
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        let caps = PREFIX_RE.captures(target)?;
        let dir = self.prefixes.get(&caps[1])?;
        let rest = caps[2].trim_start_matches('/');
        Some(dir.join(rest))
    }

    /// Expand every handled include in `source`
    pub fn expand(&self, source: &str) -> Result<String, IncludeError> {
        self.expand_at(source, 0)
    }

    fn expand_at(&self, source: &str, depth: usize) -> Result<String, IncludeError> {
        let mut out = String::with_capacity(source.len());

        for line in source.lines() {
            let Some(caps) = INCLUDE_RE.captures(line) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };
            let target = &caps[1];
            let Some(path) = self.resolve(target) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };

            if depth >= MAX_INCLUDE_DEPTH {
                return Err(IncludeError::TooDeep(MAX_INCLUDE_DEPTH, target.to_string()));
            }
            if !path.is_file() {
                log::warn!("referenced file not found: {}", path.display());
                return Err(IncludeError::Missing {
                    target: target.to_string(),
                    path,
                });
            }

            let content = std::fs::read_to_string(&path)
                .map_err(|source| IncludeError::Read { path, source })?;
            let content = match tags(&caps[2]) {
                Some(tags) => tags
                    .iter()
                    .map(|tag| tagged_region(&content, tag))
                    .collect::<Vec<_>>()
                    .join("\n"),
                None => content,
            };

            out.push_str(&self.expand_at(&content, depth + 1)?);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        Ok(out)
    }
}

/// Tag names from `tag=a` or `tags=a;b` include attributes
fn tags(attributes: &str) -> Option<Vec<String>> {
    attributes.split(',').find_map(|attr| {
        let (key, value) = attr.split_once('=')?;
        match key.trim() {
            "tag" | "tags" => Some(
                value
                    .trim()
                    .trim_matches('"')
                    .split(';')
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    })
}

/// Lines strictly between `// tag::<tag>[]` and `// end::<tag>[]`
pub fn tagged_region(content: &str, tag: &str) -> String {
    let start = format!("// tag::{tag}[]");
    let end = format!("// end::{tag}[]");

    let mut lines = Vec::new();
    let mut inside = false;
    for line in content.lines() {
        if line.starts_with(&start) {
            inside = true;
            continue;
        }
        if line.ends_with(&end) {
            break;
        }
        if inside {
            lines.push(line);
        }
    }
    lines.join("\n")
}
