//! Cross-reference registry
//!
//! Phase 1 of cross-linking: every converted document (each chunk of the
//! master document and each reference page) is scanned for section ids and
//! anchors, recording where they live. The rewrite pass
//! ([`rewrite`](crate::rewrite::rewrite)) reads the finished registry.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vkdoc_core::markers::split_heading_prefix;
use vkdoc_core::{walk, Node};

use crate::error::{Error, Result};

/// Which entry survives when an id is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    LastWriteWins,
    FirstWriteWins,
}

/// Addressable location of a chunk or page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Chapter(usize),
    Appendix(usize),
    Page(String),
}

impl Location {
    pub fn url(&self) -> String {
        match self {
            Location::Chapter(index) => format!("/chapters/{index}"),
            Location::Appendix(index) => format!("/appendices/{index}"),
            Location::Page(name) => format!("/man/{name}"),
        }
    }
}

/// What registered an entry; headings outrank anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Heading,
    Anchor,
}

/// Where an id resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Location of the document, without fragment
    pub url: String,
    /// Human-readable label
    pub title: String,
    #[serde(skip)]
    pub origin: Origin,
}

/// An id registered more than once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub id: String,
    pub kept: String,
    pub dropped: String,
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate id {:?}: kept {}, dropped {}",
            self.id, self.kept, self.dropped
        )
    }
}

/// Map from anchor id to resolved location
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
    policy: DuplicatePolicy,
    duplicates: Vec<Duplicate>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Ids registered more than once so far
    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    /// Register an entry directly, with heading priority
    pub fn insert(&mut self, id: &str, url: &str, title: &str) {
        self.register(
            id,
            Entry {
                url: url.to_string(),
                title: title.to_string(),
                origin: Origin::Heading,
            },
        );
    }

    /// Scan one document in order, registering its section ids and anchors
    pub fn collect(&mut self, nodes: &[Node], location: &Location) {
        let url = location.url();
        let mut headings: Vec<(u8, String)> = Vec::new();
        let mut found = Vec::new();

        walk(nodes, &mut |node| match node {
            Node::Heading { depth, .. } => {
                let text = node.plain_text();
                let title = match split_heading_prefix(&text) {
                    Some((heading, rest)) => {
                        let title = rest.trim().to_string();
                        found.push((heading.id.to_string(), title.clone(), Origin::Heading));
                        title
                    }
                    None => text.trim().to_string(),
                };
                while headings.last().is_some_and(|(d, _)| d >= depth) {
                    headings.pop();
                }
                headings.push((*depth, title));
            }
            Node::Directive(directive) => {
                if let Some(id) = directive.anchor_id() {
                    let title = match location {
                        Location::Page(name) => name.clone(),
                        _ => headings
                            .iter()
                            .map(|(_, title)| title.as_str())
                            .collect::<Vec<_>>()
                            .join(" > "),
                    };
                    found.push((id.to_string(), title, Origin::Anchor));
                }
            }
            _ => {}
        });

        for (id, title, origin) in found {
            self.register(
                &id,
                Entry {
                    url: url.clone(),
                    title,
                    origin,
                },
            );
        }
    }

    fn register(&mut self, id: &str, entry: Entry) {
        let Some(existing) = self.entries.get(id) else {
            self.entries.insert(id.to_string(), entry);
            return;
        };

        let replace = match (existing.origin, entry.origin) {
            (Origin::Heading, Origin::Anchor) => false,
            (Origin::Anchor, Origin::Heading) => true,
            _ => self.policy == DuplicatePolicy::LastWriteWins,
        };

        // An anchor repeating its own section's id is not a conflict
        let same_place = existing.url == entry.url && existing.origin != entry.origin;
        if !same_place {
            let (kept, dropped) = if replace {
                (entry.url.clone(), existing.url.clone())
            } else {
                (existing.url.clone(), entry.url.clone())
            };
            let duplicate = Duplicate {
                id: id.to_string(),
                kept,
                dropped,
            };
            log::warn!("{duplicate}");
            self.duplicates.push(duplicate);
        }

        if replace {
            self.entries.insert(id.to_string(), entry);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
            ..Self::default()
        })
    }

    /// Persist as `{ id: { url, title } }` in registration order
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| Error::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&json)
    }
}
