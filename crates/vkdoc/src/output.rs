//! Artifact output
//!
//! Layout under the output directory:
//!
//! ```text
//! chapters/<n>.md       chunk n of the master document
//! chapters/index.json   chunk index
//! appendices/<n>.md     appendix n
//! man/<page>.md         reference pages, with YAML frontmatter
//! xrefs.json            the cross-reference registry
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use vkdoc_core::{serialize, Node, Options};

use crate::chunk::{Chunk, ChunkMeta};
use crate::error::{Error, Result};
use crate::refpage::Refpage;
use crate::registry::Registry;

/// YAML frontmatter of a reference page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frontmatter<'a> {
    pub title: &'a str,
    pub description: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub xrefs: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<&'a str>,
}

impl<'a> From<&'a Refpage> for Frontmatter<'a> {
    fn from(page: &'a Refpage) -> Self {
        Self {
            title: &page.name,
            description: &page.description,
            kind: &page.kind,
            xrefs: &page.xrefs,
            alias: page.alias.as_deref(),
        }
    }
}

impl Frontmatter<'_> {
    /// Render as a `---` delimited block followed by a blank line
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{yaml}---\n\n"))
    }
}

/// Writes Markdown and JSON artifacts below a root directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    options: Options,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Create the output directories
    pub fn prepare(&self) -> Result<()> {
        for dir in ["chapters", "appendices", "man"] {
            let path = self.root.join(dir);
            std::fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        }
        Ok(())
    }

    pub fn chunk_path(&self, meta: &ChunkMeta) -> PathBuf {
        let dir = if meta.appendix { "appendices" } else { "chapters" };
        self.root.join(dir).join(format!("{}.md", meta.index))
    }

    pub fn page_path(&self, name: &str) -> PathBuf {
        self.root.join("man").join(format!("{name}.md"))
    }

    pub fn write_chunk(&self, chunk: &Chunk) -> Result<PathBuf> {
        let path = self.chunk_path(&chunk.meta);
        self.write(&path, &self.markdown(&chunk.nodes))?;
        Ok(path)
    }

    pub fn write_page(&self, page: &Refpage, nodes: &[Node]) -> Result<PathBuf> {
        let mut content = Frontmatter::from(page).render()?;
        content.push_str(&self.markdown(nodes));

        let path = self.page_path(&page.name);
        self.write(&path, &content)?;
        Ok(path)
    }

    /// Write `chapters/index.json` listing every chunk in document order
    pub fn write_index(&self, chunks: &[ChunkMeta]) -> Result<PathBuf> {
        let path = self.root.join("chapters").join("index.json");
        self.write(&path, &serde_json::to_string_pretty(chunks)?)?;
        Ok(path)
    }

    pub fn write_registry(&self, registry: &Registry) -> Result<PathBuf> {
        let path = self.root.join("xrefs.json");
        registry.save(&path)?;
        Ok(path)
    }

    fn markdown(&self, nodes: &[Node]) -> String {
        let mut markdown = serialize(nodes, &self.options);
        markdown.push('\n');
        markdown
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        log::debug!("writing {}", path.display());
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}
