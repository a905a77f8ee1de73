//! # vkdoc
//!
//! Build a cross-linked Markdown site from the Vulkan specification sources.
//!
//! The master document is split into chapter and appendix chunks, every
//! reference page embedded in the sources is converted on its own, and
//! `<xref>` placeholders are resolved against a registry of all section ids
//! and anchors once every document has been seen.
//!
//! ## Example
//!
//! ```rust
//! use vkdoc::{rewrite, Chunker, Registry, RewriteOptions};
//! use vkdoc_core::markers::{xref_label, xref_url};
//! use vkdoc_core::Node;
//!
//! let tree = vec![
//!     Node::heading(1, "#ov Overview"),
//!     Node::Paragraph(vec![Node::Link {
//!         url: xref_url("ov"),
//!         children: vec![Node::text(xref_label("ov"))],
//!     }]),
//! ];
//!
//! let mut registry = Registry::new();
//! let mut chunks = Chunker::split(tree, &mut registry);
//! rewrite(&mut chunks[0].nodes, &registry, &RewriteOptions::default());
//!
//! assert_eq!(
//!     chunks[0].nodes[1],
//!     Node::Paragraph(vec![Node::Link {
//!         url: "/chapters/0#ov".to_string(),
//!         children: vec![Node::text("Overview")],
//!     }])
//! );
//! ```

pub mod chunk;
pub mod config;
pub mod error;
pub mod include;
pub mod macros;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod refpage;
pub mod registry;
pub mod rewrite;

pub use chunk::{Chunk, ChunkMeta, Chunker};
pub use config::{Config, ConfigError};
pub use error::{Error, IncludeError, ProcessorError, Result};
pub use pipeline::{BuildReport, Converted, Pipeline};
pub use processor::{Asciidoctor, DocbookPassthrough, MarkupProcessor, Preprocessor};
pub use refpage::Refpage;
pub use registry::{DuplicatePolicy, Location, Registry};
pub use rewrite::{rewrite, RewriteOptions, RewriteReport};
