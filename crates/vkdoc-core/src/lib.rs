//! vkdoc-core - Document Tree and Markdown serialization
//!
//! This crate provides the output data model of the DocBook converter and the
//! serializer that turns it into Markdown. It is shared by `vkdoc-docbook`
//! (which produces trees) and `vkdoc` (which chunks, cross-links and writes them).
//!
//! # Architecture
//!
//! ```text
//! Element Tree ──convert──▶ ┌───────────────┐ ──chunk / xref──▶ ┌───────────────┐
//!                           │ Document Tree │                   │ Document Tree │ ──▶ Markdown
//!                           └───────────────┘                   └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use vkdoc_core::{serialize, Directive, Node, Options};
//!
//! let tree = vec![
//!     Node::heading(1, "#fundamentals Fundamentals"),
//!     Node::Directive(Directive::block(
//!         "note",
//!         vec![Node::Paragraph(vec![Node::text("Read this first.")])],
//!     )),
//! ];
//!
//! let markdown = serialize(&tree, &Options::default());
//! assert!(markdown.starts_with("# Fundamentals {#fundamentals}"));
//! ```

mod ast;
pub mod markers;
mod options;
mod serialize;

pub use ast::{walk, walk_mut, Directive, DirectiveKind, ListItem, Node, ANCHOR_DIRECTIVE};
pub use options::{HeadingIdStyle, Options};
pub use serialize::serialize;
