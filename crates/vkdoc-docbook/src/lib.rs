//! # vkdoc-docbook
//!
//! Convert DocBook element trees into the vkdoc Document Tree.
//!
//! ## Design
//!
//! The converter accepts a generic Element Tree ([`ElementNode`]) rather than
//! raw XML. This design allows:
//!
//! - **Parser agnostic**: any producer can build the tree
//! - **Exhaustive dispatch**: element names are classified into [`ElementKind`] once
//! - **Optional parsing**: the bundled [`parse_fragment`] sits behind the `xml` feature
//!
//! ## Example
//!
//! ```rust
//! use vkdoc_docbook::{parse_fragment, Converter, DocumentKind};
//! use vkdoc_core::Node;
//!
//! let root = parse_fragment(
//!     r#"<section xml:id="ov"><title>Overview</title><simpara>Hello</simpara></section>"#,
//! )
//! .unwrap();
//!
//! let mut converter = Converter::new();
//! let tree = converter.convert_document(&root, DocumentKind::Page).unwrap();
//! assert_eq!(tree[0], Node::heading(1, "#ov Overview"));
//! ```

mod convert;
pub mod element;
#[cfg(feature = "xml")]
mod xml;

pub use convert::{heading_depth, Converter, Diagnostic, DocumentKind};
pub use element::{Element, ElementKind, ElementNode, InstructionKind};
#[cfg(feature = "xml")]
pub use xml::{parse_fragment, XmlError};

/// Error raised when an Element Tree does not have the shape a rule expects
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("expected a <root> wrapper, found <{0}>")]
    UnexpectedRoot(String),

    #[error("malformed <{element}>: {reason}")]
    MalformedElement { element: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
