//! Convert the DocBook Element Tree to the Document Tree
//!
//! Conversion is a recursive dispatch on [`ElementKind`]. `level` tracks
//! section nesting: section-like elements convert their children one level
//! deeper and titles become headings at `level + 1`.

mod lists;
mod media;
mod validity;

use std::fmt;

use vkdoc_core::markers::{heading_prefix, xref_label, xref_url};
use vkdoc_core::{walk, Directive, Node};

use crate::element::{trim_padding, Element, ElementKind, ElementNode, InstructionKind};
use crate::{ConvertError, Result};

/// What kind of document is being converted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// The master specification, later split into chunks
    Master,
    /// An independently addressable reference page
    Page,
}

impl DocumentKind {
    /// Level the root's children are converted at
    pub fn start_level(self) -> i32 {
        match self {
            DocumentKind::Master => -1,
            DocumentKind::Page => -2,
        }
    }
}

/// A best-effort degradation recorded during conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownElement(String),
    UnknownInstruction(String),
    /// An element was missing an attribute it needs and was dropped
    MissingAttribute { element: String, attribute: String },
    /// A validity list item without an anchor naming it
    UnnamedValidityItem,
    /// A footnote definition nothing in the document refers to
    UnreferencedFootnote(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownElement(name) => write!(f, "unknown element <{name}>"),
            Diagnostic::UnknownInstruction(name) => {
                write!(f, "unknown processing instruction <?{name}?>")
            }
            Diagnostic::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> without `{attribute}` dropped")
            }
            Diagnostic::UnnamedValidityItem => write!(f, "validity item without anchor dropped"),
            Diagnostic::UnreferencedFootnote(id) => {
                write!(f, "footnote [^{id}] is defined but never referenced")
            }
        }
    }
}

/// Element Tree to Document Tree converter
#[derive(Debug, Default)]
pub struct Converter {
    diagnostics: Vec<Diagnostic>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics recorded since the last [`Converter::take_diagnostics`]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Convert a whole document.
    ///
    /// `root` must be the synthetic `root` wrapper produced by
    /// [`parse_fragment`](crate::parse_fragment).
    pub fn convert_document(&mut self, root: &Element, kind: DocumentKind) -> Result<Vec<Node>> {
        if root.kind != ElementKind::Root {
            return Err(ConvertError::UnexpectedRoot(root.name().to_string()));
        }
        let nodes = self.convert_all(&root.children, kind.start_level())?;
        self.check_footnotes(&nodes);
        Ok(nodes)
    }

    /// Diagnose footnote definitions without a matching reference
    fn check_footnotes(&mut self, nodes: &[Node]) {
        let mut references: Vec<String> = Vec::new();
        let mut definitions: Vec<String> = Vec::new();
        walk(nodes, &mut |node| match node {
            Node::FootnoteReference { id } => references.push(id.clone()),
            Node::FootnoteDefinition { id, .. } => definitions.push(id.clone()),
            _ => {}
        });

        for id in definitions {
            if !references.contains(&id) {
                self.diagnose(Diagnostic::UnreferencedFootnote(id));
            }
        }
    }

    /// Convert a single node at the given nesting level
    pub fn convert(&mut self, node: &ElementNode, level: i32) -> Result<Vec<Node>> {
        match node {
            ElementNode::Text(text) if text == "\n" => Ok(vec![Node::text("\n\n")]),
            ElementNode::Text(text) => Ok(vec![Node::text(text.as_str())]),
            ElementNode::Element(element) => self.convert_element(element, level),
            ElementNode::Instruction(InstructionKind::PageBreak) => Ok(Vec::new()),
            ElementNode::Instruction(InstructionKind::LineBreak) => Ok(vec![Node::Break]),
            ElementNode::Instruction(InstructionKind::Unknown(name)) => {
                self.diagnose(Diagnostic::UnknownInstruction(name.clone()));
                Ok(Vec::new())
            }
        }
    }

    pub(crate) fn convert_all(&mut self, nodes: &[ElementNode], level: i32) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        for node in nodes {
            out.extend(self.convert(node, level)?);
        }
        Ok(out)
    }

    fn convert_element(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        use ElementKind as K;

        match &element.kind {
            K::Simpara | K::Para => self.convert_paragraph(element, level),

            K::Title => Ok(vec![Node::Heading {
                depth: heading_depth(level),
                children: self.convert_all(&element.children, level)?,
            }]),

            K::Section | K::Simplesect | K::Chapter | K::Appendix | K::Preface | K::Part => {
                self.convert_section(element, level)
            }

            K::Emphasis => {
                let children = self.convert_all(&element.children, level)?;
                match element.attr("role") {
                    Some("strong") | Some("bold") => Ok(vec![Node::Strong(children)]),
                    _ => Ok(vec![Node::Emphasis(children)]),
                }
            }

            K::Quote => match element.sole_text() {
                Some(text) => Ok(vec![Node::InlineCode(text.to_string())]),
                None => Ok(vec![Node::Blockquote(
                    self.convert_all(&element.children, level)?,
                )]),
            },

            K::Literal => match element.sole_text() {
                Some(text) => Ok(vec![Node::InlineCode(text.to_string())]),
                None => self.convert_all(&element.children, level),
            },

            K::Phrase | K::Root => self.convert_all(&element.children, level),

            K::Blockquote => Ok(vec![Node::Blockquote(
                self.convert_all(trim_padding(&element.children), level)?,
            )]),

            K::Superscript => {
                if element.sole_text() == Some("1") {
                    return Ok(vec![Node::FootnoteReference {
                        id: "1".to_string(),
                    }]);
                }
                self.wrap_raw("sup", element, level)
            }

            K::Subscript => self.wrap_raw("sub", element, level),

            K::ProgramListing | K::Screen | K::LiteralLayout => Ok(vec![Node::Code {
                value: element.text_content(),
                language: element.attr("language").map(str::to_string),
            }]),

            K::ItemizedList => self.convert_list(element, false, level),
            K::OrderedList => self.convert_list(element, true, level),
            K::VariableList => self.convert_variable_list(element, level),
            // Stray entries outside a variablelist
            K::VarListEntry => self.convert_entries(std::iter::once(element), level),

            K::Note | K::Warning | K::Important | K::Tip | K::Caution => {
                self.convert_admonition(element, level)
            }

            K::Xref => match element.attr("linkend") {
                Some(target) => Ok(vec![Node::Link {
                    url: xref_url(target),
                    children: vec![Node::text(xref_label(target))],
                }]),
                None => {
                    self.missing_attribute(element, "linkend");
                    Ok(Vec::new())
                }
            },

            K::Anchor => match element.id() {
                Some(id) => Ok(vec![Node::anchor(id)]),
                None => {
                    self.missing_attribute(element, "xml:id");
                    Ok(Vec::new())
                }
            },

            K::Link => self.convert_link(element, level),

            K::Figure | K::InformalFigure | K::MediaObject | K::InlineMediaObject => {
                self.convert_image(element)
            }

            K::Sidebar => self.convert_sidebar(element, level),

            // Tables are rendered out of band; index terms have no visible output
            K::Table | K::InformalTable | K::IndexTerm => Ok(Vec::new()),

            K::ListItem
            | K::Term
            | K::ImageObject
            | K::ImageData
            | K::TextObject
            | K::Alt
            | K::Unknown(_) => {
                self.diagnose(Diagnostic::UnknownElement(element.name().to_string()));
                Ok(Vec::new())
            }
        }
    }

    fn convert_paragraph(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        if let Some(id) = element.id() {
            out.push(Node::anchor(id));
        }

        let children = self.convert_all(&element.children, level)?;
        if !children.iter().all(Node::is_blank) {
            out.push(Node::Paragraph(children));
        }
        Ok(out)
    }

    fn convert_section(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        let level = level + 1;
        let has_title = element.find_child(&ElementKind::Title).is_some();
        let mut prefix = element
            .id()
            .map(|id| heading_prefix(id, element.kind == ElementKind::Appendix));

        let mut out = Vec::new();
        if !has_title {
            if let Some(id) = element.id() {
                out.push(Node::anchor(id));
            }
            prefix = None;
        }

        for child in &element.children {
            let mut converted = self.convert(child, level)?;
            if child.is_element_of(&ElementKind::Title) {
                if let Some(prefix) = prefix.take() {
                    inject_heading_prefix(&mut converted, &prefix);
                }
            }
            out.extend(converted);
        }
        Ok(out)
    }

    fn convert_admonition(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        let label = admonition_label(&element.kind);
        let mut children = trim_padding(&element.children);

        if let [ElementNode::Element(title), rest @ ..] = children {
            let is_label = title
                .children
                .first()
                .and_then(ElementNode::as_text)
                .is_some_and(|text| text == label);
            if title.is(&ElementKind::Title) && !rest.is_empty() && is_label {
                children = trim_padding(rest);
            }
        }

        let converted = self.convert_all(children, level)?;
        Ok(vec![Node::Directive(Directive::block(element.name(), converted))])
    }

    fn convert_link(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        let children = self.convert_all(&element.children, level)?;

        if let Some(href) = element.href() {
            return Ok(vec![Node::Link {
                url: href.to_string(),
                children,
            }]);
        }

        match element.attr("linkend") {
            Some(target) => {
                let children = if children.iter().all(Node::is_blank) {
                    vec![Node::text(xref_label(target))]
                } else {
                    children
                };
                Ok(vec![Node::Link {
                    url: xref_url(target),
                    children,
                }])
            }
            None => Ok(children),
        }
    }

    /// Surround converted children with raw `<tag>` markup
    fn wrap_raw(&mut self, tag: &str, element: &Element, level: i32) -> Result<Vec<Node>> {
        let mut out = vec![Node::Html(format!("<{tag}>"))];
        out.extend(self.convert_all(&element.children, level)?);
        out.push(Node::Html(format!("</{tag}>")));
        Ok(out)
    }

    pub(crate) fn missing_attribute(&mut self, element: &Element, attribute: &str) {
        self.diagnose(Diagnostic::MissingAttribute {
            element: element.name().to_string(),
            attribute: attribute.to_string(),
        });
    }

    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Heading depth for a title converted at `level`
pub fn heading_depth(level: i32) -> u8 {
    (level + 1).clamp(1, 6) as u8
}

fn admonition_label(kind: &ElementKind) -> &'static str {
    match kind {
        ElementKind::Warning => "Warning",
        ElementKind::Important => "Important",
        ElementKind::Tip => "Tip",
        ElementKind::Caution => "Caution",
        _ => "Note",
    }
}

/// Prepend `prefix` to the first text of the first heading in `nodes`
fn inject_heading_prefix(nodes: &mut [Node], prefix: &str) {
    let Some(Node::Heading { children, .. }) = nodes
        .iter_mut()
        .find(|n| matches!(n, Node::Heading { .. }))
    else {
        return;
    };

    match children.first_mut() {
        Some(Node::Text(text)) => text.insert_str(0, prefix),
        _ => children.insert(0, Node::text(prefix)),
    }
}
