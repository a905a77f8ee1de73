//! Element Tree produced by the upstream markup processor.
//!
//! This module provides the generic tagged tree the converter consumes. Any
//! producer (the bundled XML parser, a test, another processor binding) builds
//! these nodes; element names are classified once into [`ElementKind`] so the
//! converter can match exhaustively.

use indexmap::IndexMap;

/// DocBook element names the converter knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Synthetic wrapper around a processor's output
    Root,
    Simpara,
    Para,
    Title,
    Section,
    Simplesect,
    Chapter,
    Appendix,
    Preface,
    Part,
    Emphasis,
    Quote,
    Literal,
    Phrase,
    Blockquote,
    Superscript,
    Subscript,
    ProgramListing,
    Screen,
    LiteralLayout,
    ItemizedList,
    OrderedList,
    ListItem,
    VariableList,
    VarListEntry,
    Term,
    Note,
    Warning,
    Important,
    Tip,
    Caution,
    Xref,
    Anchor,
    Link,
    Figure,
    InformalFigure,
    MediaObject,
    InlineMediaObject,
    ImageObject,
    ImageData,
    TextObject,
    Alt,
    Sidebar,
    Table,
    InformalTable,
    IndexTerm,
    /// Any other element, kept by name
    Unknown(String),
}

impl ElementKind {
    /// Classify an element by its local name
    pub fn from_name(name: &str) -> Self {
        match name {
            "root" => Self::Root,
            "simpara" => Self::Simpara,
            "para" => Self::Para,
            "title" => Self::Title,
            "section" => Self::Section,
            "simplesect" => Self::Simplesect,
            "chapter" => Self::Chapter,
            "appendix" => Self::Appendix,
            "preface" => Self::Preface,
            "part" => Self::Part,
            "emphasis" => Self::Emphasis,
            "quote" => Self::Quote,
            "literal" => Self::Literal,
            "phrase" => Self::Phrase,
            "blockquote" => Self::Blockquote,
            "superscript" => Self::Superscript,
            "subscript" => Self::Subscript,
            "programlisting" => Self::ProgramListing,
            "screen" => Self::Screen,
            "literallayout" => Self::LiteralLayout,
            "itemizedlist" => Self::ItemizedList,
            "orderedlist" => Self::OrderedList,
            "listitem" => Self::ListItem,
            "variablelist" => Self::VariableList,
            "varlistentry" => Self::VarListEntry,
            "term" => Self::Term,
            "note" => Self::Note,
            "warning" => Self::Warning,
            "important" => Self::Important,
            "tip" => Self::Tip,
            "caution" => Self::Caution,
            "xref" => Self::Xref,
            "anchor" => Self::Anchor,
            "link" => Self::Link,
            "figure" => Self::Figure,
            "informalfigure" => Self::InformalFigure,
            "mediaobject" => Self::MediaObject,
            "inlinemediaobject" => Self::InlineMediaObject,
            "imageobject" => Self::ImageObject,
            "imagedata" => Self::ImageData,
            "textobject" => Self::TextObject,
            "alt" => Self::Alt,
            "sidebar" => Self::Sidebar,
            "table" => Self::Table,
            "informaltable" => Self::InformalTable,
            "indexterm" => Self::IndexTerm,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The element name as it appears in markup
    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Simpara => "simpara",
            Self::Para => "para",
            Self::Title => "title",
            Self::Section => "section",
            Self::Simplesect => "simplesect",
            Self::Chapter => "chapter",
            Self::Appendix => "appendix",
            Self::Preface => "preface",
            Self::Part => "part",
            Self::Emphasis => "emphasis",
            Self::Quote => "quote",
            Self::Literal => "literal",
            Self::Phrase => "phrase",
            Self::Blockquote => "blockquote",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::ProgramListing => "programlisting",
            Self::Screen => "screen",
            Self::LiteralLayout => "literallayout",
            Self::ItemizedList => "itemizedlist",
            Self::OrderedList => "orderedlist",
            Self::ListItem => "listitem",
            Self::VariableList => "variablelist",
            Self::VarListEntry => "varlistentry",
            Self::Term => "term",
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Important => "important",
            Self::Tip => "tip",
            Self::Caution => "caution",
            Self::Xref => "xref",
            Self::Anchor => "anchor",
            Self::Link => "link",
            Self::Figure => "figure",
            Self::InformalFigure => "informalfigure",
            Self::MediaObject => "mediaobject",
            Self::InlineMediaObject => "inlinemediaobject",
            Self::ImageObject => "imageobject",
            Self::ImageData => "imagedata",
            Self::TextObject => "textobject",
            Self::Alt => "alt",
            Self::Sidebar => "sidebar",
            Self::Table => "table",
            Self::InformalTable => "informaltable",
            Self::IndexTerm => "indexterm",
            Self::Unknown(name) => name,
        }
    }
}

/// Processing instructions emitted by the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// `<?asciidoc-pagebreak?>`
    PageBreak,
    /// `<?asciidoc-br?>`
    LineBreak,
    Unknown(String),
}

impl InstructionKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "asciidoc-pagebreak" => Self::PageBreak,
            "asciidoc-br" => Self::LineBreak,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PageBreak => "asciidoc-pagebreak",
            Self::LineBreak => "asciidoc-br",
            Self::Unknown(name) => name,
        }
    }
}

/// A node of the Element Tree
#[derive(Debug, Clone, PartialEq)]
pub enum ElementNode {
    Text(String),
    Element(Element),
    Instruction(InstructionKind),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<ElementNode>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an element from its markup name
    pub fn named(name: &str) -> Self {
        Self::new(ElementKind::from_name(name))
    }

    /// Builder: set an attribute
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child node
    pub fn with_child(mut self, child: impl Into<ElementNode>) -> Self {
        self.add_child(child);
        self
    }

    /// Builder: append a text child
    pub fn with_text(self, text: &str) -> Self {
        self.with_child(ElementNode::text(text))
    }

    pub fn add_child(&mut self, child: impl Into<ElementNode>) {
        self.children.push(child.into());
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn name(&self) -> &str {
        self.kind.as_str()
    }

    pub fn is(&self, kind: &ElementKind) -> bool {
        &self.kind == kind
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The element's id (`xml:id`, falling back to `id`)
    pub fn id(&self) -> Option<&str> {
        self.attr("xml:id")
            .or_else(|| self.attr("id"))
            .filter(|id| !id.is_empty())
    }

    /// The element's link target (`xl:href`, `xlink:href` or `href`)
    pub fn href(&self) -> Option<&str> {
        self.attr("xl:href")
            .or_else(|| self.attr("xlink:href"))
            .or_else(|| self.attr("href"))
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(ElementNode::as_element)
    }

    /// First element child of the given kind
    pub fn find_child(&self, kind: &ElementKind) -> Option<&Element> {
        self.element_children().find(|e| e.is(kind))
    }

    /// First descendant (depth-first) of the given kind
    pub fn find_descendant(&self, kind: &ElementKind) -> Option<&Element> {
        self.element_children()
            .find_map(|e| if e.is(kind) { Some(e) } else { e.find_descendant(kind) })
    }

    /// The single text child, if that is all this element holds
    pub fn sole_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [ElementNode::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Get all text content from this element and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }
}

impl ElementNode {
    pub fn text(content: &str) -> Self {
        ElementNode::Text(content.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ElementNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ElementNode::Text(text) => Some(text),
            _ => None,
        }
    }

    /// A text node holding exactly one newline
    pub fn is_lone_newline(&self) -> bool {
        self.as_text() == Some("\n")
    }

    /// A text node holding only whitespace
    pub fn is_blank_text(&self) -> bool {
        self.as_text().is_some_and(|t| t.trim().is_empty())
    }

    pub fn is_element_of(&self, kind: &ElementKind) -> bool {
        self.as_element().is_some_and(|e| e.is(kind))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text_content(&mut out);
        out
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            ElementNode::Text(text) => out.push_str(text),
            ElementNode::Element(element) => {
                for child in &element.children {
                    child.push_text_content(out);
                }
            }
            ElementNode::Instruction(_) => {}
        }
    }
}

impl From<Element> for ElementNode {
    fn from(element: Element) -> Self {
        ElementNode::Element(element)
    }
}

impl From<InstructionKind> for ElementNode {
    fn from(kind: InstructionKind) -> Self {
        ElementNode::Instruction(kind)
    }
}

/// Drop a leading and a trailing lone-newline text node.
///
/// Each side is only trimmed while more than one node remains, so a sequence
/// consisting of a single newline is left as is.
pub fn trim_padding(children: &[ElementNode]) -> &[ElementNode] {
    let mut slice = children;
    if slice.len() > 1 && slice[0].is_lone_newline() {
        slice = &slice[1..];
    }
    if slice.len() > 1 && slice[slice.len() - 1].is_lone_newline() {
        slice = &slice[..slice.len() - 1];
    }
    slice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_names() {
        assert_eq!(ElementKind::from_name("simpara"), ElementKind::Simpara);
        assert_eq!(
            ElementKind::from_name("bibliography"),
            ElementKind::Unknown("bibliography".to_string())
        );
        assert_eq!(ElementKind::from_name("bibliography").as_str(), "bibliography");
        assert_eq!(ElementKind::VarListEntry.as_str(), "varlistentry");
    }

    #[test]
    fn test_id_lookup() {
        let e = Element::named("section").with_attr("xml:id", "fundamentals");
        assert_eq!(e.id(), Some("fundamentals"));
        let e = Element::named("section").with_attr("id", "legacy");
        assert_eq!(e.id(), Some("legacy"));
        let e = Element::named("section").with_attr("xml:id", "");
        assert_eq!(e.id(), None);
    }

    #[test]
    fn test_href_lookup() {
        let e = Element::named("link").with_attr("xl:href", "https://khronos.org");
        assert_eq!(e.href(), Some("https://khronos.org"));
    }

    #[test]
    fn test_text_content() {
        let e = Element::named("simpara")
            .with_text("Hello ")
            .with_child(Element::named("emphasis").with_text("World"))
            .with_child(InstructionKind::LineBreak);
        assert_eq!(e.text_content(), "Hello World");
    }

    #[test]
    fn test_sole_text() {
        assert_eq!(Element::named("literal").with_text("x").sole_text(), Some("x"));
        assert_eq!(
            Element::named("literal").with_text("x").with_text("y").sole_text(),
            None
        );
    }

    #[test]
    fn test_find_descendant() {
        let figure = Element::named("figure").with_child(
            Element::named("mediaobject").with_child(
                Element::named("imageobject")
                    .with_child(Element::named("imagedata").with_attr("fileref", "a.svg")),
            ),
        );
        let data = figure.find_descendant(&ElementKind::ImageData).unwrap();
        assert_eq!(data.attr("fileref"), Some("a.svg"));
    }

    #[test]
    fn test_trim_padding() {
        let nodes = vec![
            ElementNode::text("\n"),
            ElementNode::text("body"),
            ElementNode::text("\n"),
        ];
        assert_eq!(trim_padding(&nodes), &nodes[1..2]);

        let single = vec![ElementNode::text("\n")];
        assert_eq!(trim_padding(&single).len(), 1);

        let pair = vec![ElementNode::text("\n"), ElementNode::text("\n")];
        assert_eq!(trim_padding(&pair).len(), 1);
    }
}
