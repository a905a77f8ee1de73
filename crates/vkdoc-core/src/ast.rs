//! Document Tree
//!
//! This module defines the block/inline nodes produced by the DocBook converter.
//! Block and inline kinds share one enum because DocBook freely mixes them
//! (a list item holds paragraphs, a paragraph holds anchors and links).

/// A node of the converted document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Block kinds
    /// Paragraph containing inline content
    Paragraph(Vec<Node>),

    /// Heading with a 1-based depth (1-6)
    Heading { depth: u8, children: Vec<Node> },

    /// List (ordered or unordered)
    List { ordered: bool, items: Vec<ListItem> },

    /// Fenced code block
    Code {
        value: String,
        language: Option<String>,
    },

    /// Block quote containing nested nodes
    Blockquote(Vec<Node>),

    /// Image with alt text, URL, and optional title
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },

    /// Hard line break
    Break,

    /// Footnote body, referenced by [`Node::FootnoteReference`]
    FootnoteDefinition { id: String, children: Vec<Node> },

    /// Semantic region with no native Markdown equivalent
    Directive(Directive),

    // Inline kinds
    /// Plain text
    Text(String),

    /// Emphasis (italic)
    Emphasis(Vec<Node>),

    /// Strong emphasis (bold)
    Strong(Vec<Node>),

    /// Inline code
    InlineCode(String),

    /// Link with content and URL
    Link { url: String, children: Vec<Node> },

    /// Reference to a footnote definition
    FootnoteReference { id: String },

    /// Raw markup passed through untouched
    Html(String),
}

/// A list item containing nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub children: Vec<Node>,
}

impl ListItem {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_blank(&self) -> bool {
        self.children.iter().all(|n| n.is_blank())
    }
}

/// Whether a directive wraps a block region or sits inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `::name{...}` ... `::`
    Block,
    /// `:name{...}`
    Inline,
}

/// A named semantic role (note, validity group, anchor, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub name: String,
    /// Attributes in emission order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Name of the inline directive marking a cross-reference target
pub const ANCHOR_DIRECTIVE: &str = "anchor";

impl Directive {
    /// Create a block directive wrapping `children`
    pub fn block(name: &str, children: Vec<Node>) -> Self {
        Self {
            kind: DirectiveKind::Block,
            name: name.to_string(),
            attributes: Vec::new(),
            children,
        }
    }

    /// Create an inline directive without content
    pub fn inline(name: &str) -> Self {
        Self {
            kind: DirectiveKind::Inline,
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, keeping insertion order
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The target id if this is an anchor marker
    pub fn anchor_id(&self) -> Option<&str> {
        if self.kind == DirectiveKind::Inline && self.name == ANCHOR_DIRECTIVE {
            self.attr("id")
        } else {
            None
        }
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Inline anchor marker for `id`
    pub fn anchor(id: &str) -> Self {
        Node::Directive(Directive::inline(ANCHOR_DIRECTIVE).with_attr("id", id))
    }

    /// Heading with a single text child
    pub fn heading(depth: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            depth,
            children: vec![Node::Text(text.into())],
        }
    }

    /// Check if this node is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Text(text) => text.trim().is_empty(),
            Node::Paragraph(children)
            | Node::Blockquote(children)
            | Node::Emphasis(children)
            | Node::Strong(children) => children.iter().all(|n| n.is_blank()),
            Node::Heading { children, .. } => children.iter().all(|n| n.is_blank()),
            Node::List { items, .. } => items.iter().all(|i| i.is_blank()),
            Node::Code { value, .. } => value.trim().is_empty(),
            Node::InlineCode(code) => code.is_empty(),
            Node::Html(html) => html.trim().is_empty(),
            // Links, images and markers carry meaning even without visible text
            Node::Link { .. }
            | Node::Image { .. }
            | Node::Break
            | Node::FootnoteReference { .. }
            | Node::FootnoteDefinition { .. }
            | Node::Directive(_) => false,
        }
    }

    /// Concatenated plain text of this node and its descendants
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Node::Text(t) | Node::InlineCode(t) => out.push_str(t),
            Node::Paragraph(children)
            | Node::Blockquote(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Heading { children, .. }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => {
                children.iter().for_each(|c| c.push_plain_text(out))
            }
            Node::Directive(directive) => directive
                .children
                .iter()
                .for_each(|c| c.push_plain_text(out)),
            Node::List { items, .. } => items
                .iter()
                .flat_map(|i| i.children.iter())
                .for_each(|c| c.push_plain_text(out)),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::Break => out.push('\n'),
            Node::Code { .. } | Node::FootnoteReference { .. } | Node::Html(_) => {}
        }
    }

    /// Direct children, if this node has any
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph(children)
            | Node::Blockquote(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Heading { children, .. }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => children,
            Node::Directive(directive) => &directive.children,
            _ => &[],
        }
    }
}

/// Visit every node in document order, descending into list items
pub fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        match node {
            Node::List { items, .. } => {
                for item in items {
                    walk(&item.children, visit);
                }
            }
            other => walk(other.children(), visit),
        }
    }
}

/// Mutable counterpart of [`walk`]; children are visited after their parent
pub fn walk_mut(nodes: &mut [Node], visit: &mut impl FnMut(&mut Node)) {
    for node in nodes.iter_mut() {
        visit(&mut *node);
        match node {
            Node::Paragraph(children)
            | Node::Blockquote(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Heading { children, .. }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => walk_mut(children, visit),
            Node::Directive(directive) => walk_mut(&mut directive.children, visit),
            Node::List { items, .. } => {
                for item in items.iter_mut() {
                    walk_mut(&mut item.children, visit);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_directive() {
        let node = Node::anchor("VUID-1");
        match &node {
            Node::Directive(d) => assert_eq!(d.anchor_id(), Some("VUID-1")),
            other => panic!("expected directive, got {other:?}"),
        }
        assert!(!node.is_blank());
    }

    #[test]
    fn test_block_directive_is_not_anchor() {
        let d = Directive::block("anchor", vec![]).with_attr("id", "x");
        assert_eq!(d.anchor_id(), None);
    }

    #[test]
    fn test_plain_text() {
        let node = Node::Paragraph(vec![
            Node::text("Call "),
            Node::InlineCode("vkCreateInstance".to_string()),
            Node::Emphasis(vec![Node::text(" now")]),
        ]);
        assert_eq!(node.plain_text(), "Call vkCreateInstance now");
    }

    #[test]
    fn test_blank() {
        assert!(Node::Paragraph(vec![Node::text("\n\n")]).is_blank());
        assert!(!Node::Paragraph(vec![Node::text("x")]).is_blank());
        assert!(!Node::Break.is_blank());
    }

    #[test]
    fn test_walk_visits_list_items_and_directives() {
        let tree = vec![Node::Directive(Directive::block(
            "note",
            vec![Node::List {
                ordered: false,
                items: vec![ListItem::new(vec![Node::anchor("deep")])],
            }],
        ))];
        let mut anchors = Vec::new();
        walk(&tree, &mut |n| {
            if let Node::Directive(d) = n {
                if let Some(id) = d.anchor_id() {
                    anchors.push(id.to_string());
                }
            }
        });
        assert_eq!(anchors, vec!["deep"]);
    }

    #[test]
    fn test_walk_mut_rewrites_nested_links() {
        let mut tree = vec![Node::Paragraph(vec![Node::Link {
            url: "a".to_string(),
            children: vec![],
        }])];
        walk_mut(&mut tree, &mut |n| {
            if let Node::Link { url, .. } = n {
                *url = "b".to_string();
            }
        });
        assert_eq!(
            tree,
            vec![Node::Paragraph(vec![Node::Link {
                url: "b".to_string(),
                children: vec![],
            }])]
        );
    }
}
