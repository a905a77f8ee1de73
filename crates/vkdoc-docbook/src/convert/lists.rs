//! Itemized, ordered and variable lists

use vkdoc_core::{ListItem, Node};

use super::Converter;
use crate::element::{trim_padding, Element, ElementKind, ElementNode};
use crate::Result;

/// Depth of the heading emitted for each variable list term
const TERM_HEADING_DEPTH: u8 = 6;

/// How a `varlistentry` is rendered, decided by its terms
enum EntryShape<'a> {
    /// A single numeric term: the body of footnote `id`
    Footnote(String),
    /// No meaningful term: a plain list item
    Bare,
    /// One heading per term, then the body
    Terms(Vec<&'a Element>),
}

impl Converter {
    pub(super) fn convert_list(
        &mut self,
        element: &Element,
        ordered: bool,
        level: i32,
    ) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        for item in element
            .element_children()
            .filter(|e| e.is(&ElementKind::ListItem))
        {
            let children = self.convert_all(trim_padding(&item.children), level)?;
            items.push(ListItem::new(children));
        }

        if items.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Node::List { ordered, items }])
    }

    pub(super) fn convert_variable_list(
        &mut self,
        element: &Element,
        level: i32,
    ) -> Result<Vec<Node>> {
        let entries = element
            .element_children()
            .filter(|e| e.is(&ElementKind::VarListEntry));
        self.convert_entries(entries, level)
    }

    /// Convert `varlistentry` elements, grouping consecutive bare items into one list
    pub(super) fn convert_entries<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a Element>,
        level: i32,
    ) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        let mut bare_items = Vec::new();

        for entry in entries {
            let body = entry
                .find_child(&ElementKind::ListItem)
                .map(|item| trim_padding(&item.children))
                .unwrap_or(&[]);

            match entry_shape(entry) {
                EntryShape::Bare => {
                    let children = self.convert_all(skip_leading_blank(body), level)?;
                    bare_items.push(ListItem::new(children));
                }
                EntryShape::Footnote(id) => {
                    flush_bare_items(&mut bare_items, &mut out);
                    let children = self.convert_all(body, level)?;
                    out.push(Node::FootnoteDefinition { id, children });
                }
                EntryShape::Terms(terms) => {
                    flush_bare_items(&mut bare_items, &mut out);
                    for term in terms {
                        out.push(Node::Heading {
                            depth: TERM_HEADING_DEPTH,
                            children: self.convert_all(&term.children, level)?,
                        });
                    }
                    out.extend(self.convert_all(body, level)?);
                }
            }
        }

        flush_bare_items(&mut bare_items, &mut out);
        Ok(out)
    }
}

fn entry_shape(entry: &Element) -> EntryShape<'_> {
    let terms: Vec<&Element> = entry
        .element_children()
        .filter(|e| e.is(&ElementKind::Term))
        .collect();

    if terms.iter().all(|term| is_placeholder(&term.text_content())) {
        return EntryShape::Bare;
    }

    if let [term] = terms.as_slice() {
        let text = term.text_content();
        let text = text.trim();
        if text.chars().all(|c| c.is_ascii_digit()) {
            return EntryShape::Footnote(text.to_string());
        }
    }

    EntryShape::Terms(terms)
}

/// Empty terms, or terms holding only whitespace and zero-width spaces
fn is_placeholder(term: &str) -> bool {
    term.chars().all(|c| c.is_whitespace() || c == '\u{200b}')
}

fn skip_leading_blank(nodes: &[ElementNode]) -> &[ElementNode] {
    let start = nodes
        .iter()
        .position(|n| !n.is_blank_text())
        .unwrap_or(nodes.len());
    &nodes[start..]
}

fn flush_bare_items(items: &mut Vec<ListItem>, out: &mut Vec<Node>) {
    if !items.is_empty() {
        out.push(Node::List {
            ordered: false,
            items: std::mem::take(items),
        });
    }
}
