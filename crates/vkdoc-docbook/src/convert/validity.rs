//! Validity sidebars
//!
//! Reference pages end with sidebars listing valid usage statements and
//! host synchronization requirements. Those become directive groups the
//! renderer lays out specially; every other sidebar is dropped.

use vkdoc_core::{Directive, Node};

use super::{Converter, Diagnostic};
use crate::element::{trim_padding, Element, ElementKind, ElementNode};
use crate::Result;

const VALID_USAGE: &str = "Valid Usage";
const VALID_USAGE_IMPLICIT: &str = "Valid Usage (Implicit)";
const HOST_SYNCHRONIZATION: &str = "Host Synchronization";
/// Unsubstituted attribute reference used for the host synchronization title
const EXTERNSYNC_TITLE: &str = "{externsynctitle}";

const GROUP_DIRECTIVE: &str = "validity-group";
const FIELD_DIRECTIVE: &str = "validity-field";
const BOX_DIRECTIVE: &str = "validity-box";

impl Converter {
    pub(super) fn convert_sidebar(&mut self, element: &Element, level: i32) -> Result<Vec<Node>> {
        let children = trim_padding(&element.children);
        let title = children
            .iter()
            .filter_map(ElementNode::as_element)
            .find(|e| e.is(&ElementKind::Title))
            .map(|title| title.text_content());
        let list = children
            .iter()
            .filter_map(ElementNode::as_element)
            .find(|e| e.is(&ElementKind::ItemizedList));

        let (title, list) = match (title, list) {
            (Some(title), Some(list)) => (title, list),
            (title, _) => {
                log::debug!("dropping sidebar {:?}", title.unwrap_or_default());
                return Ok(Vec::new());
            }
        };

        match title.trim() {
            name @ (VALID_USAGE | VALID_USAGE_IMPLICIT) => {
                let mut fields = Vec::new();
                for item in list
                    .element_children()
                    .filter(|e| e.is(&ElementKind::ListItem))
                {
                    if let Some(field) = self.convert_validity_item(item, level)? {
                        fields.push(field);
                    }
                }
                let group = Directive::block(GROUP_DIRECTIVE, fields).with_attr("name", name);
                Ok(vec![Node::Directive(group)])
            }
            HOST_SYNCHRONIZATION | EXTERNSYNC_TITLE => {
                let mut children = vec![Node::heading(3, HOST_SYNCHRONIZATION)];
                children.extend(self.convert_list(list, false, level)?);
                let boxed = Directive::block(BOX_DIRECTIVE, children)
                    .with_attr("name", HOST_SYNCHRONIZATION);
                Ok(vec![Node::Directive(boxed)])
            }
            other => {
                log::debug!("dropping sidebar {other:?}");
                Ok(Vec::new())
            }
        }
    }

    /// One valid usage statement, named by the anchor inside its paragraph
    fn convert_validity_item(&mut self, item: &Element, level: i32) -> Result<Option<Node>> {
        let Some(para) = item
            .element_children()
            .find(|e| e.is(&ElementKind::Simpara) || e.is(&ElementKind::Para))
        else {
            self.diagnose(Diagnostic::UnnamedValidityItem);
            return Ok(None);
        };

        let anchor = para
            .children
            .iter()
            .enumerate()
            .find_map(|(i, child)| match child {
                ElementNode::Element(e) if e.is(&ElementKind::Anchor) => Some((i, e)),
                _ => None,
            });
        let Some((index, name)) = anchor.and_then(|(i, e)| e.id().map(|id| (i, id))) else {
            self.diagnose(Diagnostic::UnnamedValidityItem);
            return Ok(None);
        };

        let rest = trim_padding(&para.children[index + 1..]);
        let mut children = vec![Node::anchor(name)];
        let body = self.convert_all(rest, level)?;
        if !body.iter().all(Node::is_blank) {
            children.push(Node::Paragraph(body));
        }

        let field = Directive::block(FIELD_DIRECTIVE, children).with_attr("name", name);
        Ok(Some(Node::Directive(field)))
    }
}
