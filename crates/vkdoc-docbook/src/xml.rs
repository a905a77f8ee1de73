//! DocBook XML parsing support.
//!
//! This module parses the processor's DocBook output into the Element Tree.
//! The output is a fragment (several sibling elements), so it is wrapped in a
//! synthetic `<root>` element before parsing.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::element::{Element, ElementKind, ElementNode, InstructionKind};

/// Error raised while parsing DocBook XML
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("unclosed element <{0}>")]
    Unclosed(String),
}

/// Parse a DocBook fragment into a `root` element.
///
/// # Example
///
/// ```rust
/// use vkdoc_docbook::{parse_fragment, ElementKind};
///
/// let root = parse_fragment("<simpara>Hello <emphasis>World</emphasis></simpara>").unwrap();
/// assert_eq!(root.kind, ElementKind::Root);
/// assert_eq!(root.text_content(), "Hello World");
/// ```
pub fn parse_fragment(xml: &str) -> Result<Element, XmlError> {
    let wrapped = format!("<root>{xml}</root>");
    let mut reader = Reader::from_str(&wrapped);

    // Open elements, innermost last; the synthetic root is pushed by the first Start event
    let mut stack: Vec<Element> = Vec::new();
    let mut text = String::new();
    let mut finished: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                flush_text(&mut text, &mut stack);
                stack.push(start_element(&e));
            }
            Event::Empty(e) => {
                flush_text(&mut text, &mut stack);
                let element = start_element(&e);
                if let Some(parent) = stack.last_mut() {
                    parent.add_child(element);
                }
            }
            Event::End(e) => {
                flush_text(&mut text, &mut stack);
                let name = e.name();
                let local = String::from_utf8_lossy(local_name(name.as_ref())).into_owned();
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::UnexpectedClose(local.clone()))?;
                if element.name() != local {
                    return Err(XmlError::UnexpectedClose(local));
                }
                match stack.last_mut() {
                    Some(parent) => parent.add_child(element),
                    None => finished = Some(element),
                }
            }
            Event::Text(e) => {
                if !stack.is_empty() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::CData(e) => {
                if !stack.is_empty() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(resolved) => text.push_str(&resolved),
                    None => {
                        log::debug!("unresolved entity &{entity};");
                        text.push('&');
                        text.push_str(&entity);
                        text.push(';');
                    }
                }
            }
            Event::PI(e) => {
                flush_text(&mut text, &mut stack);
                let target = String::from_utf8_lossy(e.target()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.add_child(InstructionKind::from_name(&target));
                }
            }
            Event::Eof => break,
            // Comments, declarations and doctypes carry no content
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name().to_string()));
    }

    Ok(finished.unwrap_or_else(|| Element::new(ElementKind::Root)))
}

fn start_element(e: &BytesStart) -> Element {
    let name = e.name();
    let mut element = Element::named(&String::from_utf8_lossy(local_name(name.as_ref())));

    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = match unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw,
        };
        element.attributes.insert(key, value);
    }

    element
}

fn flush_text(text: &mut String, stack: &mut [Element]) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.add_child(ElementNode::Text(std::mem::take(text)));
    } else {
        text.clear();
    }
}

/// Strip a namespace prefix from an element name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{a0}".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fragment() {
        let root = parse_fragment("<simpara>Hello World</simpara>").unwrap();
        assert_eq!(root.kind, ElementKind::Root);
        let para = root.find_child(&ElementKind::Simpara).unwrap();
        assert_eq!(para.sole_text(), Some("Hello World"));
    }

    #[test]
    fn test_namespaced_attributes_are_kept() {
        let root = parse_fragment(
            r#"<section xml:id="fundamentals"><title>Fundamentals</title></section>"#,
        )
        .unwrap();
        let section = root.find_child(&ElementKind::Section).unwrap();
        assert_eq!(section.id(), Some("fundamentals"));
    }

    #[test]
    fn test_entities_merge_into_one_text_node() {
        let root = parse_fragment("<literal>a &amp;&amp; b&#8594;c</literal>").unwrap();
        let literal = root.find_child(&ElementKind::Literal).unwrap();
        assert_eq!(literal.sole_text(), Some("a && b\u{2192}c"));
    }

    #[test]
    fn test_newline_text_nodes_survive() {
        let root = parse_fragment("<note>\n<simpara>x</simpara>\n</note>").unwrap();
        let note = root.find_child(&ElementKind::Note).unwrap();
        assert_eq!(note.children.len(), 3);
        assert!(note.children[0].is_lone_newline());
    }

    #[test]
    fn test_processing_instructions() {
        let root = parse_fragment("<simpara>a<?asciidoc-br?>b</simpara><?asciidoc-pagebreak?>")
            .unwrap();
        let para = root.find_child(&ElementKind::Simpara).unwrap();
        assert_eq!(
            para.children[1],
            ElementNode::Instruction(InstructionKind::LineBreak)
        );
        assert_eq!(
            root.children[1],
            ElementNode::Instruction(InstructionKind::PageBreak)
        );
    }

    #[test]
    fn test_empty_elements() {
        let root = parse_fragment(r#"<simpara><anchor xml:id="VUID-1"/>text</simpara>"#).unwrap();
        let para = root.find_child(&ElementKind::Simpara).unwrap();
        let anchor = para.find_child(&ElementKind::Anchor).unwrap();
        assert_eq!(anchor.id(), Some("VUID-1"));
    }

    #[test]
    fn test_mismatched_tags_fail() {
        assert!(parse_fragment("<simpara><emphasis>x</simpara>").is_err());
    }
}
