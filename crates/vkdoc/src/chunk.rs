//! Splitting the master document into chunks
//!
//! The master document converts to one long tree. It is cut at every
//! depth-1 heading; each piece gets a number (chapters and appendices are
//! counted separately), an id and a title read from its heading, and its
//! ids are registered as soon as it is cut.

use serde::{Deserialize, Serialize};
use vkdoc_core::markers::split_heading_prefix;
use vkdoc_core::Node;

use crate::registry::{Location, Registry};

/// Index record of one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Sequence number among chapters, or among appendices
    pub index: usize,
    pub appendix: bool,
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub meta: ChunkMeta,
    pub nodes: Vec<Node>,
}

impl Chunk {
    pub fn location(&self) -> Location {
        if self.meta.appendix {
            Location::Appendix(self.meta.index)
        } else {
            Location::Chapter(self.meta.index)
        }
    }
}

/// Splits a master Document Tree at depth-1 headings
#[derive(Debug, Default)]
pub struct Chunker {
    chapters: usize,
    appendices: usize,
    chunks: Vec<Chunk>,
}

impl Chunker {
    /// Split `nodes` into chunks, running registry collection on each.
    ///
    /// Content before the first depth-1 heading belongs to the first chunk,
    /// so `n` headings always yield `n` chunks, and a tree without any
    /// yields exactly one.
    pub fn split(nodes: Vec<Node>, registry: &mut Registry) -> Vec<Chunk> {
        let mut chunker = Chunker::default();
        let mut current = Vec::new();
        let mut seen_heading = false;

        for node in nodes {
            if is_chunk_heading(&node) {
                if seen_heading {
                    chunker.flush(std::mem::take(&mut current), registry);
                }
                seen_heading = true;
            }
            current.push(node);
        }
        chunker.flush(current, registry);

        chunker.chunks
    }

    fn flush(&mut self, nodes: Vec<Node>, registry: &mut Registry) {
        let heading = nodes.iter().find(|n| is_chunk_heading(n)).map(Node::plain_text);

        let (id, appendix, title) = match heading.as_deref() {
            Some(text) => match split_heading_prefix(text) {
                Some((prefix, rest)) => (
                    prefix.id.to_string(),
                    prefix.appendix,
                    rest.trim().to_string(),
                ),
                None => (slugify(text), false, text.trim().to_string()),
            },
            None => (String::new(), false, String::new()),
        };

        let counter = if appendix {
            &mut self.appendices
        } else {
            &mut self.chapters
        };
        let index = *counter;
        *counter += 1;

        let location = if appendix {
            Location::Appendix(index)
        } else {
            Location::Chapter(index)
        };
        registry.collect(&nodes, &location);
        log::debug!("chunk {} {id:?}: {title}", location.url());

        self.chunks.push(Chunk {
            meta: ChunkMeta {
                index,
                appendix,
                id,
                title,
                url: location.url(),
            },
            nodes,
        });
    }
}

fn is_chunk_heading(node: &Node) -> bool {
    matches!(node, Node::Heading { depth: 1, .. })
}

/// Convert heading text to a URL-safe id
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn para(text: &str) -> Node {
        Node::Paragraph(vec![Node::text(text)])
    }

    #[test]
    fn test_section_example_registers_chunk_zero() {
        let mut registry = Registry::new();
        let chunks = Chunker::split(
            vec![Node::heading(1, "#ov Overview"), para("Hello")],
            &mut registry,
        );

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].meta,
            ChunkMeta {
                index: 0,
                appendix: false,
                id: "ov".to_string(),
                title: "Overview".to_string(),
                url: "/chapters/0".to_string(),
            }
        );
        let entry = registry.get("ov").unwrap();
        assert_eq!(entry.url, "/chapters/0");
        assert_eq!(entry.title, "Overview");
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(4, 4)]
    fn test_chunk_count_matches_headings(#[case] headings: usize, #[case] expected: usize) {
        let mut nodes = vec![para("preamble")];
        for i in 0..headings {
            nodes.push(Node::heading(1, format!("#c{i} Chapter {i}")));
            nodes.push(Node::heading(2, "Sub"));
            nodes.push(para("body"));
        }

        let chunks = Chunker::split(nodes, &mut Registry::new());
        assert_eq!(chunks.len(), expected);
    }

    #[test]
    fn test_first_heading_never_makes_empty_chunk() {
        let chunks = Chunker::split(
            vec![Node::heading(1, "#a A"), Node::heading(1, "#b B")],
            &mut Registry::new(),
        );
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| !c.nodes.is_empty()));
    }

    #[test]
    fn test_preamble_joins_first_chunk() {
        let chunks = Chunker::split(
            vec![para("front matter"), Node::heading(1, "#intro Introduction")],
            &mut Registry::new(),
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].meta.id, "intro");
        assert_eq!(chunks[0].nodes.len(), 2);
    }

    #[test]
    fn test_empty_tree_yields_one_empty_chunk() {
        let chunks = Chunker::split(Vec::new(), &mut Registry::new());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].nodes.is_empty());
        assert_eq!(chunks[0].meta.url, "/chapters/0");
    }

    #[test]
    fn test_appendices_are_counted_separately() {
        let nodes = vec![
            Node::heading(1, "#intro Introduction"),
            Node::heading(1, "#+extensions Layers & Extensions"),
            Node::heading(1, "#fundamentals Fundamentals"),
            Node::heading(1, "#+glossary Glossary"),
        ];
        let mut registry = Registry::new();
        let chunks = Chunker::split(nodes, &mut registry);

        let urls: Vec<&str> = chunks.iter().map(|c| c.meta.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["/chapters/0", "/appendices/0", "/chapters/1", "/appendices/1"]
        );
        assert_eq!(chunks[3].location(), Location::Appendix(1));
        assert_eq!(registry.get("extensions").unwrap().url, "/appendices/0");
        assert_eq!(chunks[1].meta.title, "Layers & Extensions");
    }

    #[test]
    fn test_heading_without_id_uses_slug() {
        let chunks = Chunker::split(
            vec![Node::heading(1, "Memory Allocation")],
            &mut Registry::new(),
        );
        assert_eq!(chunks[0].meta.id, "memory-allocation");
        assert_eq!(chunks[0].meta.title, "Memory Allocation");
    }

    #[test]
    fn test_anchors_resolve_to_their_chunk() {
        let nodes = vec![
            Node::heading(1, "#a A"),
            Node::heading(1, "#b B"),
            Node::Paragraph(vec![Node::anchor("in-b")]),
        ];
        let mut registry = Registry::new();
        Chunker::split(nodes, &mut registry);
        let entry = registry.get("in-b").unwrap();
        assert_eq!(entry.url, "/chapters/1");
        assert_eq!(entry.title, "B");
    }

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("Layers & Extensions", "layers-extensions")]
    #[case("  VK_KHR_surface ", "vk-khr-surface")]
    fn test_slugify(#[case] text: &str, #[case] slug: &str) {
        assert_eq!(slugify(text), slug);
    }
}
