//! Cross-reference rewrite pass
//!
//! Phase 2 of cross-linking. Runs only once the [`Registry`] holds every
//! document's ids, so forward references resolve like backward ones.

use vkdoc_core::markers::{parse_xref_label, parse_xref_url};
use vkdoc_core::{walk_mut, Node};

use crate::registry::Registry;

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Location unresolved references point at
    pub not_found_url: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            not_found_url: "/not-found".to_string(),
        }
    }
}

/// Outcome of rewriting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub resolved: usize,
    /// Target ids with no registry entry, in document order
    pub unresolved: Vec<String>,
}

impl RewriteReport {
    pub fn merge(&mut self, other: RewriteReport) {
        self.resolved += other.resolved;
        self.unresolved.extend(other.unresolved);
    }
}

/// Resolve every placeholder link in `nodes` against `registry`
pub fn rewrite(nodes: &mut [Node], registry: &Registry, options: &RewriteOptions) -> RewriteReport {
    let mut report = RewriteReport::default();

    walk_mut(nodes, &mut |node| {
        let Node::Link { url, children } = node else {
            return;
        };
        let Some(id) = parse_xref_url(url).map(str::to_string) else {
            return;
        };

        let label = match registry.get(&id) {
            Some(entry) => {
                report.resolved += 1;
                *url = format!("{}#{id}", entry.url);
                if entry.title.is_empty() {
                    fallback_label(&entry.url).to_string()
                } else {
                    entry.title.clone()
                }
            }
            None => {
                log::warn!("unresolved cross-reference to {id:?}");
                *url = format!("{}#{id}", options.not_found_url);
                report.unresolved.push(id.clone());
                id
            }
        };

        if let [Node::Text(text)] = children.as_mut_slice() {
            if parse_xref_label(text).is_some() {
                *text = label;
            }
        }
    });

    report
}

/// Last path segment of a location url
fn fallback_label(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vkdoc_core::markers::{xref_label, xref_url};

    fn placeholder(id: &str) -> Node {
        Node::Link {
            url: xref_url(id),
            children: vec![Node::text(xref_label(id))],
        }
    }

    fn link(url: &str, label: &str) -> Node {
        Node::Link {
            url: url.to_string(),
            children: vec![Node::text(label)],
        }
    }

    #[test]
    fn test_resolves_registered_id() {
        let mut registry = Registry::new();
        registry.insert("foo", "/man/foo", "Foo Bar");

        let mut tree = vec![Node::Paragraph(vec![placeholder("foo")])];
        let report = rewrite(&mut tree, &registry, &RewriteOptions::default());

        assert_eq!(
            tree,
            vec![Node::Paragraph(vec![link("/man/foo#foo", "Foo Bar")])]
        );
        assert_eq!(report.resolved, 1);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_unknown_id_points_at_not_found() {
        let registry = Registry::new();
        let mut tree = vec![placeholder("missing")];
        let report = rewrite(&mut tree, &registry, &RewriteOptions::default());

        assert_eq!(tree, vec![link("/not-found#missing", "missing")]);
        assert_eq!(report.unresolved, vec!["missing"]);
    }

    #[test]
    fn test_custom_label_is_kept() {
        let mut registry = Registry::new();
        registry.insert("sync", "/chapters/7", "Synchronization");

        let mut tree = vec![Node::Link {
            url: xref_url("sync"),
            children: vec![Node::text("synchronization chapter")],
        }];
        rewrite(&mut tree, &registry, &RewriteOptions::default());
        assert_eq!(tree, vec![link("/chapters/7#sync", "synchronization chapter")]);
    }

    #[test]
    fn test_empty_title_falls_back_to_url() {
        let mut registry = Registry::new();
        registry.insert("preamble-anchor", "/chapters/0", "");

        let mut tree = vec![placeholder("preamble-anchor")];
        rewrite(&mut tree, &registry, &RewriteOptions::default());
        assert_eq!(tree, vec![link("/chapters/0#preamble-anchor", "0")]);
    }

    #[test]
    fn test_nested_links_and_other_links() {
        let mut registry = Registry::new();
        registry.insert("a", "/man/a", "A");

        let mut tree = vec![Node::List {
            ordered: false,
            items: vec![vkdoc_core::ListItem::new(vec![Node::Paragraph(vec![
                placeholder("a"),
                link("https://www.khronos.org", "Khronos"),
            ])])],
        }];
        let options = RewriteOptions {
            not_found_url: "/404".to_string(),
        };
        let report = rewrite(&mut tree, &registry, &options);

        let Node::List { items, .. } = &tree[0] else {
            panic!("expected list");
        };
        assert_eq!(
            items[0].children,
            vec![Node::Paragraph(vec![
                link("/man/a#a", "A"),
                link("https://www.khronos.org", "Khronos"),
            ])]
        );
        assert_eq!(report.resolved, 1);
    }

    #[test]
    fn test_fallback_label() {
        assert_eq!(fallback_label("/man/vkCmdDraw"), "vkCmdDraw");
        assert_eq!(fallback_label("/chapters/3/"), "3");
    }

    #[test]
    fn test_merge_reports() {
        let mut total = RewriteReport::default();
        total.merge(RewriteReport {
            resolved: 2,
            unresolved: vec!["x".to_string()],
        });
        total.merge(RewriteReport {
            resolved: 1,
            unresolved: vec![],
        });
        assert_eq!(total.resolved, 3);
        assert_eq!(total.unresolved, vec!["x"]);
    }
}
