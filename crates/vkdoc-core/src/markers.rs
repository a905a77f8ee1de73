//! Textual conventions shared by the converter, the chunker and the registry.
//!
//! Section ids travel inside the heading text as a `#<id> ` prefix
//! (`#+<id> ` for appendices) until the chunker and registry read them back.
//! Cross-references are emitted as placeholder links and resolved once
//! every document has been scanned.

/// Placeholder URL prefix of an unresolved cross-reference
pub const XREF_URL_PREFIX: &str = "xref::";

/// Placeholder label prefix of an unresolved cross-reference
pub const XREF_LABEL_PREFIX: &str = "xref::name::";

/// A section id recovered from a heading prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingId<'a> {
    pub id: &'a str,
    pub appendix: bool,
}

/// Build the prefix token injected in front of a section heading
pub fn heading_prefix(id: &str, appendix: bool) -> String {
    if appendix {
        format!("#+{id} ")
    } else {
        format!("#{id} ")
    }
}

/// Split `#<id> rest` into the id and the remaining heading text
pub fn split_heading_prefix(text: &str) -> Option<(HeadingId<'_>, &str)> {
    let token = text.strip_prefix('#')?;
    let (token, rest) = token.split_once(' ')?;
    let (id, appendix) = match token.strip_prefix('+') {
        Some(id) => (id, true),
        None => (token, false),
    };
    if id.is_empty() || id.contains('#') {
        return None;
    }
    Some((HeadingId { id, appendix }, rest))
}

/// Placeholder URL for a cross-reference to `id`
pub fn xref_url(id: &str) -> String {
    format!("{XREF_URL_PREFIX}{id}")
}

/// Placeholder label for a cross-reference to `id`
pub fn xref_label(id: &str) -> String {
    format!("{XREF_LABEL_PREFIX}{id}")
}

/// Target id of a placeholder URL
pub fn parse_xref_url(url: &str) -> Option<&str> {
    url.strip_prefix(XREF_URL_PREFIX)
        .filter(|id| !id.is_empty() && !id.starts_with("name::"))
}

/// Target id of a placeholder label
pub fn parse_xref_label(label: &str) -> Option<&str> {
    label
        .strip_prefix(XREF_LABEL_PREFIX)
        .filter(|id| !id.is_empty())
}
