//! Document Tree serialization
//!
//! Converts Document Tree nodes into Markdown text. Directives are emitted as
//! `::name{...}` marker lines here and nowhere else.

use crate::ast::{Directive, DirectiveKind, ListItem, Node};
use crate::markers::split_heading_prefix;
use crate::options::{HeadingIdStyle, Options};

/// Serialize a node sequence to a Markdown string
pub fn serialize(nodes: &[Node], options: &Options) -> String {
    let mut output = String::with_capacity(4096);
    serialize_nodes(nodes, options, &mut output);

    collapse_and_trim(&output)
}

fn serialize_nodes(nodes: &[Node], options: &Options, out: &mut String) {
    for node in nodes {
        serialize_node(node, options, out);
    }
}

fn serialize_node(node: &Node, options: &Options, out: &mut String) {
    match node {
        Node::Paragraph(children) => {
            start_block(out);
            let start_len = out.len();
            serialize_nodes(children, options, out);
            if out[start_len..].trim().is_empty() {
                out.truncate(start_len);
            } else {
                if options.escape_text {
                    let escaped = escape_line_starts(&out[start_len..]);
                    out.truncate(start_len);
                    out.push_str(&escaped);
                }
                out.push_str("\n\n");
            }
        }

        Node::Heading { depth, children } => serialize_heading(*depth, children, options, out),

        Node::List { ordered, items } => serialize_list(*ordered, items, options, out),

        Node::Code { value, language } => serialize_code(value, language.as_deref(), options, out),

        Node::Blockquote(children) => {
            let content = render(children, options);
            if content.is_empty() {
                return;
            }
            start_block(out);
            for (i, line) in content.lines().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push('>');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }

        Node::Image { url, alt, title } => {
            out.push_str("![");
            push_escaped(alt, options, out);
            out.push_str("](");
            out.push_str(url);
            push_title(title.as_deref(), out);
            out.push(')');
        }

        Node::Break => out.push_str("\\\n"),

        Node::FootnoteDefinition { id, children } => {
            start_block(out);
            out.push_str("[^");
            out.push_str(id);
            out.push_str("]: ");
            push_indented(&render(children, options), "    ", out);
            out.push_str("\n\n");
        }

        Node::Directive(directive) => serialize_directive(directive, options, out),

        Node::Text(text) => push_escaped(text, options, out),

        Node::Emphasis(children) => {
            let inner = render_inline(children, options);
            if !inner.trim().is_empty() {
                out.push(options.em_delimiter);
                out.push_str(&inner);
                out.push(options.em_delimiter);
            }
        }

        Node::Strong(children) => {
            let inner = render_inline(children, options);
            if !inner.trim().is_empty() {
                out.push_str(&options.strong_delimiter);
                out.push_str(&inner);
                out.push_str(&options.strong_delimiter);
            }
        }

        Node::InlineCode(code) => {
            if !code.is_empty() {
                let backticks = "`".repeat(longest_backtick_run(code) + 1);
                let space = if code.starts_with('`') || code.ends_with('`') {
                    " "
                } else {
                    ""
                };
                out.push_str(&backticks);
                out.push_str(space);
                out.push_str(code);
                out.push_str(space);
                out.push_str(&backticks);
            }
        }

        Node::Link { url, children } => {
            out.push('[');
            out.push_str(&render_inline(children, options));
            out.push_str("](");
            out.push_str(url);
            out.push(')');
        }

        Node::FootnoteReference { id } => {
            out.push_str("[^");
            out.push_str(id);
            out.push(']');
        }

        Node::Html(html) => out.push_str(html),
    }
}

fn serialize_heading(depth: u8, children: &[Node], options: &Options, out: &mut String) {
    let mut text = String::new();
    let mut id = None;
    let mut rest = children;

    if let Some((Node::Text(first), tail)) = children.split_first() {
        if let Some((heading_id, remainder)) = split_heading_prefix(first) {
            match options.heading_ids {
                HeadingIdStyle::Prefix => text.push_str(&first[..first.len() - remainder.len()]),
                HeadingIdStyle::Attribute => id = Some(heading_id.id),
                HeadingIdStyle::Strip => {}
            }
            push_escaped(remainder, options, &mut text);
            rest = tail;
        }
    }
    serialize_nodes(rest, options, &mut text);

    let text = text.replace('\n', " ");
    let text = text.trim();
    if text.is_empty() && id.is_none() {
        return;
    }

    start_block(out);
    for _ in 0..depth.clamp(1, 6) {
        out.push('#');
    }
    out.push(' ');
    out.push_str(text);
    if let Some(id) = id {
        out.push_str(" {#");
        out.push_str(id);
        out.push('}');
    }
    out.push_str("\n\n");
}

fn serialize_list(ordered: bool, items: &[ListItem], options: &Options, out: &mut String) {
    if items.is_empty() {
        return;
    }
    start_block(out);

    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", i + 1)
        } else {
            format!("{} ", options.bullet_list_marker)
        };
        let indent = " ".repeat(marker.len());

        out.push_str(&marker);
        push_indented(&render(&item.children, options), &indent, out);
        out.push('\n');
    }

    out.push('\n');
}

fn serialize_code(value: &str, language: Option<&str>, options: &Options, out: &mut String) {
    // A fence must be longer than any backtick run inside the code
    let longest_run = longest_backtick_run(value);
    let fence = if longest_run >= options.fence.len() {
        "`".repeat(longest_run + 1)
    } else {
        options.fence.clone()
    };

    start_block(out);
    out.push_str(&fence);
    out.push_str(language.unwrap_or(""));
    out.push('\n');
    out.push_str(value.trim_end_matches('\n'));
    out.push('\n');
    out.push_str(&fence);
    out.push_str("\n\n");
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

fn serialize_directive(directive: &Directive, options: &Options, out: &mut String) {
    match directive.kind {
        DirectiveKind::Inline => {
            out.push(':');
            out.push_str(&directive.name);
            if !directive.children.is_empty() {
                out.push('[');
                out.push_str(&render_inline(&directive.children, options));
                out.push(']');
            }
            push_directive_attributes(&directive.attributes, out);
        }
        DirectiveKind::Block => {
            start_block(out);
            out.push_str("::");
            out.push_str(&directive.name);
            push_directive_attributes(&directive.attributes, out);
            out.push('\n');
            out.push_str(&render(&directive.children, options));
            out.push_str("\n::\n\n");
        }
    }
}

/// Write `{key="value" ...}`, escaping quotes and backslashes
fn push_directive_attributes(attributes: &[(String, String)], out: &mut String) {
    if attributes.is_empty() {
        return;
    }
    out.push('{');
    for (i, (key, value)) in attributes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(key);
        out.push_str("=\"");
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out.push('}');
}

fn push_title(title: Option<&str>, out: &mut String) {
    if let Some(t) = title {
        out.push_str(" \"");
        out.push_str(&t.replace('"', "\\\""));
        out.push('"');
    }
}

/// Render nodes into a standalone, trimmed string
fn render(nodes: &[Node], options: &Options) -> String {
    let mut buffer = String::new();
    serialize_nodes(nodes, options, &mut buffer);
    collapse_and_trim(&buffer)
}

/// Render inline content on a single line
fn render_inline(nodes: &[Node], options: &Options) -> String {
    let mut buffer = String::new();
    serialize_nodes(nodes, options, &mut buffer);
    buffer.trim_matches('\n').replace("\n\n", " ")
}

/// Append `content`, indenting every line after the first
fn push_indented(content: &str, indent: &str, out: &mut String) {
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
}

/// Make sure the next block starts after a blank line
fn start_block(out: &mut String) {
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}

fn push_escaped(text: &str, options: &Options, out: &mut String) {
    if !options.escape_text {
        out.push_str(text);
        return;
    }
    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '<' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
}

/// Escape characters that would turn the start of a paragraph line into another block
fn escape_line_starts(content: &str) -> String {
    let mut result = String::with_capacity(content.len() + 4);
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
        }
        let body = line.trim_start_matches(' ');
        result.push_str(&line[..line.len() - body.len()]);

        let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let after_digits = &body[digits..];
        let marker_end = |rest: &str| rest.is_empty() || rest.starts_with([' ', '\t']);

        if body.starts_with(['#', '>']) {
            result.push('\\');
        } else if body.starts_with(['-', '+']) && marker_end(&body[1..]) {
            result.push('\\');
        } else if (1..=9).contains(&digits)
            && after_digits.starts_with(['.', ')'])
            && marker_end(&after_digits[1..])
        {
            result.push_str(&body[..digits]);
            result.push('\\');
            result.push_str(after_digits);
            continue;
        }
        result.push_str(body);
    }
    result
}

/// The backtick fence a line starts with; info strings never contain backticks
fn fence_of(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let len = line.len() - line.trim_start_matches('`').len();
    (len >= 3 && !line[len..].contains('`')).then(|| &line[..len])
}

/// Collapse runs of blank lines outside code fences and trim surrounding newlines
fn collapse_and_trim(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut open_fence: Option<usize> = None;
    let mut blank_run = 0;

    for line in s.trim_matches('\n').split('\n') {
        match (open_fence, fence_of(line)) {
            (None, Some(fence)) => open_fence = Some(fence.len()),
            // A closing fence is at least as long as the opener and has no info string
            (Some(opener), Some(fence))
                if fence.len() >= opener && line.trim().len() == fence.len() =>
            {
                open_fence = None
            }
            _ => {}
        }
        let in_fence = open_fence.is_some();
        if !in_fence && line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            result.push('\n');
            continue;
        }
        blank_run = 0;
        result.push_str(line);
        result.push('\n');
    }

    let trimmed_len = result.trim_end_matches('\n').len();
    result.truncate(trimmed_len);
    result
}
