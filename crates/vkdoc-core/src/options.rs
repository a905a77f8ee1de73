//! Configuration options for Markdown serialization

/// How a `#<id> ` heading prefix is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingIdStyle {
    /// Move the id into a trailing `{#id}` attribute
    #[default]
    Attribute,
    /// Keep the prefix verbatim in the heading text
    Prefix,
    /// Drop the id
    Strip,
}

/// Options for Markdown serialization
#[derive(Debug, Clone)]
pub struct Options {
    /// Heading id rendering
    pub heading_ids: HeadingIdStyle,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Fence string for code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Escape Markdown-significant characters in text
    pub escape_text: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_ids: HeadingIdStyle::Attribute,
            bullet_list_marker: '-',
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            escape_text: true,
        }
    }
}
