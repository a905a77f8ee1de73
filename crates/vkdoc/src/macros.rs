//! Inline macro rewriting
//!
//! The specification sources use custom inline macros (`pname:`, `must:`,
//! `flink:` ...) that a stock processor does not know. They are rewritten
//! into plain markup before rendering. Listing and literal blocks are
//! copied untouched.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Keywords marked as normative language
pub const NORMATIVE_KEYWORDS: [&str; 8] = [
    "can",
    "cannot",
    "may",
    "must",
    "optional",
    "optionally",
    "required",
    "should",
];

static NORMATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b({}):\w*", NORMATIVE_KEYWORDS.join("|"))).unwrap()
});

static MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bpname:(\w+(?:(?:\.|&#8594;)\w+)*)|\bptext:([\w*]+(?:(?:\.|&#8594;)[\w*]+)*)")
        .unwrap()
});

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcode:(\w+(?:[.*]\w+)*\**)").unwrap());

static TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:ftext|stext|etext):([\w*]+)").unwrap());

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:fname|sname|ename|dname|tname):([-\w]+)").unwrap());

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:flink|slink|elink|reflink|apiext|dlink|tlink|basetype):(\w+)").unwrap()
});

static STRONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:attr|tag):(\w+)").unwrap());

/// A delimiter line opening or closing a listing (`----`) or literal (`....`) block
fn block_delimiter(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let first = line.chars().next()?;
    if (first == '-' || first == '.') && line.len() >= 4 && line.chars().all(|c| c == first) {
        Some(line)
    } else {
        None
    }
}

/// Rewrite inline macros in `source`, leaving delimited blocks alone
pub fn rewrite_macros(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut open_block: Option<&str> = None;

    for line in source.lines() {
        match (open_block, block_delimiter(line)) {
            (None, Some(delimiter)) => {
                open_block = Some(delimiter);
                out.push_str(line);
            }
            (Some(opener), Some(delimiter)) if opener == delimiter => {
                open_block = None;
                out.push_str(line);
            }
            (Some(_), _) => out.push_str(line),
            (None, None) => out.push_str(&rewrite_line(line)),
        }
        out.push('\n');
    }

    out
}

/// Rewrite the inline macros of a single line
pub fn rewrite_line(line: &str) -> Cow<'_, str> {
    if !line.contains(':') {
        return Cow::Borrowed(line);
    }

    let line = NORMATIVE_RE.replace_all(line, |caps: &Captures| {
        format!(":normative{{type=\"{}\"}}", &caps[1])
    });
    let line = MEMBER_RE.replace_all(&line, |caps: &Captures| {
        let target = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        monospaced(target)
    });
    let line = CODE_RE.replace_all(&line, |caps: &Captures| monospaced(&caps[1]));
    let line = TEXT_RE.replace_all(&line, |caps: &Captures| monospaced(&caps[1]));
    let line = NAME_RE.replace_all(&line, |caps: &Captures| monospaced(&caps[1]));
    let line = LINK_RE.replace_all(&line, |caps: &Captures| {
        format!("link:/man/{0}[{0}]", &caps[1])
    });
    let line = STRONG_RE.replace_all(&line, |caps: &Captures| format!("*{}*", &caps[1]));

    Cow::Owned(line.into_owned())
}

fn monospaced(target: &str) -> String {
    format!("`+{target}+`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Applications must: not do this", "Applications :normative{type=\"must\"} not do this")]
    #[case("it optionally: works", "it :normative{type=\"optionally\"} works")]
    #[case("pname:pCreateInfo is a pointer", "`+pCreateInfo+` is a pointer")]
    #[case("pname:pInfo->pNext", "`+pInfo+`->pNext")]
    #[case("pname:a.b.c", "`+a.b.c+`")]
    #[case("ptext:pAllocator*", "`+pAllocator*+`")]
    #[case("code:uint32_t*", "`+uint32_t*+`")]
    #[case("fname:vkCmdDraw", "`+vkCmdDraw+`")]
    #[case("ename:VK-ERROR", "`+VK-ERROR+`")]
    #[case("stext:Vk*CreateInfo", "`+Vk*CreateInfo+`")]
    #[case("see flink:vkCmdDraw", "see link:/man/vkCmdDraw[vkCmdDraw]")]
    #[case("basetype:VkBool32", "link:/man/VkBool32[VkBool32]")]
    #[case("attr:len and tag:extension", "*len* and *extension*")]
    #[case("no macros here", "no macros here")]
    fn test_rewrite_line(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(rewrite_line(input), expected);
    }

    #[test]
    fn test_every_normative_keyword_is_rewritten() {
        for keyword in NORMATIVE_KEYWORDS {
            assert_eq!(
                rewrite_line(&format!("it {keyword}: work")),
                format!("it :normative{{type=\"{keyword}\"}} work")
            );
        }
        assert_eq!(rewrite_line("it shall: work"), "it shall: work");
    }

    #[test]
    fn test_macro_names_need_word_boundary() {
        assert_eq!(rewrite_line("xpname:foo"), "xpname:foo");
        assert_eq!(rewrite_line("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_listing_blocks_are_untouched() {
        let source = "\
must: outside
----
pname:inside
....
still inside
----
flink:after
";
        let expected = "\
:normative{type=\"must\"} outside
----
pname:inside
....
still inside
----
link:/man/after[after]
";
        assert_eq!(rewrite_macros(source), expected);
    }

    #[test]
    fn test_literal_block_needs_matching_close() {
        let source = "......\nfname:a\n....\nfname:b\n......\nfname:c\n";
        assert_eq!(
            rewrite_macros(source),
            "......\nfname:a\n....\nfname:b\n......\n`+c+`\n"
        );
    }

    #[rstest]
    #[case("----", true)]
    #[case("....", true)]
    #[case("---", false)]
    #[case("--", false)]
    #[case("-.--", false)]
    fn test_block_delimiter(#[case] line: &str, #[case] is_delimiter: bool) {
        assert_eq!(block_delimiter(line).is_some(), is_delimiter);
    }
}
