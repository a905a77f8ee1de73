//! Reference page discovery
//!
//! Reference pages are embedded in the chapter sources as open blocks:
//!
//! ```text
//! [open,refpage='vkCmdDraw',desc='Draw primitives',type='protos',xrefs='vkCmdDrawIndirect']
//! --
//! ...
//! --
//! ```

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[open *,(.+)\]$").unwrap());

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*=\s*'([^']*)'").unwrap());

const BLOCK_DELIMITER: &str = "--";

/// A reference page extracted from a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refpage {
    pub name: String,
    /// Page category (`protos`, `structs`, `enums` ...)
    pub kind: String,
    pub description: String,
    pub alias: Option<String>,
    pub anchor: Option<String>,
    pub xrefs: Vec<String>,
    /// Body between the `--` delimiters
    pub source: String,
    /// File the page was found in
    pub path: PathBuf,
}

/// Parse a `[open,refpage=...]` header line
fn parse_header(line: &str, path: &Path) -> Option<Refpage> {
    let caps = HEADER_RE.captures(line)?;

    let mut name = None;
    let mut kind = None;
    let mut description = None;
    let mut alias = None;
    let mut anchor = None;
    let mut xrefs = Vec::new();
    for attr in ATTRIBUTE_RE.captures_iter(&caps[1]) {
        let value = attr[2].to_string();
        match &attr[1] {
            "refpage" => name = Some(value),
            "type" => kind = Some(value),
            "desc" => description = Some(value),
            "alias" => alias = Some(value),
            "anchor" => anchor = Some(value),
            "xrefs" => xrefs = value.split_whitespace().map(str::to_string).collect(),
            _ => {}
        }
    }

    match (name, kind, description) {
        (Some(name), Some(kind), Some(description)) => Some(Refpage {
            name,
            kind,
            description,
            alias,
            anchor,
            xrefs,
            source: String::new(),
            path: path.to_path_buf(),
        }),
        _ => {
            log::warn!("{}: open block without refpage, desc and type: {line}", path.display());
            None
        }
    }
}

/// Extract every reference page from one file's content
pub fn extract(content: &str, path: &Path, skip: &[String]) -> Vec<Refpage> {
    let mut pages = Vec::new();
    let mut current: Option<Refpage> = None;
    let mut in_body = false;

    for line in content.lines() {
        let Some(page) = current.as_mut() else {
            current = parse_header(line, path);
            continue;
        };

        if line == BLOCK_DELIMITER {
            if in_body {
                pages.extend(current.take());
                in_body = false;
            } else {
                in_body = true;
            }
            continue;
        }
        if in_body {
            page.source.push_str(line);
            page.source.push('\n');
        }
    }

    if let Some(page) = current {
        if skip.contains(&page.name) {
            log::debug!("skipping unterminated refpage {}", page.name);
        } else {
            log::warn!("{}: refpage {} is not terminated", path.display(), page.name);
            pages.push(page);
        }
    }

    pages
}

/// Every `.adoc` file under `dir`, depth first, in name order
fn adoc_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            adoc_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "adoc") {
            files.push(path);
        }
    }
    Ok(())
}

/// Discover reference pages in `dirs`, in directory order, skipping `skip`
pub fn discover(dirs: &[PathBuf], skip: &[String]) -> Result<Vec<Refpage>> {
    let mut pages = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            log::warn!("refpage directory {} does not exist", dir.display());
            continue;
        }
        let mut files = Vec::new();
        adoc_files(dir, &mut files)?;
        for path in files {
            let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            pages.extend(extract(&content, &path, skip));
        }
    }
    log::info!("discovered {} reference pages", pages.len());
    Ok(pages)
}
