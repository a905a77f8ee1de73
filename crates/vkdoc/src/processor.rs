//! Markup processors
//!
//! A [`MarkupProcessor`] turns one preprocessed source document into a
//! DocBook fragment. Rendering is delegated to an external `asciidoctor`
//! process, or skipped entirely when the sources are DocBook already.

use std::io::Write;
use std::process::{Command, Stdio};

use indexmap::IndexMap;

use crate::config::{ProcessorConfig, ProcessorKind};
use crate::error::{IncludeError, ProcessorError};
use crate::include::IncludeResolver;
use crate::macros::rewrite_macros;

/// Renders a source document to DocBook
pub trait MarkupProcessor {
    /// Render `source`; `name` identifies the document in errors
    fn render(&self, source: &str, name: &str) -> Result<String, ProcessorError>;
}

/// Build the processor selected by `config`
pub fn from_config(config: &ProcessorConfig) -> Box<dyn MarkupProcessor> {
    match config.kind {
        ProcessorKind::Asciidoctor => Box::new(Asciidoctor {
            program: config.program.clone(),
            attributes: config.attributes.clone(),
        }),
        ProcessorKind::Docbook => Box::new(DocbookPassthrough),
    }
}

/// Runs `asciidoctor -b docbook5 -s -o - -`, feeding the source on stdin
#[derive(Debug, Clone)]
pub struct Asciidoctor {
    pub program: String,
    pub attributes: IndexMap<String, String>,
}

impl Default for Asciidoctor {
    fn default() -> Self {
        Self {
            program: "asciidoctor".to_string(),
            attributes: IndexMap::new(),
        }
    }
}

impl Asciidoctor {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(["-b", "docbook5", "-s", "-o", "-"]);
        for (name, value) in &self.attributes {
            command.arg("-a").arg(format!("{name}={value}"));
        }
        command.arg("-");
        command
    }
}

impl MarkupProcessor for Asciidoctor {
    fn render(&self, source: &str, name: &str) -> Result<String, ProcessorError> {
        log::debug!("rendering {name} with {}", self.program);

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdout is drained while stdin is still being written
        let writer = child.stdin.take().map(|mut stdin| {
            let source = source.to_string();
            std::thread::spawn(move || stdin.write_all(source.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let written = match writer.map(|writer| writer.join()) {
            Some(Ok(result)) => result,
            Some(Err(_)) => {
                log::error!("stdin writer for {name} panicked");
                Ok(())
            }
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(ProcessorError::Failed {
                program: self.program.clone(),
                document: name.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Returns the source unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct DocbookPassthrough;

impl MarkupProcessor for DocbookPassthrough {
    fn render(&self, source: &str, _name: &str) -> Result<String, ProcessorError> {
        Ok(source.to_string())
    }
}

/// Source-level rewriting applied before a document is rendered
#[derive(Debug, Clone)]
pub struct Preprocessor {
    includes: IncludeResolver,
    rewrite_macros: bool,
}

impl Preprocessor {
    pub fn new(includes: IncludeResolver) -> Self {
        Self {
            includes,
            rewrite_macros: true,
        }
    }

    /// Skip inline macro rewriting; for sources that are not AsciiDoc
    pub fn without_macros(mut self) -> Self {
        self.rewrite_macros = false;
        self
    }

    /// Expand includes, then rewrite inline macros
    pub fn prepare(&self, source: &str) -> Result<String, IncludeError> {
        let expanded = self.includes.expand(source)?;
        if self.rewrite_macros {
            Ok(rewrite_macros(&expanded))
        } else {
            Ok(expanded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_asciidoctor_command_line() {
        let mut attributes = IndexMap::new();
        attributes.insert("VK_VERSION_1_3".to_string(), "".to_string());
        attributes.insert("chapters".to_string(), "/src/chapters".to_string());
        let processor = Asciidoctor {
            program: "asciidoctor".to_string(),
            attributes,
        };

        let command = processor.command();
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "asciidoctor");
        assert_eq!(
            args,
            vec![
                "-b", "docbook5", "-s", "-o", "-", "-a", "VK_VERSION_1_3=", "-a",
                "chapters=/src/chapters", "-",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let processor = Asciidoctor {
            program: "vkdoc-test-no-such-program".to_string(),
            attributes: IndexMap::new(),
        };
        let err = processor.render("= Title", "doc").unwrap_err();
        assert!(matches!(err, ProcessorError::Spawn { .. }));
    }

    #[test]
    fn test_passthrough() {
        let xml = "<simpara>Hello</simpara>";
        assert_eq!(DocbookPassthrough.render(xml, "x").unwrap(), xml);
    }

    #[test]
    fn test_from_config_selects_processor() {
        let config = ProcessorConfig {
            kind: ProcessorKind::Docbook,
            ..ProcessorConfig::default()
        };
        let processor = from_config(&config);
        assert_eq!(processor.render("<para/>", "p").unwrap(), "<para/>");
    }

    #[test]
    fn test_prepare_expands_then_rewrites() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("part.adoc"), "fname:vkCmdDraw must: be recorded").unwrap();

        let mut prefixes = IndexMap::new();
        prefixes.insert("chapters".to_string(), root.path().to_path_buf());
        let preprocessor = Preprocessor::new(IncludeResolver::new(prefixes));

        let out = preprocessor
            .prepare("intro\ninclude::{chapters}/part.adoc[]\n")
            .unwrap();
        assert_eq!(
            out,
            "intro\n`+vkCmdDraw+` :normative{type=\"must\"} be recorded\n"
        );

        let raw = Preprocessor::new(IncludeResolver::new(IndexMap::new())).without_macros();
        assert_eq!(raw.prepare("pname:x").unwrap(), "pname:x\n");
    }
}
