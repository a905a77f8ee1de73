//! End-to-end build
//!
//! ```text
//! master ─prepare─render─parse─convert─▶ Chunker ──┐
//!                                                  ├─▶ Registry (phase 1)
//! refpages ─prepare─render─parse─convert─▶ collect ┘
//!
//! all trees ─rewrite (phase 2)─▶ serialize ─▶ output directory
//! ```
//!
//! A document that fails (missing include, processor error, bad XML) is
//! skipped with a warning; the build goes on without it.

use std::path::Path;

use vkdoc_core::{serialize, Node};
use vkdoc_docbook::{parse_fragment, Converter, Diagnostic, DocumentKind};

use crate::chunk::{Chunk, Chunker};
use crate::config::{Config, ProcessorKind};
use crate::error::{Error, Result};
use crate::include::IncludeResolver;
use crate::output::OutputWriter;
use crate::processor::{self, MarkupProcessor, Preprocessor};
use crate::refpage::{self, Refpage};
use crate::registry::{Location, Registry};
use crate::rewrite::{rewrite, RewriteReport};

/// A converted document and the diagnostics raised on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    pub chunks: usize,
    pub pages: usize,
    /// Documents left out, with the reason
    pub skipped: Vec<(String, String)>,
    pub diagnostics: usize,
    pub registered: usize,
    pub duplicates: usize,
    pub rewrite: RewriteReport,
}

pub struct Pipeline {
    config: Config,
    preprocessor: Preprocessor,
    processor: Box<dyn MarkupProcessor>,
}

impl Pipeline {
    /// Build a pipeline using the processor named in `config`
    pub fn new(config: Config) -> Self {
        let processor = processor::from_config(&config.processor);
        Self::with_processor(config, processor)
    }

    pub fn with_processor(config: Config, processor: Box<dyn MarkupProcessor>) -> Self {
        let includes = IncludeResolver::new(config.include_dirs());
        let preprocessor = match config.processor.kind {
            ProcessorKind::Asciidoctor => Preprocessor::new(includes),
            ProcessorKind::Docbook => Preprocessor::new(includes).without_macros(),
        };
        Self {
            config,
            preprocessor,
            processor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one source document through preprocessing, rendering and conversion
    pub fn convert_source(&self, source: &str, name: &str, kind: DocumentKind) -> Result<Converted> {
        let prepared = self.preprocessor.prepare(source)?;
        let docbook = self.processor.render(&prepared, name)?;
        let root = parse_fragment(&docbook)?;

        let mut converter = Converter::new();
        let nodes = converter.convert_document(&root, kind)?;
        Ok(Converted {
            nodes,
            diagnostics: converter.take_diagnostics(),
        })
    }

    /// Convert a single file to Markdown, resolving references if a registry is given
    pub fn convert_file(
        &self,
        path: &Path,
        kind: DocumentKind,
        registry: Option<&Registry>,
    ) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut converted = self.convert_source(&source, &name, kind)?;
        if let Some(registry) = registry {
            rewrite(&mut converted.nodes, registry, &self.config.rewrite_options());
        }
        Ok(serialize(&converted.nodes, &self.config.markdown_options()))
    }

    /// Convert the master document and every reference page, cross-link
    /// them and write all artifacts
    pub fn build(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        let mut registry = Registry::with_policy(self.config.duplicate_policy);

        let writer = OutputWriter::new(&self.config.output_dir, self.config.markdown_options());
        writer.prepare()?;

        let mut chunks = self.build_master(&mut registry, &mut report)?;
        let mut pages = self.build_pages(&mut registry, &mut report)?;

        let options = self.config.rewrite_options();
        for chunk in &mut chunks {
            report.rewrite.merge(rewrite(&mut chunk.nodes, &registry, &options));
        }
        for (_, nodes) in &mut pages {
            report.rewrite.merge(rewrite(nodes, &registry, &options));
        }

        for chunk in &chunks {
            writer.write_chunk(chunk)?;
        }
        let index: Vec<_> = chunks.iter().map(|chunk| chunk.meta.clone()).collect();
        writer.write_index(&index)?;
        for (page, nodes) in &pages {
            writer.write_page(page, nodes)?;
        }
        writer.write_registry(&registry)?;

        report.chunks = chunks.len();
        report.pages = pages.len();
        report.registered = registry.len();
        report.duplicates = registry.duplicates().len();
        log::info!(
            "built {} chunks and {} pages, {} ids ({} unresolved references)",
            report.chunks,
            report.pages,
            report.registered,
            report.rewrite.unresolved.len()
        );
        Ok(report)
    }

    fn build_master(&self, registry: &mut Registry, report: &mut BuildReport) -> Result<Vec<Chunk>> {
        let path = self.config.master_path();
        let source = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        log::info!("converting master document {}", path.display());

        match self.convert_source(&source, "master", DocumentKind::Master) {
            Ok(converted) => {
                report.diagnostics += converted.diagnostics.len();
                Ok(Chunker::split(converted.nodes, registry))
            }
            Err(e) if e.is_document_local() => {
                log::warn!("skipping master document: {e}");
                report.skipped.push(("master".to_string(), e.to_string()));
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn build_pages(
        &self,
        registry: &mut Registry,
        report: &mut BuildReport,
    ) -> Result<Vec<(Refpage, Vec<Node>)>> {
        let discovered = refpage::discover(&self.config.page_dirs(), &self.config.skip_pages)?;
        let mut pages = Vec::with_capacity(discovered.len());

        for page in discovered {
            log::debug!("converting {}", page.name);
            match self.convert_source(&page.source, &page.name, DocumentKind::Page) {
                Ok(converted) => {
                    report.diagnostics += converted.diagnostics.len();
                    registry.collect(&converted.nodes, &Location::Page(page.name.clone()));
                    pages.push((page, converted.nodes));
                }
                Err(e) if e.is_document_local() => {
                    log::warn!("skipping {}: {e}", page.name);
                    report.skipped.push((page.name, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(pages)
    }
}
