use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

use vkdoc::config::ProcessorKind;
use vkdoc::{ChunkMeta, Config, DocbookPassthrough, DuplicatePolicy, Pipeline, Registry};

const MASTER: &str = r#"<simpara>Front matter.</simpara>
<chapter xml:id="intro"><title>Introduction</title>
<simpara>Drawing is described in <xref linkend="vkCmdDraw-anchor"/>.</simpara>
</chapter>
<appendix xml:id="glossary"><title>Glossary</title>
<simpara><anchor xml:id="glossary-term"/>A term.</simpara>
</appendix>
<chapter xml:id="drawing"><title>Drawing Commands</title>
include::{chapters}/drawing-body.xml[]
</chapter>
"#;

const DRAWING_BODY: &str = r#"<section xml:id="drawing-indirect"><title>Indirect Draws</title>
<simpara>See <xref linkend="nowhere"/>.</simpara>
</section>
"#;

const DRAW_PAGE: &str = r#"Some chapter prose.

[open,refpage='vkCmdDraw',desc='Draw primitives',type='protos',xrefs='vkCmdDrawIndirect']
--
<simpara><anchor xml:id="vkCmdDraw-anchor"/>Records a draw. See <xref linkend="intro"/> and <xref linkend="glossary-term"/>.</simpara>
--
"#;

const BROKEN_PAGE: &str = r#"[open,refpage='vkBroken',desc='Needs a generated file',type='protos']
--
include::{generated}/api/protos/vkBroken.adoc[]
--
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Vulkan-Docs");
        fs::create_dir_all(source.join("chapters")).unwrap();
        fs::create_dir_all(source.join("appendices")).unwrap();
        fs::create_dir_all(source.join("gen")).unwrap();

        fs::write(source.join("vkspec.adoc"), MASTER).unwrap();
        fs::write(source.join("chapters/drawing-body.xml"), DRAWING_BODY).unwrap();
        fs::write(source.join("chapters/drawing.adoc"), DRAW_PAGE).unwrap();
        fs::write(source.join("chapters/broken.adoc"), BROKEN_PAGE).unwrap();

        Self { dir }
    }

    fn source(&self) -> std::path::PathBuf {
        self.dir.path().join("Vulkan-Docs")
    }

    fn dist(&self) -> std::path::PathBuf {
        self.dir.path().join("dist")
    }

    fn config(&self) -> Config {
        let mut config = Config {
            source_dir: self.source(),
            output_dir: self.dist(),
            ..Config::default()
        };
        config.processor.kind = ProcessorKind::Docbook;
        config
    }

    fn pipeline(&self, config: Config) -> Pipeline {
        Pipeline::with_processor(config, Box::new(DocbookPassthrough))
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.dist().join(relative)).unwrap()
    }
}

fn exists(path: &Path) -> bool {
    path.is_file()
}

#[test]
fn test_build_writes_chunks_and_index() {
    let fixture = Fixture::new();
    let report = fixture.pipeline(fixture.config()).build().unwrap();

    assert_eq!(report.chunks, 3);
    let index: Vec<ChunkMeta> = serde_json::from_str(&fixture.read("chapters/index.json")).unwrap();
    let urls: Vec<&str> = index.iter().map(|meta| meta.url.as_str()).collect();
    assert_eq!(urls, vec!["/chapters/0", "/appendices/0", "/chapters/1"]);
    assert_eq!(index[2].title, "Drawing Commands");

    assert!(exists(&fixture.dist().join("chapters/0.md")));
    assert!(exists(&fixture.dist().join("appendices/0.md")));
    assert!(exists(&fixture.dist().join("chapters/1.md")));

    let intro = fixture.read("chapters/0.md");
    assert!(intro.starts_with("Front matter."));
    assert!(intro.contains("# Introduction {#intro}"));
}

#[test]
fn test_forward_references_resolve_across_documents() {
    let fixture = Fixture::new();
    fixture.pipeline(fixture.config()).build().unwrap();

    let intro = fixture.read("chapters/0.md");
    assert!(intro.contains("[vkCmdDraw](/man/vkCmdDraw#vkCmdDraw-anchor)"));

    let page = fixture.read("man/vkCmdDraw.md");
    assert!(page.starts_with("---\ntitle: vkCmdDraw\ndescription: Draw primitives\ntype: protos\n"));
    assert!(page.contains("[Introduction](/chapters/0#intro)"));
    assert!(page.contains("[Glossary](/appendices/0#glossary-term)"));
}

#[test]
fn test_included_section_and_unresolved_reference() {
    let fixture = Fixture::new();
    let report = fixture.pipeline(fixture.config()).build().unwrap();

    let drawing = fixture.read("chapters/1.md");
    assert!(drawing.contains("## Indirect Draws {#drawing-indirect}"));
    assert!(drawing.contains("(/not-found#nowhere)"));
    assert_eq!(report.rewrite.unresolved, vec!["nowhere"]);
}

#[test]
fn test_missing_include_skips_only_that_page() {
    let fixture = Fixture::new();
    let report = fixture.pipeline(fixture.config()).build().unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "vkBroken");
    assert!(!exists(&fixture.dist().join("man/vkBroken.md")));
    assert!(exists(&fixture.dist().join("man/vkCmdDraw.md")));
}

#[test]
fn test_registry_is_persisted() {
    let fixture = Fixture::new();
    let report = fixture.pipeline(fixture.config()).build().unwrap();

    let registry = Registry::load(&fixture.dist().join("xrefs.json")).unwrap();
    assert_eq!(registry.len(), report.registered);

    let intro = registry.get("intro").unwrap();
    assert_eq!(intro.url, "/chapters/0");
    assert_eq!(intro.title, "Introduction");

    let anchor = registry.get("vkCmdDraw-anchor").unwrap();
    assert_eq!(anchor.url, "/man/vkCmdDraw");
    assert_eq!(anchor.title, "vkCmdDraw");

    assert_eq!(registry.get("glossary-term").unwrap().title, "Glossary");
    assert_eq!(
        registry.get("drawing-indirect").unwrap().url,
        "/chapters/1"
    );
}

#[rstest]
#[case(DuplicatePolicy::LastWriteWins, "/man/second")]
#[case(DuplicatePolicy::FirstWriteWins, "/man/first")]
fn test_duplicate_anchor_across_pages(#[case] policy: DuplicatePolicy, #[case] url: &str) {
    let fixture = Fixture::new();
    let chapters = fixture.source().join("chapters");
    for (file, name) in [("z1.adoc", "first"), ("z2.adoc", "second")] {
        fs::write(
            chapters.join(file),
            format!(
                "[open,refpage='{name}',desc='d',type='t']\n--\n<simpara><anchor xml:id=\"shared\"/>x</simpara>\n--\n"
            ),
        )
        .unwrap();
    }

    let config = Config {
        duplicate_policy: policy,
        ..fixture.config()
    };
    let report = fixture.pipeline(config).build().unwrap();

    let registry = Registry::load(&fixture.dist().join("xrefs.json")).unwrap();
    assert_eq!(registry.get("shared").unwrap().url, url);
    assert_eq!(report.duplicates, 1);
}

#[test]
fn test_unreadable_master_fails_the_build() {
    let fixture = Fixture::new();
    let config = Config {
        master: "missing.adoc".into(),
        ..fixture.config()
    };
    let err = fixture.pipeline(config).build().unwrap_err();
    assert!(!err.is_document_local());
}

#[test]
fn test_convert_file_with_registry() {
    let fixture = Fixture::new();
    fixture.pipeline(fixture.config()).build().unwrap();
    let registry = Registry::load(&fixture.dist().join("xrefs.json")).unwrap();

    let input = fixture.dir.path().join("single.xml");
    fs::write(&input, r#"<simpara>Back to <xref linkend="drawing"/>.</simpara>"#).unwrap();

    let markdown = fixture
        .pipeline(fixture.config())
        .convert_file(&input, vkdoc_docbook::DocumentKind::Page, Some(&registry))
        .unwrap();
    assert_eq!(markdown, "Back to [Drawing Commands](/chapters/1#drawing).");
}
