//! vkdoc - Vulkan specification to Markdown

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use vkdoc::{Config, Pipeline, Registry};
use vkdoc_docbook::DocumentKind;

#[derive(Parser)]
#[command(name = "vkdoc")]
#[command(version, about = "Convert the Vulkan specification to cross-linked Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    vkdoc build                          Build dist/ from ./Vulkan-Docs
    vkdoc -c vkdoc.yaml build -o site    Build with a config file into site/
    vkdoc convert page.xml --docbook     Convert one DocBook file to stdout
    vkdoc refpages                       List discovered reference pages")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Root of the specification sources
    #[arg(long, value_name = "DIR", global = true)]
    source_dir: Option<PathBuf>,

    /// Sources are DocBook already; skip asciidoctor
    #[arg(long, global = true)]
    docbook: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert the master document and all reference pages
    Build {
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert a single document and print Markdown
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Heading levels to use
        #[arg(long, value_enum, default_value_t = Kind::Page)]
        kind: Kind,

        /// Resolve cross-references with a registry written by `build`
        #[arg(long, value_name = "FILE")]
        xrefs: Option<PathBuf>,
    },

    /// List the reference pages found in the sources
    Refpages,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Master,
    Page,
}

impl From<Kind> for DocumentKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Master => DocumentKind::Master,
            Kind::Page => DocumentKind::Page,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.source_dir {
        config.source_dir = dir.clone();
    }
    if cli.docbook {
        config.processor.kind = vkdoc::config::ProcessorKind::Docbook;
    }
    if let Command::Build {
        output: Some(output),
    } = &cli.command
    {
        config.output_dir = output.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Command::Build { .. } => {
            let output_dir = config.output_dir.clone();
            let report = Pipeline::new(config).build()?;

            println!(
                "Wrote {} chunks and {} reference pages to {}",
                report.chunks,
                report.pages,
                output_dir.display()
            );
            println!(
                "Registered {} ids, resolved {} references ({} unresolved, {} duplicate ids)",
                report.registered,
                report.rewrite.resolved,
                report.rewrite.unresolved.len(),
                report.duplicates
            );
            if !report.skipped.is_empty() {
                println!("Skipped {} documents:", report.skipped.len());
                for (name, reason) in &report.skipped {
                    println!("  {name}: {reason}");
                }
            }
        }

        Command::Convert { input, kind, xrefs } => {
            let registry = xrefs
                .as_deref()
                .map(Registry::load)
                .transpose()
                .context("failed to load cross-reference registry")?;
            let markdown = Pipeline::new(config)
                .convert_file(input, (*kind).into(), registry.as_ref())
                .with_context(|| format!("failed to convert {}", input.display()))?;
            println!("{markdown}");
        }

        Command::Refpages => {
            let pages = vkdoc::refpage::discover(&config.page_dirs(), &config.skip_pages)?;
            for page in &pages {
                println!("{}\t{}\t{}", page.name, page.kind, page.description);
            }
        }
    }

    Ok(())
}
