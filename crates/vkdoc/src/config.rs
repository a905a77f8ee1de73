//! Pipeline configuration
//!
//! Every field has a default matching the layout of a Vulkan-Docs checkout,
//! so a YAML file only needs to name what differs.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vkdoc_core::{HeadingIdStyle, Options};

use crate::registry::DuplicatePolicy;
use crate::rewrite::RewriteOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", config_path.display())]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", config_path.display())]
    ConfigParseError {
        config_path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which markup processor renders source documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    /// Run the `asciidoctor` command with the DocBook 5 backend
    #[default]
    Asciidoctor,
    /// Sources are already DocBook
    Docbook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub kind: ProcessorKind,
    /// Executable used for [`ProcessorKind::Asciidoctor`]
    pub program: String,
    /// Document attributes passed as `-a name=value`
    pub attributes: IndexMap<String, String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            kind: ProcessorKind::Asciidoctor,
            program: "asciidoctor".to_string(),
            attributes: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the specification sources
    pub source_dir: PathBuf,
    /// Master document, relative to `source_dir`
    pub master: PathBuf,
    /// Where artifacts are written
    pub output_dir: PathBuf,
    /// Directories scanned for reference pages, relative to `source_dir`
    pub page_dirs: Vec<PathBuf>,
    /// Reference pages never converted
    pub skip_pages: Vec<String>,
    /// Include prefixes (`{name}`) and the directories they stand for
    pub include_prefixes: IndexMap<String, PathBuf>,
    pub processor: ProcessorConfig,
    pub duplicate_policy: DuplicatePolicy,
    /// Target of cross-references to unknown ids
    pub not_found_url: String,
    /// Render section ids as a raw `#id ` prefix instead of `{#id}`
    pub keep_heading_prefix: bool,
}

impl Default for Config {
    fn default() -> Self {
        let include_prefixes = [
            ("chapters", "chapters"),
            ("appendices", "appendices"),
            ("generated", "gen"),
            ("config", "config"),
        ]
        .into_iter()
        .map(|(name, dir)| (name.to_string(), PathBuf::from(dir)))
        .collect();

        Self {
            source_dir: PathBuf::from("Vulkan-Docs"),
            master: PathBuf::from("vkspec.adoc"),
            output_dir: PathBuf::from("dist"),
            page_dirs: vec![PathBuf::from("chapters"), PathBuf::from("appendices")],
            skip_pages: vec!["provisional-headers".to_string()],
            include_prefixes,
            processor: ProcessorConfig::default(),
            duplicate_policy: DuplicatePolicy::default(),
            not_found_url: "/not-found".to_string(),
            keep_heading_prefix: false,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.master.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("`master` must name a document".into()));
        }
        if !self.not_found_url.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "`not_found_url` must be an absolute path, got {:?}",
                self.not_found_url
            )));
        }
        if let Some(name) = self
            .include_prefixes
            .keys()
            .find(|name| name.is_empty() || name.contains(['{', '}']))
        {
            return Err(ConfigError::Invalid(format!(
                "include prefix {name:?} must be a bare name"
            )));
        }
        Ok(())
    }

    pub fn master_path(&self) -> PathBuf {
        self.source_dir.join(&self.master)
    }

    pub fn page_dirs(&self) -> Vec<PathBuf> {
        self.page_dirs
            .iter()
            .map(|dir| self.source_dir.join(dir))
            .collect()
    }

    /// Include prefixes with their directories resolved against `source_dir`
    pub fn include_dirs(&self) -> IndexMap<String, PathBuf> {
        self.include_prefixes
            .iter()
            .map(|(name, dir)| (name.clone(), self.source_dir.join(dir)))
            .collect()
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            not_found_url: self.not_found_url.clone(),
        }
    }

    pub fn markdown_options(&self) -> Options {
        Options {
            heading_ids: if self.keep_heading_prefix {
                HeadingIdStyle::Prefix
            } else {
                HeadingIdStyle::Attribute
            },
            ..Options::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_vulkan_docs_layout() {
        let config = Config::default();
        assert_eq!(config.master_path(), PathBuf::from("Vulkan-Docs/vkspec.adoc"));
        assert_eq!(
            config.include_dirs().get("generated"),
            Some(&PathBuf::from("Vulkan-Docs/gen"))
        );
        assert_eq!(config.skip_pages, vec!["provisional-headers"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vkdoc.yaml");
        std::fs::write(
            &path,
            "source_dir: /src/Vulkan-Docs\nduplicate_policy: first-write-wins\nprocessor:\n  kind: docbook\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/src/Vulkan-Docs"));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FirstWriteWins);
        assert_eq!(config.processor.kind, ProcessorKind::Docbook);
        assert_eq!(config.processor.program, "asciidoctor");
        assert_eq!(config.not_found_url, "/not-found");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from_path(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigReadError { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vkdoc.yaml");
        std::fs::write(&path, "page_dirs: 3").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_relative_not_found_url_is_rejected() {
        let config = Config {
            not_found_url: "not-found".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_heading_prefix_option() {
        let config = Config {
            keep_heading_prefix: true,
            ..Config::default()
        };
        assert_eq!(config.markdown_options().heading_ids, HeadingIdStyle::Prefix);
    }
}
