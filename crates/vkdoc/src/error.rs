//! Error types for the vkdoc pipeline

use std::path::PathBuf;

use thiserror::Error;
use vkdoc_docbook::{ConvertError, XmlError};

use crate::config::ConfigError;

/// An include directive could not be expanded
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("included file not found: {target} ({})", path.display())]
    Missing { target: String, path: PathBuf },

    #[error("failed to read included file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("includes nested deeper than {0} levels at {1}")]
    TooDeep(usize, String),
}

/// The markup processor failed to render a document
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed on {document} ({status}): {stderr}")]
    Failed {
        program: String,
        document: String,
        status: String,
        stderr: String,
    },

    #[error("processor I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("processor output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Any failure of the vkdoc pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Include(#[from] IncludeError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error("invalid DocBook output: {0}")]
    Xml(#[from] XmlError),

    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this failure only concerns the current document
    pub fn is_document_local(&self) -> bool {
        match self {
            Error::Processor(ProcessorError::Spawn { .. }) => false,
            Error::Include(_) | Error::Processor(_) | Error::Xml(_) | Error::Convert(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
