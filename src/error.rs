use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Unknown source \"{input}\" (expected all, claude, cc, codex or cx)")]
    UnknownSource { input: String },

    #[error("Unsupported locale \"{input}\" (expected en, zh, de, fr or ru)")]
    UnsupportedLocale { input: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures that abort one source scan. The inventory loader turns these
/// into an empty contribution for that source.
#[derive(Debug, Error)]
pub(crate) enum ScanError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum PricingError {
    #[error("Failed to fetch pricing: {message}")]
    Fetch { message: String },

    #[error("Failed to parse pricing data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Pricing cache error at {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model name: {model:?}")]
    InvalidModel { model: String },
}
