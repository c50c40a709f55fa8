//! Error types for iconify-dl library
//!
//! Every error is fatal to a run: nothing here is retried or recovered locally.

use std::fmt;
use std::path::PathBuf;

/// Minimum normalized similarity for a collection ID to be offered as a suggestion
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Suggest the closest known collection ID for a possibly mistyped one
///
/// Returns `None` when the input is already a known ID or nothing is close enough.
pub fn suggest_collection<'a, I>(input: &str, known_ids: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_score = SUGGESTION_THRESHOLD;

    for id in known_ids {
        if id.eq_ignore_ascii_case(&input_lower) {
            return None;
        }

        let score = strsim::normalized_levenshtein(&input_lower, &id.to_lowercase());
        if score >= best_score {
            best_score = score;
            best_match = Some(id.to_string());
        }
    }

    best_match
}

/// Main error type for iconify-dl operations
#[derive(Debug)]
pub enum Error {
    /// Network or connection failure, including non-success HTTP statuses
    TransportError(String),

    /// Malformed or unexpected catalog response
    DecodeError(String),

    /// Directory or file creation failure
    FilesystemError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Template parsing or execution failure
    RenderError(String),

    /// Invalid selection or parameters
    InvalidInput(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FilesystemError {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportError(msg) => {
                write!(f, "Transport error: {}", msg)
            }
            Error::DecodeError(msg) => {
                write!(f, "Decode error: {}", msg)
            }
            Error::FilesystemError { path, source } => {
                write!(f, "Filesystem error at {}: {}", path.display(), source)
            }
            Error::RenderError(msg) => {
                write!(f, "Render error: {}", msg)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FilesystemError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::DecodeError(err.to_string())
        } else {
            Error::TransportError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DecodeError(err.to_string())
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Error::RenderError(format!("template: {}", err))
    }
}

impl From<handlebars::RenderError> for Error {
    fn from(err: handlebars::RenderError) -> Self {
        Error::RenderError(err.to_string())
    }
}

/// Convenience result type for iconify-dl operations
pub type Result<T> = std::result::Result<T, Error>;
