use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the chat analyzer.
///
/// Parsing and statistics never fail; only the edges that touch the
/// filesystem, the terminal or user input produce these.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A transcript file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No transcript file exists at (or under) the given path.
    #[error("No chat transcript found at {0}")]
    TranscriptNotFound(PathBuf),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// The selected participant never sent a message in the transcript.
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report could not be serialised to JSON.
    #[error("Failed to serialise JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
