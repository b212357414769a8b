//! Shared domain types for the chat analyzer.
//!
//! Message records and participant selection, the error type, header
//! timestamp formats, display formatting and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{AnalyzerError, Result};
pub use models::{ChatSession, MessageRecord, Participant, GROUP_NOTIFICATION, OVERALL};
