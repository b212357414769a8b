//! Data layer for the chat analyzer.
//!
//! Locates and reads exported transcripts, parses them into message records,
//! computes statistics and runs the top-level analysis pipeline.

pub mod analysis;
pub mod parser;
pub mod reader;
pub mod stats;

pub use chat_core as core;
