//! Transcript parsing.
//!
//! Turns the plain-text export of a chat into ordered [`MessageRecord`]s.
//! A line either opens a new message with a timestamped header or continues
//! the body of the message before it. Nothing in here fails: lines that are
//! neither are dropped, and so are messages whose timestamp cannot be read.

use std::sync::OnceLock;

use chat_core::models::{ChatSession, MessageRecord, GROUP_NOTIFICATION};
use chat_core::time_utils::{
    detect_batch_format, normalize_timestamp_text, parse_timestamp, TimestampFormat,
};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

// ── HeaderFormat ──────────────────────────────────────────────────────────────

/// The header layouts a message line can start with, in match priority order.
///
/// The 12-hour dash layout must be tried before the 24-hour one so that an
/// `AM`/`PM` suffix is never left dangling in the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderFormat {
    /// `01/01/23, 9:05 AM - Sender: message`
    Dash12h,
    /// `01/01/23, 21:05 - Sender: message`
    Dash24h,
    /// `[01/01/23, 09:05:00 AM] Sender: message`
    Bracketed12h,
    /// `[01/01/23, 21:05:00] Sender: message`
    Bracketed24h,
}

impl HeaderFormat {
    /// Every layout in priority order.
    pub const ALL: [HeaderFormat; 4] = [
        HeaderFormat::Dash12h,
        HeaderFormat::Dash24h,
        HeaderFormat::Bracketed12h,
        HeaderFormat::Bracketed24h,
    ];

    fn index(self) -> usize {
        match self {
            HeaderFormat::Dash12h => 0,
            HeaderFormat::Dash24h => 1,
            HeaderFormat::Bracketed12h => 2,
            HeaderFormat::Bracketed24h => 3,
        }
    }

    fn regex(self) -> &'static Regex {
        static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            [
                r"^(\d{2}/\d{2}/\d{2},\s\d{1,2}:\d{2}\s[APMapm]{2})\s-\s*(.*)$",
                r"^(\d{2}/\d{2}/\d{2},\s\d{1,2}:\d{2})\s-\s*(.*)$",
                r"^\[(\d{2}/\d{2}/\d{2},\s\d{1,2}:\d{2}:\d{2}\s[APMapm]{2})\]\s*(.*)$",
                r"^\[(\d{2}/\d{2}/\d{2},\s\d{1,2}:\d{2}:\d{2})\]\s*(.*)$",
            ]
            .map(|p| Regex::new(p).expect("regex is valid"))
        });
        &patterns[self.index()]
    }

    fn is_bracketed(self) -> bool {
        matches!(self, HeaderFormat::Bracketed12h | HeaderFormat::Bracketed24h)
    }

    /// Match `line` against this layout.
    ///
    /// Returns the raw timestamp text and the trimmed sender and message.
    /// A header without a sender delimiter is a system notification and is
    /// attributed to [`GROUP_NOTIFICATION`].
    pub fn match_line(self, line: &str) -> Option<HeaderMatch> {
        let caps = self.regex().captures(line)?;
        let timestamp_text = caps.get(1)?.as_str().to_string();
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let (sender, message) = match self.sender_delimiter(rest) {
            Some(colon) => (rest[..colon].trim(), rest[colon + 1..].trim()),
            None => (GROUP_NOTIFICATION, rest.trim()),
        };

        Some(HeaderMatch {
            format: self,
            timestamp_text,
            sender: sender.to_string(),
            message: message.to_string(),
        })
    }

    /// Byte offset of the colon that ends the sender name.
    ///
    /// Dash layouts split on the first colon. Bracketed layouts split on the
    /// first colon that is followed by whitespace or ends the line.
    fn sender_delimiter(self, rest: &str) -> Option<usize> {
        if !self.is_bracketed() {
            return rest.find(':');
        }
        rest.char_indices()
            .filter(|&(_, c)| c == ':')
            .map(|(i, _)| i)
            .find(|&i| rest[i + 1..].chars().next().map_or(true, char::is_whitespace))
    }
}

/// Fields extracted from one header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub format: HeaderFormat,
    pub timestamp_text: String,
    pub sender: String,
    pub message: String,
}

/// Try every [`HeaderFormat`] in priority order against `line`.
pub fn match_header(line: &str) -> Option<HeaderMatch> {
    HeaderFormat::ALL.iter().find_map(|fmt| fmt.match_line(line))
}

// ── ParseSummary ──────────────────────────────────────────────────────────────

/// Counters describing what the parser did with its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    /// Non-empty lines seen.
    pub lines_read: usize,
    /// Lines recognised as message headers.
    pub headers_matched: usize,
    /// Lines folded into the previous message body.
    pub continuation_lines: usize,
    /// Non-header lines discarded because no message preceded them.
    pub orphan_lines: usize,
    /// Messages dropped because their timestamp could not be parsed.
    pub dropped_timestamps: usize,
    /// The single format every timestamp parsed under, if there was one.
    pub batch_format: Option<TimestampFormat>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse a whole transcript into records, in file order.
pub fn parse(raw: &str) -> Vec<MessageRecord> {
    parse_with_summary(raw).0
}

/// Parse a transcript and wrap the records in a [`ChatSession`].
pub fn parse_session(raw: &str) -> ChatSession {
    ChatSession::new(parse(raw))
}

/// Parse a transcript, also returning a [`ParseSummary`].
pub fn parse_with_summary(raw: &str) -> (Vec<MessageRecord>, ParseSummary) {
    let mut summary = ParseSummary::default();
    let candidates = collect_candidates(raw, &mut summary);

    let texts: Vec<&str> = candidates.iter().map(|c| c.timestamp_text.as_str()).collect();
    let timestamps = resolve_timestamps(&texts, &mut summary);

    let records: Vec<MessageRecord> = candidates
        .into_iter()
        .zip(timestamps)
        .filter_map(|(candidate, ts)| {
            ts.map(|ts| MessageRecord::new(ts, candidate.sender, candidate.body))
        })
        .collect();

    summary.dropped_timestamps = summary.headers_matched - records.len();
    if summary.dropped_timestamps > 0 {
        warn!(
            "Dropped {} message(s) with unreadable timestamps",
            summary.dropped_timestamps
        );
    }

    debug!(
        "Parsed {} lines: {} headers, {} continuations, {} orphans, {} records",
        summary.lines_read,
        summary.headers_matched,
        summary.continuation_lines,
        summary.orphan_lines,
        records.len(),
    );

    (records, summary)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// A header with its body, before the timestamp has been parsed.
#[derive(Debug)]
struct Candidate {
    timestamp_text: String,
    sender: String,
    body: String,
}

/// Strip whitespace plus the byte-order and left-to-right marks exporters
/// put in front of lines.
fn clean_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}' || c == '\u{200E}')
}

fn collect_candidates(raw: &str, summary: &mut ParseSummary) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for line in raw.lines().map(clean_line).filter(|l| !l.is_empty()) {
        summary.lines_read += 1;

        if let Some(header) = match_header(line) {
            summary.headers_matched += 1;
            candidates.push(Candidate {
                timestamp_text: header.timestamp_text,
                sender: header.sender,
                body: header.message,
            });
            continue;
        }

        match candidates.last_mut() {
            Some(last) => {
                summary.continuation_lines += 1;
                last.body.push('\n');
                last.body.push_str(line);
            }
            None => summary.orphan_lines += 1,
        }
    }

    candidates
}

/// Parse every timestamp text, using one shared format when all of them
/// agree and falling back to per-text parsing otherwise.
fn resolve_timestamps(texts: &[&str], summary: &mut ParseSummary) -> Vec<Option<NaiveDateTime>> {
    summary.batch_format = detect_batch_format(texts);

    match summary.batch_format {
        Some(fmt) => texts
            .iter()
            .map(|t| fmt.parse(&normalize_timestamp_text(t)))
            .collect(),
        None => texts
            .iter()
            .map(|t| match parse_timestamp(t) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            })
            .collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
