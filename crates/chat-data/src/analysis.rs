//! Main analysis pipeline for the chat analyzer.
//!
//! Loads and parses a transcript, then runs every statistic for one
//! participant selection, returning an [`AnalysisReport`] ready for output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chat_core::error::Result;
use chat_core::models::{ChatSession, Participant};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::parser::{parse_with_summary, ParseSummary};
use crate::reader::load_transcript_text;
use crate::stats::{
    AverageResponse, ChatStatistics, Frequency, HourActivity, OverallStats, ResponseEntry,
    TimelinePoint, UserActivity,
};

// ── Public types ──────────────────────────────────────────────────────────────

/// A transcript that has been read from disk and parsed.
#[derive(Debug, Clone)]
pub struct ParsedTranscript {
    /// The transcript file that was actually read.
    pub source: PathBuf,
    /// Parsed records, immutable for the rest of the run.
    pub session: ChatSession,
    /// What the parser did with the input.
    pub summary: ParseSummary,
    /// Wall-clock seconds spent reading and parsing.
    pub load_time_seconds: f64,
}

/// Metadata produced alongside the analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Records in the whole session.
    pub records_total: usize,
    /// Records belonging to the selected participant.
    pub records_selected: usize,
    /// Wall-clock seconds spent computing statistics.
    pub analysis_time_seconds: f64,
}

/// Every statistic for one participant selection.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub participant: Participant,
    pub overall: OverallStats,
    pub monthly_timeline: Vec<TimelinePoint>,
    pub weekday_activity: BTreeMap<String, usize>,
    pub month_activity: BTreeMap<String, usize>,
    pub most_common_words: Vec<Frequency>,
    pub emojis: Vec<Frequency>,
    pub peak_hours: Vec<HourActivity>,
    /// Per-sender message counts over the whole session.
    pub most_active_users: Vec<UserActivity>,
    /// Sender-change delays over the whole session.
    pub response_patterns: Vec<ResponseEntry>,
    pub average_response_times: Vec<AverageResponse>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Read and parse the transcript at `path` (a file or an export directory).
pub fn load_transcript(path: &Path) -> Result<ParsedTranscript> {
    let load_start = std::time::Instant::now();
    let (source, text) = load_transcript_text(path)?;
    let (records, summary) = parse_with_summary(&text);
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} messages from {} in {:.3}s",
        records.len(),
        source.display(),
        load_time
    );

    Ok(ParsedTranscript {
        source,
        session: ChatSession::new(records),
        summary,
        load_time_seconds: load_time,
    })
}

/// Run every statistic over `session` for `participant`.
///
/// Participant-scoped sections only see that participant's records. Sender
/// rankings and response patterns always cover the whole session, since
/// they describe the interplay between participants.
pub fn analyze_session(session: &ChatSession, participant: &Participant) -> AnalysisReport {
    let start = std::time::Instant::now();
    let records = session.records();

    let overall = ChatStatistics::overall_stats(participant, records);
    let monthly_timeline = ChatStatistics::monthly_timeline(participant, records);
    let weekday_activity = ChatStatistics::weekday_activity(participant, records);
    let month_activity = ChatStatistics::month_activity(participant, records);
    let most_common_words = ChatStatistics::most_common_words(participant, records);
    let emojis = ChatStatistics::emoji_frequency(participant, records);
    let peak_hours = ChatStatistics::peak_activity_hours(participant, records);
    let most_active_users = ChatStatistics::most_active_users(records);
    let response_patterns = ChatStatistics::response_patterns(records);
    let average_response_times = ChatStatistics::average_response_times(records);

    let metadata = AnalysisMetadata {
        generated_at: Local::now().to_rfc3339(),
        records_total: records.len(),
        records_selected: overall.messages,
        analysis_time_seconds: start.elapsed().as_secs_f64(),
    };

    info!(
        "Analysed {} of {} messages for {}",
        metadata.records_selected, metadata.records_total, participant
    );

    AnalysisReport {
        participant: participant.clone(),
        overall,
        monthly_timeline,
        weekday_activity,
        month_activity,
        most_common_words,
        emojis,
        peak_hours,
        most_active_users,
        response_patterns,
        average_response_times,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_session;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
01/01/23, 9:55 AM - Alice created group \"Weekend\"
01/01/23, 10:00 AM - Alice: Hello
how are you?
01/01/23, 10:05 AM - Bob: Good, thanks! 😀
01/01/23, 10:07 AM - Bob: <Media omitted>
02/02/23, 8:30 PM - Alice: see https://example.com
02/02/23, 8:31 PM - Bob: Missed voice call";

    #[test]
    fn test_analyze_session_round_trip_scenario() {
        let session = parse_session(
            "01/01/23, 10:00 AM - Alice: Hello\nhow are you?\n01/01/23, 10:05 AM - Bob: Good, thanks!",
        );
        let report = analyze_session(&session, &Participant::Overall);

        assert_eq!(report.overall.messages, 2);
        assert_eq!(report.response_patterns.len(), 1);
        let entry = &report.response_patterns[0];
        assert_eq!(entry.from, "Alice");
        assert_eq!(entry.to, "Bob");
        assert!((entry.minutes - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_session_overall() {
        let session = parse_session(SAMPLE);
        let report = analyze_session(&session, &Participant::Overall);

        assert_eq!(report.overall.messages, 6);
        assert_eq!(report.overall.media, 1);
        assert_eq!(report.overall.links, 1);
        assert_eq!(report.overall.missed_calls, 1);
        assert_eq!(report.overall.members, 3);
        assert_eq!(report.overall.first_date, "2023-01-01");
        assert_eq!(report.overall.last_date, "2023-02-02");
        assert_eq!(report.monthly_timeline.len(), 2);
        assert_eq!(report.monthly_timeline[0].label, "January-2023");
        assert_eq!(report.emojis[0].item, "😀");
        assert_eq!(report.metadata.records_total, 6);
        assert_eq!(report.metadata.records_selected, 6);
    }

    #[test]
    fn test_analyze_session_named_participant() {
        let session = parse_session(SAMPLE);
        let report = analyze_session(&session, &Participant::from("Bob"));

        assert_eq!(report.overall.messages, 3);
        assert_eq!(report.overall.members, 1);
        assert_eq!(report.metadata.records_selected, 3);
        assert_eq!(report.metadata.records_total, 6);
        // Session-wide sections are unaffected by the selection.
        assert_eq!(report.most_active_users.len(), 3);
        assert!(!report.response_patterns.is_empty());
    }

    #[test]
    fn test_analyze_session_empty() {
        let report = analyze_session(&ChatSession::default(), &Participant::Overall);
        assert_eq!(report.overall.messages, 0);
        assert_eq!(report.overall.first_date, "N/A");
        assert_eq!(report.overall.last_date, "N/A");
        assert!(report.monthly_timeline.is_empty());
        assert!(report.weekday_activity.is_empty());
        assert!(report.most_common_words.is_empty());
        assert!(report.peak_hours.is_empty());
        assert!(report.response_patterns.is_empty());
        assert!(report.average_response_times.is_empty());
    }

    #[test]
    fn test_report_serialises_to_json() {
        let session = parse_session(SAMPLE);
        let report = analyze_session(&session, &Participant::from("Alice"));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["participant"], "Alice");
        assert_eq!(json["overall"]["messages"], 2);
        assert!(json["weekday_activity"].is_object());
        assert!(json["metadata"]["generated_at"].is_string());
    }

    #[test]
    fn test_load_transcript_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let parsed = load_transcript(&path).unwrap();
        assert_eq!(parsed.source, path);
        assert_eq!(parsed.session.len(), 6);
        assert_eq!(parsed.summary.headers_matched, 6);
        assert_eq!(parsed.summary.continuation_lines, 1);
        assert!(parsed.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_load_transcript_missing() {
        let dir = TempDir::new().unwrap();
        assert!(load_transcript(&dir.path().join("missing.txt")).is_err());
    }
}
