//! Plain-text rendering of an [`AnalysisReport`].
//!
//! Each section is a titled, column-aligned table. Widths are measured in
//! terminal cells so sender names and emoji line up.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chat_core::formatting::{format_count, format_minutes, percentage};
use chat_core::time_utils::{month_name, weekday_name};
use chat_data::analysis::AnalysisReport;
use chrono::Weekday;
use unicode_width::UnicodeWidthStr;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Table helper ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Pad `text` to `width` terminal cells.
fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

/// Render `rows` under `headers`, one space-padded column per header.
///
/// The first column is left-aligned, the rest right-aligned.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let align = if i == 0 { Align::Left } else { Align::Right };
                pad(cell, widths[i], align)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.to_vec()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.width()));
    if body.is_empty() {
        let _ = writeln!(out, "(no data)");
    } else {
        out.push_str(body);
    }
    out.push('\n');
}

/// Rows for a name-keyed count map in the given display order, skipping
/// names that never occur.
fn ordered_counts<'a>(
    counts: &BTreeMap<String, usize>,
    order: impl Iterator<Item = &'a str>,
) -> Vec<Vec<String>> {
    order
        .filter_map(|name| {
            counts
                .get(name)
                .map(|n| vec![name.to_string(), format_count(*n as u64)])
        })
        .collect()
}

fn table_or_empty(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        String::new()
    } else {
        render_table(headers, rows)
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Render every section of `report` as plain text.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let overall = &report.overall;

    let summary = render_table(
        &["Metric", "Value"],
        &[
            vec!["Messages".into(), format_count(overall.messages as u64)],
            vec!["Words".into(), format_count(overall.words as u64)],
            vec!["Media shared".into(), format_count(overall.media as u64)],
            vec!["Links shared".into(), format_count(overall.links as u64)],
            vec!["Missed calls".into(), format_count(overall.missed_calls as u64)],
            vec!["Members".into(), format_count(overall.members as u64)],
            vec!["First message".into(), overall.first_date.clone()],
            vec!["Last message".into(), overall.last_date.clone()],
        ],
    );
    section(
        &mut out,
        &format!("Chat statistics: {}", report.participant),
        &summary,
    );

    let timeline: Vec<Vec<String>> = report
        .monthly_timeline
        .iter()
        .map(|p| vec![p.label.clone(), format_count(p.messages as u64)])
        .collect();
    section(
        &mut out,
        "Monthly timeline",
        &table_or_empty(&["Month", "Messages"], &timeline),
    );

    let weekdays = ordered_counts(&report.weekday_activity, WEEK.iter().map(|d| weekday_name(*d)));
    section(
        &mut out,
        "Busiest days",
        &table_or_empty(&["Day", "Messages"], &weekdays),
    );

    let months = ordered_counts(&report.month_activity, (1..=12).map(month_name));
    section(
        &mut out,
        "Busiest months",
        &table_or_empty(&["Month", "Messages"], &months),
    );

    let hours: Vec<Vec<String>> = report
        .peak_hours
        .iter()
        .map(|h| vec![format!("{:02}:00", h.hour), format_count(h.messages as u64)])
        .collect();
    section(
        &mut out,
        "Peak hours",
        &table_or_empty(&["Hour", "Messages"], &hours),
    );

    let words: Vec<Vec<String>> = report
        .most_common_words
        .iter()
        .map(|f| vec![f.item.clone(), format_count(f.count as u64)])
        .collect();
    section(
        &mut out,
        "Most common words",
        &table_or_empty(&["Word", "Count"], &words),
    );

    let emojis: Vec<Vec<String>> = report
        .emojis
        .iter()
        .map(|f| vec![f.item.clone(), format_count(f.count as u64)])
        .collect();
    section(
        &mut out,
        "Emojis",
        &table_or_empty(&["Emoji", "Count"], &emojis),
    );

    let total = report.metadata.records_total as u64;
    let users: Vec<Vec<String>> = report
        .most_active_users
        .iter()
        .map(|u| {
            vec![
                u.sender.clone(),
                format_count(u.messages as u64),
                format!("{:.2}%", percentage(u.messages as u64, total, 2)),
            ]
        })
        .collect();
    section(
        &mut out,
        "Most active users",
        &table_or_empty(&["Sender", "Messages", "Share"], &users),
    );

    let responses: Vec<Vec<String>> = report
        .average_response_times
        .iter()
        .map(|r| {
            vec![
                format!("{} -> {}", r.from, r.to),
                format_minutes(r.average_minutes),
                format_count(r.samples as u64),
            ]
        })
        .collect();
    section(
        &mut out,
        "Average response times",
        &table_or_empty(&["Reply", "Average", "Replies"], &responses),
    );

    out
}

/// One line per selectable participant, `"Overall"` first.
pub fn render_participants(participants: &[String]) -> String {
    participants.iter().fold(String::new(), |mut out, name| {
        let _ = writeln!(out, "{name}");
        out
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
