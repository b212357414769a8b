//! Read-only statistics over parsed chat records.
//!
//! Every query is independent and pure: it borrows the records, optionally
//! narrows them to one [`Participant`], and returns plain data. An empty
//! selection always yields zero counts or empty collections.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use chat_core::formatting::format_date;
use chat_core::models::{ChatSession, MessageRecord, Participant, OVERALL};
use regex::Regex;
use serde::Serialize;

/// Number of entries returned by [`ChatStatistics::most_common_words`].
pub const TOP_WORDS: usize = 10;
/// Number of entries returned by [`ChatStatistics::emoji_frequency`].
pub const TOP_EMOJIS: usize = 10;
/// Number of entries returned by [`ChatStatistics::peak_activity_hours`].
pub const TOP_HOURS: usize = 3;
/// Placeholder exporters substitute for attachments.
pub const MEDIA_OMITTED: &str = "<Media omitted>";

// ── Output types ──────────────────────────────────────────────────────────────

/// Headline counts for a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub messages: usize,
    /// Whitespace-separated tokens across all bodies.
    pub words: usize,
    /// Messages carrying the media-omitted placeholder.
    pub media: usize,
    /// Web links found across all bodies.
    pub links: usize,
    pub missed_calls: usize,
    /// Distinct senders, the notification sentinel included.
    pub members: usize,
    /// `YYYY-MM-DD` of the earliest message, or `"N/A"`.
    pub first_date: String,
    /// `YYYY-MM-DD` of the latest message, or `"N/A"`.
    pub last_date: String,
}

/// Message count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub year: i32,
    pub month_num: u32,
    pub month: String,
    pub messages: usize,
    /// Display label, e.g. `"January-2023"`.
    pub label: String,
}

/// A token and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frequency {
    pub item: String,
    pub count: usize,
}

/// Message count for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourActivity {
    pub hour: u32,
    pub messages: usize,
}

/// Message count for one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivity {
    pub sender: String,
    pub messages: usize,
}

/// Delay between a message and the next one by a different sender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEntry {
    pub from: String,
    pub to: String,
    pub minutes: f64,
}

/// Mean response delay for one ordered sender pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageResponse {
    pub from: String,
    pub to: String,
    pub average_minutes: f64,
    pub samples: usize,
}

// ── Patterns ──────────────────────────────────────────────────────────────────

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("regex is valid"))
}

/// Two blocks only: Emoticons and Miscellaneous Symbols and Pictographs.
/// Flags, skin tones, transport symbols and newer emoji are not counted.
fn emoji_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}]+").expect("regex is valid")
    })
}

fn missed_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)missed .* call").expect("regex is valid"))
}

/// Links with a scheme or `www.` prefix, plus bare domains under common
/// top-level domains.
fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?i)(?:https?://|ftp://|www\.)[^\s<>"]+"#,
            r"|\b[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*",
            r"\.(?:com|org|net|edu|gov|io|dev|app|co|me|ly|gl|be|in|uk|de|fr|info|biz)\b",
            r#"(?:/[^\s<>"]*)?"#,
        ))
        .expect("regex is valid")
    })
}

/// Count the web links in `text`. Matches directly preceded by `@` are
/// e-mail domains and are skipped.
fn count_links(text: &str) -> usize {
    url_regex()
        .find_iter(text)
        .filter(|m| !text[..m.start()].ends_with('@'))
        .count()
}

/// Rank `items` by count descending, ties by first occurrence, keep `n`.
fn top_n<'a>(items: impl Iterator<Item = &'a str>, n: usize) -> Vec<Frequency> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, item) in items.enumerate() {
        counts.entry(item).or_insert((0, order)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first))| (item, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(n)
        .map(|(item, count, _)| Frequency {
            item: item.to_string(),
            count,
        })
        .collect()
}

/// Count records per key, keyed by whatever `key_fn` extracts.
fn count_by<K: Ord>(
    records: &[&MessageRecord],
    key_fn: impl Fn(&MessageRecord) -> K,
) -> BTreeMap<K, usize> {
    let mut map = BTreeMap::new();
    for record in records {
        *map.entry(key_fn(*record)).or_insert(0) += 1;
    }
    map
}

// ── ChatStatistics ────────────────────────────────────────────────────────────

/// Stateless collection of statistics queries.
pub struct ChatStatistics;

impl ChatStatistics {
    /// Headline counts and date range for the selection.
    pub fn overall_stats(participant: &Participant, records: &[MessageRecord]) -> OverallStats {
        let selected = participant.filter(records);

        let media_marker = MEDIA_OMITTED.to_lowercase();
        let members: BTreeSet<&str> = selected.iter().map(|r| r.sender.as_str()).collect();

        OverallStats {
            messages: selected.len(),
            words: selected.iter().map(|r| r.body.split_whitespace().count()).sum(),
            media: selected
                .iter()
                .filter(|r| r.body.to_lowercase().contains(&media_marker))
                .count(),
            links: selected.iter().map(|r| count_links(&r.body)).sum(),
            missed_calls: selected
                .iter()
                .filter(|r| missed_call_regex().is_match(&r.body))
                .count(),
            members: members.len(),
            first_date: format_date(selected.iter().map(|r| r.timestamp).min()),
            last_date: format_date(selected.iter().map(|r| r.timestamp).max()),
        }
    }

    /// Messages per calendar month, ascending by (year, month).
    pub fn monthly_timeline(
        participant: &Participant,
        records: &[MessageRecord],
    ) -> Vec<TimelinePoint> {
        let selected = participant.filter(records);
        let mut months: BTreeMap<(i32, u32), (&str, usize)> = BTreeMap::new();
        for record in &selected {
            let cal = &record.calendar;
            months
                .entry((cal.year, cal.month_num))
                .or_insert((cal.month.as_str(), 0))
                .1 += 1;
        }

        months
            .into_iter()
            .map(|((year, month_num), (month, messages))| TimelinePoint {
                year,
                month_num,
                month: month.to_string(),
                messages,
                label: format!("{}-{}", month, year),
            })
            .collect()
    }

    /// Messages per weekday name.
    pub fn weekday_activity(
        participant: &Participant,
        records: &[MessageRecord],
    ) -> BTreeMap<String, usize> {
        count_by(&participant.filter(records), |r| r.calendar.day_name.clone())
    }

    /// Messages per month name, across all years.
    pub fn month_activity(
        participant: &Participant,
        records: &[MessageRecord],
    ) -> BTreeMap<String, usize> {
        count_by(&participant.filter(records), |r| r.calendar.month.clone())
    }

    /// The [`TOP_WORDS`] most frequent word-character runs, case-sensitive.
    pub fn most_common_words(
        participant: &Participant,
        records: &[MessageRecord],
    ) -> Vec<Frequency> {
        let selected = participant.filter(records);
        let words = selected
            .iter()
            .flat_map(|r| word_regex().find_iter(&r.body).map(|m| m.as_str()));
        top_n(words, TOP_WORDS)
    }

    /// The [`TOP_EMOJIS`] most frequent emoji runs.
    ///
    /// Adjacent emoji form one run, so `"😂😂"` counts once as `"😂😂"`.
    pub fn emoji_frequency(participant: &Participant, records: &[MessageRecord]) -> Vec<Frequency> {
        let selected = participant.filter(records);
        let emojis = selected
            .iter()
            .flat_map(|r| emoji_regex().find_iter(&r.body).map(|m| m.as_str()));
        top_n(emojis, TOP_EMOJIS)
    }

    /// The [`TOP_HOURS`] busiest hours of the day; ties go to the earlier hour.
    pub fn peak_activity_hours(
        participant: &Participant,
        records: &[MessageRecord],
    ) -> Vec<HourActivity> {
        let by_hour = count_by(&participant.filter(records), |r| r.calendar.hour);

        let mut hours: Vec<HourActivity> = by_hour
            .into_iter()
            .map(|(hour, messages)| HourActivity { hour, messages })
            .collect();
        // Stable sort keeps ascending hour order among equal counts.
        hours.sort_by(|a, b| b.messages.cmp(&a.messages));
        hours.truncate(TOP_HOURS);
        hours
    }

    /// One entry per sender change between chronologically adjacent records.
    ///
    /// Records are ordered by timestamp with a stable sort, so messages that
    /// share a minute keep their transcript order. Consecutive messages from
    /// the same sender produce nothing.
    pub fn response_patterns(records: &[MessageRecord]) -> Vec<ResponseEntry> {
        let mut ordered: Vec<&MessageRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);

        ordered
            .windows(2)
            .filter(|pair| pair[0].sender != pair[1].sender)
            .map(|pair| ResponseEntry {
                from: pair[0].sender.clone(),
                to: pair[1].sender.clone(),
                minutes: (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64 / 60.0,
            })
            .collect()
    }

    /// Mean of [`response_patterns`](Self::response_patterns) per
    /// `(from, to)` pair, ordered by pair.
    pub fn average_response_times(records: &[MessageRecord]) -> Vec<AverageResponse> {
        let mut pairs: BTreeMap<(String, String), (f64, usize)> = BTreeMap::new();
        for entry in Self::response_patterns(records) {
            let slot = pairs.entry((entry.from, entry.to)).or_insert((0.0, 0));
            slot.0 += entry.minutes;
            slot.1 += 1;
        }

        pairs
            .into_iter()
            .map(|((from, to), (total, samples))| AverageResponse {
                from,
                to,
                average_minutes: total / samples as f64,
                samples,
            })
            .collect()
    }

    /// Messages per sender, busiest first; ties keep first-appearance order.
    pub fn most_active_users(records: &[MessageRecord]) -> Vec<UserActivity> {
        top_n(records.iter().map(|r| r.sender.as_str()), usize::MAX)
            .into_iter()
            .map(|f| UserActivity {
                sender: f.item,
                messages: f.count,
            })
            .collect()
    }

    /// Selectable participants: `"Overall"` first, then sorted senders
    /// without the notification sentinel.
    pub fn participants(session: &ChatSession) -> Vec<String> {
        std::iter::once(OVERALL.to_string())
            .chain(session.senders())
            .collect()
    }

    /// Message bodies of the selection joined by single spaces, as consumed
    /// by word-cloud renderers.
    pub fn word_cloud_text(participant: &Participant, records: &[MessageRecord]) -> String {
        participant
            .filter(records)
            .iter()
            .map(|r| r.body.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
