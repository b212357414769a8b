mod bootstrap;
mod report;

use anyhow::{bail, Result};
use chat_core::settings::Settings;
use chat_data::analysis::{analyze_session, load_transcript};
use chat_data::stats::ChatStatistics;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Chat Analyzer v{} starting", env!("CARGO_PKG_VERSION"));

    let Some(path) = settings.transcript.as_deref() else {
        if settings.clear {
            println!("Saved configuration cleared.");
            return Ok(());
        }
        bail!("no transcript given; pass an exported chat .txt file or its unzipped directory");
    };

    let parsed = load_transcript(path)?;
    tracing::debug!("Parse summary for {}: {:?}", parsed.source.display(), parsed.summary);

    if parsed.session.is_empty() {
        tracing::warn!(
            "No messages recognised in {}; is this an exported chat?",
            parsed.source.display()
        );
    }

    if settings.list_users {
        let participants = ChatStatistics::participants(&parsed.session);
        print!("{}", report::render_participants(&participants));
        return Ok(());
    }

    let participant = parsed.session.resolve_participant(&settings.user)?;
    tracing::info!("Analysing {} for {}", parsed.source.display(), participant);

    if settings.word_cloud {
        println!(
            "{}",
            ChatStatistics::word_cloud_text(&participant, parsed.session.records())
        );
        return Ok(());
    }

    let analysis = analyze_session(&parsed.session, &participant);

    if settings.wants_json() {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render_text(&analysis));
    }

    Ok(())
}
