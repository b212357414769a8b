//! Transcript discovery and loading.
//!
//! Accepts either the exported `.txt` file itself or the directory an export
//! archive was unzipped into, and returns the decoded transcript text.

use std::path::{Path, PathBuf};

use chat_core::error::{AnalyzerError, Result};
use tracing::{debug, warn};

/// File name used for the transcript inside bracketed-format export archives.
const ARCHIVE_TRANSCRIPT_NAME: &str = "_chat.txt";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.txt` files recursively under `dir`, sorted by path.
pub fn find_text_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Export directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("txt"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Resolve `path` to a single transcript file.
///
/// A file path is returned as-is. For a directory, `_chat.txt` is preferred
/// and otherwise the first `.txt` file in path order is used; the remaining
/// files are ignored, never merged.
pub fn locate_transcript(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(AnalyzerError::TranscriptNotFound(path.to_path_buf()));
    }

    let files = find_text_files(path);
    if files.len() > 1 {
        debug!(
            "{} text files under {}; picking one transcript",
            files.len(),
            path.display()
        );
    }

    files
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n == ARCHIVE_TRANSCRIPT_NAME)
                .unwrap_or(false)
        })
        .or_else(|| files.first())
        .cloned()
        .ok_or_else(|| AnalyzerError::TranscriptNotFound(path.to_path_buf()))
}

/// Read a transcript file as text.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD rather than rejecting
/// the whole file.
pub fn read_transcript(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| AnalyzerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "{} is not valid UTF-8; undecodable bytes were replaced",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Locate and read the transcript at `path`.
///
/// Returns the resolved file path together with its text.
pub fn load_transcript_text(path: &Path) -> Result<(PathBuf, String)> {
    let file = locate_transcript(path)?;
    let text = read_transcript(&file)?;
    Ok((file, text))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    // ── find_text_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_text_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.txt", b"x");
        write_file(dir.path(), "a.TXT", b"x");
        write_file(dir.path(), "nested/c.txt", b"x");
        write_file(dir.path(), "photo.jpg", b"x");

        let files = find_text_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_find_text_files_nonexistent_path() {
        let files = find_text_files(Path::new("/tmp/does-not-exist-chat-analyzer-xyz"));
        assert!(files.is_empty());
    }

    // ── locate_transcript ─────────────────────────────────────────────────────

    #[test]
    fn test_locate_transcript_file_passthrough() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "WhatsApp Chat with Bob.txt", b"x");
        assert_eq!(locate_transcript(&file).unwrap(), file);
    }

    #[test]
    fn test_locate_transcript_prefers_archive_name() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "aaa-notes.txt", b"x");
        let chat = write_file(dir.path(), "_chat.txt", b"x");
        assert_eq!(locate_transcript(dir.path()).unwrap(), chat);
    }

    #[test]
    fn test_locate_transcript_first_text_file() {
        let dir = TempDir::new().unwrap();
        let first = write_file(dir.path(), "a.txt", b"x");
        write_file(dir.path(), "b.txt", b"x");
        assert_eq!(locate_transcript(dir.path()).unwrap(), first);
    }

    #[test]
    fn test_locate_transcript_empty_directory() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "IMG-0001.jpg", b"x");
        let err = locate_transcript(dir.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::TranscriptNotFound(_)));
    }

    #[test]
    fn test_locate_transcript_missing_path() {
        let err = locate_transcript(Path::new("/tmp/no-such-export-xyz/chat.txt")).unwrap_err();
        assert!(matches!(err, AnalyzerError::TranscriptNotFound(_)));
    }

    // ── read_transcript ───────────────────────────────────────────────────────

    #[test]
    fn test_read_transcript_utf8() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "chat.txt", "01/01/23, 10:00 - Zoë: 😀".as_bytes());
        assert_eq!(read_transcript(&file).unwrap(), "01/01/23, 10:00 - Zoë: 😀");
    }

    #[test]
    fn test_read_transcript_lossy_on_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "chat.txt", b"01/01/23, 10:00 - Al: caf\xe9");
        let text = read_transcript(&file).unwrap();
        assert!(text.starts_with("01/01/23, 10:00 - Al: caf"));
        assert!(text.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_read_transcript_missing_file() {
        let err = read_transcript(Path::new("/tmp/no-such-chat-xyz.txt")).unwrap_err();
        assert!(matches!(err, AnalyzerError::FileRead { .. }));
    }

    // ── load_transcript_text ──────────────────────────────────────────────────

    #[test]
    fn test_load_transcript_text_from_directory() {
        let dir = TempDir::new().unwrap();
        let chat = write_file(dir.path(), "_chat.txt", b"[01/01/23, 14:30:00] Carol: Test");
        let (path, text) = load_transcript_text(dir.path()).unwrap();
        assert_eq!(path, chat);
        assert_eq!(text, "[01/01/23, 14:30:00] Carol: Test");
    }
}
