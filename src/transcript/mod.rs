use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

// ===================================================================
// Transcript records — one per JSONL line
// ===================================================================

/// A single line of a session transcript.
///
/// Transcripts carry a dozen entry shapes (user, assistant, progress, ...);
/// the only field this tool cares about is the plan `slug` that Claude Code
/// stamps on conversation entries, so everything else stays untyped.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    slug: Option<String>,
}

/// Parse one transcript line, yielding its slug if the line is a
/// well-formed object carrying a string `slug`.
///
/// Anything else — blank lines, truncated JSON from a concurrent writer,
/// non-object values, a non-string slug — contributes nothing. The host
/// process owns the file and rewrites lines freely; a malformed line is an
/// expected state, not an error.
fn parse_slug(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str::<Record>(line).ok()?.slug
}

/// Read the transcript, reporting a missing or unreadable file on stderr
/// and treating it as empty.
fn read_contents(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("planport: transcript file not found: {}", path.display());
            None
        }
        Err(e) => {
            eprintln!("planport: reading transcript {}: {e}", path.display());
            None
        }
    }
}

// ===================================================================
// Scanning
// ===================================================================

/// The first slug in file order, from a single scan.
pub fn first_slug(path: &Path) -> Option<String> {
    read_contents(path)?.lines().find_map(parse_slug)
}

/// Like [`first_slug`], but re-scans when nothing is found.
///
/// The transcript may still be appended to when the SessionEnd hook fires,
/// so the slug line can be absent or torn on the first pass. Re-scan up to
/// `retries` times with a fixed `delay` in between; exhaustion means the
/// writer was slower than the budget and is an ordinary `None`.
pub fn first_slug_with_retry(path: &Path, retries: u32, delay: Duration) -> Option<String> {
    let attempts = retries.max(1);
    for attempt in 0..attempts {
        if let Some(slug) = first_slug(path) {
            return Some(slug);
        }
        if attempt + 1 < attempts {
            thread::sleep(delay);
        }
    }
    None
}

/// Every distinct slug in one transcript file.
pub fn all_slugs(path: &Path) -> BTreeSet<String> {
    match read_contents(path) {
        Some(contents) => contents.lines().filter_map(parse_slug).collect(),
        None => BTreeSet::new(),
    }
}

/// The union of slugs across every `*.jsonl` file in `dir`, skipping files
/// whose name starts with `skip_prefix` (subagent transcripts).
///
/// Ordered so callers process slugs deterministically.
pub fn slugs_in_dir(dir: &Path, skip_prefix: &str) -> Result<BTreeSet<String>> {
    let mut slugs = BTreeSet::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
            continue;
        }
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if name.starts_with(skip_prefix) {
            continue;
        }
        slugs.extend(all_slugs(&path));
    }
    Ok(slugs)
}
