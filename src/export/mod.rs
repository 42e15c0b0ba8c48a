use anyhow::{Context, Result};
use filetime::FileTime;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use time::format_description;
use time::{OffsetDateTime, UtcOffset};

// ===================================================================
// Naming
// ===================================================================

/// Destination naming policy for exported plan documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// `plan-{slug}.md`
    Flat,
    /// `{mtime}-plan-{slug}.md`
    Timestamped,
}

/// The source file's modification time rendered as `YYYYMMDD-HHMMSS`.
///
/// The rendering is a pure function of the mtime (local offset when the
/// platform yields one, UTC otherwise), so re-exporting an unchanged file
/// produces the same destination name.
pub fn timestamp_prefix(source: &Path) -> Result<String> {
    let mtime = fs::metadata(source)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime of {}", source.display()))?;
    let mut stamp = OffsetDateTime::from(mtime);
    if let Ok(offset) = UtcOffset::current_local_offset() {
        stamp = stamp.to_offset(offset);
    }
    let fmt = format_description::parse("[year][month][day]-[hour][minute][second]")
        .context("building timestamp format")?;
    stamp.format(&fmt).context("formatting timestamp")
}

fn dest_file_name(slug: &str, source: &Path, naming: Naming) -> Result<String> {
    match naming {
        Naming::Flat => Ok(format!("plan-{slug}.md")),
        Naming::Timestamped => Ok(format!("{}-plan-{slug}.md", timestamp_prefix(source)?)),
    }
}

// ===================================================================
// Copying
// ===================================================================

/// Outcome of copying one plan document.
#[derive(Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// The source did not exist, or vanished before the copy finished.
    Missing,
}

/// Copy `source` to `dest`, carrying over the source's mtime.
///
/// The copy is staged under a hidden name in the destination directory and
/// renamed into place, so a concurrent reader (or a second exporter racing
/// to the same path) only ever observes a complete file.
pub fn copy_plan(source: &Path, dest: &Path) -> Result<CopyOutcome> {
    let metadata = match fs::metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CopyOutcome::Missing),
        Err(e) => return Err(e).with_context(|| format!("reading {}", source.display())),
    };
    let mtime = FileTime::from_last_modification_time(&metadata);

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("bad destination name {}", dest.display()))?;
    let staging = dir.join(format!(".{name}.{}", process::id()));

    match fs::copy(source, &staging) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let _ = fs::remove_file(&staging);
            return Ok(CopyOutcome::Missing);
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            return Err(e).with_context(|| format!("copying {}", source.display()));
        }
    }
    if let Err(e) =
        filetime::set_file_mtime(&staging, mtime).and_then(|()| fs::rename(&staging, dest))
    {
        let _ = fs::remove_file(&staging);
        return Err(e).with_context(|| format!("writing {}", dest.display()));
    }
    Ok(CopyOutcome::Copied)
}

// ===================================================================
// Bulk export
// ===================================================================

/// Export the plan document for every slug in `slugs` from `source_root`
/// into `dest_root`, returning how many files were copied.
///
/// When more than one slug has an existing plan file, everything goes under
/// `{dest_root}/plans/` to keep a bulk export from scattering files across
/// the project root; a lone valid file lands in `dest_root` directly.
/// Missing plan files and per-item copy failures are reported and skipped.
pub fn export_bulk(
    slugs: &BTreeSet<String>,
    source_root: &Path,
    dest_root: &Path,
    naming: Naming,
) -> Result<usize> {
    let mut valid: Vec<(&str, PathBuf)> = Vec::new();
    for slug in slugs {
        let source = source_root.join(format!("{slug}.md"));
        if !source.exists() {
            eprintln!(
                "planport: plan file not found for slug '{slug}': {}",
                source.display()
            );
            continue;
        }
        valid.push((slug.as_str(), source));
    }

    let use_plans_folder = valid.len() > 1;
    let dest_dir = if use_plans_folder {
        dest_root.join("plans")
    } else {
        dest_root.to_path_buf()
    };
    if use_plans_folder && !dest_dir.exists() {
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("creating {}", dest_dir.display()))?;
    }

    let mut copied = 0;
    for (slug, source) in &valid {
        let name = match dest_file_name(slug, source, naming) {
            Ok(name) => name,
            Err(e) => {
                eprintln!("planport: skipping '{slug}': {e:#}");
                continue;
            }
        };
        let dest = dest_dir.join(name);
        match copy_plan(source, &dest) {
            Ok(CopyOutcome::Copied) => {
                println!("Copied: {}", dest.display());
                copied += 1;
            }
            Ok(CopyOutcome::Missing) => {
                eprintln!(
                    "planport: plan file not found for slug '{slug}': {}",
                    source.display()
                );
            }
            Err(e) => eprintln!("planport: copying {}: {e:#}", source.display()),
        }
    }
    println!("Exported {copied} plan file(s)");
    Ok(copied)
}
