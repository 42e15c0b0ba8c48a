use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Quote a value for a shell `export` line.
///
/// Single quotes pass every shell metacharacter through literally; an
/// embedded quote becomes `'\''`.
fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    let mut out = String::from("'");
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Append one `export {var}={value}` line to the shared environment file.
///
/// Nested sessions fire the SessionStart hook concurrently against the same
/// file, so the append happens as a single write under an exclusive advisory
/// lock. The lock is released before returning on every path; a crashed
/// holder releases it at process exit.
pub fn append_export(path: &Path, var: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("locking {}", path.display()))?;
    let line = format!("export {var}={}\n", shell_quote(value));
    let result = file.write_all(line.as_bytes());
    let _ = FileExt::unlock(&file);
    result.with_context(|| format!("writing {}", path.display()))
}
