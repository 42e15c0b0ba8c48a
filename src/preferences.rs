use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

const FILENAME: &str = "planport.toml";

/// User-facing preferences stored in `~/.claude/planport.toml`.
///
/// Every key is optional; a missing file means defaults. The hooks never
/// write this file.
#[derive(Debug, Serialize, Deserialize)]
pub struct Preferences {
    /// Scan attempts before giving up on a transcript that has no slug yet.
    #[serde(default = "default_scan_retries")]
    pub scan_retries: u32,

    /// Delay between scan attempts, in milliseconds.
    #[serde(default = "default_scan_retry_delay_ms")]
    pub scan_retry_delay_ms: u64,

    /// Transcript files whose name starts with this prefix belong to
    /// subagent sessions and are never scanned.
    #[serde(default = "default_agent_file_prefix")]
    pub agent_file_prefix: String,

    /// Overrides the plan source directory (default `~/.claude/plans`).
    #[serde(default)]
    pub plans_dir: Option<String>,
}

fn default_scan_retries() -> u32 {
    5
}

fn default_scan_retry_delay_ms() -> u64 {
    50
}

fn default_agent_file_prefix() -> String {
    "agent".into()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            scan_retries: default_scan_retries(),
            scan_retry_delay_ms: default_scan_retry_delay_ms(),
            agent_file_prefix: default_agent_file_prefix(),
            plans_dir: None,
        }
    }
}

impl Preferences {
    /// Load preferences from `{dir}/planport.toml`.
    ///
    /// Missing keys in an existing file are filled in with defaults via
    /// serde; a missing file yields the defaults unchanged.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(FILENAME);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let prefs: Preferences = toml::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}
