use crate::env_file;
use crate::export::{self, CopyOutcome, Naming};
use crate::preferences::Preferences;
use crate::transcript;
use crate::types::HookInput;
use anyhow::{Context, Result, bail};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Names the shell fragment the SessionStart hook appends to.
pub const ENV_FILE_VAR: &str = "CLAUDE_ENV_FILE";

/// Variable written into the environment file by the SessionStart hook and
/// consumed by `export-all`.
pub const TRANSCRIPT_DIR_VAR: &str = "TRANSCRIPT_DIR";

/// Resolved process environment shared by the hook handlers: working
/// directory, home, and preferences, each read exactly once.
pub struct Session {
    cwd: PathBuf,
    home: Option<PathBuf>,
    prefs: Preferences,
}

impl Session {
    pub fn open() -> Result<Self> {
        let cwd = env::current_dir().context("resolving working directory")?;
        let home = env::var_os("HOME").map(PathBuf::from);
        let prefs = match &home {
            Some(home) => Preferences::load(&home.join(".claude"))?,
            None => Preferences::default(),
        };
        Ok(Self { cwd, home, prefs })
    }

    // ---------------------------------------------------------------
    // Path helpers
    // ---------------------------------------------------------------

    fn plans_source_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.prefs.plans_dir {
            return Ok(PathBuf::from(dir));
        }
        let home = self.home.as_ref().context("HOME not set")?;
        Ok(home.join(".claude").join("plans"))
    }

    fn scan_retry_delay(&self) -> Duration {
        Duration::from_millis(self.prefs.scan_retry_delay_ms)
    }

    /// The directory holding `transcript_path`, absolutized against the
    /// working directory. A bare file name maps to the working directory
    /// itself.
    fn transcript_dir(&self, transcript_path: &str) -> PathBuf {
        match Path::new(transcript_path).parent() {
            Some(p) if !p.as_os_str().is_empty() => {
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    self.cwd.join(p)
                }
            }
            _ => self.cwd.clone(),
        }
    }

    // ---------------------------------------------------------------
    // Hook handlers
    // ---------------------------------------------------------------

    /// SessionStart: record the transcript directory in the shared
    /// environment file so later hooks can find this session's transcripts.
    pub fn handle_session_start(&self, input: &HookInput) -> Result<()> {
        let Some(env_file) = env::var_os(ENV_FILE_VAR) else {
            eprintln!("planport: {ENV_FILE_VAR} not set, skipping");
            return Ok(());
        };
        let dir = self.transcript_dir(&input.transcript_path);
        if !dir.is_dir() {
            bail!("transcript directory does not exist: {}", dir.display());
        }
        let dir_str = dir
            .to_str()
            .with_context(|| format!("non-UTF-8 transcript directory {}", dir.display()))?;
        env_file::append_export(Path::new(&env_file), TRANSCRIPT_DIR_VAR, dir_str)?;
        eprintln!("planport: exported {TRANSCRIPT_DIR_VAR}={}", dir.display());
        Ok(())
    }

    /// SessionEnd: find this session's plan slug and copy the plan document
    /// into the project root.
    pub fn handle_session_end(&self, input: &HookInput) -> Result<()> {
        let slug = transcript::first_slug_with_retry(
            Path::new(&input.transcript_path),
            self.prefs.scan_retries,
            self.scan_retry_delay(),
        );
        let Some(slug) = slug else {
            eprintln!("planport: no slug found in transcript");
            return Ok(());
        };
        let source = self.plans_source_dir()?.join(format!("{slug}.md"));
        let dest = self.cwd.join(format!("plan-{slug}.md"));
        match export::copy_plan(&source, &dest)? {
            CopyOutcome::Copied => println!("Copied plan to {}", dest.display()),
            CopyOutcome::Missing => {
                eprintln!("planport: plan file not found: {}", source.display());
            }
        }
        Ok(())
    }

    /// Bulk export: union the slugs across every transcript in
    /// `$TRANSCRIPT_DIR` and copy each existing plan document.
    pub fn export_project_plans(&self, naming: Naming) -> Result<()> {
        let dir = env::var_os(TRANSCRIPT_DIR_VAR)
            .with_context(|| format!("{TRANSCRIPT_DIR_VAR} environment variable is not set"))?;
        let dir = PathBuf::from(dir);
        if !dir.is_dir() {
            bail!("{TRANSCRIPT_DIR_VAR} is not a directory: {}", dir.display());
        }
        let slugs = transcript::slugs_in_dir(&dir, &self.prefs.agent_file_prefix)?;
        if slugs.is_empty() {
            eprintln!("planport: no slugs found in any transcript files");
            return Ok(());
        }
        export::export_bulk(&slugs, &self.plans_source_dir()?, &self.cwd, naming)?;
        Ok(())
    }
}
