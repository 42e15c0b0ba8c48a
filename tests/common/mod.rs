use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run the planport binary with the given subcommand args, stdin, child
/// environment, and working directory. The inherited `CLAUDE_ENV_FILE`,
/// `TRANSCRIPT_DIR`, and `HOME` are cleared first so tests only see the
/// variables they pass.
pub fn run_cli(
    args: &[&str],
    stdin_json: &str,
    envs: &[(&str, &str)],
    cwd: &Path,
) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planport"));
    cmd.args(args)
        .current_dir(cwd)
        .env_remove("CLAUDE_ENV_FILE")
        .env_remove("TRANSCRIPT_DIR")
        .env_remove("HOME")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin_json.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Hook stdin payload pointing at `transcript_path`.
pub fn hook_input(transcript_path: &Path) -> String {
    serde_json::json!({
        "session_id": "test-session",
        "transcript_path": transcript_path,
        "cwd": "/tmp",
        "hook_event_name": "SessionEnd"
    })
    .to_string()
}

/// A fake home directory with `.claude/plans/` created, returning
/// (home, plans_dir).
pub fn home_with_plans(root: &Path) -> (PathBuf, PathBuf) {
    let home = root.join("home");
    let plans = home.join(".claude").join("plans");
    fs::create_dir_all(&plans).unwrap();
    (home, plans)
}

/// Write `{plans}/{slug}.md` and return its path.
pub fn plan_file(plans: &Path, slug: &str, contents: &str) -> PathBuf {
    let path = plans.join(format!("{slug}.md"));
    fs::write(&path, contents).unwrap();
    path
}

/// Write a one-line transcript carrying `slug`.
pub fn transcript_with_slug(dir: &Path, name: &str, slug: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{{\"type\":\"user\",\"slug\":\"{slug}\"}}\n")).unwrap();
    path
}
