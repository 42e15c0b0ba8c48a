use serde::Deserialize;

/// Hook payload received on stdin (snake_case JSON).
///
/// Claude Code sends many more fields (`session_id`, `cwd`,
/// `hook_event_name`, ...); only `transcript_path` is meaningful to these
/// hooks, so everything else is left untyped and ignored.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    pub transcript_path: String,
}
