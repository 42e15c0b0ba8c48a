mod env_file;
mod export;
mod preferences;
mod session;
mod transcript;
mod types;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use export::Naming;
use session::Session;
use std::io::{self, Read};
use std::process;
use types::HookInput;

#[derive(Parser)]
#[command(
    name = "planport",
    version,
    about = "Session hooks that export Claude Code plan documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// SessionStart hook: record the transcript directory in CLAUDE_ENV_FILE
    SessionStart,
    /// SessionEnd hook: copy this session's plan document into the project
    ExportPlan,
    /// Export plans for every slug found in the TRANSCRIPT_DIR transcripts
    ExportAll {
        /// Prefix destination names with the plan file's modification time
        #[arg(long)]
        timestamp: bool,
    },
}

fn read_hook_input() -> Result<HookInput> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    serde_json::from_str(&buffer).context("parsing hook input")
}

fn run(command: Command) -> Result<()> {
    let session = Session::open()?;
    match command {
        Command::SessionStart => session.handle_session_start(&read_hook_input()?),
        Command::ExportPlan => session.handle_session_end(&read_hook_input()?),
        Command::ExportAll { timestamp } => session.export_project_plans(if timestamp {
            Naming::Timestamped
        } else {
            Naming::Flat
        }),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("planport: {err:#}");
        process::exit(1);
    }
}
