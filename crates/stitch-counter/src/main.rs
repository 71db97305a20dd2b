//! CLI entry point for stitch-counter.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use stitch_counter_app::{AppConfig, resolve_data_dir};
use stitch_counter_core::{CounterSlot, ProjectId};
use stitch_counter_store::JsonStore;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use commands::Workspace;

mod commands;
mod view;

/// Stitch and row counters for knitting projects.
#[derive(Parser, Debug)]
#[command(
    name = "stitch-counter",
    version,
    about = "stitch-counter: stitch and row counters kept in a local project library"
)]
struct Cli {
    /// Directory holding projects.json and config.toml.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project. Passing --rows adds a row counter.
    New {
        name: String,
        /// Total rows the row counter measures progress against.
        #[arg(long)]
        rows: Option<u32>,
        /// Initial step (1, 5 or 10); defaults to the configured step.
        #[arg(long)]
        step: Option<i64>,
    },

    /// List projects.
    Ls {
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Show a project's counters.
    Show {
        id: ProjectId,
        /// Print the stored record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Increase a counter by its step.
    Inc {
        id: ProjectId,
        #[arg(short, long, value_enum, default_value_t = SlotArg::Stitch)]
        counter: SlotArg,
        /// Repeat the increment.
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },

    /// Decrease a counter by its step.
    Dec {
        id: ProjectId,
        #[arg(short, long, value_enum, default_value_t = SlotArg::Stitch)]
        counter: SlotArg,
        /// Repeat the decrement.
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },

    /// Reset a counter to zero.
    Reset {
        id: ProjectId,
        #[arg(short, long, value_enum, default_value_t = SlotArg::Stitch)]
        counter: SlotArg,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Change a counter's step.
    Step {
        id: ProjectId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        #[arg(short, long, value_enum, default_value_t = SlotArg::Stitch)]
        counter: SlotArg,
    },

    /// Set the total progress is measured against.
    Target {
        id: ProjectId,
        total: u32,
        /// Defaults to the row counter on double projects.
        #[arg(short, long, value_enum)]
        counter: Option<SlotArg>,
    },

    /// Rename a project.
    Rename { id: ProjectId, name: String },

    /// Mark a project finished.
    Done { id: ProjectId },

    /// Clear a project's finished mark.
    Reopen { id: ProjectId },

    /// Delete projects.
    Rm {
        #[arg(required = true)]
        ids: Vec<ProjectId>,
    },

    /// Write every project to a backup file.
    Export { path: PathBuf },

    /// Load projects from a backup file.
    Import {
        path: PathBuf,
        /// Keep backup ids and overwrite matching projects.
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SlotArg {
    Stitch,
    Row,
}

impl From<SlotArg> for CounterSlot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::Stitch => Self::Stitch,
            SlotArg::Row => Self::Row,
        }
    }
}

fn main() -> Result<()> {
    let Cli { data_dir, cmd } = Cli::parse();
    install_tracing();

    let data_dir = resolve_data_dir(data_dir)?;
    let config = AppConfig::from_dir(&data_dir)?;
    let store = JsonStore::open(&data_dir)?;
    let workspace = Workspace::new(store, config)?;
    commands::run(cmd, &workspace)
}

fn install_tracing() {
    // RUST_LOG overrides the default WARN level; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
