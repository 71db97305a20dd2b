use std::io::{self, Write};

use anyhow::{Context, Result};
use stitch_counter_app::{
    AppConfig, BackgroundPersister, CounterSession, PersistenceGateway, ProjectService,
    StorePersister,
};
use stitch_counter_core::{Adjustment, Counter, CounterFormat, CounterSlot, ProjectId, ProjectRecord};
use stitch_counter_store::JsonStore;
use tracing::debug;

use crate::Command;
use crate::view::TerminalView;

mod backup;
mod handlers;

/// Session type driven by command handlers.
pub type Session<'a> = CounterSession<TerminalView, &'a dyn PersistenceGateway>;

/// Library, settings and persistence mode shared by every command.
pub struct Workspace {
    service: ProjectService<JsonStore>,
    format: CounterFormat,
    default_step: Adjustment,
    background: bool,
}

impl Workspace {
    pub fn new(store: JsonStore, config: AppConfig) -> Result<Self> {
        Ok(Self {
            service: ProjectService::new(store),
            format: config.display.format()?,
            default_step: config.counter.default_adjustment()?,
            background: config.persistence.background,
        })
    }

    pub const fn service(&self) -> &ProjectService<JsonStore> {
        &self.service
    }

    pub const fn store(&self) -> &JsonStore {
        self.service.store()
    }

    pub const fn format(&self) -> &CounterFormat {
        &self.format
    }

    pub const fn default_step(&self) -> Adjustment {
        self.default_step
    }

    /// Open project `id`, apply `change` and return its result with the final frame.
    pub fn with_session<T>(
        &self,
        id: ProjectId,
        change: impl FnOnce(&mut Session<'_>) -> Result<T>,
    ) -> Result<(T, TerminalView)> {
        let record = self.service.record(id)?;
        debug!(%id, background = self.background, "Opening session");
        if !self.background {
            let persister = StorePersister::new(self.store());
            return self.drive(&record, &persister, change);
        }

        let runtime = tokio::runtime::Runtime::new().context("failed to start background writer")?;
        let (persister, worker) = BackgroundPersister::spawn(self.store().clone(), runtime.handle());
        let outcome = self.drive(&record, &persister, change);
        persister.blocking_flush()?;
        drop(persister);
        runtime
            .block_on(worker)
            .context("background writer stopped unexpectedly")?;
        outcome
    }

    fn drive<T>(
        &self,
        record: &ProjectRecord,
        persister: &dyn PersistenceGateway,
        change: impl FnOnce(&mut Session<'_>) -> Result<T>,
    ) -> Result<(T, TerminalView)> {
        let mut session = CounterSession::open_project(
            record,
            self.format.clone(),
            TerminalView::default(),
            persister,
        );
        let out = change(&mut session)?;
        let title = frame_title(session.stitch());
        let (mut view, _) = session.close();
        view.set_title(title);
        Ok((out, view))
    }
}

pub fn run(command: Command, workspace: &Workspace) -> Result<()> {
    match command {
        Command::New { name, rows, step } => handlers::handle_new(workspace, &name, rows, step),
        Command::Ls { format } => handlers::handle_ls(workspace, format),
        Command::Show { id, json } => handlers::handle_show(workspace, id, json),
        Command::Inc { id, counter, times } => {
            handlers::handle_increment(workspace, id, counter.into(), times)
        }
        Command::Dec { id, counter, times } => {
            handlers::handle_decrement(workspace, id, counter.into(), times)
        }
        Command::Reset { id, counter, yes } => {
            let slot = counter.into();
            if !yes && !confirm_reset(id, slot)? {
                println!("Aborted.");
                return Ok(());
            }
            handlers::handle_reset(workspace, id, slot)
        }
        Command::Step { id, amount, counter } => {
            handlers::handle_step(workspace, id, counter.into(), amount)
        }
        Command::Target { id, total, counter } => {
            handlers::handle_target(workspace, id, counter.map(Into::into), total)
        }
        Command::Rename { id, name } => handlers::handle_rename(workspace, id, &name),
        Command::Done { id } => handlers::handle_complete(workspace, id),
        Command::Reopen { id } => handlers::handle_reopen(workspace, id),
        Command::Rm { ids } => handlers::handle_remove(workspace, &ids),
        Command::Export { path } => backup::run_export(workspace.store(), &path),
        Command::Import { path, replace } => backup::run_import(workspace.store(), &path, replace),
    }
}

fn frame_title(counter: &Counter) -> String {
    format!("#{} {}", counter.id(), counter.project_name())
}

fn confirm_reset(id: ProjectId, slot: CounterSlot) -> Result<bool> {
    print!("Reset the {} counter of project {id} to 0? [y/N]: ", slot.as_str());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
