use anyhow::{Context, Result, bail};
use stitch_counter_core::{Adjustment, CounterSlot, ProjectId, ProjectRecord, render};
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use super::Workspace;
use crate::LsFormat;
use crate::view::TerminalView;

pub fn handle_new(
    workspace: &Workspace,
    name: &str,
    rows: Option<u32>,
    step: Option<i64>,
) -> Result<()> {
    let step = step
        .map(Adjustment::from_amount)
        .transpose()
        .context("--step must be 1, 5 or 10")?
        .unwrap_or_else(|| workspace.default_step());
    let service = workspace.service();
    let id = match rows {
        Some(total_rows) => service.create_double(name, total_rows, step)?,
        None => service.create_single(name, step)?,
    };
    info!(%id, step = step.amount(), "Created project from command line");
    println!("created project: {id}");
    Ok(())
}

pub fn handle_ls(workspace: &Workspace, format: LsFormat) -> Result<()> {
    let projects = workspace.service().list()?;
    debug!(count = projects.len(), "Listing projects");
    if projects.is_empty() && format == LsFormat::Table {
        println!("No projects found");
        return Ok(());
    }

    match format {
        LsFormat::Table => render_project_table(&projects)?,
        LsFormat::Json => println!("{}", serde_json::to_string_pretty(&projects)?),
    }
    Ok(())
}

pub fn handle_show(workspace: &Workspace, id: ProjectId, json: bool) -> Result<()> {
    let record = workspace.service().record(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let (stitch, row) = record.counters();
    let mut view = TerminalView::new(format!("#{} {}", record.id, record.title));
    render(&stitch, CounterSlot::Stitch, workspace.format(), &mut view);
    if let Some(row) = &row {
        render(row, CounterSlot::Row, workspace.format(), &mut view);
    }
    print!("{view}");
    println!("stitches worked: {}", record.total_stitches_ever);
    if let Some(completed_at) = record.completed_at {
        println!("completed: {}", completed_at.format(&Rfc3339)?);
    }
    Ok(())
}

pub fn handle_increment(
    workspace: &Workspace,
    id: ProjectId,
    slot: CounterSlot,
    times: u32,
) -> Result<()> {
    let ((), view) = workspace.with_session(id, |session| {
        for _ in 0..times {
            session.increment(slot)?;
        }
        Ok(())
    })?;
    print!("{view}");
    Ok(())
}

pub fn handle_decrement(
    workspace: &Workspace,
    id: ProjectId,
    slot: CounterSlot,
    times: u32,
) -> Result<()> {
    let ((), view) = workspace.with_session(id, |session| {
        for _ in 0..times {
            session.decrement(slot)?;
        }
        Ok(())
    })?;
    print!("{view}");
    Ok(())
}

pub fn handle_reset(workspace: &Workspace, id: ProjectId, slot: CounterSlot) -> Result<()> {
    let ((), view) = workspace.with_session(id, |session| Ok(session.reset(slot)?))?;
    print!("{view}");
    Ok(())
}

pub fn handle_step(workspace: &Workspace, id: ProjectId, slot: CounterSlot, amount: i64) -> Result<()> {
    let (step, view) =
        workspace.with_session(id, |session| Ok(session.set_adjustment_step(slot, amount)?))?;
    println!("step set to {step}");
    print!("{view}");
    Ok(())
}

pub fn handle_target(
    workspace: &Workspace,
    id: ProjectId,
    slot: Option<CounterSlot>,
    total: u32,
) -> Result<()> {
    let ((), view) = workspace.with_session(id, |session| {
        let slot = slot.unwrap_or(if session.row().is_some() {
            CounterSlot::Row
        } else {
            CounterSlot::Stitch
        });
        Ok(session.set_total_target(slot, total)?)
    })?;
    print!("{view}");
    Ok(())
}

pub fn handle_rename(workspace: &Workspace, id: ProjectId, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("project name must not be empty");
    }
    let ((), view) = workspace.with_session(id, |session| {
        session.rename(name);
        Ok(())
    })?;
    print!("{view}");
    Ok(())
}

pub fn handle_complete(workspace: &Workspace, id: ProjectId) -> Result<()> {
    let record = workspace.service().complete(id)?;
    let completed_at = record
        .completed_at
        .context("project was not marked finished")?
        .format(&Rfc3339)?;
    println!("#{} {} finished at {completed_at}", record.id, record.title);
    Ok(())
}

pub fn handle_reopen(workspace: &Workspace, id: ProjectId) -> Result<()> {
    let record = workspace.service().reopen(id)?;
    println!("#{} {} reopened", record.id, record.title);
    Ok(())
}

pub fn handle_remove(workspace: &Workspace, ids: &[ProjectId]) -> Result<()> {
    debug!(?ids, "Removing projects");
    let removed = workspace.service().delete(ids)?;
    println!("deleted {removed} project(s)");
    if removed < ids.len() {
        println!("{} id(s) did not match a project", ids.len() - removed);
    }
    Ok(())
}

fn render_project_table(projects: &[ProjectRecord]) -> Result<()> {
    println!("ID | Type | Title | Stitches | Rows | Progress | Status | Updated");
    println!("-- | ---- | ----- | -------- | ---- | -------- | ------ | -------");

    for project in projects {
        let (stitch, row) = project.counters();
        let rows = row.map_or_else(
            || "-".to_owned(),
            |row| format!("{}/{}", row.value(), row.total_target()),
        );
        let progress = project
            .progress_percent()
            .map_or_else(|| "-".to_owned(), |percent| format!("{percent}%"));
        let status = if project.history().is_completed() {
            "done"
        } else {
            "active"
        };
        let updated = project.updated_at.format(&Rfc3339)?;

        println!(
            "{} | {} | {} | {} | {} | {} | {} | {}",
            project.id,
            project.kind.as_str(),
            project.title,
            stitch.value(),
            rows,
            progress,
            status,
            updated
        );
    }
    Ok(())
}
