//! Persistence gateway that writes on a tokio worker.

use anyhow::{Result, anyhow};
use stitch_counter_core::ProjectRecord;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::persist::PersistenceGateway;
use crate::project_store::ProjectStore;

enum Message {
    Write(ProjectRecord),
    Flush(oneshot::Sender<()>),
}

/// Hands counter records to a background worker.
///
/// Each [`persist`](PersistenceGateway::persist) call copies the counters
/// into an owned [`ProjectRecord`] before it crosses the channel, so the
/// caller may keep mutating its counters while the write is pending.
/// Records are written in hand-off order. Dropping every handle closes the
/// channel; the worker drains what is queued and exits.
///
/// Ids are only known once the worker has written a record, so projects
/// without an id are declined by
/// [`insert_record`](PersistenceGateway::insert_record) and must be created
/// through a synchronous gateway first.
#[derive(Clone)]
pub struct BackgroundPersister {
    sender: mpsc::UnboundedSender<Message>,
}

impl BackgroundPersister {
    /// Start the worker on `handle`.
    ///
    /// The returned join handle completes once every persister clone has been
    /// dropped and the queue is empty.
    pub fn spawn<S>(store: S, handle: &Handle) -> (Self, JoinHandle<()>)
    where
        S: ProjectStore + Clone + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = handle.spawn(run(store, receiver));
        (Self { sender }, worker)
    }

    /// Wait until every record handed off before this call has been written.
    ///
    /// # Errors
    /// Returns an error if the worker has stopped.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(Message::Flush(done))
            .map_err(|_| anyhow!("background persister has stopped"))?;
        wait.await
            .map_err(|_| anyhow!("background persister stopped before flushing"))
    }

    /// Blocking variant of [`flush`](Self::flush) for synchronous callers.
    ///
    /// Must not be called from within an async context.
    ///
    /// # Errors
    /// Returns an error if the worker has stopped.
    pub fn blocking_flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(Message::Flush(done))
            .map_err(|_| anyhow!("background persister has stopped"))?;
        wait.blocking_recv()
            .map_err(|_| anyhow!("background persister stopped before flushing"))
    }
}

impl PersistenceGateway for BackgroundPersister {
    fn persist_record(&self, record: ProjectRecord) {
        let id = record.id;
        if self.sender.send(Message::Write(record)).is_err() {
            warn!(%id, "Background persister has stopped; counters not saved");
        }
    }
}

async fn run<S>(store: S, mut receiver: mpsc::UnboundedReceiver<Message>)
where
    S: ProjectStore + Clone + Send + 'static,
{
    while let Some(message) = receiver.recv().await {
        match message {
            Message::Write(record) => write(store.clone(), record).await,
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Background persister drained");
}

async fn write<S>(store: S, record: ProjectRecord)
where
    S: ProjectStore + Send + 'static,
{
    let id = record.id;
    let outcome: Result<_> =
        match tokio::task::spawn_blocking(move || store.upsert(record).map_err(Into::into)).await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("Task join error: {e}")),
        };
    match outcome {
        Ok(stored) => debug!(id = %stored, "Persisted counters in background"),
        Err(err) => warn!(%id, error = %err, "Failed to persist counters in background"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_counter_core::{Counter, ProjectId};
    use stitch_counter_store::JsonStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn later_mutations_do_not_reach_handed_off_record() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let (persister, _worker) = BackgroundPersister::spawn(store.clone(), &Handle::current());

        let mut counter = Counter::named("Mittens");
        counter.assign_id(ProjectId(1));
        for _ in 0..3 {
            counter.increment();
        }
        persister.persist(&counter, None);
        counter.increment();
        counter.set_project_name("Changed");

        persister.flush().await?;
        let stored = store.load(ProjectId(1))?;
        assert_eq!(stored.stitch_counter_number, 3);
        assert_eq!(stored.title, "Mittens");
        Ok(())
    }

    #[tokio::test]
    async fn writes_apply_in_hand_off_order() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let (persister, _worker) = BackgroundPersister::spawn(store.clone(), &Handle::current());

        let mut counter = Counter::named("Shawl");
        counter.assign_id(ProjectId(7));
        for _ in 0..10 {
            counter.increment();
            persister.persist(&counter, None);
        }
        persister.flush().await?;

        assert_eq!(store.load(ProjectId(7))?.stitch_counter_number, 10);
        assert_eq!(store.list()?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unsaved_projects_are_declined() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let (persister, _worker) = BackgroundPersister::spawn(store.clone(), &Handle::current());

        let record = ProjectRecord::from_counters(&Counter::named("Draft"), None);
        assert_eq!(persister.insert_record(record), None);
        persister.flush().await?;
        assert!(store.list()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn worker_drains_queue_when_handles_drop() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let (persister, worker) = BackgroundPersister::spawn(store.clone(), &Handle::current());

        let mut stitch = Counter::named("Blanket");
        stitch.assign_id(ProjectId(2));
        let mut row = Counter::named("Blanket");
        row.assign_id(ProjectId(2));
        row.set_total_target(120);
        row.increment();
        persister.persist(&stitch, Some(&row));
        drop(persister);

        worker.await?;
        let stored = store.load(ProjectId(2))?;
        assert_eq!(stored.row_counter_number, 1);
        assert_eq!(stored.total_rows, 120);
        Ok(())
    }
}
