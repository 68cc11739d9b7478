//! Batched commits over an entity manager session.

use std::sync::Arc;

use chainproc_core::{Entity, EntityManager, PersistenceResult};
use tracing::trace;

/// Stages removals and commits them every `batch_size` items.
///
/// A commit flushes the session and then clears it, so memory held by the
/// session stays bounded by one batch. Call [`finish`](UnitOfWork::finish)
/// to commit a trailing partial batch.
pub struct UnitOfWork {
    manager: Arc<dyn EntityManager>,
    batch_size: usize,
    pending: usize,
    staged: usize,
    commits: usize,
}

impl UnitOfWork {
    /// `batch_size` of zero is treated as one.
    pub fn new(manager: Arc<dyn EntityManager>, batch_size: usize) -> Self {
        Self {
            manager,
            batch_size: batch_size.max(1),
            pending: 0,
            staged: 0,
            commits: 0,
        }
    }

    /// Stage a removal, committing when the batch is full.
    pub fn remove(&mut self, entity: &Entity) -> PersistenceResult<()> {
        self.manager.remove(entity)?;
        self.pending += 1;
        self.staged += 1;
        if self.pending == self.batch_size {
            self.commit()?;
        }
        Ok(())
    }

    /// Flush and clear the session.
    pub fn commit(&mut self) -> PersistenceResult<()> {
        self.manager.flush(None)?;
        self.reset();
        self.commits += 1;
        trace!(commits = self.commits, staged = self.staged, "batch committed");
        Ok(())
    }

    /// Discard staged work without writing it.
    pub fn reset(&mut self) {
        self.manager.clear();
        self.pending = 0;
    }

    /// Commit the trailing partial batch, if any.
    pub fn finish(&mut self) -> PersistenceResult<()> {
        if self.pending > 0 {
            self.commit()?;
        }
        Ok(())
    }

    /// Items staged since the last commit.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Items staged overall.
    pub fn staged(&self) -> usize {
        self.staged
    }

    /// Commits performed.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("batch_size", &self.batch_size)
            .field("pending", &self.pending)
            .field("staged", &self.staged)
            .field("commits", &self.commits)
            .finish()
    }
}
