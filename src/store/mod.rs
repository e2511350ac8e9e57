pub mod job;
pub mod memory;
pub mod validation;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

pub use job::{Job, JobPatch, JobStatus, NewJob};
pub use memory::MemoryStore;
pub use validation::{JobInput, ValidationError};

/// Ordering for [`JobStore::find_all`], by applied date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Document store holding job records.
///
/// Lookups by id report a missing document as `Ok(None)`, so callers can tell
/// "not found" apart from a store failure. Every write runs
/// [`validation::check_job`] on the resulting document before committing it.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. The store assigns the id and fills in defaults.
    async fn insert(&self, job: NewJob) -> Result<Job>;

    async fn find_all(&self, order: SortOrder) -> Result<Vec<Job>>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Job>>;

    /// Apply `patch` to the job with `id` and return the updated document.
    async fn find_by_id_and_update(&self, id: &Uuid, patch: JobPatch) -> Result<Option<Job>>;

    /// Remove the job with `id` and return what was removed.
    async fn find_by_id_and_delete(&self, id: &Uuid) -> Result<Option<Job>>;

    async fn count(&self) -> Result<usize>;

    /// Flush and release the store. Called once at shutdown.
    async fn close(&self) -> Result<()>;
}
