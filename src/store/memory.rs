use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::{StoreConfig, DEFAULT_MAX_JOBS};
use crate::error::{JobNestError, Result};
use crate::store::job::{Job, JobPatch, NewJob};
use crate::store::validation::check_job;
use crate::store::{JobStore, SortOrder};

/// In-process job store, optionally backed by a JSON snapshot file.
#[derive(Debug)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
    data_file: Option<PathBuf>,
    max_jobs: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }

    pub fn with_capacity(max_jobs: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            data_file: None,
            max_jobs,
        }
    }

    /// Open the store described by `config`, loading the snapshot file if it exists.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let mut jobs = HashMap::new();

        if let Some(path) = &config.data_file {
            if tokio::fs::try_exists(path).await? {
                let bytes = tokio::fs::read(path).await?;
                let loaded: Vec<Job> = serde_json::from_slice(&bytes)?;
                for job in loaded {
                    jobs.insert(job.id, job);
                }
                tracing::info!(path = %path.display(), jobs = jobs.len(), "Loaded job snapshot");
            } else {
                tracing::info!(path = %path.display(), "No job snapshot found, starting empty");
            }
        }

        Ok(Self {
            jobs: RwLock::new(jobs),
            data_file: config.data_file.clone(),
            max_jobs: config.max_jobs,
        })
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Write the snapshot file, if one is configured. Writes go to a temporary
    /// file first and are renamed into place.
    async fn persist(&self, jobs: &HashMap<Uuid, Job>) -> Result<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let snapshot = sorted(jobs.values().cloned().collect(), SortOrder::NewestFirst);
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn sorted(mut jobs: Vec<Job>, order: SortOrder) -> Vec<Job> {
    match order {
        SortOrder::NewestFirst => {
            jobs.sort_by(|a, b| b.applied_date.cmp(&a.applied_date).then(a.id.cmp(&b.id)))
        }
        SortOrder::OldestFirst => {
            jobs.sort_by(|a, b| a.applied_date.cmp(&b.applied_date).then(a.id.cmp(&b.id)))
        }
    }
    jobs
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert(&self, new: NewJob) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        if jobs.len() >= self.max_jobs {
            return Err(JobNestError::Store(format!(
                "Job store is at capacity ({} jobs)",
                self.max_jobs
            )));
        }

        let job = Job::from_new(new);
        check_job(&job)?;
        jobs.insert(job.id, job.clone());

        if let Err(e) = self.persist(&jobs).await {
            jobs.remove(&job.id);
            return Err(e);
        }

        tracing::debug!(job_id = %job.id, company = %job.company, "Job inserted");
        Ok(job)
    }

    async fn find_all(&self, order: SortOrder) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;
        Ok(sorted(jobs.values().cloned().collect(), order))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Job>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn find_by_id_and_update(&self, id: &Uuid, patch: JobPatch) -> Result<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        let Some(current) = jobs.get(id) else {
            return Ok(None);
        };

        let previous = current.clone();
        let mut updated = current.clone();
        patch.apply(&mut updated);
        check_job(&updated)?;
        jobs.insert(*id, updated.clone());

        if let Err(e) = self.persist(&jobs).await {
            jobs.insert(*id, previous);
            return Err(e);
        }

        tracing::debug!(job_id = %id, status = %updated.status, "Job updated");
        Ok(Some(updated))
    }

    async fn find_by_id_and_delete(&self, id: &Uuid) -> Result<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        let Some(removed) = jobs.remove(id) else {
            return Ok(None);
        };

        if let Err(e) = self.persist(&jobs).await {
            jobs.insert(*id, removed);
            return Err(e);
        }

        tracing::debug!(job_id = %id, "Job deleted");
        Ok(Some(removed))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.jobs.read().await.len())
    }

    async fn close(&self) -> Result<()> {
        let jobs = self.jobs.read().await;
        self.persist(&jobs).await?;
        tracing::info!(jobs = jobs.len(), "Job store closed");
        Ok(())
    }
}
