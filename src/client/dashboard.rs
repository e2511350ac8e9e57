use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::client::http::JobApiClient;
use crate::error::{JobNestError, Result};
use crate::store::{Job, JobInput, JobStatus, ValidationError};

/// Status selector for the job table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: JobStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "All" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// The add/edit form buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobForm {
    pub company: String,
    pub role: String,
    pub status: JobStatus,
    pub reminder: String,
    pub applied_date: Option<DateTime<Utc>>,
}

impl JobForm {
    pub fn from_job(job: &Job) -> Self {
        Self {
            company: job.company.clone(),
            role: job.role.clone(),
            status: job.status,
            reminder: job.reminder.clone().unwrap_or_default(),
            applied_date: None,
        }
    }

    /// Company and role must contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.company.trim().is_empty() && !self.role.trim().is_empty()
    }

    /// The request payload. The whole form is sent on both create and update.
    pub fn to_input(&self) -> JobInput {
        JobInput {
            company: Some(self.company.clone()),
            role: Some(self.role.clone()),
            status: Some(self.status.to_string()),
            applied_date: self.applied_date,
            reminder: Some(self.reminder.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
}

impl Stats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let count = |status: JobStatus| jobs.iter().filter(|j| j.status == status).count();
        Self {
            total: jobs.len(),
            interviews: count(JobStatus::Interview),
            offers: count(JobStatus::Offer),
            rejected: count(JobStatus::Rejected),
        }
    }
}

/// Jobs whose company contains `search_term` (case-insensitive) and whose
/// status passes `status_filter`. An empty search term matches everything.
pub fn filter_jobs<'a>(
    jobs: &'a [Job],
    search_term: &str,
    status_filter: StatusFilter,
) -> Vec<&'a Job> {
    let needle = search_term.to_lowercase();
    jobs.iter()
        .filter(|job| needle.is_empty() || job.company.to_lowercase().contains(&needle))
        .filter(|job| status_filter.matches(job.status))
        .collect()
}

pub fn reminders(jobs: &[Job]) -> Vec<&Job> {
    jobs.iter().filter(|job| job.has_reminder()).collect()
}

/// Client-side dashboard state.
///
/// Holds the job list last fetched from the API, the table filters and the
/// form buffer. Filtered views and counters are derived on demand.
#[derive(Debug, Clone)]
pub struct Dashboard {
    jobs: Vec<Job>,
    loading: bool,
    editing: Option<Job>,
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub form: JobForm,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// A dashboard that has not loaded anything yet.
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            loading: true,
            editing: None,
            search_term: String::new(),
            status_filter: StatusFilter::All,
            form: JobForm::default(),
        }
    }

    /// A ready dashboard over an existing job list.
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            loading: false,
            ..Self::new()
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn editing(&self) -> Option<&Job> {
        self.editing.as_ref()
    }

    pub fn find(&self, id: &Uuid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == *id)
    }

    pub fn filtered_jobs(&self) -> Vec<&Job> {
        filter_jobs(&self.jobs, &self.search_term, self.status_filter)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_jobs(&self.jobs)
    }

    pub fn reminders(&self) -> Vec<&Job> {
        reminders(&self.jobs)
    }

    /// Fetch the job list. Failures are logged and leave the list as it was.
    pub async fn load(&mut self, api: &JobApiClient) {
        match self.refresh(api).await {
            Ok(()) => {}
            Err(e) if e.is_connectivity() => {
                tracing::warn!(
                    addr = %api.base_url(),
                    error = %e,
                    "Backend server is not reachable, is it running?"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching jobs");
            }
        }
    }

    /// Fetch the job list and return any failure to the caller.
    pub async fn refresh(&mut self, api: &JobApiClient) -> Result<()> {
        self.loading = true;
        let fetched = api.list_jobs().await;
        self.loading = false;

        let jobs = fetched?;
        tracing::debug!(jobs = jobs.len(), "Loaded jobs");
        self.jobs = jobs;
        Ok(())
    }

    /// Fetch the job list and start editing the job with `id`.
    pub async fn begin_edit_by_id(&mut self, api: &JobApiClient, id: &Uuid) -> Result<()> {
        self.refresh(api).await?;
        let job = self
            .find(id)
            .cloned()
            .ok_or_else(|| JobNestError::JobNotFound(id.to_string()))?;
        self.begin_edit(&job);
        Ok(())
    }

    /// Copy `job` into the form and make it the edit target.
    pub fn begin_edit(&mut self, job: &Job) {
        self.form = JobForm::from_job(job);
        self.editing = Some(job.clone());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form = JobForm::default();
    }

    /// Send the form as an update (when editing) or a create.
    ///
    /// On success the local list is reconciled with the returned document and
    /// the form is reset. On failure nothing local changes.
    pub async fn submit(&mut self, api: &JobApiClient) -> Result<Job> {
        if !self.form.is_complete() {
            return Err(JobNestError::InvalidForm);
        }

        let payload = self.form.to_input();
        let saved = match self.editing.as_ref().map(|job| job.id) {
            Some(id) => {
                let updated = api.update_job(&id, &payload).await?;
                if let Some(slot) = self.jobs.iter_mut().find(|job| job.id == updated.id) {
                    *slot = updated.clone();
                }
                self.editing = None;
                updated
            }
            None => {
                let created = api.create_job(&payload).await?;
                self.jobs.insert(0, created.clone());
                created
            }
        };

        self.form = JobForm::default();
        Ok(saved)
    }

    /// Delete a job after `confirm` agrees.
    ///
    /// Returns `Ok(None)` when the user declined. The job is removed locally
    /// only once the server confirms the delete.
    pub async fn delete(
        &mut self,
        api: &JobApiClient,
        id: &Uuid,
        confirm: impl FnOnce() -> bool,
    ) -> Result<Option<Job>> {
        if !confirm() {
            return Ok(None);
        }

        let response = api.delete_job(id).await?;
        self.jobs.retain(|job| job.id != *id);
        Ok(Some(response.deleted_job))
    }
}
