//! Schema checks shared by the create and update paths.
//!
//! Validation is independent of storage: the API turns a raw [`JobInput`]
//! into a [`NewJob`] or [`JobPatch`], and the store runs [`check_job`] on the
//! resulting document before it is committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::job::{Job, JobPatch, JobStatus, NewJob};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must not be blank")]
    BlankField(&'static str),

    #[error("`{0}` is not a valid status, expected one of Applied, Interview, Offer, Rejected")]
    InvalidStatus(String),

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// Raw job fields as they arrive in a request body or leave the client form.
///
/// Every field is optional here; which ones are required depends on the
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
}

fn parse_status(status: Option<String>) -> Result<Option<JobStatus>, ValidationError> {
    status.map(|s| s.parse()).transpose()
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Validate a create request. `company` and `role` must be present and non-blank.
pub fn validate_new(input: JobInput) -> Result<NewJob, ValidationError> {
    let company = input
        .company
        .ok_or(ValidationError::MissingField("company"))?;
    let role = input.role.ok_or(ValidationError::MissingField("role"))?;
    require_text("company", &company)?;
    require_text("role", &role)?;

    Ok(NewJob {
        company,
        role,
        status: parse_status(input.status)?,
        applied_date: input.applied_date,
        reminder: input.reminder,
    })
}

/// Validate an update request. Only the status can be rejected up front;
/// the patched document is checked again with [`check_job`].
pub fn validate_patch(input: JobInput) -> Result<JobPatch, ValidationError> {
    Ok(JobPatch {
        company: input.company,
        role: input.role,
        status: parse_status(input.status)?,
        applied_date: input.applied_date,
        reminder: input.reminder,
    })
}

/// Check a complete document against the schema.
pub fn check_job(job: &Job) -> Result<(), ValidationError> {
    require_text("company", &job.company)?;
    require_text("role", &job.role)?;
    Ok(())
}
