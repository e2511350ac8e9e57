use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    /// Status names are matched exactly, the same way the API stores them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// A single job application as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub status: JobStatus,
    pub applied_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
}

impl Job {
    pub fn new(company: String, role: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            company,
            role,
            status: JobStatus::Applied,
            applied_date: Utc::now(),
            reminder: None,
        }
    }

    /// Build a stored document from validated input, filling in the defaults.
    pub fn from_new(new: NewJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            company: new.company,
            role: new.role,
            status: new.status.unwrap_or_default(),
            applied_date: new.applied_date.unwrap_or_else(Utc::now),
            reminder: new.reminder,
        }
    }

    pub fn has_reminder(&self) -> bool {
        self.reminder
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }
}

/// Fields accepted when creating a job. Only `company` and `role` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJob {
    pub company: String,
    pub role: String,
    pub status: Option<JobStatus>,
    pub applied_date: Option<DateTime<Utc>>,
    pub reminder: Option<String>,
}

/// A partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<JobStatus>,
    pub applied_date: Option<DateTime<Utc>>,
    pub reminder: Option<String>,
}

impl JobPatch {
    /// Apply the supplied fields to `job`. The id is never touched.
    pub fn apply(self, job: &mut Job) {
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(role) = self.role {
            job.role = role;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(applied_date) = self.applied_date {
            job.applied_date = applied_date;
        }
        if let Some(reminder) = self.reminder {
            job.reminder = Some(reminder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_exact_names_only() {
        assert_eq!("Interview".parse::<JobStatus>(), Ok(JobStatus::Interview));
        assert_eq!(
            "interview".parse::<JobStatus>(),
            Err(ValidationError::InvalidStatus("interview".to_string()))
        );
    }

    #[test]
    fn status_display_honours_width() {
        assert_eq!(format!("{:<10}|", JobStatus::Applied), "Applied   |");
        assert_eq!(format!("{}", JobStatus::Rejected), "Rejected");
    }

    #[test]
    fn from_new_fills_defaults() {
        let before = Utc::now();
        let job = Job::from_new(NewJob {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            ..Default::default()
        });
        assert_eq!(job.status, JobStatus::Applied);
        assert!(job.applied_date >= before);
        assert!(job.reminder.is_none());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut job = Job::new("Acme".to_string(), "Engineer".to_string());
        let original = job.clone();
        JobPatch {
            status: Some(JobStatus::Offer),
            ..Default::default()
        }
        .apply(&mut job);

        assert_eq!(job.status, JobStatus::Offer);
        assert_eq!(job.id, original.id);
        assert_eq!(job.company, original.company);
        assert_eq!(job.role, original.role);
        assert_eq!(job.applied_date, original.applied_date);
    }

    #[test]
    fn wire_format_uses_camel_case_and_omits_missing_reminder() {
        let job = Job::new("Acme".to_string(), "Engineer".to_string());
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("appliedDate").is_some());
        assert!(json.get("reminder").is_none());
        assert_eq!(json["status"], "Applied");
    }

    #[test]
    fn blank_reminder_is_not_a_reminder() {
        let mut job = Job::new("Acme".to_string(), "Engineer".to_string());
        job.reminder = Some("  ".to_string());
        assert!(!job.has_reminder());
        job.reminder = Some("Follow up".to_string());
        assert!(job.has_reminder());
    }
}
