use thiserror::Error;

use crate::store::validation::ValidationError;

#[derive(Error, Debug)]
pub enum JobNestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Job not found")]
    JobNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Please fill in all required fields")]
    InvalidForm,

    #[error("Cannot connect to server at {addr}. Please make sure the backend is running")]
    Connectivity { addr: String, source: reqwest::Error },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobNestError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, JobNestError::Connectivity { .. })
    }
}

impl From<std::io::Error> for JobNestError {
    fn from(e: std::io::Error) -> Self {
        JobNestError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for JobNestError {
    fn from(e: serde_json::Error) -> Self {
        JobNestError::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JobNestError>;
