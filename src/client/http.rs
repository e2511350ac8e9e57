use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::{DeleteJobResponse, ErrorResponse};
use crate::config::ClientConfig;
use crate::error::{JobNestError, Result};
use crate::store::{Job, JobInput};

/// HTTP client for the jobs API.
///
/// Failures where no response came back are reported as
/// [`JobNestError::Connectivity`]; responses with a non-success status become
/// [`JobNestError::Server`] carrying the server's `error` message.
#[derive(Debug, Clone)]
pub struct JobApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl JobApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let response = self
            .http
            .get(self.config.jobs_url())
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }

    pub async fn create_job(&self, input: &JobInput) -> Result<Job> {
        let response = self
            .http
            .post(self.config.jobs_url())
            .json(input)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }

    pub async fn update_job(&self, id: &Uuid, input: &JobInput) -> Result<Job> {
        let response = self
            .http
            .patch(self.config.job_url(&id.to_string()))
            .json(input)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }

    pub async fn delete_job(&self, id: &Uuid) -> Result<DeleteJobResponse> {
        let response = self
            .http
            .delete(self.config.job_url(&id.to_string()))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }

    fn classify(&self, e: reqwest::Error) -> JobNestError {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            JobNestError::Connectivity {
                addr: self.config.base_url.clone(),
                source: e,
            }
        } else {
            JobNestError::Http(e)
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("Server error: {}", status.as_u16()),
        };
        Err(JobNestError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
