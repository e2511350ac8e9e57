use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MAX_JOBS: usize = 10_000;

/// Configuration for the job store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON snapshot file. When unset, jobs only live in memory.
    pub data_file: Option<PathBuf>,
    /// Maximum number of stored jobs. Inserts beyond this fail.
    pub max_jobs: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            max_jobs: DEFAULT_MAX_JOBS,
        }
    }
}

impl StoreConfig {
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:5000"
                .parse()
                .expect("default listen address is valid"),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

/// Where the dashboard client finds the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the jobs collection, e.g. `http://127.0.0.1:5000/api/jobs`.
    pub fn jobs_url(&self) -> String {
        format!("{}/api/jobs", self.base_url)
    }

    pub fn job_url(&self, id: &str) -> String {
        format!("{}/api/jobs/{}", self.base_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_default() {
        let cfg = StoreConfig::default();
        assert!(cfg.data_file.is_none());
        assert_eq!(cfg.max_jobs, DEFAULT_MAX_JOBS);
    }

    #[test]
    fn store_config_builders() {
        let cfg = StoreConfig::default()
            .with_data_file("/tmp/jobs.json")
            .with_max_jobs(3);
        assert_eq!(cfg.data_file, Some(PathBuf::from("/tmp/jobs.json")));
        assert_eq!(cfg.max_jobs, 3);
    }

    #[test]
    fn server_config_default() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:5000");
        assert!(cfg.store.data_file.is_none());
    }

    #[test]
    fn server_config_new() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let cfg = ServerConfig::new(addr).with_store(StoreConfig::default().with_max_jobs(1));
        assert_eq!(cfg.listen_addr, addr);
        assert_eq!(cfg.store.max_jobs, 1);
    }

    #[test]
    fn client_config_urls() {
        let cfg = ClientConfig::new("http://localhost:5000/");
        assert_eq!(cfg.base_url, "http://localhost:5000");
        assert_eq!(cfg.jobs_url(), "http://localhost:5000/api/jobs");
        assert_eq!(cfg.job_url("abc"), "http://localhost:5000/api/jobs/abc");
    }
}
