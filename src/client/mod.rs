pub mod dashboard;
pub mod http;

pub use dashboard::{filter_jobs, reminders, Dashboard, JobForm, Stats, StatusFilter};
pub use http::JobApiClient;
