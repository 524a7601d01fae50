//! JobSpark client core: typed access to the job board backend plus the
//! client-side logic (filtering, recommendations, dashboards, profile editing).

pub mod api_client;
pub mod applications;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod profile;
pub mod recommendations;
pub mod session;

pub use api_client::{ApiClient, HttpClient, JobSource, ProfileUpdater};
pub use errors::{ClientError, Result};
pub use session::{AuthUser, Session};
