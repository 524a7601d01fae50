use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::api_client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub job_id: String,
    pub motivation: String,
}

impl ApplyRequest {
    pub fn validate(&self) -> Result<()> {
        if self.job_id.trim().is_empty() {
            return Err(ClientError::Validation("A job must be selected".to_string()));
        }
        if self.motivation.trim().is_empty() {
            return Err(ClientError::Validation(
                "Tell the employer why you are interested".to_string(),
            ));
        }
        Ok(())
    }
}

/// Applies, then reads the user back so the caller sees the server's view of
/// every application rather than the optimistic one.
pub async fn submit_application(
    api: &ApiClient,
    email: &str,
    request: &ApplyRequest,
) -> Result<Vec<Application>> {
    api.apply(email, request).await?;
    let user = api.fetch_user(email).await?;
    Ok(user.applications)
}

pub fn applied_job_ids(applications: &[Application]) -> HashSet<String> {
    applications.iter().map(|a| a.job_id.clone()).collect()
}

/// Every status present with a count, zero included, in lifecycle order.
pub fn count_by_status(applications: &[Application]) -> BTreeMap<ApplicationStatus, usize> {
    let mut counts: BTreeMap<ApplicationStatus, usize> =
        ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for application in applications {
        *counts.entry(application.status).or_insert(0) += 1;
    }
    counts
}
