use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    Applied,
    #[serde(rename = "In Progress")]
    InProgress,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::InProgress,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::InProgress => "In Progress",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Still waiting on a decision.
    pub fn is_active(&self) -> bool {
        !matches!(self, ApplicationStatus::Offer | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A user's application to a job. The client only ever creates `Applied`;
/// later statuses are whatever the server reports back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub job_id: String,
    #[serde(default)]
    pub email: String,
    pub status: ApplicationStatus,
    pub applied_date: NaiveDate,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub next_step_date: Option<NaiveDate>,
    #[serde(default)]
    pub motivation: String,
}
