use serde::{Deserialize, Serialize};

use crate::models::application::Application;
use crate::models::job::JobType;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// `YYYY-MM` as entered; empty when unset.
    pub start_date: String,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub current: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalaryRange {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobPreferences {
    #[serde(default)]
    pub job_types: Vec<JobType>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub salary_range: SalaryRange,
    #[serde(default)]
    pub remote: bool,
}

/// Career data owned by the signed-in user and edited through the profile form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub preferences: JobPreferences,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The server-side user document, looked up by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub applications: Vec<Application>,
}
