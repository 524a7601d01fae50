use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment type of a posting. Wire names match the labels the job board shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for JobType {
    type Err = String;

    /// Accepts the display label or a loose spelling such as `full_time` / `fulltime`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "fulltime" => Ok(JobType::FullTime),
            "parttime" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "freelance" => Ok(JobType::Freelance),
            "internship" => Ok(JobType::Internship),
            _ => Err(format!("unknown job type '{s}'")),
        }
    }
}

/// A posted position. Created server-side and never mutated by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub posted_date: Option<NaiveDate>,
}

impl Job {
    /// `wanted_lower` must already be lowercased. Matches when it appears inside any of
    /// the job's skills.
    pub fn has_skill(&self, wanted_lower: &str) -> bool {
        self.skills
            .iter()
            .any(|s| s.to_lowercase().contains(wanted_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_deserializes_from_backend_shape() {
        let job: Job = serde_json::from_value(json!({
            "_id": "665f1c",
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Berlin",
            "salary": "$120k - $150k",
            "type": "Full-time",
            "remote": true,
            "skills": ["Go", "Postgres"],
            "description": "Build APIs",
            "responsibilities": ["Own services"],
            "requirements": ["3+ years"],
            "postedDate": "2024-05-01"
        }))
        .unwrap();

        assert_eq!(job.id, "665f1c");
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.posted_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(job.skills.len(), 2);
    }

    #[test]
    fn test_job_missing_lists_default_to_empty() {
        let job: Job = serde_json::from_value(json!({
            "id": "1",
            "title": "Intern",
            "company": "Acme",
            "type": "Internship"
        }))
        .unwrap();

        assert!(job.skills.is_empty());
        assert!(job.requirements.is_empty());
        assert!(!job.remote);
        assert!(job.posted_date.is_none());
    }

    #[test]
    fn test_job_type_parses_loose_spellings() {
        assert_eq!("full_time".parse::<JobType>().unwrap(), JobType::FullTime);
        assert_eq!("Part-time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert_eq!("CONTRACT".parse::<JobType>().unwrap(), JobType::Contract);
        assert!("permanent".parse::<JobType>().is_err());
    }

    #[test]
    fn test_job_type_serializes_to_label() {
        assert_eq!(
            serde_json::to_value(JobType::PartTime).unwrap(),
            json!("Part-time")
        );
    }
}
