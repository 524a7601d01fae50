//! Pure filtering over the in-memory job collection.
//!
//! All provided criteria must hold (AND). Within `skills` every requested skill has
//! to match one of the job's skills. The free-text query is the only OR: it hits on
//! title, company, location or any skill. Blank strings count as "not provided".

use serde::{Deserialize, Serialize};

use crate::models::job::{Job, JobType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub remote: Option<bool>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub search_query: Option<String>,
}

/// Result of applying a filter. `NoMatches` is the empty state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JobListing {
    Results(Vec<Job>),
    NoMatches,
}

impl JobListing {
    fn from_jobs(jobs: Vec<Job>) -> Self {
        if jobs.is_empty() {
            JobListing::NoMatches
        } else {
            JobListing::Results(jobs)
        }
    }

    pub fn jobs(&self) -> &[Job] {
        match self {
            JobListing::Results(jobs) => jobs,
            JobListing::NoMatches => &[],
        }
    }

    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            JobListing::Results(jobs) => jobs,
            JobListing::NoMatches => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, JobListing::NoMatches)
    }
}

/// Lowercased, blank-free view of a `JobFilter`, built once per `apply`.
struct Criteria {
    location: Option<String>,
    job_type: Option<JobType>,
    remote: Option<bool>,
    skills: Vec<String>,
    query: Option<String>,
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

impl JobFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::default()
        }
    }

    /// True when no criterion would exclude anything.
    pub fn is_empty(&self) -> bool {
        let c = self.criteria();
        c.location.is_none()
            && c.job_type.is_none()
            && c.remote.is_none()
            && c.skills.is_empty()
            && c.query.is_none()
    }

    fn criteria(&self) -> Criteria {
        Criteria {
            location: normalize(&self.location),
            job_type: self.job_type,
            remote: self.remote,
            skills: self
                .skills
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
                .collect(),
            query: normalize(&self.search_query),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.criteria().matches(job)
    }

    /// Filters `jobs` without touching it; the caller always passes the base collection.
    pub fn apply(&self, jobs: &[Job]) -> JobListing {
        let criteria = self.criteria();
        JobListing::from_jobs(
            jobs.iter()
                .filter(|job| criteria.matches(job))
                .cloned()
                .collect(),
        )
    }
}

impl Criteria {
    fn matches(&self, job: &Job) -> bool {
        if let Some(query) = &self.query {
            let hit = job.title.to_lowercase().contains(query)
                || job.company.to_lowercase().contains(query)
                || job.location.to_lowercase().contains(query)
                || job.has_skill(query);
            if !hit {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location) {
                return false;
            }
        }

        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }

        if let Some(remote) = self.remote {
            if job.remote != remote {
                return false;
            }
        }

        self.skills.iter().all(|skill| job.has_skill(skill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, title: &str, company: &str, skills: &[&str]) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: "Berlin, Germany".to_string(),
            salary: "$100k".to_string(),
            job_type: JobType::FullTime,
            remote: false,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
            responsibilities: vec![],
            requirements: vec![],
            posted_date: None,
        }
    }

    fn scenario_jobs() -> Vec<Job> {
        vec![
            job("1", "Backend Engineer", "Acme", &["Go"]),
            job("2", "Frontend Dev", "Acme", &["React"]),
        ]
    }

    fn mixed_jobs() -> Vec<Job> {
        let mut remote_contract = job("3", "Data Engineer", "Globex", &["Python", "SQL", "Spark"]);
        remote_contract.remote = true;
        remote_contract.job_type = JobType::Contract;
        remote_contract.location = "Lisbon, Portugal".to_string();

        let mut intern = job("4", "Platform Intern", "Initech", &["Rust", "Kubernetes"]);
        intern.job_type = JobType::Internship;
        intern.location = "Remote".to_string();
        intern.remote = true;

        let mut all = scenario_jobs();
        all.push(remote_contract);
        all.push(intern);
        all.push(job("5", "Fullstack Developer", "Hooli", &["React", "Node.js", "PostgreSQL"]));
        all
    }

    fn ids(listing: &JobListing) -> Vec<&str> {
        listing.jobs().iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_search_matches_company_for_both_jobs() {
        let listing = JobFilter::search("acme").apply(&scenario_jobs());
        assert_eq!(ids(&listing), vec!["1", "2"]);
    }

    #[test]
    fn test_skill_filter_selects_first_job_only() {
        let filter = JobFilter {
            skills: vec!["Go".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&scenario_jobs())), vec!["1"]);
    }

    #[test]
    fn test_empty_filter_is_identity() {
        for jobs in [scenario_jobs(), mixed_jobs()] {
            let listing = JobFilter::default().apply(&jobs);
            assert_eq!(listing.jobs(), jobs.as_slice());
        }
        assert!(JobFilter::default().is_empty());
    }

    #[test]
    fn test_blank_criteria_are_ignored() {
        let filter = JobFilter {
            location: Some("   ".to_string()),
            skills: vec!["".to_string(), " ".to_string()],
            search_query: Some("".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&mixed_jobs()).len(), mixed_jobs().len());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let jobs = mixed_jobs();
        let filters = vec![
            JobFilter::search("engineer"),
            JobFilter {
                remote: Some(true),
                ..Default::default()
            },
            JobFilter {
                skills: vec!["react".to_string()],
                location: Some("berlin".to_string()),
                ..Default::default()
            },
            JobFilter {
                job_type: Some(JobType::Internship),
                search_query: Some("nothing-matches-this".to_string()),
                ..Default::default()
            },
        ];

        for filter in filters {
            let once = filter.apply(&jobs);
            let twice = filter.apply(once.jobs());
            assert_eq!(once, twice, "filter {filter:?} is not idempotent");
        }
    }

    #[test]
    fn test_skills_require_every_requested_skill() {
        let filter = JobFilter {
            skills: vec!["python".to_string(), "spark".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&mixed_jobs())), vec!["3"]);

        let missing_one = JobFilter {
            skills: vec!["python".to_string(), "rust".to_string()],
            ..Default::default()
        };
        assert!(missing_one.apply(&mixed_jobs()).is_empty());
    }

    #[test]
    fn test_skill_match_is_substring_and_case_insensitive() {
        let filter = JobFilter {
            skills: vec!["POSTGRES".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&mixed_jobs())), vec!["5"]);
    }

    #[test]
    fn test_search_matches_location_and_skill() {
        assert_eq!(ids(&JobFilter::search("lisbon").apply(&mixed_jobs())), vec!["3"]);
        assert_eq!(ids(&JobFilter::search("kubernetes").apply(&mixed_jobs())), vec!["4"]);
    }

    #[test]
    fn test_location_type_and_remote_combine_with_and() {
        let filter = JobFilter {
            location: Some("remote".to_string()),
            job_type: Some(JobType::Internship),
            remote: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&mixed_jobs())), vec!["4"]);

        let contradictory = JobFilter {
            remote: Some(false),
            ..filter
        };
        assert!(contradictory.apply(&mixed_jobs()).is_empty());
    }

    #[test]
    fn test_remote_false_is_an_exact_match() {
        let filter = JobFilter {
            remote: Some(false),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&mixed_jobs())), vec!["1", "2", "5"]);
    }

    #[test]
    fn test_no_matches_is_empty_state() {
        let listing = JobFilter::search("cobol").apply(&mixed_jobs());
        assert_eq!(listing, JobListing::NoMatches);
        assert_eq!(listing.len(), 0);
        assert!(listing.into_jobs().is_empty());
    }

    #[test]
    fn test_filter_deserializes_from_camel_case() {
        let filter: JobFilter = serde_json::from_value(serde_json::json!({
            "type": "Contract",
            "searchQuery": "data",
            "skills": ["SQL"]
        }))
        .unwrap();
        assert_eq!(filter.job_type, Some(JobType::Contract));
        assert_eq!(ids(&filter.apply(&mixed_jobs())), vec!["3"]);
    }
}
