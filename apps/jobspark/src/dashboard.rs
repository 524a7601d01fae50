//! Role-based dashboard summaries. One view model per role.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::applications::count_by_status;
use crate::models::application::ApplicationStatus;
use crate::models::job::{Job, JobType};
use crate::models::user::UserRecord;
use crate::profile::completeness::{compute_profile_completeness, CompletenessReport};
use crate::session::Session;

pub const TOP_SKILLS: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NextStep {
    pub job_id: String,
    /// Job title when the job is still listed, otherwise the job id.
    pub job_title: String,
    pub label: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub email: String,
    pub total_applications: usize,
    pub active_applications: usize,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
    /// Dated steps first, earliest first.
    pub upcoming: Vec<NextStep>,
    pub completeness: CompletenessReport,
}

impl UserDashboard {
    pub fn build(user: &UserRecord, jobs: &[Job]) -> Self {
        let titles: HashMap<&str, &str> = jobs
            .iter()
            .map(|j| (j.id.as_str(), j.title.as_str()))
            .collect();

        let mut upcoming: Vec<NextStep> = user
            .applications
            .iter()
            .filter(|a| a.status.is_active())
            .filter_map(|a| {
                let label = a.next_step.as_deref()?.trim();
                if label.is_empty() {
                    return None;
                }
                Some(NextStep {
                    job_id: a.job_id.clone(),
                    job_title: titles
                        .get(a.job_id.as_str())
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| a.job_id.clone()),
                    label: label.to_string(),
                    date: a.next_step_date,
                })
            })
            .collect();
        upcoming.sort_by_key(|s| (s.date.is_none(), s.date));

        UserDashboard {
            email: user.email.clone(),
            total_applications: user.applications.len(),
            active_applications: user
                .applications
                .iter()
                .filter(|a| a.status.is_active())
                .count(),
            by_status: count_by_status(&user.applications),
            upcoming,
            completeness: compute_profile_completeness(
                &user.profile.clone().unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub total_jobs: usize,
    pub remote_jobs: usize,
    pub jobs_by_type: BTreeMap<JobType, usize>,
    /// Most requested skills, most frequent first, ties alphabetical.
    pub top_skills: Vec<(String, usize)>,
    pub total_users: usize,
    pub total_applications: usize,
    pub applications_by_status: BTreeMap<ApplicationStatus, usize>,
}

impl AdminDashboard {
    pub fn build(jobs: &[Job], users: &[UserRecord]) -> Self {
        let mut jobs_by_type: BTreeMap<JobType, usize> =
            JobType::ALL.iter().map(|t| (*t, 0)).collect();
        // Keyed by lowercase so "rust" and "Rust" count together; first spelling wins.
        let mut skill_counts: HashMap<String, (String, usize)> = HashMap::new();

        for job in jobs {
            *jobs_by_type.entry(job.job_type).or_insert(0) += 1;
            for skill in &job.skills {
                let key = skill.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                skill_counts
                    .entry(key)
                    .or_insert_with(|| (skill.trim().to_string(), 0))
                    .1 += 1;
            }
        }

        let mut top_skills: Vec<(String, usize)> = skill_counts.into_values().collect();
        top_skills.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_skills.truncate(TOP_SKILLS);

        let all_applications: Vec<_> = users
            .iter()
            .flat_map(|u| u.applications.iter().cloned())
            .collect();

        AdminDashboard {
            total_jobs: jobs.len(),
            remote_jobs: jobs.iter().filter(|j| j.remote).count(),
            jobs_by_type,
            top_skills,
            total_users: users.len(),
            total_applications: all_applications.len(),
            applications_by_status: count_by_status(&all_applications),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    User(UserDashboard),
    Admin(AdminDashboard),
}

impl Dashboard {
    /// Admin view for admins, the personal view otherwise. `None` when nobody
    /// is signed in or the profile has not been resolved yet.
    pub fn for_session(session: &Session, jobs: &[Job], users: &[UserRecord]) -> Option<Self> {
        let record = session.user_record()?;
        if session.is_admin() {
            Some(Dashboard::Admin(AdminDashboard::build(jobs, users)))
        } else {
            Some(Dashboard::User(UserDashboard::build(record, jobs)))
        }
    }
}
