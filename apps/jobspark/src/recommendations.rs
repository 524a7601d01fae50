//! Match scoring between a user's profile and a job.
//!
//! Default: `SkillMatchScorer`, pure and deterministic. Any other
//! scorer can be swapped in through the `MatchScorer` trait.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api_client::ApiClient;
use crate::applications::applied_job_ids;
use crate::errors::Result;
use crate::models::job::Job;
use crate::models::user::UserProfile;
use crate::session::Session;

/// A job as shown in a list: the posting plus fields derived on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    /// 0 – 100
    pub match_score: u32,
    pub is_applied: bool,
}

pub trait MatchScorer: Send + Sync {
    fn score(&self, profile: &UserProfile, job: &Job) -> u32;
}

const SKILL_WEIGHT: f32 = 60.0;
const TYPE_WEIGHT: f32 = 15.0;
const LOCATION_WEIGHT: f32 = 15.0;
const REMOTE_WEIGHT: f32 = 10.0;

/// Keyword scorer.
///
/// Algorithm:
/// 1. For each of the job's skills, best match among the profile skills:
///    exact (case-insensitive) → 1.0, substring either way → 0.6, none → 0.0.
///    The mean strength carries 60 points; a job without skills gets none.
/// 2. Job type among the preferred types → 15.
/// 3. Job location contains a preferred location or the profile location
///    (or the other way round) → 15.
/// 4. Remote preference equals the job's remote flag → 10.
pub struct SkillMatchScorer;

fn skill_strength(job_skill: &str, profile_skills: &[String]) -> f32 {
    let job_skill = job_skill.trim().to_lowercase();
    if job_skill.is_empty() {
        return 0.0;
    }
    let mut best = 0.0_f32;
    for mine in profile_skills {
        let mine = mine.trim().to_lowercase();
        if mine.is_empty() {
            continue;
        }
        let strength = if mine == job_skill {
            1.0
        } else if mine.contains(&job_skill) || job_skill.contains(&mine) {
            0.6
        } else {
            0.0
        };
        best = best.max(strength);
    }
    best
}

fn location_matches(job_location: &str, wanted: &str) -> bool {
    let job_location = job_location.trim().to_lowercase();
    let wanted = wanted.trim().to_lowercase();
    !job_location.is_empty()
        && !wanted.is_empty()
        && (job_location.contains(&wanted) || wanted.contains(&job_location))
}

impl MatchScorer for SkillMatchScorer {
    fn score(&self, profile: &UserProfile, job: &Job) -> u32 {
        let prefs = &profile.preferences;

        let skills = if job.skills.is_empty() {
            0.0
        } else {
            let total: f32 = job
                .skills
                .iter()
                .map(|s| skill_strength(s, &profile.skills))
                .sum();
            total / job.skills.len() as f32 * SKILL_WEIGHT
        };

        let job_type = if prefs.job_types.contains(&job.job_type) {
            TYPE_WEIGHT
        } else {
            0.0
        };

        let location = if prefs
            .locations
            .iter()
            .chain(std::iter::once(&profile.location))
            .any(|l| location_matches(&job.location, l))
        {
            LOCATION_WEIGHT
        } else {
            0.0
        };

        let remote = if prefs.remote == job.remote {
            REMOTE_WEIGHT
        } else {
            0.0
        };

        ((skills + job_type + location + remote).round() as u32).min(100)
    }
}

pub fn match_label(score: u32) -> &'static str {
    if score >= 80 {
        "Strong match"
    } else if score >= 60 {
        "Good match"
    } else {
        "Partial match"
    }
}

/// Builds list views, best match first (ties by title). Without a profile every
/// score is 0 and the incoming order is kept.
pub fn annotate(
    scorer: &dyn MatchScorer,
    jobs: &[Job],
    profile: Option<&UserProfile>,
    applied: &HashSet<String>,
) -> Vec<JobView> {
    let mut views: Vec<JobView> = jobs
        .iter()
        .map(|job| JobView {
            match_score: profile.map(|p| scorer.score(p, job)).unwrap_or(0),
            is_applied: applied.contains(&job.id),
            job: job.clone(),
        })
        .collect();
    if profile.is_some() {
        views.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.job.title.cmp(&b.job.title))
        });
    }
    views
}

/// Fetches recommendations for the session's user (or the anonymous set) and
/// scores them against the session profile.
pub async fn recommend(
    api: &ApiClient,
    session: &Session,
    scorer: &dyn MatchScorer,
) -> Result<Vec<JobView>> {
    let jobs = api.fetch_recommendations(session.email()).await?;
    let applied = session
        .user_record()
        .map(|r| applied_job_ids(&r.applications))
        .unwrap_or_default();
    debug!("Scoring {} recommended jobs", jobs.len());
    Ok(annotate(scorer, &jobs, session.profile(), &applied))
}
