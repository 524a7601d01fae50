use serde::{Deserialize, Serialize};

use crate::models::user::UserProfile;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: String,
    pub score: f64,
    pub status: SectionStatus,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// 0.0 – 1.0
    pub overall_score: f64,
    pub sections: Vec<SectionHealth>,
    pub missing_sections: Vec<String>,
}

impl CompletenessReport {
    pub fn percent(&self) -> u32 {
        (self.overall_score * 100.0).round() as u32
    }
}

const SECTION_WEIGHTS: &[(&str, f64)] = &[
    ("basic", 0.30),
    ("skills", 0.20),
    ("experience", 0.25),
    ("education", 0.15),
    ("preferences", 0.10),
];

/// Skills count as complete from this many entries on.
const TARGET_SKILLS: f64 = 5.0;
const TARGET_EXPERIENCE: f64 = 2.0;

fn filled(value: &str) -> f64 {
    if value.trim().is_empty() {
        0.0
    } else {
        1.0
    }
}

fn section_score(section: &str, profile: &UserProfile) -> f64 {
    let score = match section {
        "basic" => {
            (filled(&profile.headline) + filled(&profile.bio) + filled(&profile.location)) / 3.0
        }
        "skills" => profile.skills.len() as f64 / TARGET_SKILLS,
        "experience" => profile.experience.len() as f64 / TARGET_EXPERIENCE,
        "education" => {
            if profile.education.is_empty() {
                0.0
            } else {
                1.0
            }
        }
        "preferences" => {
            let prefs = &profile.preferences;
            let parts = [
                !prefs.job_types.is_empty(),
                !prefs.locations.is_empty(),
                prefs.salary_range.min.is_some() || prefs.salary_range.max.is_some(),
            ];
            parts.iter().filter(|p| **p).count() as f64 / parts.len() as f64
        }
        _ => 0.0,
    };
    score.clamp(0.0, 1.0)
}

fn recommendation(section: &str, status: SectionStatus) -> Option<String> {
    if status == SectionStatus::Strong {
        return None;
    }
    let hint = match section {
        "basic" => "Fill in your headline, bio and location",
        "skills" => "List at least five skills so recommendations can match you",
        "experience" => "Add your recent roles to the experience section",
        "education" => "Add at least one education entry",
        "preferences" => "Tell us which job types, locations and salary you are after",
        _ => return None,
    };
    Some(hint.to_string())
}

pub fn compute_profile_completeness(profile: &UserProfile) -> CompletenessReport {
    let mut sections = Vec::new();
    let mut missing_sections = Vec::new();
    let mut weighted = 0.0;

    for (section, weight) in SECTION_WEIGHTS {
        let score = section_score(section, profile);
        let status = match score {
            s if s >= 0.8 => SectionStatus::Strong,
            s if s >= 0.5 => SectionStatus::Moderate,
            s if s > 0.0 => SectionStatus::Weak,
            _ => SectionStatus::Missing,
        };
        if status == SectionStatus::Missing {
            missing_sections.push(section.to_string());
        }
        weighted += score * weight;
        sections.push(SectionHealth {
            section: section.to_string(),
            score,
            status,
            recommendation: recommendation(section, status),
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    CompletenessReport {
        overall_score: (weighted / total_weight).clamp(0.0, 1.0),
        sections,
        missing_sections,
    }
}
