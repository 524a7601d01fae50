//! Multi-section profile editor state.
//!
//! One `UserProfile` holds every section at once; the active section only decides
//! what is rendered. Field edits never discard data, validation failures included.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::api_client::ProfileUpdater;
use crate::models::job::JobType;
use crate::models::user::{EducationEntry, ExperienceEntry, SalaryRange, UserProfile};
use crate::profile::ids::EntryIdGenerator;
use crate::profile::validation::{validate_profile, ProfileField, ValidationReport};

pub const DEFAULT_FEEDBACK_DURATION: Duration = Duration::from_secs(3);
pub const SAVED_MESSAGE: &str = "Profile updated successfully";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Basic,
    Experience,
    Education,
    Preferences,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExperienceField {
    Title(String),
    Company(String),
    Location(String),
    StartDate(String),
    /// Ignored while the entry is marked current.
    EndDate(Option<String>),
    /// Setting `true` clears the end date.
    Current(bool),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EducationField {
    School(String),
    Degree(String),
    Field(String),
    StartYear(Option<i32>),
    /// Ignored while the entry is marked current.
    EndYear(Option<i32>),
    /// Setting `true` clears the end year.
    Current(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved,
    /// Blocked before reaching the backend.
    Invalid(ValidationReport),
    Failed(String),
}

#[derive(Debug, Clone)]
struct ActiveFeedback {
    feedback: Feedback,
    /// `None` keeps the message until the next edit or submit.
    expires_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
    email: String,
    data: UserProfile,
    saved: UserProfile,
    active: Section,
    errors: BTreeMap<ProfileField, String>,
    feedback: Option<ActiveFeedback>,
    feedback_duration: Duration,
    ids: EntryIdGenerator,
}

impl ProfileForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self::from_profile(email, UserProfile::default())
    }

    /// Seeds the form with the profile currently stored on the server.
    pub fn from_profile(email: impl Into<String>, profile: UserProfile) -> Self {
        let mut ids = EntryIdGenerator::new();
        ids.observe(profile.experience.iter().map(|e| e.id.as_str()));
        ids.observe(profile.education.iter().map(|e| e.id.as_str()));
        Self {
            email: email.into(),
            saved: profile.clone(),
            data: profile,
            active: Section::default(),
            errors: BTreeMap::new(),
            feedback: None,
            feedback_duration: DEFAULT_FEEDBACK_DURATION,
            ids,
        }
    }

    pub fn with_feedback_duration(mut self, duration: Duration) -> Self {
        self.feedback_duration = duration;
        self
    }

    pub fn data(&self) -> &UserProfile {
        &self.data
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    pub fn set_active_section(&mut self, section: Section) {
        self.active = section;
    }

    pub fn errors(&self) -> &BTreeMap<ProfileField, String> {
        &self.errors
    }

    pub fn error(&self, field: &ProfileField) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Unsaved changes relative to the last seeded or saved profile.
    pub fn is_dirty(&self) -> bool {
        self.data != self.saved
    }

    fn touched(&mut self, field: ProfileField) {
        self.errors.remove(&field);
        if matches!(
            self.feedback,
            Some(ActiveFeedback {
                feedback: Feedback::Error(_),
                ..
            })
        ) {
            self.feedback = None;
        }
    }

    // Basic info

    pub fn set_headline(&mut self, value: impl Into<String>) {
        self.data.headline = value.into();
        self.touched(ProfileField::Headline);
    }

    pub fn set_bio(&mut self, value: impl Into<String>) {
        self.data.bio = value.into();
        self.touched(ProfileField::Bio);
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.data.location = value.into();
        self.touched(ProfileField::Location);
    }

    // Skills

    /// Returns `false` for blank input or a skill already present.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.data.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.data.skills.push(skill.to_string());
        self.touched(ProfileField::Skills);
        true
    }

    pub fn remove_skill(&mut self, skill: &str) {
        self.data.skills.retain(|s| s != skill);
    }

    // Experience

    pub fn add_experience(&mut self) -> String {
        let id = self.ids.next_id();
        self.data.experience.push(ExperienceEntry {
            id: id.clone(),
            ..Default::default()
        });
        id
    }

    pub fn remove_experience(&mut self, id: &str) {
        self.data.experience.retain(|e| e.id != id);
        self.errors.remove(&ProfileField::Experience(id.to_string()));
    }

    /// Returns `false` when no entry has this id.
    pub fn update_experience(&mut self, id: &str, field: ExperienceField) -> bool {
        let Some(entry) = self.data.experience.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        match field {
            ExperienceField::Title(v) => entry.title = v,
            ExperienceField::Company(v) => entry.company = v,
            ExperienceField::Location(v) => entry.location = v,
            ExperienceField::StartDate(v) => entry.start_date = v,
            ExperienceField::EndDate(v) => {
                if !entry.current {
                    entry.end_date = v;
                }
            }
            ExperienceField::Current(current) => {
                entry.current = current;
                if current {
                    entry.end_date = None;
                }
            }
            ExperienceField::Description(v) => entry.description = v,
        }
        self.touched(ProfileField::Experience(id.to_string()));
        true
    }

    // Education

    pub fn add_education(&mut self) -> String {
        let id = self.ids.next_id();
        self.data.education.push(EducationEntry {
            id: id.clone(),
            ..Default::default()
        });
        id
    }

    pub fn remove_education(&mut self, id: &str) {
        self.data.education.retain(|e| e.id != id);
        self.errors.remove(&ProfileField::Education(id.to_string()));
    }

    /// Returns `false` when no entry has this id.
    pub fn update_education(&mut self, id: &str, field: EducationField) -> bool {
        let Some(entry) = self.data.education.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        match field {
            EducationField::School(v) => entry.school = v,
            EducationField::Degree(v) => entry.degree = v,
            EducationField::Field(v) => entry.field = v,
            EducationField::StartYear(v) => entry.start_year = v,
            EducationField::EndYear(v) => {
                if !entry.current {
                    entry.end_year = v;
                }
            }
            EducationField::Current(current) => {
                entry.current = current;
                if current {
                    entry.end_year = None;
                }
            }
        }
        self.touched(ProfileField::Education(id.to_string()));
        true
    }

    // Preferences

    pub fn toggle_job_type(&mut self, job_type: JobType) {
        let types = &mut self.data.preferences.job_types;
        if let Some(pos) = types.iter().position(|t| *t == job_type) {
            types.remove(pos);
        } else {
            types.push(job_type);
        }
    }

    /// Returns `false` for blank input or a location already listed.
    pub fn add_preferred_location(&mut self, location: &str) -> bool {
        let location = location.trim();
        let locations = &mut self.data.preferences.locations;
        if location.is_empty() || locations.iter().any(|l| l == location) {
            return false;
        }
        locations.push(location.to_string());
        true
    }

    pub fn remove_preferred_location(&mut self, location: &str) {
        self.data.preferences.locations.retain(|l| l != location);
    }

    pub fn set_salary_range(&mut self, min: Option<u32>, max: Option<u32>) {
        self.data.preferences.salary_range = SalaryRange { min, max };
        self.touched(ProfileField::SalaryRange);
    }

    pub fn set_remote(&mut self, remote: bool) {
        self.data.preferences.remote = remote;
    }

    // Submission

    pub fn validate(&self) -> ValidationReport {
        validate_profile(&self.data)
    }

    /// Validates, then hands the whole profile to `updater`. Nothing entered is
    /// lost on either failure path.
    pub async fn submit(&mut self, updater: &dyn ProfileUpdater) -> SubmitOutcome {
        self.feedback = None;

        let report = self.validate();
        if !report.passed() {
            info!("Profile submit blocked by {} field errors", report.errors.len());
            self.errors = report.errors.clone();
            return SubmitOutcome::Invalid(report);
        }
        self.errors.clear();

        match updater.update_profile(&self.email, &self.data).await {
            Ok(()) => {
                info!("Profile saved for {}", self.email);
                self.saved = self.data.clone();
                self.feedback = Some(ActiveFeedback {
                    feedback: Feedback::Success(SAVED_MESSAGE.to_string()),
                    expires_at: Some(Instant::now() + self.feedback_duration),
                });
                SubmitOutcome::Saved
            }
            Err(e) => {
                warn!("Profile save failed: {e}");
                let message = e.user_message();
                self.feedback = Some(ActiveFeedback {
                    feedback: Feedback::Error(message.clone()),
                    expires_at: None,
                });
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// The message currently visible, if it has not expired.
    pub fn feedback(&self) -> Option<&Feedback> {
        let active = self.feedback.as_ref()?;
        match active.expires_at {
            Some(deadline) if Instant::now() >= deadline => None,
            _ => Some(&active.feedback),
        }
    }

    /// Drops an expired message. Returns `true` if one was removed.
    pub fn expire_feedback(&mut self) -> bool {
        let expired = matches!(
            &self.feedback,
            Some(ActiveFeedback { expires_at: Some(deadline), .. }) if Instant::now() >= *deadline
        );
        if expired {
            self.feedback = None;
        }
        expired
    }

    /// Sleeps until the current message's deadline, then clears it.
    pub async fn clear_feedback_after_delay(&mut self) {
        if let Some(deadline) = self.feedback.as_ref().and_then(|f| f.expires_at) {
            tokio::time::sleep_until(deadline).await;
            self.expire_feedback();
        }
    }
}
