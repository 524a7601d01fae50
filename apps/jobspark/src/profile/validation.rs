use std::collections::BTreeMap;

use chrono::NaiveDate;
use crate::models::user::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Headline,
    Bio,
    Location,
    Skills,
    SalaryRange,
    Experience(String),
    Education(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: BTreeMap<ProfileField, String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &ProfileField) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

fn month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}

/// Checks a profile before it is sent.
///
/// Required: headline, bio, location (non-blank after trimming) and at least one skill.
/// Also rejects an inverted salary range and entries that end before they start.
pub fn validate_profile(profile: &UserProfile) -> ValidationReport {
    let mut errors = BTreeMap::new();

    if profile.headline.trim().is_empty() {
        errors.insert(ProfileField::Headline, "Headline is required".to_string());
    }
    if profile.bio.trim().is_empty() {
        errors.insert(ProfileField::Bio, "Bio is required".to_string());
    }
    if profile.location.trim().is_empty() {
        errors.insert(ProfileField::Location, "Location is required".to_string());
    }
    if profile.skills.is_empty() {
        errors.insert(ProfileField::Skills, "Add at least one skill".to_string());
    }

    let range = profile.preferences.salary_range;
    if let (Some(min), Some(max)) = (range.min, range.max) {
        if min > max {
            errors.insert(
                ProfileField::SalaryRange,
                "Minimum salary cannot exceed maximum salary".to_string(),
            );
        }
    }

    for entry in &profile.experience {
        if entry.current {
            continue;
        }
        let start = month(&entry.start_date);
        let end = entry.end_date.as_deref().and_then(month);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.insert(
                    ProfileField::Experience(entry.id.clone()),
                    format!("{} at {} ends before it starts", entry.title, entry.company),
                );
            }
        }
    }

    for entry in &profile.education {
        if entry.current {
            continue;
        }
        if let (Some(start), Some(end)) = (entry.start_year, entry.end_year) {
            if end < start {
                errors.insert(
                    ProfileField::Education(entry.id.clone()),
                    format!("{} ends before it starts", entry.school),
                );
            }
        }
    }

    ValidationReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{EducationEntry, ExperienceEntry};

    fn valid_profile() -> UserProfile {
        UserProfile {
            headline: "Backend Engineer".to_string(),
            bio: "I build services.".to_string(),
            location: "Berlin".to_string(),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(validate_profile(&valid_profile()).passed());
    }

    #[test]
    fn test_empty_headline_reported_alone() {
        let profile = UserProfile {
            headline: String::new(),
            ..valid_profile()
        };
        let report = validate_profile(&profile);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.error(&ProfileField::Headline), Some("Headline is required"));
        assert!(report.error(&ProfileField::Bio).is_none());
        assert!(report.error(&ProfileField::Location).is_none());
        assert!(report.error(&ProfileField::Skills).is_none());
    }

    #[test]
    fn test_whitespace_only_fields_fail() {
        let profile = UserProfile {
            headline: "  ".to_string(),
            bio: "\t".to_string(),
            location: "\n".to_string(),
            skills: vec![],
            ..Default::default()
        };
        let report = validate_profile(&profile);
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn test_inverted_salary_range() {
        let mut profile = valid_profile();
        profile.preferences.salary_range.min = Some(120_000);
        profile.preferences.salary_range.max = Some(80_000);
        assert!(validate_profile(&profile)
            .error(&ProfileField::SalaryRange)
            .is_some());
    }

    #[test]
    fn test_entry_dates_out_of_order() {
        let mut profile = valid_profile();
        profile.experience.push(ExperienceEntry {
            id: "1".to_string(),
            title: "Dev".to_string(),
            company: "Acme".to_string(),
            start_date: "2022-05".to_string(),
            end_date: Some("2021-01".to_string()),
            ..Default::default()
        });
        profile.education.push(EducationEntry {
            id: "2".to_string(),
            school: "TU".to_string(),
            start_year: Some(2020),
            end_year: Some(2018),
            ..Default::default()
        });
        let report = validate_profile(&profile);
        assert!(report.error(&ProfileField::Experience("1".to_string())).is_some());
        assert!(report.error(&ProfileField::Education("2".to_string())).is_some());
    }

    #[test]
    fn test_unparseable_dates_are_not_flagged() {
        let mut profile = valid_profile();
        profile.experience.push(ExperienceEntry {
            id: "1".to_string(),
            start_date: "spring".to_string(),
            end_date: Some("2021-01".to_string()),
            ..Default::default()
        });
        assert!(validate_profile(&profile).passed());
    }
}
