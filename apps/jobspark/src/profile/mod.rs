pub mod completeness;
pub mod form;
pub mod ids;
pub mod validation;

pub use form::{EducationField, ExperienceField, Feedback, ProfileForm, Section, SubmitOutcome};
pub use validation::{validate_profile, ProfileField, ValidationReport};
