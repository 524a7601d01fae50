//! The signed-in user, passed explicitly to whatever needs it.

use std::time::Duration;

use tracing::{info, warn};

use crate::api_client::endpoints::NewUser;
use crate::api_client::{ApiClient, ProfileUpdater};
use crate::errors::{ClientError, Result};
use crate::models::user::{Role, UserProfile, UserRecord};
use crate::profile::{ProfileForm, SubmitOutcome};

/// Identity as reported by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<AuthUser>,
    /// Display only.
    pub dark_mode: bool,
    profile: Option<UserRecord>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.current_user.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.current_user.as_ref().map(|u| u.email.as_str())
    }

    pub fn user_record(&self) -> Option<&UserRecord> {
        self.profile.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref().and_then(|r| r.profile.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.profile.as_ref().map(|r| r.role), Some(Role::Admin))
    }

    pub fn sign_in(&mut self, user: AuthUser) {
        info!("Signed in as {}", user.email);
        if self.email() != Some(user.email.as_str()) {
            self.profile = None;
        }
        self.current_user = Some(user);
    }

    /// Registers the user with the backend, obtains credentials, then resolves
    /// the server-side profile.
    pub async fn establish(&mut self, api: &ApiClient, user: AuthUser) -> Result<&UserRecord> {
        api.save_user(&NewUser {
            email: &user.email,
            name: user.display_name.as_deref(),
            photo_url: user.photo_url.as_deref(),
            profile: None,
        })
        .await?;
        api.issue_token(&user.email).await?;
        self.sign_in(user);
        self.resolve_profile(api).await
    }

    /// GET /user/{email} for the signed-in user.
    pub async fn resolve_profile(&mut self, api: &ApiClient) -> Result<&UserRecord> {
        let email = self.email().ok_or(ClientError::Unauthorized)?.to_string();
        let record = api.fetch_user(&email).await?;
        Ok(&*self.profile.insert(record))
    }

    /// Replaces the cached profile after a successful save.
    pub fn store_profile(&mut self, profile: UserProfile) {
        if let Some(record) = self.profile.as_mut() {
            record.profile = Some(profile);
        }
    }

    /// A form for the signed-in user, seeded from the cached profile.
    pub fn profile_form(&self, feedback_duration: Duration) -> Result<ProfileForm> {
        let email = self.email().ok_or(ClientError::Unauthorized)?;
        let profile = self.profile().cloned().unwrap_or_default();
        Ok(ProfileForm::from_profile(email, profile).with_feedback_duration(feedback_duration))
    }

    /// Submits `form` and, once the backend accepts it, keeps the cached
    /// profile in step with what was saved.
    pub async fn save_profile(
        &mut self,
        form: &mut ProfileForm,
        updater: &dyn ProfileUpdater,
    ) -> SubmitOutcome {
        let outcome = form.submit(updater).await;
        if outcome == SubmitOutcome::Saved {
            self.store_profile(form.data().clone());
        }
        outcome
    }

    pub async fn sign_out(&mut self, api: &ApiClient) -> Result<()> {
        let result = api.logout().await;
        if let Err(e) = &result {
            warn!("Logout request failed, clearing local session anyway: {e}");
        }
        self.current_user = None;
        self.profile = None;
        result
    }
}
