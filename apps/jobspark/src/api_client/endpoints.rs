use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api_client::HttpClient;
use crate::applications::ApplyRequest;
use crate::errors::Result;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::user::{UserProfile, UserRecord};

/// Anything that can hand over the full job collection.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<Job>>;
}

/// The save action behind the profile form.
#[async_trait]
pub trait ProfileUpdater: Send + Sync {
    async fn update_profile(&self, email: &str, profile: &UserProfile) -> Result<()>;
}

#[derive(Debug, Serialize)]
pub struct NewUser<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(rename = "photoUrl", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<&'a UserProfile>,
}

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Both HTTP clients plus one method per backend endpoint.
#[derive(Clone)]
pub struct ApiClient {
    public: HttpClient,
    secure: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            public: HttpClient::public(base_url, timeout)?,
            secure: HttpClient::secure(base_url, timeout)?,
        })
    }

    pub fn public(&self) -> &HttpClient {
        &self.public
    }

    pub fn secure(&self) -> &HttpClient {
        &self.secure
    }

    /// GET /jobs
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        let jobs: Vec<Job> = self.public.get_json(&["jobs"], &[]).await?;
        info!("Fetched {} jobs", jobs.len());
        Ok(jobs)
    }

    /// GET /recommendations, or GET /recommendations?email= for a signed-in user.
    pub async fn fetch_recommendations(&self, email: Option<&str>) -> Result<Vec<Job>> {
        match email {
            Some(email) => {
                self.secure
                    .get_json(&["recommendations"], &[("email", email)])
                    .await
            }
            None => self.secure.get_json(&["recommendations"], &[]).await,
        }
    }

    /// GET /user/{email}
    pub async fn fetch_user(&self, email: &str) -> Result<UserRecord> {
        self.secure.get_json(&["user", email], &[]).await
    }

    /// POST /user. The backend upserts by email.
    pub async fn save_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.public.send_discard(Method::POST, &["user"], user).await
    }

    /// POST /jwt. Cookies land in the secure client's store; a token in the body,
    /// if any, becomes its bearer credential. An empty body means cookies only.
    pub async fn issue_token(&self, email: &str) -> Result<()> {
        let body = self
            .secure
            .send_text(Method::POST, &["jwt"], &EmailBody { email })
            .await?;
        let token = if body.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<TokenResponse>(&body)?.token
        };
        if token.is_some() {
            info!("Bearer token issued for {email}");
        }
        self.secure.set_token(token);
        Ok(())
    }

    /// POST /logout
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .secure
            .send_discard(Method::POST, &["logout"], &serde_json::json!({}))
            .await;
        self.secure.set_token(None);
        result
    }

    /// PATCH /user/{email}/apply. Always sends status `Applied`; whatever the
    /// application becomes later is read back through `fetch_user`.
    pub async fn apply(&self, email: &str, request: &ApplyRequest) -> Result<Application> {
        request.validate()?;
        let application = Application {
            job_id: request.job_id.clone(),
            email: email.to_string(),
            status: ApplicationStatus::Applied,
            applied_date: Utc::now().date_naive(),
            next_step: None,
            next_step_date: None,
            motivation: request.motivation.trim().to_string(),
        };
        self.secure
            .send_discard(Method::PATCH, &["user", email, "apply"], &application)
            .await?;
        info!("Applied to job {} as {email}", application.job_id);
        Ok(application)
    }
}

#[async_trait]
impl JobSource for ApiClient {
    async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        ApiClient::fetch_jobs(self).await
    }
}

#[async_trait]
impl ProfileUpdater for ApiClient {
    async fn update_profile(&self, email: &str, profile: &UserProfile) -> Result<()> {
        let user = NewUser {
            email,
            name: None,
            photo_url: None,
            profile: Some(profile),
        };
        self.secure.send_discard(Method::POST, &["user"], &user).await
    }
}
