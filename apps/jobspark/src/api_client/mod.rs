//! HTTP plumbing shared by every backend call.
//!
//! Two flavours exist: `HttpClient::public` for anonymous reads and
//! `HttpClient::secure`, which keeps a cookie store and an optional bearer token
//! issued by `POST /jwt`. Endpoint methods live in [`endpoints`].

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{ClientError, Result};

pub mod endpoints;

pub use endpoints::{ApiClient, JobSource, ProfileUpdater};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A reqwest client pinned to one base URL.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    bearer: Option<Arc<RwLock<Option<String>>>>,
}

impl HttpClient {
    /// Anonymous client: base URL only, no credentials.
    pub fn public(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
            bearer: None,
        })
    }

    /// Credentialed client: cookies set by the backend are replayed and a bearer
    /// token, once issued, is attached to every request.
    pub fn secure(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(ClientError::Network)?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
            bearer: Some(Arc::new(RwLock::new(None))),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_secure(&self) -> bool {
        self.bearer.is_some()
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Some(slot) = &self.bearer {
            match slot.write() {
                Ok(mut guard) => *guard = token,
                Err(poisoned) => *poisoned.into_inner() = token,
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.bearer
            .as_ref()
            .and_then(|slot| slot.read().ok().and_then(|t| t.clone()))
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config(format!("'{}' cannot be a base URL", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut url = self.url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let response = self.dispatch(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.url(segments)?;
        let response = self
            .dispatch(self.request(method, url).json(body))
            .await?;
        decode(response).await
    }

    /// Sends `body` and returns the raw response text, empty when the server
    /// answers with no body.
    pub async fn send_text<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<String> {
        let url = self.url(segments)?;
        let response = self
            .dispatch(self.request(method, url).json(body))
            .await?;
        Ok(response.text().await?)
    }

    /// Like `send_json` but ignores whatever the server answers with.
    pub async fn send_discard<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let url = self.url(segments)?;
        self.dispatch(self.request(method, url).json(body)).await?;
        Ok(())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);
        warn!("Backend returned {}: {}", status, message);
        Err(ClientError::from_status(status.as_u16(), message))
    }
}

/// Reads the body as text first so a malformed payload is a `Parse` error
/// rather than a transport failure.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

fn parse_base(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| ClientError::Config(format!("invalid API URL '{base_url}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "'{base_url}' cannot be a base URL"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_and_encodes_segments() {
        let client = HttpClient::public("http://api.test", Duration::from_secs(1)).unwrap();
        let url = client.url(&["user", "a b@example.com", "apply"]).unwrap();
        assert_eq!(url.as_str(), "http://api.test/user/a%20b@example.com/apply");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = HttpClient::public("http://api.test/v1/", Duration::from_secs(1)).unwrap();
        let url = client.url(&["jobs"]).unwrap();
        assert_eq!(url.as_str(), "http://api.test/v1/jobs");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = HttpClient::public("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_only_secure_client_holds_token() {
        let public = HttpClient::public("http://api.test", Duration::from_secs(1)).unwrap();
        public.set_token(Some("abc".to_string()));
        assert!(public.token().is_none());

        let secure = HttpClient::secure("http://api.test", Duration::from_secs(1)).unwrap();
        secure.set_token(Some("abc".to_string()));
        assert_eq!(secure.token().as_deref(), Some("abc"));
        assert!(secure.is_secure());
    }
}
