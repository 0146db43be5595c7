//! GitLab API client
//!
//! Provides a typed HTTP client for interacting with the GitLab REST API.
//! The client never retries: each call either succeeds or returns exactly
//! one [`GitLabError`], with the access token scrubbed from its text.

use crate::auth::BoxedAuthProvider;
use crate::config::GitLabConfig;
use crate::error::{GitLabError, GitLabResult};
use crate::gitlab::types::{ConnectionInfo, CurrentUser, VersionInfo};
use crate::response::PageHeaders;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// GitLab API client
pub struct GitLabClient {
    http: Client,
    base_url: String,
    auth: BoxedAuthProvider,
    timeout_secs: u64,
}

impl GitLabClient {
    /// Create a new GitLab client from configuration
    pub fn new(config: &GitLabConfig, auth: BoxedAuthProvider) -> GitLabResult<Self> {
        if !config.verify_ssl {
            warn!("TLS certificate verification is disabled");
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("gitlab-mcp-server/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitLabError::Connectivity {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.api_url(),
            auth,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build a URL for an API endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Add authentication to a request
    async fn authenticate(&self, request: RequestBuilder) -> GitLabResult<RequestBuilder> {
        let header = self
            .auth
            .get_auth_header()
            .await
            .map_err(|e| GitLabError::Authentication {
                details: e.to_string(),
            })?;

        let mut value =
            HeaderValue::from_str(header.header_value()).map_err(|_| GitLabError::Authentication {
                details: "access token contains characters not allowed in an HTTP header"
                    .to_string(),
            })?;
        value.set_sensitive(true);

        Ok(request.header(header.header_name(), value))
    }

    /// Send a request once and translate any failure
    async fn execute(&self, request: RequestBuilder, endpoint: &str) -> GitLabResult<Response> {
        let request = self.authenticate(request).await?;

        let response = request.send().await.map_err(|e| {
            let reason = describe_transport_error(e, self.timeout_secs);
            warn!(reason = %reason, "GitLab request failed");
            self.scrub(GitLabError::Connectivity { reason })
        })?;

        self.handle_response(response, endpoint).await
    }

    /// Handle API response
    async fn handle_response(&self, response: Response, endpoint: &str) -> GitLabResult<Response> {
        let status = response.status();
        debug!(status = status.as_u16(), "GitLab responded");

        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        // Extract error details from response body
        let body = response.text().await.unwrap_or_default();
        let resource = endpoint.split('?').next().unwrap_or(endpoint);

        let secret = self.auth.secret();
        Err(
            GitLabError::from_response(status.as_u16(), &body, resource, secret.expose_secret())
                .with_retry_after(retry_after),
        )
    }

    fn scrub(&self, error: GitLabError) -> GitLabError {
        error.redact(self.auth.secret().expose_secret())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GitLabResult<T> {
        response.json().await.map_err(|e| {
            GitLabError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Make a GET request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> GitLabResult<T> {
        let request = self.http.get(self.url(endpoint));
        let response = self.execute(request, endpoint).await?;
        Self::decode(response).await
    }

    /// Make a GET request for one page of a list endpoint
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_page(&self, endpoint: &str) -> GitLabResult<(Vec<Value>, PageHeaders)> {
        let request = self.http.get(self.url(endpoint));
        let response = self.execute(request, endpoint).await?;
        let headers = PageHeaders::from_headers(response.headers());

        match Self::decode::<Value>(response).await? {
            Value::Array(items) => Ok((items, headers)),
            other => Err(GitLabError::InvalidResponse(format!(
                "expected a JSON array from a list endpoint, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Make a GET request returning raw text (not JSON)
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get_text(&self, endpoint: &str) -> GitLabResult<String> {
        let request = self.http.get(self.url(endpoint));
        let response = self.execute(request, endpoint).await?;
        response.text().await.map_err(|e| {
            GitLabError::InvalidResponse(format!("Failed to read response text: {}", e))
        })
    }

    /// Make a POST request
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitLabResult<T> {
        let request = self.http.post(self.url(endpoint)).json(body);
        let response = self.execute(request, endpoint).await?;
        Self::decode(response).await
    }

    /// Make a POST request without a body (retry, cancel, approve, ...)
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> GitLabResult<T> {
        let request = self.http.post(self.url(endpoint));
        let response = self.execute(request, endpoint).await?;
        Self::decode(response).await
    }

    /// Make a PUT request
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitLabResult<T> {
        let request = self.http.put(self.url(endpoint)).json(body);
        let response = self.execute(request, endpoint).await?;
        Self::decode(response).await
    }

    /// Make a DELETE request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn delete(&self, endpoint: &str) -> GitLabResult<()> {
        let request = self.http.delete(self.url(endpoint));
        self.execute(request, endpoint).await?;
        Ok(())
    }

    /// Make a DELETE request with a body
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitLabResult<()> {
        let request = self.http.delete(self.url(endpoint)).json(body);
        self.execute(request, endpoint).await?;
        Ok(())
    }

    /// Check that the instance is reachable and the token works.
    ///
    /// Fetches the version, the token's user, and one project. A 403 on the
    /// project probe only limits what the token can do and is logged as a
    /// warning; any other failure is returned.
    pub async fn verify_connection(&self) -> GitLabResult<ConnectionInfo> {
        let version = match self.get::<VersionInfo>("/version").await {
            Ok(v) => Some(v.version),
            Err(e @ (GitLabError::Authentication { .. } | GitLabError::Connectivity { .. })) => {
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "Could not read GitLab version");
                None
            }
        };

        let user: CurrentUser = self.get("/user").await?;

        let can_list_projects = match self.get::<Value>("/projects?per_page=1").await {
            Ok(_) => true,
            Err(GitLabError::Permission { .. }) => {
                warn!("Token cannot list projects; some tools will be limited");
                false
            }
            Err(e) => return Err(e),
        };

        info!(
            version = version.as_deref().unwrap_or("unknown"),
            username = %user.username,
            can_list_projects,
            "Connected to GitLab"
        );

        Ok(ConnectionInfo {
            version,
            username: user.username,
            can_list_projects,
        })
    }
}

/// Describe a transport failure without the request URL
fn describe_transport_error(error: reqwest::Error, timeout_secs: u64) -> String {
    if error.is_timeout() {
        return format!("request timed out after {}s", timeout_secs);
    }

    let kind = if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    let error = error.without_url();
    let mut message = kind.to_string();
    let mut source: Option<&dyn std::error::Error> = Some(&error);
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
