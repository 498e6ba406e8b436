use super::{ApiError, ClientConfig, Credentials, ErrorMode, UserProfile, UserSession};
use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

/// The endpoint issuing access tokens for a username and password.
const TOKEN_ENDPOINT: &str = "token/";

/// The endpoint describing whoever owns the presented access token.
const CURRENT_USER_ENDPOINT: &str = "me/";

/// A stateless client for the API.
///
/// It holds no tokens of its own: every authenticated call takes its access
/// token as an argument, and whatever `login` returns belongs to the caller.
/// Clones share the underlying connection pool and nothing else.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    error_mode: ErrorMode,
}

impl ApiClient {
    /// Creates a new API client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Same as `new`, but reuses an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            error_mode: config.error_mode,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Exchanges a username and password for a session.
    ///
    /// Nothing is validated locally; that's the server's job.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserSession, ApiError> {
        let url = self.endpoint(TOKEN_ENDPOINT)?;
        tracing::debug!(%url, "POST token request");

        let result = self.http.post(url).json(credentials).send().await;
        self.parse_response(result).await
    }

    /// Fetches the profile of the user owning `access_token`.
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(CURRENT_USER_ENDPOINT)?;
        tracing::debug!(%url, "GET current user");

        // `bearer_auth` produces exactly `Authorization: Bearer <token>`.
        let result = self.http.get(url).bearer_auth(access_token).send().await;
        self.parse_response(result).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|error| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: error.to_string(),
            })
    }

    /// Turns a raw send result into our parsed body, honoring the error mode.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        result: Result<Response, reqwest::Error>,
    ) -> Result<T, ApiError> {
        match self.error_mode {
            ErrorMode::Passthrough => {
                let response = result
                    .and_then(|response| {
                        if !response.status().is_success() {
                            tracing::warn!(status = %response.status(), url = %response.url(), "request failed");
                        }
                        response.error_for_status()
                    })
                    .map_err(ApiError::Http)?;
                response.json().await.map_err(ApiError::Http)
            }
            ErrorMode::Classified => {
                let response = result.map_err(ApiError::Network)?;

                let status = response.status();
                if !status.is_success() {
                    tracing::warn!(%status, url = %response.url(), "request failed");
                    let body = response.text().await.unwrap_or_else(|error| {
                        tracing::debug!(%error, "unable to read error body");
                        "<failed to read error body>".to_string()
                    });
                    return Err(ApiError::from_status(status, body));
                }

                response.json().await.map_err(ApiError::Decode)
            }
        }
    }
}

/// Parses a base URL, ensuring it ends in `/` so joins keep any path prefix.
///
/// Queries and fragments are refused, as endpoint joins would drop them.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|error| invalid(error.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base URL must not carry a query or fragment".to_string()));
    }

    // Without a trailing slash, `join` would replace the last path segment.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
