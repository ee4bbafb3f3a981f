// API client module: a small blocking client for the handful of GitHub
// REST endpoints the gist wrapper needs. Every network call in the crate
// goes through here.

use crate::error::{GistError, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("gist-wrapper/", env!("CARGO_PKG_VERSION"));

/// How a request identifies itself to GitHub.
#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Token(String),
    Basic { username: String, password: String },
}

/// Blocking GitHub client bound to one base URL and one set of credentials.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    base: Url,
    credentials: Credentials,
}

/// The current user as returned by `GET /user`. Only the login is used.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// Payload for `POST /gists`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NewGist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub public: bool,
    pub files: BTreeMap<String, GistFileContent>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GistFileContent {
    pub content: String,
}

impl NewGist {
    pub fn new(description: impl Into<String>, public: bool) -> Self {
        NewGist {
            description: Some(description.into()),
            public,
            files: BTreeMap::new(),
        }
    }

    /// Add (or replace) a file in the gist.
    pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(
            name.into(),
            GistFileContent {
                content: content.into(),
            },
        );
        self
    }
}

/// A gist as GitHub returns it. Fields the wrapper does not model are kept
/// in `extra` so nothing from the response is lost.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Only present on single-gist and creation responses.
    #[serde(default)]
    pub content: Option<String>,
}

/// Payload for `POST /authorizations`.
#[derive(Serialize, Debug)]
pub struct AuthorizationRequest {
    pub scopes: Vec<String>,
    pub note: String,
}

/// Response of `POST /authorizations`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Authorization {
    pub token: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GitHubClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| GistError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(GistError::InvalidUrl(base_url));
        }
        Ok(GitHubClient {
            client,
            base_url,
            base,
            credentials,
        })
    }

    pub fn with_token(base_url: &str, token: &str) -> Result<Self> {
        Self::new(base_url, Credentials::Token(token.to_string()))
    }

    pub fn anonymous(base_url: &str) -> Result<Self> {
        Self::new(base_url, Credentials::Anonymous)
    }

    pub fn with_password(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Self::new(
            base_url,
            Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match &self.credentials {
            Credentials::Anonymous => req,
            Credentials::Token(t) => {
                let val = HeaderValue::from_str(&format!("token {}", t))
                    .map_err(|_| GistError::InvalidToken)?;
                req.header(AUTHORIZATION, val)
            }
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
        })
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, segments: &[&str]) -> Result<Response> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);
        let res = self.authorize(self.client.get(url))?.send()?;
        check(res)
    }

    fn post<T: Serialize>(&self, segments: &[&str], body: &T) -> Result<Response> {
        let url = self.endpoint(segments);
        debug!("POST {}", url);
        let res = self.authorize(self.client.post(url))?.json(body).send()?;
        check(res)
    }

    /// Fetch the authenticated user. Fails with `Unauthorized` when the
    /// credentials are rejected and `InvalidToken` when they can't be sent.
    pub fn user(&self) -> Result<AuthenticatedUser> {
        Ok(self.get(&["user"])?.json()?)
    }

    /// Resolve the login name for the current credentials. Rejected or
    /// unsendable credentials yield `None` rather than an error; transport
    /// and other API failures still propagate.
    pub fn login(&self) -> Result<Option<String>> {
        match self.user() {
            Ok(user) => Ok(Some(user.login)),
            Err(GistError::Unauthorized) | Err(GistError::InvalidToken) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// True when GitHub accepts the credentials.
    pub fn verify(&self) -> Result<bool> {
        Ok(self.login()?.is_some())
    }

    /// Gists of the authenticated user.
    pub fn gists(&self) -> Result<Vec<Gist>> {
        Ok(self.get(&["gists"])?.json()?)
    }

    /// Public gists of `username`.
    pub fn user_gists(&self, username: &str) -> Result<Vec<Gist>> {
        Ok(self.get(&["users", username, "gists"])?.json()?)
    }

    pub fn create_gist(&self, gist: &NewGist) -> Result<Gist> {
        Ok(self.post(&["gists"], gist)?.json()?)
    }

    /// Create an OAuth authorization. Needs basic-auth credentials.
    pub fn create_authorization(&self, req: &AuthorizationRequest) -> Result<Authorization> {
        Ok(self.post(&["authorizations"], req)?.json()?)
    }
}

/// Turn non-success responses into typed errors, keeping the body text.
fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(GistError::Unauthorized);
    }
    let message = res.text().unwrap_or_else(|_| "".into());
    Err(GistError::Api { status, message })
}
