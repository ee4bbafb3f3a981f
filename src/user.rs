// The `User` facade: a narrow gist interface over `GitHubClient`.

use crate::api::{Gist, GitHubClient, NewGist};
use crate::config::{Settings, UserConfig, UserOptions};
use crate::error::Result;
use log::debug;

/// A GitHub user as seen by the gist wrapper.
///
/// Holding a token means the user is authenticated right away; otherwise
/// authentication happens on the first call that needs it. The
/// authenticated flag is never re-checked against GitHub, so a revoked
/// token keeps reporting `authenticated() == true` until a call fails.
///
/// ```no_run
/// use gist_wrapper::{NewGist, User, UserOptions};
///
/// let mut user = User::new(UserOptions {
///     username: None,
///     token: Some("ghp_...".into()),
/// })?;
/// let gist = user.create_gist(
///     &NewGist::new("the description for this gist", true)
///         .file("file1.txt", "String file contents"),
/// )?;
/// println!("{}", gist.id);
/// # Ok::<(), gist_wrapper::GistError>(())
/// ```
pub struct User {
    options: UserConfig,
    api_url: String,
    client: Option<GitHubClient>,
    logged_in: bool,
    login: Option<String>,
}

impl User {
    pub fn new(options: UserOptions) -> Result<Self> {
        Self::with_api_url(options, crate::api::DEFAULT_API_URL)
    }

    /// Like `new`, against another API root (GitHub Enterprise, tests).
    pub fn with_api_url(options: UserOptions, api_url: &str) -> Result<Self> {
        let mut user = User {
            options: UserConfig::new(options),
            api_url: api_url.to_string(),
            client: None,
            logged_in: false,
            login: None,
        };
        if user.options.has_token() {
            user.authenticate()?;
        }
        Ok(user)
    }

    /// Build a user from the stored token (`GIST_TOKEN`, then the token file).
    pub fn from_settings(settings: &Settings, username: Option<String>) -> Result<Self> {
        let options = UserOptions {
            username,
            token: settings.stored_token()?,
        };
        Self::with_api_url(options, &settings.api_url)
    }

    pub fn options(&self) -> &UserConfig {
        &self.options
    }

    pub fn authenticated(&self) -> bool {
        self.logged_in
    }

    /// Login name resolved during authentication, if GitHub accepted the token.
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Create a gist, authenticating first if needed. The gist GitHub
    /// returns is handed back as-is.
    pub fn create_gist(&mut self, gist: &NewGist) -> Result<Gist> {
        if !self.authenticated() {
            self.authenticate()?;
        }
        self.client()?.create_gist(gist)
    }

    /// Your gists when authenticated, otherwise the public gists of the
    /// configured username.
    pub fn gists(&mut self) -> Result<Vec<Gist>> {
        if self.authenticated() {
            return self.client()?.gists();
        }
        let username = self.options.username()?;
        debug!("listing gists of {} without authentication", username);
        GitHubClient::anonymous(&self.api_url)?.user_gists(username)
    }

    fn client(&mut self) -> Result<&GitHubClient> {
        let client = match self.client.take() {
            Some(client) => client,
            None => GitHubClient::with_token(&self.api_url, self.options.token()?)?,
        };
        Ok(self.client.insert(client))
    }

    fn authenticate(&mut self) -> Result<()> {
        self.login = self.client()?.login()?;
        self.logged_in = true;
        debug!("authenticated as {:?}", self.login);
        Ok(())
    }
}
