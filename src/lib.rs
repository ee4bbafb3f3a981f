// Library root
// -----------
// A small wrapper for creating and listing GitHub gists, plus the pieces
// the `gist-setup` binary uses to provision a token.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the GitHub endpoints we touch.
// - `config`: user options and their "missing" errors, environment
//   settings, and the token file.
// - `user`: the `User` facade (`create_gist`, `gists`).
// - `install`: dependency installation with a bounded wait.
// - `interrupt`: Ctrl-C handling that restores the terminal.
// - `ui`: the interactive setup wizard.
pub mod api;
pub mod config;
pub mod error;
pub mod install;
pub mod interrupt;
pub mod ui;
pub mod user;

pub use api::{Gist, GistFile, GitHubClient, NewGist};
pub use config::{Settings, UserConfig, UserOptions};
pub use error::{GistError, Result};
pub use user::User;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
