// UI layer: the interactive setup wizard built on `dialoguer` prompts and
// `indicatif` spinners. The flow is a single forward pass: banner, install,
// token check, then (if needed) one of the token choices.

use crate::api::{AuthorizationRequest, GitHubClient};
use crate::config::{self, Settings};
use crate::install::{self, Installer};
use crate::interrupt;
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::io;
use std::path::Path;
use std::time::Duration;

const TOKENS_URL: &str = "https://github.com/settings/tokens";

const BANNER: &str = r"
     ██████╗ ██╗███████╗████████╗
    ██╔════╝ ██║██╔════╝╚══██╔══╝
    ██║  ███╗██║███████╗   ██║
    ██║   ██║██║╚════██║   ██║
    ╚██████╔╝██║███████║   ██║
     ╚═════╝ ╚═╝╚══════╝   ╚═╝";

const RULE: &str = "-----------------------------------------------------------";

/// What the operator picked when no valid token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupChoice {
    ProvideToken,
    GenerateToken,
    Exit,
}

impl SetupChoice {
    pub const ALL: [SetupChoice; 3] = [
        SetupChoice::ProvideToken,
        SetupChoice::GenerateToken,
        SetupChoice::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SetupChoice::ProvideToken => "I have a token, set it for me",
            SetupChoice::GenerateToken => "Generate my token and set it for me",
            SetupChoice::Exit => "I will do it myself",
        }
    }
}

/// Questions the wizard puts to the operator after the stored-token check.
pub trait Prompts {
    /// Pick what to do about the missing token.
    fn choose(&mut self, token_file: &Path) -> Result<SetupChoice>;
    fn token(&mut self) -> Result<String>;
    /// Username and password for the login round trip.
    fn credentials(&mut self) -> Result<(String, String)>;
}

/// `Prompts` answered on the terminal.
pub struct TerminalPrompts;

impl Prompts for TerminalPrompts {
    fn choose(&mut self, token_file: &Path) -> Result<SetupChoice> {
        let file_line = format!("It needs to be set in the {} file", token_file.display());
        for line in [
            "To run tests you need to provide an auth token.",
            file_line.as_str(),
            "You can do this yourself",
            "here:",
            TOKENS_URL,
            "Or I can do it for you",
        ] {
            println!("{}", format!("{:^59}", line).black().on_magenta());
        }

        let items: Vec<&str> = SetupChoice::ALL.iter().map(|c| c.label()).collect();
        let selection = Select::new()
            .with_prompt("What would you like to do?".cyan().to_string())
            .items(&items)
            .default(0)
            .interact()?;
        Ok(SetupChoice::ALL[selection])
    }

    fn token(&mut self) -> Result<String> {
        let t: String = Input::new()
            .with_prompt("40 char Token for https://github.com")
            .interact_text()?;
        Ok(t.trim().to_string())
    }

    fn credentials(&mut self) -> Result<(String, String)> {
        let username: String = Input::new()
            .with_prompt("Username for https://github.com")
            .interact_text()?;
        let password: String = Password::new()
            .with_prompt(format!("Password for {}", username))
            .interact()?;
        Ok((username, password))
    }
}

/// How the token question was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    StoredTokenValid,
    /// A token was written to the token file.
    Written(String),
    LeftToOperator,
}

/// The setup wizard. Holds the resolved settings and the installer it runs.
pub struct Setup {
    settings: Settings,
    installer: Installer,
}

impl Setup {
    pub fn new(settings: Settings) -> Self {
        Setup {
            settings,
            installer: Installer::new(install::default_steps()),
        }
    }

    /// Run the whole wizard on the terminal. An interrupted prompt ends it
    /// cleanly with `Ok(())`.
    pub fn run(&self) -> Result<()> {
        match self.run_steps(&mut TerminalPrompts) {
            Err(e) if is_interrupt(&e) => {
                interrupt::announce();
                Ok(())
            }
            other => other,
        }
    }

    fn run_steps(&self, prompts: &mut dyn Prompts) -> Result<()> {
        self.title();
        self.install();
        self.provision(prompts)?;
        self.leave();
        Ok(())
    }

    /// Make sure a valid token is stored: keep a valid stored one, or ask
    /// the operator how to get one and write it to the token file.
    pub fn provision(&self, prompts: &mut dyn Prompts) -> Result<Provisioned> {
        if self.stored_token_valid()? {
            return Ok(Provisioned::StoredTokenValid);
        }
        match prompts.choose(&self.settings.token_file)? {
            SetupChoice::ProvideToken => {
                let token = ask_until_valid(|| prompts.token(), |t| self.test_token(t))?;
                self.set_gist_token(&token)?;
                Ok(Provisioned::Written(token))
            }
            SetupChoice::GenerateToken => {
                let token = self.prompt_generate(prompts)?;
                Ok(Provisioned::Written(token))
            }
            SetupChoice::Exit => Ok(Provisioned::LeftToOperator),
        }
    }

    fn title(&self) {
        println!("{}", RULE);
        println!("{} wrapper", BANNER.cyan());
        println!("Version ({})", crate::VERSION);
        println!("{}", RULE);
    }

    fn install(&self) {
        self.installer.run(|step, run| {
            let pb = spinner(&step.label);
            let outcome = run();
            pb.finish_and_clear();
            outcome
        });
    }

    /// An unreadable token file counts as "no valid token" so the operator
    /// still gets offered a way to set one.
    fn stored_token_valid(&self) -> Result<bool> {
        match self.settings.stored_token() {
            Ok(Some(token)) => self.test_token(&token),
            Ok(None) => Ok(false),
            Err(e) => {
                warn!(
                    "ignoring unreadable token file {}: {}",
                    self.settings.token_file.display(),
                    e
                );
                Ok(false)
            }
        }
    }

    fn prompt_generate(&self, prompts: &mut dyn Prompts) -> Result<String> {
        let client = loop {
            let (username, password) = prompts.credentials()?;
            if let Some(client) = self.login(&username, &password)? {
                println!("login successful");
                break client;
            }
            println!("Invalid username or password");
            println!("Please try again");
        };
        let token = self.generate_token(&client)?;
        println!(
            "{}{}",
            "Your token:".black().on_blue(),
            token.as_str().black().on_green().bold()
        );
        self.set_gist_token(&token)?;
        Ok(token)
    }

    fn leave(&self) {
        println!("{}", "setup successful".green());
        println!("{}", "DONE!".green().bold());
    }

    /// `None` when GitHub rejects the username/password.
    fn login(&self, username: &str, password: &str) -> Result<Option<GitHubClient>> {
        let pb = spinner("Signing in...");
        let client = GitHubClient::with_password(&self.settings.api_url, username, password)?;
        let ok = client.verify();
        pb.finish_and_clear();
        Ok(if ok? { Some(client) } else { None })
    }

    /// Create an authorization scoped to `gist` and return its token.
    fn generate_token(&self, client: &GitHubClient) -> Result<String> {
        let pb = spinner("Generating token...");
        let req = AuthorizationRequest {
            scopes: vec!["gist".into()],
            note: format!(
                "Gist Token made at {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z")
            ),
        };
        let auth = client.create_authorization(&req);
        pb.finish_and_clear();
        Ok(auth.context("Failed to generate token")?.token)
    }

    fn set_gist_token(&self, token: &str) -> Result<()> {
        let path = &self.settings.token_file;
        config::write_token(path, token)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Your token has been written to {}", path.display());
        Ok(())
    }

    fn test_token(&self, token: &str) -> Result<bool> {
        let pb = spinner("Checking token...");
        let valid = GitHubClient::with_token(&self.settings.api_url, token)
            .and_then(|client| client.verify());
        pb.finish_and_clear();
        Ok(valid?)
    }
}

/// Keep asking until `validate` accepts an answer. Errors from either
/// closure (including an interrupted prompt) end the loop.
pub fn ask_until_valid<A, V>(mut ask: A, mut validate: V) -> Result<String>
where
    A: FnMut() -> Result<String>,
    V: FnMut(&str) -> Result<bool>,
{
    loop {
        let answer = ask()?;
        if validate(&answer)? {
            return Ok(answer);
        }
        println!("The token you provided is not valid. Please try again");
    }
}

/// True when the error chain holds an interrupted prompt read.
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::Interrupted)
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("[{spinner}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
