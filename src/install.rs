// Dependency installation for the setup flow. Commands run one after the
// other against a shared deadline; their output goes to a log file and
// failures are logged, never raised.

use log::{info, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_LOG_FILE: &str = "setup.log";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One step of the installation, shown next to its spinner.
#[derive(Debug, Clone)]
pub struct InstallStep {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

impl InstallStep {
    pub fn new(label: &str, program: &str, args: &[&str]) -> Self {
        InstallStep {
            label: label.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `cargo fetch` then `cargo update`.
pub fn default_steps() -> Vec<InstallStep> {
    vec![
        InstallStep::new("Installing dependencies", "cargo", &["fetch"]),
        InstallStep::new("Updating dependencies", "cargo", &["update"]),
    ]
}

#[derive(Debug)]
pub enum StepOutcome {
    Succeeded,
    Failed(ExitStatus),
    SpawnFailed(io::Error),
    TimedOut,
    /// Not run because an earlier step used up the deadline.
    Skipped,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

pub struct Installer {
    steps: Vec<InstallStep>,
    timeout: Duration,
    log_path: PathBuf,
}

impl Installer {
    pub fn new(steps: Vec<InstallStep>) -> Self {
        Installer {
            steps,
            timeout: INSTALL_TIMEOUT,
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn steps(&self) -> &[InstallStep] {
        &self.steps
    }

    /// Run every step. `around` wraps each step (the UI puts a spinner
    /// there) and receives the step plus a closure that actually runs it.
    pub fn run<F>(&self, mut around: F) -> Vec<StepOutcome>
    where
        F: FnMut(&InstallStep, &mut dyn FnMut() -> StepOutcome) -> StepOutcome,
    {
        let deadline = Instant::now() + self.timeout;
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if Instant::now() >= deadline {
                warn!("skipping `{}`: install deadline reached", step.command_line());
                outcomes.push(StepOutcome::Skipped);
                continue;
            }
            let outcome = around(step, &mut || run_step(step, deadline, &self.log_path));
            match &outcome {
                StepOutcome::Succeeded => info!("`{}` finished", step.command_line()),
                StepOutcome::Failed(status) => {
                    warn!("`{}` failed with {}", step.command_line(), status)
                }
                StepOutcome::SpawnFailed(e) => {
                    warn!("could not start `{}`: {}", step.command_line(), e)
                }
                StepOutcome::TimedOut => warn!("`{}` timed out", step.command_line()),
                StepOutcome::Skipped => {}
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn run_step(step: &InstallStep, deadline: Instant, log_path: &Path) -> StepOutcome {
    let mut log = match open_log(log_path) {
        Ok(f) => f,
        Err(e) => return StepOutcome::SpawnFailed(e),
    };
    let _ = writeln!(log, "$ {}", step.command_line());

    let stdout = match log.try_clone() {
        Ok(f) => f,
        Err(e) => return StepOutcome::SpawnFailed(e),
    };
    let stderr = match log.try_clone() {
        Ok(f) => f,
        Err(e) => return StepOutcome::SpawnFailed(e),
    };

    let child = Command::new(&step.program)
        .args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn();
    let outcome = match child {
        Ok(child) => wait_until(child, deadline),
        Err(e) => StepOutcome::SpawnFailed(e),
    };
    let _ = writeln!(log, "=> {:?}", outcome);
    outcome
}

fn wait_until(mut child: Child, deadline: Instant) -> StepOutcome {
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return StepOutcome::Succeeded,
            Ok(Some(status)) => return StepOutcome::Failed(status),
            Ok(None) => {}
            Err(e) => return StepOutcome::SpawnFailed(e),
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return StepOutcome::TimedOut;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
