// Ctrl-C handling for the setup wizard. Raw-mode prompts report Ctrl-C as
// an `Interrupted` read; everything else (the password prompt, spinners,
// network calls, install commands) gets SIGINT, handled here.

use std::io;

pub const MESSAGE: &str = "You pressed ctrl-c";

/// Terminal attributes captured before any prompt touches them.
#[derive(Clone, Copy)]
pub struct TerminalState {
    #[cfg(unix)]
    termios: Option<libc::termios>,
}

impl TerminalState {
    /// Snapshot stdin's terminal attributes. Not a terminal: nothing to save.
    #[cfg(unix)]
    pub fn capture() -> Self {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: `termios` is a valid out-pointer for the duration of the call.
        let ok = unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut termios) } == 0;
        TerminalState {
            termios: ok.then_some(termios),
        }
    }

    #[cfg(not(unix))]
    pub fn capture() -> Self {
        TerminalState {}
    }

    #[cfg(unix)]
    pub fn is_saved(&self) -> bool {
        self.termios.is_some()
    }

    #[cfg(not(unix))]
    pub fn is_saved(&self) -> bool {
        false
    }

    /// Put the saved attributes back (echo, canonical mode).
    pub fn restore(&self) {
        self.restore_termios();
        let _ = crossterm::terminal::disable_raw_mode();
    }

    #[cfg(unix)]
    fn restore_termios(&self) {
        if let Some(termios) = &self.termios {
            // SAFETY: `termios` came from a successful `tcgetattr` on the same fd.
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios);
            }
        }
    }

    #[cfg(not(unix))]
    fn restore_termios(&self) {}
}

/// Show the cursor again and tell the operator what happened.
pub fn announce() {
    // Select/Password and the spinners may hide the cursor.
    let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
    println!();
    println!("{}", MESSAGE);
}

/// Install a process-wide SIGINT handler: restore the terminal captured
/// now, announce the interrupt and exit with status 0.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    let state = TerminalState::capture();
    log::debug!("terminal state saved: {}", state.is_saved());
    ctrlc::set_handler(move || {
        state.restore();
        announce();
        std::process::exit(0);
    })
}
