// Entrypoint for the setup wizard.
// - Keeps `main` small: resolve settings from the environment and hand
//   them to the wizard.
// - Logging goes through `env_logger`; `RUST_LOG` overrides the default.

use gist_wrapper::{ui::Setup, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RUST_LOG", "warn")).init();

    // Ctrl-C outside raw-mode prompts (password, spinners) restores the
    // terminal and exits 0.
    gist_wrapper::interrupt::install_handler()?;

    let settings = Settings::from_env();
    log::debug!(
        "api: {}, token file: {}",
        settings.api_url,
        settings.token_file.display()
    );

    // Blocks until the wizard finishes or the operator presses Ctrl-C.
    Setup::new(settings).run()?;
    Ok(())
}
