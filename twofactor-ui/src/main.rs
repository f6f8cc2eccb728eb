use std::{error::Error, process::ExitCode};

use tracing::info;
use tracing_subscriber::EnvFilter;
use twofactor_common::client::CodeResolver;
use twofactor_ui::{
    config::{APP_ID, PROFILE, VERSION},
    gui::{self, prompt::CodeEntryPrompt, terminal::TerminalShell},
};

const USAGE: &str = "usage: twofactor-prompt [METHOD] [ATTEMPTS]";

fn main() -> ExitCode {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let method = args.next().unwrap_or_else(|| "email".to_string());
    let attempts = match args.next().map(|a| a.parse::<u32>()).transpose() {
        Ok(attempts) => attempts.unwrap_or(3),
        Err(err) => {
            eprintln!("Invalid attempt count: {err}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&method, attempts) {
        Ok(Some(code)) => {
            println!("{code}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            info!("Code entry cancelled");
            ExitCode::from(1)
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(3)
        }
    }
}

fn run(method: &str, attempts: u32) -> Result<Option<String>, Box<dyn Error>> {
    info!("Code prompt ({})", APP_ID);
    info!("Version: {} ({})", VERSION, PROFILE);
    if let Err(err) = gui::init_i18n() {
        tracing::warn!("Failed to set up translations: {err}");
    }

    let (ui, ui_thread) = gui::start_ui_thread()?;
    let resolver = CodeEntryPrompt::new(TerminalShell::new(ui.clone()), ui.clone());
    let code = async_std::task::block_on(resolver.code(method, attempts).wait());
    resolver.dismiss();

    ui.close();
    if ui_thread.join().is_err() {
        return Err("UI thread panicked".into());
    }
    Ok(code)
}
