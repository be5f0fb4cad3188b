use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tracing::debug;
use urweather_core::{Config, NoFocus, QueryController, provider_from_config};

use crate::render::render;

const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "urweather", version, about = "Current weather lookup")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure,

    /// Show current weather for a single location and exit.
    Show {
        /// Location name, e.g. "paris" or "new york".
        location: String,
    },

    /// Prompt for locations until `:q` or Esc (the default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { location } => show(&location).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn build_controller(config: &Config) -> anyhow::Result<QueryController> {
    let provider = provider_from_config(config)?;
    debug!(base_url = %config.base_url, startup = %config.startup_location, "controller ready");
    Ok(QueryController::from_config(config, Arc::new(provider), Arc::new(NoFocus)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    controller.submit(location).await;
    let state = controller.state();
    controller.teardown();

    match state.error_message.clone() {
        Some(message) => Err(anyhow!(message)),
        None => {
            println!("{}", render(&state));
            Ok(())
        }
    }
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let controller = build_controller(&config)?;

    controller.mount().await;
    println!("{}", render(&controller.state()));

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("Location:")
                .with_placeholder("Enter location")
                .with_help_message(":q or Esc to quit")
                .prompt()
        })
        .await
        .context("Prompt task panicked")?;

        let text = match answer {
            Ok(text) if text.trim() == QUIT => break,
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read location"),
        };

        controller.set_input(text);
        controller.submit_input().await;
        println!("{}", render(&controller.state()));
    }

    controller.teardown();
    debug!("interactive session ended");
    Ok(())
}
