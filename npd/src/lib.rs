pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;

use anyhow::Result;
use std::sync::Arc;

use npd_api::{Client, FileTokenStore};

use crate::cli::{Cli, Command};
use crate::settings::Settings;

/// Build the API client from settings, with tokens persisted on disk.
pub fn build_client(settings: &Settings, inn: Option<&str>) -> Result<Client> {
    let token_store = match &settings.token_file {
        Some(path) => FileTokenStore::with_path(path),
        None => FileTokenStore::new()?,
    };
    tracing::debug!(path = %token_store.path().display(), "Using token file");

    let mut config = settings.client.clone();
    if let Some(inn) = inn {
        config = config.with_default_inn(inn);
    }

    Ok(Client::with_token_store(config, Arc::new(token_store))?)
}

pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let client = build_client(&settings, cli.inn.as_deref())?;

    match cli.command {
        Command::Login { password } => commands::auth::login(&client, password).await,
        Command::Status => commands::auth::status(&client).await,
        Command::Refresh => commands::auth::refresh(&client).await,
        Command::Income(command) => commands::income::run(&client, command).await,
        Command::Invoice(command) => commands::invoice::run(&client, command).await,
        Command::PaymentOptions => commands::invoice::payment_options(&client).await,
    }
}
