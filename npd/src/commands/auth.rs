use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::Write;

use npd_api::{AuthState, Client};

fn account(client: &Client) -> Result<String> {
    client
        .config()
        .default_inn
        .clone()
        .context("no account: pass --inn or set client.default_inn")
}

fn prompt_password() -> Result<SecretString> {
    print!("Password: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(SecretString::from(input.trim_end().to_string()))
}

pub async fn login(client: &Client, password: Option<String>) -> Result<()> {
    let inn = account(client)?;
    let password = match password {
        Some(password) => SecretString::from(password),
        None => prompt_password()?,
    };

    let profile = client.login(&inn, &password).await?;

    println!(
        "✓ Logged in as {} ({})",
        profile.display_name.as_deref().unwrap_or("-"),
        profile.inn
    );
    Ok(())
}

pub async fn status(client: &Client) -> Result<()> {
    let inn = account(client)?;
    let tokens = client.tokens(Some(&inn))?;
    let tokens = tokens.lock().await;

    let state = AuthState::assess(&tokens);
    println!("Account: {}", inn);
    match state {
        AuthState::TokenLive => println!("Access token: valid"),
        AuthState::NeedsRefresh => println!("Access token: expired, will be refreshed on next call"),
        AuthState::NeedsLogin => println!("Access token: missing, run `npd login`"),
    }
    if let Some(expires_at) = tokens.access().and_then(|access| access.expires_at()) {
        println!("Expires at: {}", expires_at.with_timezone(&chrono::Local));
    }
    Ok(())
}

pub async fn refresh(client: &Client) -> Result<()> {
    client.refresh(None).await?;
    println!("✓ Token refreshed successfully");
    Ok(())
}
