//! The account commands: login, register, logout, whoami.

use std::path::Path;

use anyhow::Result;

use leveltest_api::config::load_config_from;
use leveltest_auth::context::{Credentials, Registration};
use leveltest_core::model::Role;

use super::build_auth;

pub async fn login(config_path: Option<&Path>, username: String, password: String) -> Result<()> {
    let config = load_config_from(config_path)?;
    let auth = build_auth(&config)?;

    let identity = auth.login(&Credentials { username, password }).await?;
    println!("Logged in as {} ({})", identity.username, identity.role);
    Ok(())
}

pub async fn register(
    config_path: Option<&Path>,
    username: String,
    email: String,
    password: String,
    role: String,
) -> Result<()> {
    let role: Role = role
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e} (expected student or teacher)"))?;
    let config = load_config_from(config_path)?;
    let auth = build_auth(&config)?;

    let identity = auth
        .register(&Registration {
            username,
            email,
            password,
            role,
        })
        .await?;
    println!("Registered and logged in as {} ({})", identity.username, identity.role);
    Ok(())
}

pub fn logout(config_path: Option<&Path>) -> Result<()> {
    let config = load_config_from(config_path)?;
    let auth = build_auth(&config)?;

    auth.logout();
    println!("Logged out.");
    Ok(())
}

pub fn whoami(config_path: Option<&Path>) -> Result<()> {
    let config = load_config_from(config_path)?;
    let auth = build_auth(&config)?;

    match auth.restore()? {
        Some(identity) => println!("Logged in as {} ({})", identity.username, identity.role),
        None => println!("Not logged in."),
    }
    Ok(())
}
