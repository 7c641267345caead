//! Credential loading: CLI flag → env var → .env in the manifest dir → secure prompt (terminal only).

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::io::IsTerminal;
use std::path::Path;

use crate::utils::config::PackagePaths;

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn try_env_then_dotenv(key: &str, dir: &Path) -> Option<String> {
    if let Some(s) = non_empty_env(key) {
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        return non_empty_env(key);
    }
    None
}

/// User name: `given` → `SUBLOADER_USER` → `.env` in `dir`. Never prompts.
pub fn get_user(given: Option<String>, dir: &Path) -> Option<String> {
    given.or_else(|| try_env_then_dotenv(PackagePaths::get().user_env(), dir))
}

/// Password: `given` → `SUBLOADER_PASSWORD` → `.env` in `dir` → prompt when stdin is a terminal.
/// `Ok(None)` when nothing was found and no prompt was possible; the caller reports it as a config error.
pub fn get_password(
    given: Option<String>,
    dir: &Path,
    user: Option<&str>,
) -> Result<Option<String>> {
    if given.is_some() {
        return Ok(given);
    }
    if let Some(s) = try_env_then_dotenv(PackagePaths::get().password_env(), dir) {
        info!("Password found in environment");
        return Ok(Some(s));
    }
    let Some(user) = user else {
        return Ok(None);
    };
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let label = format!("[{}]", env!("CARGO_PKG_NAME")).cyan().bold();
    let pass = rpassword::prompt_password(format!("{} Password for {}: ", label, user))
        .context("read password")?;
    let pass = pass.trim().to_string();
    Ok((!pass.is_empty()).then_some(pass))
}
