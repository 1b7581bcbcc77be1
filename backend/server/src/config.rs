use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use anyhow::{Context, Error, anyhow};
use tracing::{info, warn};

pub const DEV_PASSWORD: &str = "devpassword";

pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub public_dir: PathBuf,
    pub default_title: String,
    pub trust_proxy: bool,
    pub admin_password: String,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Ok(Self {
            port: try_load("RUST_PORT", "3000")?,
            db_path: try_load("ARENA_DB_FILE", "./db.json")?,
            public_dir: try_load("ARENA_PUBLIC_DIR", "public")?,
            default_title: try_load("ARENA_TITLE", "Head-to-Head")?,
            trust_proxy: try_load("ARENA_TRUST_PROXY", "true")?,
            admin_password: admin_password(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: PathBuf::from("./db.json"),
            public_dir: PathBuf::from("public"),
            default_title: "Head-to-Head".to_string(),
            trust_proxy: true,
            admin_password: DEV_PASSWORD.to_string(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    parse_or_default(key, var(key), default)
}

fn parse_or_default<T: FromStr>(key: &str, value: Option<String>, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    value
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("Invalid {key} value: {e}")
        })
        .context("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
}

fn admin_password() -> String {
    read_secret("ADMIN_PASSWORD")
        .or_else(|| var("ADMIN_PASSWORD"))
        .unwrap_or_else(|| {
            warn!("ADMIN_PASSWORD not found, using development password");
            DEV_PASSWORD.to_string()
        })
}
