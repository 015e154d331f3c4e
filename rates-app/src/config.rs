//! Configuration loading from environment.

use std::env;

use rates_fixer::DEFAULT_BASE_URL;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub fixer_base_url: String,
    /// A key known to be on the free plan, pre-marked as restricted so it
    /// never attempts a base-currency request.
    pub fixer_free_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let fixer_base_url =
            env::var("FIXER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let fixer_free_key = env::var("FIXER_FREE_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            port,
            database_url,
            fixer_base_url,
            fixer_free_key,
        })
    }
}
