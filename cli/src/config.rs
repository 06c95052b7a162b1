//! Connection settings from flags and `MONIBOT_*` environment variables.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use monibot_core::transport::DEFAULT_BASE_URL;
use monibot_core::HttpSenderConfig;

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Monibot service URL
    #[arg(long, env = "MONIBOT_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub url: String,

    /// API key, found on the Monibot profile page
    #[arg(long, env = "MONIBOT_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "MONIBOT_TIMEOUT", default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Attempts per request before giving up
    #[arg(long, env = "MONIBOT_TRIES", default_value_t = 12, global = true)]
    pub tries: u32,

    /// Seconds to wait between attempts
    #[arg(long, env = "MONIBOT_DELAY", default_value_t = 5, global = true)]
    pub delay: u64,
}

impl ConnectionArgs {
    pub fn sender_config(&self) -> Result<HttpSenderConfig> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .context("no API key: pass --api-key or set MONIBOT_API_KEY")?;
        Ok(HttpSenderConfig {
            base_url: self.url.clone(),
            timeout: Duration::from_secs(self.timeout),
            tries: self.tries,
            delay: Duration::from_secs(self.delay),
            ..HttpSenderConfig::new(api_key)
        })
    }

    /// Human readable settings with the API key masked.
    pub fn describe(&self) -> String {
        let api_key = match self.api_key.as_deref() {
            None | Some("") => "(not set)".to_string(),
            Some(key) if key.chars().count() <= 4 => "****".to_string(),
            Some(key) => format!("{}****", key.chars().take(4).collect::<String>()),
        };
        format!(
            "url      {}\napiKey   {}\ntimeout  {}s\ntries    {}\ndelay    {}s",
            self.url, api_key, self.timeout, self.tries, self.delay
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_key: Option<&str>) -> ConnectionArgs {
        ConnectionArgs {
            url: "http://localhost:3000".to_string(),
            api_key: api_key.map(str::to_string),
            timeout: 3,
            tries: 2,
            delay: 1,
        }
    }

    #[test]
    fn sender_config_carries_settings() {
        let config = args(Some("secret-key")).sender_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_key, "secret-key");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.tries, 2);
        assert_eq!(config.delay, Duration::from_secs(1));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        assert!(args(None).sender_config().is_err());
        assert!(args(Some("")).sender_config().is_err());
    }

    #[test]
    fn describe_masks_api_key() {
        let text = args(Some("abcdefgh")).describe();
        assert!(text.contains("abcd****"));
        assert!(!text.contains("efgh"));
        assert!(args(None).describe().contains("(not set)"));
    }
}
