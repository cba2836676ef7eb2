use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::preview::fetcher::FETCH_TIMEOUT;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub static_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub block_private_addresses: bool,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let server_port = match env::var("PORT") {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                expected: "a port number",
                value,
            })?,
            Err(_) => 3001,
        };

        let fetch_timeout = match env::var("FETCH_TIMEOUT_MS") {
            Ok(value) => value
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    var: "FETCH_TIMEOUT_MS",
                    expected: "a number of milliseconds",
                    value,
                })?,
            Err(_) => FETCH_TIMEOUT,
        };

        let block_private_addresses = match env::var("BLOCK_PRIVATE_ADDRESSES") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                var: "BLOCK_PRIVATE_ADDRESSES",
                expected: "true or false",
                value,
            })?,
            Err(_) => false,
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "dist".to_string())
                .into(),
            fetch_timeout,
            block_private_addresses,
            is_production: env::var("APP_ENV").as_deref() == Ok("production"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
