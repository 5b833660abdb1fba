//! Startup configuration read from the process environment.
//!
//! | Variable     | Required | Meaning                                      |
//! |--------------|----------|----------------------------------------------|
//! | `TODOS_FILE` | yes      | path of the JSON file holding the todo list  |
//! | `PORT`       | yes      | listen port, `8080` or `:8080`               |
//! | `HOST`       | no       | listen IP address, defaults to `0.0.0.0`     |
//!
//! A `.env` file in the working directory is honored when the binary calls
//! [`Config::load_with_dotenv`].

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use figment::{providers::Env, Figment};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A required variable is unset or empty.
    #[error("required configuration value {key} is not set")]
    Missing { key: &'static str },

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub todos_file: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    todos_file: Option<EnvValue>,
    port: Option<EnvValue>,
    host: Option<EnvValue>,
}

/// Raw env values are parsed, so `2025` arrives as a number and `true` as a
/// bool. Every key here is read back as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnvValue {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::Signed(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Trimmed text of a value, `None` when unset or blank.
fn text_of(value: Option<EnvValue>) -> Option<String> {
    value
        .map(|value| value.to_string().trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Loads `.env` from the working directory first, if there is one.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) => debug!(%err, "no .env loaded"),
        }
        Self::load()
    }

    pub fn figment() -> Figment {
        Figment::new().merge(Env::raw().only(&["todos_file", "port", "host"]))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let raw: RawConfig = figment.extract()?;

        let todos_file = text_of(raw.todos_file)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing { key: "TODOS_FILE" })?;

        let port = text_of(raw.port)
            .ok_or(ConfigError::Missing { key: "PORT" })
            .and_then(|text| parse_port(&text))?;

        let host = match text_of(raw.host) {
            None => DEFAULT_HOST,
            Some(text) => parse_host(&text)?,
        };

        Ok(Self {
            todos_file,
            host,
            port,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_port(text: &str) -> Result<u16, ConfigError> {
    let digits = text.strip_prefix(':').unwrap_or(text);
    digits.parse().map_err(|_| ConfigError::InvalidValue {
        key: "PORT",
        reason: format!("{text:?} is not a port number between 0 and 65535"),
    })
}

fn parse_host(text: &str) -> Result<IpAddr, ConfigError> {
    let bare = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(text);
    bare.parse().map_err(|_| ConfigError::InvalidValue {
        key: "HOST",
        reason: format!("{text:?} is not an IP address"),
    })
}
