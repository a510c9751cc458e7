use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
#[error("invalid {key} value `{value}`: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    pub mail: MailConfig,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    /// Endpoint outgoing mail is posted to. `None` disables delivery.
    pub webhook: Option<Url>,
    pub to: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            addr: try_load(&lookup, "BANKSIDE_ADDR", "0.0.0.0:3000")?,
            static_dir: try_load(&lookup, "BANKSIDE_STATIC_DIR", "public")?,
            mail: MailConfig {
                webhook: try_load_optional(&lookup, "BANKSIDE_MAIL_WEBHOOK")?,
                to: try_load(&lookup, "BANKSIDE_MAIL_TO", "owner@localhost")?,
            },
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });
    parse(key, value)
}

fn try_load_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => parse(key, value).map(Some),
        None => {
            info!("{key} not set");
            Ok(None)
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError { key, value, reason: e.to_string() }
    })
}
