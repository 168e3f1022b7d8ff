use crate::photo::ResizeConfig;
use crate::reminder::Permission;
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

const MAX_REMINDER_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {name}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub storage_quota: Option<usize>,
    pub resize: ResizeConfig,
    pub upload_limit: usize,
    pub reminder_hour: u32,
    pub reminder_interval: Duration,
    /// `None` lets the notifier decide.
    pub notifications: Option<Permission>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/journal.json"),
            storage_quota: None,
            resize: ResizeConfig::default(),
            upload_limit: 20 * 1024 * 1024,
            reminder_hour: 20,
            reminder_interval: Duration::from_secs(3600),
            notifications: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let quality: u8 = parse_or(&lookup, "APP_JPEG_QUALITY", defaults.resize.quality)?;
        if !(1..=100).contains(&quality) {
            return Err(invalid("APP_JPEG_QUALITY", quality, "must be between 1 and 100"));
        }
        let max_width: u32 = parse_or(&lookup, "APP_MAX_WIDTH", defaults.resize.max_width)?;
        if max_width == 0 {
            return Err(invalid("APP_MAX_WIDTH", max_width, "must be positive"));
        }
        let reminder_hour: u32 = parse_or(&lookup, "APP_REMINDER_HOUR", defaults.reminder_hour)?;
        if reminder_hour > 23 {
            return Err(invalid("APP_REMINDER_HOUR", reminder_hour, "must be 0-23"));
        }
        let interval_secs: u64 = parse_or(
            &lookup,
            "APP_REMINDER_INTERVAL_SECS",
            defaults.reminder_interval.as_secs(),
        )?;
        if !(1..=MAX_REMINDER_INTERVAL_SECS).contains(&interval_secs) {
            return Err(invalid(
                "APP_REMINDER_INTERVAL_SECS",
                interval_secs,
                format!("must be between 1 and {MAX_REMINDER_INTERVAL_SECS}"),
            ));
        }

        let notifications = match lookup("APP_NOTIFICATIONS").as_deref().map(str::trim) {
            None | Some("") => None,
            Some("granted") => Some(Permission::Granted),
            Some("denied") => Some(Permission::Denied),
            Some(other) => {
                return Err(invalid("APP_NOTIFICATIONS", other, "expected granted or denied"));
            }
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            data_path: resolve_data_path(&lookup),
            storage_quota: parse_optional(&lookup, "APP_STORAGE_QUOTA_BYTES")?,
            resize: ResizeConfig {
                max_width,
                quality,
                allow_upscale: parse_or(
                    &lookup,
                    "APP_ALLOW_UPSCALE",
                    defaults.resize.allow_upscale,
                )?,
            },
            upload_limit: parse_or(&lookup, "APP_UPLOAD_LIMIT_BYTES", defaults.upload_limit)?,
            reminder_hour,
            reminder_interval: Duration::from_secs(interval_secs),
            notifications,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn resolve_data_path(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = lookup("APP_DATA_PATH").filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }

    Config::default().data_path
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| invalid(name, &raw, err)),
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(lookup, name)?.unwrap_or(default))
}

fn invalid(name: &'static str, value: impl ToString, reason: impl ToString) -> ConfigError {
    ConfigError {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
