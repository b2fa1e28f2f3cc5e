use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub media_root: PathBuf,
    pub max_upload_bytes: usize,
    /// Signing key for staff tokens. Staff routes reject every request when unset.
    pub jwt_key: Option<String>,
    pub staff_username: String,
    /// bcrypt hash of the staff password.
    pub staff_password_hash: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite://splab.db?mode=rwc".to_string(),
            media_root: PathBuf::from("media"),
            max_upload_bytes: 50 * 1024 * 1024,
            jwt_key: None,
            staff_username: "admin".to_string(),
            staff_password_hash: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: non_empty("SPLAB_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "SPLAB_PORT", defaults.port)?,
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            media_root: non_empty("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            jwt_key: non_empty("JWT_KEY"),
            staff_username: non_empty("STAFF_USERNAME").unwrap_or(defaults.staff_username),
            staff_password_hash: non_empty("STAFF_PASSWORD_HASH"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}
