// ============================
// clawcontrol-backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::auth::{MIN_PASSWORD_LENGTH, RECOVERY_TTL_SECS, SESSION_TTL_SECS};
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Recovery token TTL in seconds
    pub recovery_ttl_secs: u64,
    /// Minimum accepted password length
    pub min_password_length: usize,
    /// Rate limiting for the auth endpoints
    pub rate_limit: RateLimitSettings,
}

/// Fixed-window rate limit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("static addr"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            session_ttl_secs: SESSION_TTL_SECS,
            recovery_ttl_secs: RECOVERY_TTL_SECS,
            min_password_length: MIN_PASSWORD_LENGTH,
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `CLAWCONTROL_`-prefixed
    /// environment variables, on top of the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit TOML file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CLAWCONTROL_").split("__"))
            .extract()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_auth_constants() {
        let settings = Settings::default();
        assert_eq!(settings.session_ttl_secs, SESSION_TTL_SECS);
        assert_eq!(settings.recovery_ttl_secs, RECOVERY_TTL_SECS);
        assert_eq!(settings.min_password_length, MIN_PASSWORD_LENGTH);
        assert_eq!(settings.session_ttl_secs, 60 * 60 * 24 * 30);
        assert_eq!(settings.recovery_ttl_secs, 60 * 60);
        assert_eq!(settings.min_password_length, 6);
        assert_eq!(settings.rate_limit.max_requests, 100);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("does-not-exist.toml").unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bind_addr = [this is not toml").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
