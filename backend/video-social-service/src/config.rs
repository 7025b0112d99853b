/// Configuration management for Video Social Service
///
/// Loads configuration from environment variables.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Store and notification settings
    pub service: ServiceConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Number of backend instances behind the dispatch proxy
    pub backend_instances: usize,
}

/// Whether a follower's pending queue also receives notifications that were
/// already delivered live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryPolicy {
    /// Always append to the pending queue, even after a live delivery
    AlwaysQueue,
    /// Append only when no live callback accepted the notification
    QueueWhenOffline,
}

impl DeliveryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPolicy::AlwaysQueue => "always-queue",
            DeliveryPolicy::QueueWhenOffline => "queue-when-offline",
        }
    }
}

impl FromStr for DeliveryPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always-queue" => Ok(DeliveryPolicy::AlwaysQueue),
            "queue-when-offline" => Ok(DeliveryPolicy::QueueWhenOffline),
            other => Err(anyhow!("unknown delivery policy: {}", other)),
        }
    }
}

/// Store and notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Length of generated video ids
    #[serde(default = "default_video_id_length")]
    pub video_id_length: usize,
    /// Length of generated session tokens
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Attempts to find an unused id before giving up
    #[serde(default = "default_id_max_attempts")]
    pub id_max_attempts: usize,
    #[serde(default = "default_delivery_policy")]
    pub delivery: DeliveryPolicy,
}

// Default values
fn default_video_id_length() -> usize {
    5
}

fn default_token_length() -> usize {
    7
}

fn default_id_max_attempts() -> usize {
    64
}

fn default_delivery_policy() -> DeliveryPolicy {
    DeliveryPolicy::AlwaysQueue
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            video_id_length: default_video_id_length(),
            token_length: default_token_length(),
            id_max_attempts: default_id_max_attempts(),
            delivery: default_delivery_policy(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            backend_instances: parse_var("BACKEND_INSTANCES", 1)?,
        };
        if app.backend_instances == 0 {
            return Err(anyhow!("BACKEND_INSTANCES must be at least 1"));
        }

        let service = ServiceConfig {
            video_id_length: parse_var("VIDEO_ID_LENGTH", default_video_id_length())?,
            token_length: parse_var("TOKEN_LENGTH", default_token_length())?,
            id_max_attempts: parse_var("ID_MAX_ATTEMPTS", default_id_max_attempts())?,
            delivery: parse_var("NOTIFICATION_DELIVERY", default_delivery_policy())?,
        };
        if service.video_id_length == 0 {
            return Err(anyhow!("VIDEO_ID_LENGTH must be at least 1"));
        }
        if service.token_length == 0 {
            return Err(anyhow!("TOKEN_LENGTH must be at least 1"));
        }
        if service.id_max_attempts == 0 {
            return Err(anyhow!("ID_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Config { app, service })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "BACKEND_INSTANCES",
        "VIDEO_ID_LENGTH",
        "TOKEN_LENGTH",
        "ID_MAX_ATTEMPTS",
        "NOTIFICATION_DELIVERY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_values() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.backend_instances, 1);
        assert_eq!(config.service.video_id_length, 5);
        assert_eq!(config.service.token_length, 7);
        assert_eq!(config.service.id_max_attempts, 64);
        assert_eq!(config.service.delivery, DeliveryPolicy::AlwaysQueue);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("BACKEND_INSTANCES", "3");
        std::env::set_var("NOTIFICATION_DELIVERY", "queue-when-offline");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.app.backend_instances, 3);
        assert_eq!(config.service.delivery, DeliveryPolicy::QueueWhenOffline);
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        clear_env();
        std::env::set_var("TOKEN_LENGTH", "seven");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("BACKEND_INSTANCES", "0");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("TOKEN_LENGTH", "0");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("TOKEN_LENGTH"));

        clear_env();
        std::env::set_var("VIDEO_ID_LENGTH", "0");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("VIDEO_ID_LENGTH"));

        clear_env();
        std::env::set_var("ID_MAX_ATTEMPTS", "0");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("NOTIFICATION_DELIVERY", "sometimes");
        let err = Config::from_env().unwrap_err();
        assert!(format!("{:#}", err).contains("NOTIFICATION_DELIVERY"));
        clear_env();
    }

    #[test]
    fn test_delivery_policy_round_trip() {
        for policy in [DeliveryPolicy::AlwaysQueue, DeliveryPolicy::QueueWhenOffline] {
            assert_eq!(policy.as_str().parse::<DeliveryPolicy>().unwrap(), policy);
        }
    }
}
