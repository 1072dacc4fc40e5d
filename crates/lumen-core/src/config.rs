//! Configuration module
//!
//! Server, upload, storage and mail settings, read from the environment
//! (optionally seeded from a `.env` file).

use std::env;

use crate::constants::{DEFAULT_SERVER_PORT, MAX_UPLOAD_SIZE_CEILING_MB, MAX_UPLOAD_SIZE_MB};

const BYTES_PER_MB: usize = 1024 * 1024;

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Site backend configuration
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub base: BaseConfig,
    // Upload gateway
    pub max_upload_size_bytes: usize,
    // Local image store
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Mail
    pub email_enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
    pub contact_recipient: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SiteConfig>);

impl Config {
    fn as_site(&self) -> &SiteConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_site().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = SiteConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_site().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_site().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_site().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_site().base.environment
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_site().max_upload_size_bytes
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_site().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_site().local_storage_base_url
    }

    pub fn email_enabled(&self) -> bool {
        self.as_site().email_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.as_site().smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.as_site().smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.as_site().smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.as_site().smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.as_site().smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.as_site().smtp_tls
    }

    pub fn contact_recipient(&self) -> Option<&str> {
        self.as_site().contact_recipient.as_deref()
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map so they never touch
    /// process-wide state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&mb| mb > 0)
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(BYTES_PER_MB)
            .ok_or_else(|| {
                anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is out of range: {}", max_upload_size_mb)
            })?;

        let config = SiteConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
            },
            max_upload_size_bytes,
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| "./uploads".to_string()),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/uploads", server_port)),
            email_enabled: parse_bool(lookup("EMAIL_ENABLED"), false),
            smtp_host: non_empty(lookup("SMTP_HOST")),
            smtp_port: lookup("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .filter(|&p| p > 0),
            smtp_user: non_empty(lookup("SMTP_USER")),
            smtp_password: non_empty(lookup("SMTP_PASSWORD")),
            smtp_from: non_empty(lookup("SMTP_FROM")),
            smtp_tls: parse_bool(lookup("SMTP_TLS"), true),
            contact_recipient: non_empty(lookup("CONTACT_RECIPIENT")),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let environment = self.base.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.email_enabled && (self.smtp_host.is_none() || self.smtp_from.is_none()) {
            return Err(anyhow::anyhow!(
                "EMAIL_ENABLED=true requires SMTP_HOST and SMTP_FROM to be set"
            ));
        }

        if self.max_upload_size_bytes > MAX_UPLOAD_SIZE_CEILING_MB * BYTES_PER_MB {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must not exceed {} (uploads are buffered in memory)",
                MAX_UPLOAD_SIZE_CEILING_MB
            ));
        }

        if self.local_storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = SiteConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base.server_port, 5000);
        assert_eq!(config.base.environment, "development");
        assert_eq!(config.base.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.max_upload_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.local_storage_path, "./uploads");
        assert_eq!(config.local_storage_base_url, "http://localhost:5000/uploads");
        assert!(!config.email_enabled);
        assert!(config.smtp_tls);
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let result = SiteConfig::from_lookup(lookup_from(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());

        let ok = SiteConfig::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://example.org, https://www.example.org"),
        ]))
        .unwrap();
        assert_eq!(ok.base.cors_origins.len(), 2);
        assert!(Config(Box::new(ok)).is_production());
    }

    #[test]
    fn email_enabled_requires_smtp() {
        let result = SiteConfig::from_lookup(lookup_from(&[("EMAIL_ENABLED", "true")]));
        assert!(result.is_err());

        let config = SiteConfig::from_lookup(lookup_from(&[
            ("EMAIL_ENABLED", "TRUE"),
            ("SMTP_HOST", "smtp.example.org"),
            ("SMTP_FROM", "noreply@example.org"),
            ("SMTP_PORT", "2525"),
        ]))
        .unwrap();
        assert!(config.email_enabled);
        assert_eq!(config.smtp_port, Some(2525));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = SiteConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("MAX_UPLOAD_SIZE_MB", "0"),
        ]))
        .unwrap();
        assert_eq!(config.base.server_port, 5000);
        assert_eq!(config.max_upload_size_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn oversized_upload_cap_is_rejected() {
        let overflowing = usize::MAX.to_string();
        assert!(SiteConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_SIZE_MB", overflowing.as_str())])).is_err());

        assert!(SiteConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_SIZE_MB", "1025")])).is_err());

        let config = SiteConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_SIZE_MB", "1024")])).unwrap();
        assert_eq!(config.max_upload_size_bytes, 1024 * 1024 * 1024);
    }
}
