use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_flag, env_or_default, env_parse_or,
    server::ServerConfig,
};
use database::mongodb::MongoConfig;
use std::time::Duration;

pub use core_config::Environment;

/// Catalogue runtime settings
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// How often the liveness monitor pings MongoDB (`DB_HEALTH_INTERVAL_SECS`, default 15)
    pub health_interval: Duration,
}

impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secs = env_parse_or("DB_HEALTH_INTERVAL_SECS", 15u64)?;
        Ok(Self {
            health_interval: Duration::from_secs(secs.max(1)),
        })
    }
}

/// Addresses used for contact form mail
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub from: String,
    pub admin_email: String,
}

impl FromEnv for MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            from: env_or_default("MAIL_FROM", "noreply@pharma.example"),
            admin_email: env_or_default("ADMIN_EMAIL", "admin@pharma.example"),
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub catalog: CatalogConfig,
    pub mail: MailConfig,
    /// Mount `GET /api/contact` (`ADMIN_API_ENABLED`, default false)
    pub admin_api_enabled: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            catalog: CatalogConfig::from_env()?,
            mail: MailConfig::from_env()?,
            admin_api_enabled: env_flag("ADMIN_API_ENABLED"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "DB_HEALTH_INTERVAL_SECS",
                "MAIL_FROM",
                "ADMIN_EMAIL",
                "ADMIN_API_ENABLED",
                "MONGODB_URL",
                "MONGO_URL",
                "MONGODB_URI",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.catalog.health_interval, Duration::from_secs(15));
                assert_eq!(config.mail.admin_email, "admin@pharma.example");
                assert!(!config.admin_api_enabled);
                assert_eq!(config.app.name, "pharma_api");
            },
        );
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("DB_HEALTH_INTERVAL_SECS", Some("5")),
                ("ADMIN_EMAIL", Some("ops@distributor.in")),
                ("ADMIN_API_ENABLED", Some("true")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.catalog.health_interval, Duration::from_secs(5));
                assert_eq!(config.mail.admin_email, "ops@distributor.in");
                assert!(config.admin_api_enabled);
            },
        );
    }

    #[test]
    fn test_production_requires_mongodb_url() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("MONGODB_URL", None),
                ("MONGO_URL", None),
                ("MONGODB_URI", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_invalid_health_interval() {
        temp_env::with_var("DB_HEALTH_INTERVAL_SECS", Some("often"), || {
            assert!(CatalogConfig::from_env().is_err());
        });
    }
}
