//! Listener settings read from `HOST` and `PORT`.

use crate::{ConfigError, FromEnv, env_parse_or};
use std::net::Ipv4Addr;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Bind address. IPv6 hosts are bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl FromEnv for ServerConfig {
    /// A blank `HOST` binds every interface.
    fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse_or("PORT", DEFAULT_PORT)?;

        Ok(Self { host, port })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_env_matches_default() {
        temp_env::with_vars_unset(["HOST", "PORT"], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.address(), "0.0.0.0:5000");
        });
    }

    #[test]
    fn test_blank_host_binds_all_interfaces() {
        temp_env::with_vars([("HOST", Some("  ")), ("PORT", Some("8081"))], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.address(), "0.0.0.0:8081");
        });
    }

    #[test]
    fn test_rejected_ports_name_the_variable() {
        for raw in ["not_a_number", "99999", "-1"] {
            temp_env::with_var("PORT", Some(raw), || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(
                    matches!(&err, ConfigError::ParseError { key, .. } if key == "PORT"),
                    "{raw}: {err}"
                );
            });
        }
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = ServerConfig {
            host: "::1".to_string(),
            port: 5000,
        };
        assert_eq!(config.address(), "[::1]:5000");

        let already = ServerConfig {
            host: "[::]".to_string(),
            port: 5000,
        };
        assert_eq!(already.address(), "[::]:5000");
    }
}
