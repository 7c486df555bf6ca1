//! Client configuration.
//!
//! Configuration arrives already resolved (no file loading here) and is
//! validated once, at startup. Anything invalid is a fatal
//! [`CasError::Configuration`], never deferred to first use.
//!
//! # Example (TOML)
//!
//! ```toml
//! [server]
//! url_prefix = "https://cas.example.com/cas"
//! service_url = "https://app.example.com/"
//!
//! [proxy]
//! callback_url = "https://app.example.com/proxyCallback"
//! storage_ttl = "60s"
//! reaper_interval = "60s"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::CasResult;
use crate::error::CasError;
use crate::ticket::Protocol;

/// Root client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CasConfig {
    /// Authentication server endpoints and the protected service URL.
    pub server: ServerConfig,

    /// Protocol variant spoken with the authentication server.
    pub protocol: Protocol,

    /// Require fresh authentication (no SSO session reuse) when
    /// redirecting to login.
    pub renew: bool,

    /// Request gateway behavior: the server redirects back without
    /// prompting when no SSO session exists.
    pub gateway: bool,

    /// Single logout behavior.
    pub slo: SingleLogoutConfig,

    /// Proxy-granting-ticket support. `None` disables proxy
    /// participation entirely (no PGT store, no reaper).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            protocol: Protocol::Cas20,
            renew: false,
            gateway: false,
            slo: SingleLogoutConfig::default(),
            proxy: None,
        }
    }
}

/// Server URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the authentication server, e.g.
    /// `https://cas.example.com/cas`.
    pub url_prefix: String,

    /// Login endpoint. Defaults to `{url_prefix}/login`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,

    /// The service URL this application presents when validating
    /// tickets. Must match the URL the ticket was issued for.
    pub service_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url_prefix: "https://localhost:8443/cas".to_string(),
            login_url: None,
            service_url: "https://localhost:8080/".to_string(),
        }
    }
}

impl ServerConfig {
    /// The login endpoint, derived from the prefix unless configured.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.login_url
            .clone()
            .unwrap_or_else(|| format!("{}/login", self.url_prefix.trim_end_matches('/')))
    }

    /// The logout endpoint on the authentication server.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/logout", self.url_prefix.trim_end_matches('/'))
    }
}

/// Single logout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SingleLogoutConfig {
    /// Name of the parameter carrying the logout payload.
    pub logout_parameter: String,

    /// Name of the parameter carrying the front-channel relay state.
    pub relay_state_parameter: String,

    /// HTTP method used for front-channel logout delivery.
    pub front_channel_method: String,

    /// When one request carries both a ticket and a logout parameter,
    /// classify it as a logout. The source protocol leaves this
    /// ambiguous; this default matches observed server behavior.
    pub logout_takes_precedence: bool,
}

impl Default for SingleLogoutConfig {
    fn default() -> Self {
        Self {
            logout_parameter: "logoutRequest".to_string(),
            relay_state_parameter: "RelayState".to_string(),
            front_channel_method: "GET".to_string(),
            logout_takes_precedence: true,
        }
    }
}

/// Proxy-granting-ticket configuration.
///
/// TTL and sweep interval are operational parameters with no sensible
/// universal default; both are required and must be positive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Callback URL the authentication server delivers
    /// `(pgtIou, pgtId)` pairs to.
    pub callback_url: String,

    /// How long an unconsumed PGT stays retrievable.
    #[serde(with = "humantime_serde")]
    pub storage_ttl: Duration,

    /// Time between reaper sweeps.
    #[serde(with = "humantime_serde")]
    pub reaper_interval: Duration,
}

impl CasConfig {
    /// Validates the configuration, failing fast on anything the client
    /// cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`CasError::Configuration`] describing the first problem
    /// found.
    pub fn validate(&self) -> CasResult<()> {
        require_url("server.url_prefix", &self.server.url_prefix)?;
        require_url("server.service_url", &self.server.service_url)?;
        if let Some(login_url) = &self.server.login_url {
            require_url("server.login_url", login_url)?;
        }

        require_nonempty("slo.logout_parameter", &self.slo.logout_parameter)?;
        require_nonempty("slo.relay_state_parameter", &self.slo.relay_state_parameter)?;
        require_nonempty("slo.front_channel_method", &self.slo.front_channel_method)?;

        if let Some(proxy) = &self.proxy {
            require_url("proxy.callback_url", &proxy.callback_url)?;
            if proxy.storage_ttl.is_zero() {
                return Err(CasError::configuration(
                    "proxy.storage_ttl must be greater than zero",
                ));
            }
            if proxy.reaper_interval.is_zero() {
                return Err(CasError::configuration(
                    "proxy.reaper_interval must be greater than zero",
                ));
            }
            // Proxy tickets are issued against an existing SSO session;
            // forcing fresh authentication would reject every one.
            if self.renew {
                return Err(CasError::configuration(
                    "renew must not be enabled when receiving proxy callbacks",
                ));
            }
        }

        Ok(())
    }
}

fn require_nonempty(field: &str, value: &str) -> CasResult<()> {
    if value.trim().is_empty() {
        return Err(CasError::configuration(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> CasResult<()> {
    require_nonempty(field, value)?;
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| CasError::configuration(format!("{field} is not a valid URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy_config() -> ProxyConfig {
        ProxyConfig {
            callback_url: "https://app.example.com/proxyCallback".to_string(),
            storage_ttl: Duration::from_secs(60),
            reaper_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_defaults_validate() {
        CasConfig::default().validate().unwrap();
    }

    #[test]
    fn test_login_url_derivation() {
        let server = ServerConfig {
            url_prefix: "https://cas.example.com/cas/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.login_url(), "https://cas.example.com/cas/login");
        assert_eq!(server.logout_url(), "https://cas.example.com/cas/logout");

        let server = ServerConfig {
            login_url: Some("https://cas.example.com/signin".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(server.login_url(), "https://cas.example.com/signin");
    }

    #[test]
    fn test_invalid_server_url_rejected() {
        let config = CasConfig {
            server: ServerConfig {
                url_prefix: "not a url".to_string(),
                ..ServerConfig::default()
            },
            ..CasConfig::default()
        };
        assert!(config.validate().unwrap_err().is_fatal());
    }

    #[test]
    fn test_empty_logout_parameter_rejected() {
        let config = CasConfig {
            slo: SingleLogoutConfig {
                logout_parameter: "  ".to_string(),
                ..SingleLogoutConfig::default()
            },
            ..CasConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_proxy_durations_rejected() {
        let mut config = CasConfig {
            proxy: Some(ProxyConfig {
                storage_ttl: Duration::ZERO,
                ..proxy_config()
            }),
            ..CasConfig::default()
        };
        assert!(config.validate().is_err());

        config.proxy = Some(ProxyConfig {
            reaper_interval: Duration::ZERO,
            ..proxy_config()
        });
        assert!(config.validate().is_err());

        config.proxy = Some(proxy_config());
        config.validate().unwrap();
    }

    #[test]
    fn test_renew_conflicts_with_proxy() {
        let config = CasConfig {
            renew: true,
            proxy: Some(proxy_config()),
            ..CasConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("renew"));
    }
}
