//! Process configuration, read from the environment once at start-up.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Duration;

use claimgate_auth::PolicyRegistry;

/// Default sign-in lifetime: two minutes.
const DEFAULT_SESSION_TTL_SECS: i64 = 120;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cookie_key: Key,
    pub secure_cookies: bool,
    pub session_ttl: Duration,
    pub policy_file: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("cookie_key", &"<redacted>")
            .field("secure_cookies", &self.secure_cookies)
            .field("session_ttl", &self.session_ttl)
            .field("policy_file", &self.policy_file)
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".into())
            .parse::<SocketAddr>()
            .context("invalid BIND_ADDR")?;

        let cookie_key = match lookup("COOKIE_SECRET_BASE64") {
            Some(secret) => {
                let bytes = STANDARD
                    .decode(secret.trim())
                    .context("invalid COOKIE_SECRET_BASE64")?;
                Key::try_from(bytes.as_slice())
                    .context("COOKIE_SECRET_BASE64 must decode to at least 64 bytes")?
            }
            None => {
                tracing::warn!(
                    "COOKIE_SECRET_BASE64 not set; using a random key (sessions end on restart)"
                );
                Key::generate()
            }
        };

        let secure_cookies = lookup("COOKIE_SECURE")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let ttl_secs = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .context("invalid SESSION_TTL_SECS")?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        if ttl_secs <= 0 {
            return Err(anyhow!("SESSION_TTL_SECS must be positive"));
        }

        let policy_file = lookup("POLICY_FILE")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            cookie_key,
            secure_cookies,
            session_ttl: Duration::seconds(ttl_secs),
            policy_file,
        })
    }

    /// Local configuration: ephemeral port, random key, plain-HTTP cookies.
    pub fn local() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_key: Key::generate(),
            secure_cookies: false,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            policy_file: None,
        }
    }

    /// Policy table from `POLICY_FILE`, or the built-in demo table.
    pub fn policy_registry(&self) -> Result<PolicyRegistry> {
        match &self.policy_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read policy file {}", path.display()))?;
                let registry = PolicyRegistry::from_json(&json)
                    .with_context(|| format!("invalid policy file {}", path.display()))?;
                tracing::info!(path = %path.display(), policies = registry.len(), "loaded policy table");
                Ok(registry)
            }
            None => Ok(PolicyRegistry::with_default_policies()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(!cfg.secure_cookies);
        assert_eq!(cfg.session_ttl, Duration::minutes(2));
        assert!(cfg.policy_file.is_none());
    }

    #[test]
    fn reads_overrides() {
        let secret = STANDARD.encode([7u8; 64]);
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("COOKIE_SECRET_BASE64", &secret),
            ("COOKIE_SECURE", "true"),
            ("SESSION_TTL_SECS", "600"),
            ("POLICY_FILE", "/etc/claimgate/policies.json"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert!(cfg.secure_cookies);
        assert_eq!(cfg.session_ttl, Duration::minutes(10));
        assert_eq!(cfg.policy_file, Some(PathBuf::from("/etc/claimgate/policies.json")));
    }

    #[test]
    fn rejects_short_cookie_secret() {
        let secret = STANDARD.encode([1u8; 32]);
        assert!(config(&[("COOKIE_SECRET_BASE64", &secret)]).is_err());
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(config(&[("SESSION_TTL_SECS", "0")]).is_err());
        assert!(config(&[("SESSION_TTL_SECS", "soon")]).is_err());
    }

    #[test]
    fn default_policy_registry_without_file() {
        let registry = AppConfig::local().policy_registry().unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn missing_policy_file_is_an_error() {
        let mut cfg = AppConfig::local();
        cfg.policy_file = Some(PathBuf::from("/nonexistent/claimgate-policies.json"));
        assert!(cfg.policy_registry().is_err());
    }
}
