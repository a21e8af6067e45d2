//! Server configuration, read once at startup from the environment
//! (and a `.env` file when present).

use std::env;
use std::path::PathBuf;

use girlgram_api::IdentityProvider;

/// Secrets that ship in example files and must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("{0} is still a placeholder; set a real secret")]
    Placeholder(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub identity: IdentityProvider,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            get(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let secret = |name: &'static str| -> Result<String, ConfigError> {
            let value = required(name)?;
            if PLACEHOLDER_SECRETS.contains(&value.as_str()) {
                return Err(ConfigError::Placeholder(name));
            }
            Ok(value)
        };

        let port = match get("GIRLGRAM_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "GIRLGRAM_PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let secure_cookies = match get("GIRLGRAM_SECURE_COOKIES").as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "GIRLGRAM_SECURE_COOKIES",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            host: get("GIRLGRAM_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("GIRLGRAM_DB_PATH").unwrap_or_else(|| "girlgram.db".into()).into(),
            session_secret: secret("GIRLGRAM_SESSION_SECRET")?,
            identity: IdentityProvider {
                issuer: required("GIRLGRAM_OIDC_ISSUER")?,
                audience: required("GIRLGRAM_OIDC_AUDIENCE")?,
                secret: secret("GIRLGRAM_OIDC_SECRET")?,
            },
            secure_cookies,
        })
    }
}
