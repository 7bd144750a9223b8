use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ASSETS_DIR: &str = "./data/assets";
const DEFAULT_MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SEARCH_PAGE_SIZE: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("either SUPABASE_URL and SUPABASE_ANON_KEY or JWT_SECRET must be set")]
    NoAuthMode,
}

/// How bearer tokens are verified.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Supabase JWKS endpoint of the given project.
    Supabase { project_ref: String, anon_key: String },
    /// Shared HS256 secret.
    Secret(String),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub assets_dir: PathBuf,
    /// Base URL that resolved asset references are joined onto.
    pub assets_public_url: String,
    pub max_asset_bytes: u64,
    pub search_page_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` reads the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let redis_url = var("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?;
        let port = parse_or("PORT", var("PORT"), DEFAULT_PORT)?;

        let auth = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY"), var("JWT_SECRET")) {
            (Some(url), Some(anon_key), _) => AuthConfig::Supabase {
                project_ref: project_ref_from_url(&url)?,
                anon_key,
            },
            (_, _, Some(secret)) => AuthConfig::Secret(secret),
            _ => return Err(ConfigError::NoAuthMode),
        };

        let assets_dir = var("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));
        let assets_public_url = var("ASSETS_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}/api/assets"));

        Ok(Self {
            database_url,
            redis_url,
            port,
            auth,
            assets_dir,
            assets_public_url,
            max_asset_bytes: parse_or(
                "MAX_ASSET_BYTES",
                var("MAX_ASSET_BYTES"),
                DEFAULT_MAX_ASSET_BYTES,
            )?,
            search_page_size: parse_or(
                "SEARCH_PAGE_SIZE",
                var("SEARCH_PAGE_SIZE"),
                DEFAULT_SEARCH_PAGE_SIZE,
            )?
            .max(1),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}

/// `https://PROJECT.supabase.co` -> `PROJECT`.
fn project_ref_from_url(url: &str) -> Result<String, ConfigError> {
    url.trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Invalid {
            name: "SUPABASE_URL",
            value: url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_with_secret_auth() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/portfo"),
            ("REDIS_URL", "redis://localhost"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.assets_dir, PathBuf::from("./data/assets"));
        assert_eq!(config.assets_public_url, "http://localhost:8080/api/assets");
        assert_eq!(config.max_asset_bytes, 10 * 1024 * 1024);
        assert_eq!(config.search_page_size, 6);
        assert!(matches!(config.auth, AuthConfig::Secret(ref s) if s == "secret"));
    }

    #[test]
    fn test_supabase_auth_takes_precedence() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/portfo"),
            ("REDIS_URL", "redis://localhost"),
            ("SUPABASE_URL", "https://abcd.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("JWT_SECRET", "secret"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        match config.auth {
            AuthConfig::Supabase { project_ref, anon_key } => {
                assert_eq!(project_ref, "abcd");
                assert_eq!(anon_key, "anon");
            }
            other => panic!("unexpected auth mode: {other:?}"),
        }
        assert_eq!(config.assets_public_url, "http://localhost:9000/api/assets");
    }

    #[test]
    fn test_missing_values_are_reported() {
        let err =
            AppConfig::from_lookup(lookup(&[("REDIS_URL", "redis://localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/portfo"),
            ("REDIS_URL", "redis://localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoAuthMode));
    }

    #[test]
    fn test_invalid_numbers_and_urls() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/portfo"),
            ("REDIS_URL", "redis://localhost"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        assert!(project_ref_from_url("http://abcd.supabase.co").is_err());
    }
}
