use actix_web::cookie::Key;

use crate::errors::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_APP_NAME: &str = "Civil Registry";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_ACTIVITY_LIMIT: i64 = 5;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub db_max_connections: u32,
    pub recent_activity_limit: i64,
    pub login_path: String,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_key: None,
            cookie_secure: false,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            recent_activity_limit: DEFAULT_ACTIVITY_LIMIT,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` wraps this.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_key: lookup("SESSION_KEY"),
            cookie_secure: parse_or("COOKIE_SECURE", lookup("COOKIE_SECURE"), defaults.cookie_secure),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            ),
            recent_activity_limit: parse_or(
                "RECENT_ACTIVITY_LIMIT",
                lookup("RECENT_ACTIVITY_LIMIT"),
                defaults.recent_activity_limit,
            ),
            login_path: lookup("LOGIN_PATH").unwrap_or(defaults.login_path),
            app_name: lookup("APP_NAME").unwrap_or(defaults.app_name),
        })
    }

    /// Cookie signing key. Falls back to a random key, which drops sessions on restart.
    pub fn cookie_key(&self) -> Key {
        match &self.session_key {
            Some(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid value for {name}: {v:?}, using default");
            default
        }),
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/registry")]))
            .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.login_path, "/login");
        assert_eq!(cfg.recent_activity_limit, 5);
        assert_eq!(cfg.db_max_connections, 8);
        assert!(!cfg.cookie_secure);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("RECENT_ACTIVITY_LIMIT", "lots"),
            ("DB_MAX_CONNECTIONS", "16"),
        ]))
        .unwrap();
        assert_eq!(cfg.recent_activity_limit, 5);
        assert_eq!(cfg.db_max_connections, 16);
    }

    #[test]
    fn short_session_key_still_yields_a_key() {
        let cfg = AppConfig {
            session_key: Some("short".to_string()),
            ..AppConfig::default()
        };
        // Key::generate is random; only check it does not panic on a short key.
        let _ = cfg.cookie_key();
    }
}
