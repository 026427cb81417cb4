use std::env;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "app.db";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5555";
pub const DEFAULT_POOL_MAX: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings read from the environment.
///
/// - `DATABASE_URL` (or `DB_URI`): SQLite database path, default `app.db`
/// - `LISTEN_ADDR`: socket address to bind, default `0.0.0.0:5555`
/// - `DB_POOL_MAX`: maximum pooled connections, default 10
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub pool_max: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB_URI"))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let listen_addr = parse_or("LISTEN_ADDR", lookup("LISTEN_ADDR"), DEFAULT_LISTEN_ADDR)?;

        let pool_max = match lookup("DB_POOL_MAX") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_POOL_MAX",
                        value,
                    })
                }
            },
            None => DEFAULT_POOL_MAX,
        };

        Ok(Self {
            database_url: strip_sqlite_scheme(&database_url).to_string(),
            listen_addr,
            pool_max,
        })
    }
}

fn parse_or(
    name: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

// SQLAlchemy-style `sqlite:///path` URLs are accepted as plain paths.
fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.listen_addr, "0.0.0.0:5555".parse().unwrap());
        assert_eq!(config.pool_max, 10);
    }

    #[test]
    fn test_database_url_precedence() {
        let config = config_from(&[("DATABASE_URL", "a.db"), ("DB_URI", "b.db")]).unwrap();
        assert_eq!(config.database_url, "a.db");

        let config = config_from(&[("DB_URI", "sqlite:///var/lib/pizza.db")]).unwrap();
        assert_eq!(config.database_url, "var/lib/pizza.db");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("LISTEN_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { name: "LISTEN_ADDR", .. })
        ));
        assert!(matches!(
            config_from(&[("DB_POOL_MAX", "0")]),
            Err(ConfigError::Invalid { name: "DB_POOL_MAX", .. })
        ));
    }
}
