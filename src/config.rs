use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_idle_minutes: i64,
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://agora.db".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            session_idle_minutes: 60,
            cookie_secure: false,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_idle_minutes: parse_var(&lookup, "SESSION_IDLE_MINUTES")?
                .unwrap_or(defaults.session_idle_minutes),
            cookie_secure: parse_var(&lookup, "COOKIE_SECURE")?
                .unwrap_or(defaults.cookie_secure),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {key}: {raw:?}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        let config = Config::from_lookup(env(&[])).unwrap();
        assert_eq!(config.database_url, "sqlite://agora.db");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.session_idle_minutes, 60);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(env(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("SESSION_IDLE_MINUTES", "5"),
            ("COOKIE_SECURE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.session_idle_minutes, 5);
        assert!(config.cookie_secure);
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = Config::from_lookup(env(&[("SESSION_IDLE_MINUTES", "soon")])).unwrap_err();
        assert!(err.to_string().contains("SESSION_IDLE_MINUTES"));
    }
}
