use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Log every SQL statement the ORM sends.
    pub echo_sql: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let echo_sql = match lookup("DATABASE_ECHO") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow::anyhow!("DATABASE_ECHO is not a boolean: {raw}"))?,
            None => false,
        };
        Ok(Self {
            database_url,
            echo_sql,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            echo_sql: false,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
