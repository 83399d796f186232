use anyhow::{Result, anyhow};
use axum::http::HeaderValue;
use platform_db::DatabaseSettings;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();
        for origin in &cors_allowed_origins {
            HeaderValue::from_str(origin)
                .map_err(|_| anyhow!("invalid CORS_ALLOWED_ORIGINS entry {origin:?}"))?;
        }

        Ok(Self {
            database: DatabaseSettings::from_env(),
            cors_allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_defaults_to_local_frontend() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.cors_allowed_origins, vec![DEFAULT_CORS_ORIGINS]);
    }

    #[test]
    fn cors_list_is_split_and_trimmed() {
        let config = AppConfig::from_lookup(|key| {
            (key == "CORS_ALLOWED_ORIGINS").then(|| "https://a.test, ,https://b.test ".into())
        })
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.test", "https://b.test"]
        );
    }

    #[test]
    fn blank_cors_list_allows_any_origin() {
        let config =
            AppConfig::from_lookup(|key| (key == "CORS_ALLOWED_ORIGINS").then(String::new))
                .unwrap();
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn unprintable_origin_is_rejected() {
        let result = AppConfig::from_lookup(|key| {
            (key == "CORS_ALLOWED_ORIGINS").then(|| "https://a.test\u{7f}".into())
        });
        assert!(result.is_err());
    }
}
