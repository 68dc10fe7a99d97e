use crate::application::rate_governor::GovernorPolicy;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder values shipped in sample env files; treated as "not configured".
const CREDENTIAL_SENTINELS: [&str; 2] = ["demo", "demo_key_replace_with_your_actual_key"];

pub const NASA_DEMO_KEY: &str = "DEMO_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpSettings,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub governors: Governors,
    pub paging: PagingSettings,
    pub debounce: DebounceSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 12_000,
            user_agent: concat!("api-dashboards/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub openweather_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,
    pub newsapi_key: Option<String>,
    pub aqicn_token: Option<String>,
    pub nasa_api_key: Option<String>,
}

impl Credentials {
    /// Drops blank and placeholder values.
    pub fn sanitized(self) -> Self {
        Self {
            github_token: usable(self.github_token),
            openweather_api_key: usable(self.openweather_api_key),
            alpha_vantage_api_key: usable(self.alpha_vantage_api_key),
            newsapi_key: usable(self.newsapi_key),
            aqicn_token: usable(self.aqicn_token),
            nasa_api_key: usable(self.nasa_api_key),
        }
    }

    /// APOD accepts a shared demo key, so it is never unconfigured.
    pub fn nasa_key(&self) -> String {
        self.nasa_api_key.clone().unwrap_or_else(|| NASA_DEMO_KEY.to_string())
    }
}

fn usable(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !CREDENTIAL_SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s)))
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Endpoints {
    pub github: String,
    pub openweather: String,
    pub coingecko: String,
    pub alpha_vantage: String,
    pub newsapi: String,
    pub waqi: String,
    pub disease: String,
    pub apod: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github: "https://api.github.com".to_string(),
            openweather: "https://api.openweathermap.org".to_string(),
            coingecko: "https://api.coingecko.com/api/v3".to_string(),
            alpha_vantage: "https://www.alphavantage.co".to_string(),
            newsapi: "https://newsapi.org/v2".to_string(),
            waqi: "https://api.waqi.info".to_string(),
            disease: "https://disease.sh".to_string(),
            apod: "https://api.nasa.gov".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct GovernorSettings {
    pub min_interval_ms: u64,
    #[serde(default)]
    pub max_calls: usize,
    #[serde(default)]
    pub window_ms: u64,
    /// Targets fetched live per cycle; 0 means no limit.
    #[serde(default)]
    pub live_quota: usize,
    /// Longest wait for a slot before serving synthetic data instead.
    pub patience_ms: u64,
}

impl GovernorSettings {
    pub fn policy(&self) -> GovernorPolicy {
        GovernorPolicy::spacing(Duration::from_millis(self.min_interval_ms))
            .with_budget(self.max_calls, Duration::from_millis(self.window_ms))
    }

    pub fn patience(&self) -> Duration {
        Duration::from_millis(self.patience_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Governors {
    pub stocks: GovernorSettings,
    pub news: GovernorSettings,
    pub air_quality: GovernorSettings,
}

impl Default for Governors {
    fn default() -> Self {
        Self {
            stocks: GovernorSettings {
                min_interval_ms: 12_000,
                max_calls: 5,
                window_ms: 60_000,
                live_quota: 3,
                patience_ms: 60_000,
            },
            news: GovernorSettings {
                min_interval_ms: 1_000,
                max_calls: 0,
                window_ms: 0,
                live_quota: 0,
                patience_ms: 10_000,
            },
            air_quality: GovernorSettings {
                min_interval_ms: 200,
                max_calls: 0,
                window_ms: 0,
                live_quota: 0,
                patience_ms: 10_000,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PagingSettings {
    pub page_size: usize,
    pub crypto_per_page: usize,
    pub news_page_size: usize,
    pub github_per_page: usize,
    pub gists_per_page: usize,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: 12,
            crypto_per_page: 10,
            news_page_size: 50,
            github_per_page: 100,
            gists_per_page: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DebounceSettings {
    pub weather_ms: u64,
    pub news_ms: u64,
    pub air_quality_ms: u64,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            weather_ms: 300,
            news_ms: 500,
            air_quality_ms: 800,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".dashboards"),
        }
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_config_from("config/dashboards")
}

/// File (optional), then `DASHBOARDS__SECTION__KEY` variables, then the well-known credential variables.
pub fn load_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let env = |name: &str| std::env::var(name).ok();
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("credentials.github_token", env("GITHUB_TOKEN"))?
        .set_override_option("credentials.openweather_api_key", env("OPENWEATHER_API_KEY"))?
        .set_override_option("credentials.alpha_vantage_api_key", env("ALPHA_VANTAGE_API_KEY"))?
        .set_override_option("credentials.newsapi_key", env("NEWSAPI_KEY"))?
        .set_override_option("credentials.aqicn_token", env("AQICN_TOKEN"))?
        .set_override_option("credentials.nasa_api_key", env("NASA_API_KEY"))?
        .build()
        .context("Failed to load dashboard configuration")?;

    let mut config: AppConfig = settings
        .try_deserialize()
        .context("Invalid dashboard configuration")?;
    config.credentials = config.credentials.sanitized();
    Ok(config)
}

/// Replace `${name}` placeholders in an endpoint path
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("user".to_string(), "torvalds".to_string());
        vars.insert("city".to_string(), "new york".to_string());

        assert_eq!(prepare_path("/users/${user}/repos", &vars), "/users/torvalds/repos");
        assert_eq!(prepare_path("/feed/${city}/", &vars), "/feed/new%20york/");
    }

    #[test]
    fn test_sentinel_credentials_are_absent() {
        let credentials = Credentials {
            openweather_api_key: Some("demo_key_replace_with_your_actual_key".to_string()),
            newsapi_key: Some("   ".to_string()),
            alpha_vantage_api_key: Some("demo".to_string()),
            aqicn_token: Some(" real-token ".to_string()),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(credentials.openweather_api_key, None);
        assert_eq!(credentials.newsapi_key, None);
        assert_eq!(credentials.alpha_vantage_api_key, None);
        assert_eq!(credentials.aqicn_token.as_deref(), Some("real-token"));
        assert_eq!(credentials.nasa_key(), NASA_DEMO_KEY);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboards.toml");
        std::fs::write(
            &path,
            "[http]\ntimeout_ms = 5000\n\n[endpoints]\ngithub = \"http://localhost:9000\"\n",
        )
        .unwrap();

        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert_eq!(config.endpoints.github, "http://localhost:9000");
        assert_eq!(config.endpoints.disease, "https://disease.sh");
        assert_eq!(config.governors.stocks.live_quota, 3);
        assert_eq!(config.paging.page_size, 12);
    }
}
