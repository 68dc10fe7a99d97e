// HTTP transport shared by every upstream adapter
use crate::domain::error::FetchError;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Query parameters that carry credentials and must never be logged.
const SECRET_PARAMS: [&str; 5] = ["apikey", "apiKey", "appid", "token", "api_key"];

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Maps a non-2xx status onto the error taxonomy, then decodes the body.
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> Result<T, FetchError> {
        if !self.is_success() {
            return Err(FetchError::from_status(self.status, context));
        }
        serde_json::from_str(&self.body).map_err(|e| FetchError::Malformed(format!("{context}: {e}")))
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        tracing::debug!("GET {}", redact(&request.url));

        let mut builder = self.http.get(&request.url).header("Accept", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout.as_millis() as u64)
            } else {
                FetchError::Network(e.without_url().to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!("{} answered {}", redact(&request.url), status);
        }
        Ok(HttpResponse { status, body })
    }
}

/// `base` + `path` + `?k=v&...`, values percent-encoded.
pub fn query_url(base: &str, path: &str, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), path);
    for (i, (key, value)) in params.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

/// Masks credential query parameters for logging.
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SECRET_PARAMS.contains(&key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect();
    format!("{}?{}", base, params.join("&"))
}
