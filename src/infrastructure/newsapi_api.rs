// NewsAPI adapter - top headlines by category and country, keyword search
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::application::rate_governor::RateGovernor;
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::domain::news::{Article, NewsQuery};
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub struct NewsApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    governor: Arc<RateGovernor>,
    patience: Duration,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct NewsResponseDto {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleDto {
    source: Option<SourceDto>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SourceDto {
    name: Option<String>,
}

impl NewsApi {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        api_key: Option<String>,
        governor: Arc<RateGovernor>,
        patience: Duration,
        page_size: usize,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            governor,
            patience,
            page_size,
        }
    }

    async fn articles(&self, endpoint: &str, params: &[(&str, &str)], category: &str) -> Result<Vec<Article>, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::Unauthorized("newsapi key".to_string()))?;
        self.governor.acquire_within(self.patience).await?;

        let page_size = self.page_size.to_string();
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("pageSize", page_size.as_str()));
        all.push(("apiKey", api_key));
        let response = self
            .transport
            .get(HttpRequest::get(query_url(&self.base_url, endpoint, &all)))
            .await?;

        // Errors arrive as a JSON envelope with a non-2xx status; the code is more precise.
        let dto: NewsResponseDto = match serde_json::from_str::<NewsResponseDto>(&response.body) {
            Ok(dto) if dto.status == "error" => return Err(envelope_error(&dto, response.status)),
            Ok(dto) if response.is_success() => dto,
            _ => response.json(endpoint)?,
        };

        let total = dto.articles.len();
        let articles: Vec<Article> = dto
            .articles
            .into_iter()
            .enumerate()
            .map(|(i, a)| to_article(a, i, category))
            .filter(|a| !a.is_removed())
            .collect();
        tracing::debug!("newsapi: {} returned {} articles, kept {}", endpoint, total, articles.len());
        Ok(articles)
    }
}

fn envelope_error(dto: &NewsResponseDto, status: u16) -> FetchError {
    let message = dto.message.clone().unwrap_or_default();
    match dto.code.as_deref() {
        Some("rateLimited") => FetchError::RateLimited(message),
        Some("apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled" | "apiKeyExhausted") => {
            FetchError::Unauthorized(message)
        }
        _ if (200..300).contains(&status) => FetchError::Upstream { status: 500 },
        _ => FetchError::from_status(status, &message),
    }
}

fn to_article(dto: ArticleDto, index: usize, category: &str) -> Article {
    let url = dto.url.unwrap_or_default();
    Article {
        id: if url.is_empty() { format!("article-{index}") } else { url.clone() },
        title: dto.title.unwrap_or_default(),
        description: dto.description.unwrap_or_default(),
        url,
        image_url: dto.url_to_image.filter(|u| !u.is_empty()),
        source: dto.source.and_then(|s| s.name).unwrap_or_default(),
        author: dto.author.filter(|a| !a.is_empty()),
        category: category.to_string(),
        published_at: dto.published_at.unwrap_or_else(Utc::now),
        provenance: Provenance::Live,
    }
}

#[async_trait]
impl DataSource for NewsApi {
    type Entity = Article;
    type Options = NewsQuery;

    fn name(&self) -> &'static str {
        "newsapi"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, request: &FetchRequest<NewsQuery>) -> Result<Batch<Article>, FetchError> {
        let articles = match &request.options {
            NewsQuery::Headlines { category, country } => {
                self.articles(
                    "/top-headlines",
                    &[("category", category.as_str()), ("country", country.as_str())],
                    category,
                )
                .await?
            }
            NewsQuery::Search { query } => {
                let query = query.trim();
                let found = self
                    .articles(
                        "/everything",
                        &[("q", query), ("sortBy", "publishedAt"), ("language", "en")],
                        "general",
                    )
                    .await?;
                if found.is_empty() {
                    tracing::debug!("newsapi: nothing in everything for '{}', trying headlines", query);
                    self.articles("/top-headlines", &[("q", query)], "general").await?
                } else {
                    found
                }
            }
        };
        Ok(Batch::new(articles))
    }
}
