// NASA Astronomy Picture of the Day adapter
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::domain::astronomy::{ApodImage, DateRange, MediaType, RangeQuery};
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub struct ApodApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApodPayload {
    Many(Vec<ApodDto>),
    One(ApodDto),
}

#[derive(Debug, Deserialize)]
struct ApodDto {
    date: NaiveDate,
    title: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    url: String,
    hdurl: Option<String>,
    #[serde(default)]
    media_type: String,
    copyright: Option<String>,
}

impl ApodApi {
    /// `api_key` falls back to NASA's shared demo key upstream of this call.
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, api_key: String) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl DataSource for ApodApi {
    type Entity = ApodImage;
    type Options = DateRange;

    fn name(&self) -> &'static str {
        "nasa-apod"
    }

    async fn fetch(&self, request: &FetchRequest<DateRange>) -> Result<Batch<ApodImage>, FetchError> {
        let today = Utc::now().date_naive();
        let url = match request.options.query(today) {
            RangeQuery::Span { start, end } => {
                let (start, end) = (start.to_string(), end.to_string());
                query_url(
                    &self.base_url,
                    "/planetary/apod",
                    &[("api_key", self.api_key.as_str()), ("start_date", start.as_str()), ("end_date", end.as_str())],
                )
            }
            RangeQuery::Count(count) => {
                let count = count.to_string();
                query_url(
                    &self.base_url,
                    "/planetary/apod",
                    &[("api_key", self.api_key.as_str()), ("count", count.as_str())],
                )
            }
        };

        let payload: ApodPayload = self.transport.get(HttpRequest::get(url)).await?.json("apod")?;
        let mut images: Vec<ApodImage> = match payload {
            ApodPayload::Many(items) => items.into_iter().map(to_image).collect(),
            ApodPayload::One(item) => vec![to_image(item)],
        };
        images.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(Batch::new(images))
    }
}

fn to_image(dto: ApodDto) -> ApodImage {
    ApodImage {
        id: dto.date.to_string(),
        date: dto.date,
        title: dto.title,
        explanation: dto.explanation,
        url: dto.url,
        hd_url: dto.hdurl,
        media_type: if dto.media_type == "video" { MediaType::Video } else { MediaType::Image },
        copyright: dto.copyright.map(|c| c.trim().to_string()),
        provenance: Provenance::Live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const PICTURES: &str = r#"[
        {"date":"2024-02-28","title":"Older","explanation":"e","url":"https://apod/a.jpg","media_type":"image"},
        {"date":"2024-03-01","title":"Newest","explanation":"e","url":"https://youtube/v","media_type":"video",
         "copyright":"\nJane Doe\n"}
    ]"#;

    #[tokio::test]
    async fn test_week_range_is_sorted_newest_first() {
        let transport = Arc::new(FakeTransport::new().route("/planetary/apod", 200, PICTURES));
        let api = ApodApi::new(transport.clone(), "https://api.nasa.gov", "DEMO_KEY".to_string());

        let batch = api.fetch(&FetchRequest::new(Vec::new(), DateRange::Week, 8)).await.unwrap();

        assert_eq!(batch.entities[0].title, "Newest");
        assert_eq!(batch.entities[0].id, "2024-03-01");
        assert_eq!(batch.entities[0].media_type, MediaType::Video);
        assert_eq!(batch.entities[0].copyright.as_deref(), Some("Jane Doe"));
        let call = &transport.calls()[0];
        assert!(call.contains("api_key=DEMO_KEY&start_date="));
        assert!(call.contains("&end_date="));
    }

    #[tokio::test]
    async fn test_random_range_uses_count() {
        let transport = Arc::new(FakeTransport::new().route("/planetary/apod", 200, PICTURES));
        let api = ApodApi::new(transport.clone(), "https://api.nasa.gov", "DEMO_KEY".to_string());

        api.fetch(&FetchRequest::new(Vec::new(), DateRange::Random, 30)).await.unwrap();
        assert!(transport.calls()[0].ends_with("count=30"));
    }

    #[tokio::test]
    async fn test_demo_key_quota() {
        let transport = Arc::new(FakeTransport::new().route(
            "/planetary/apod",
            429,
            r#"{"error":{"code":"OVER_RATE_LIMIT","message":"You have exceeded your rate limit."}}"#,
        ));
        let api = ApodApi::new(transport, "https://api.nasa.gov", "DEMO_KEY".to_string());
        let err = api.fetch(&FetchRequest::new(Vec::new(), DateRange::Month, 31)).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited(_)));
    }
}
