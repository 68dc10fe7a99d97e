// World Air Quality Index adapter - station feed per city
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::application::rate_governor::RateGovernor;
use crate::domain::air_quality::{city_display_name, AirQualityReading, AqiLevel, Continent, Pollutants, PRIORITY_AFRICAN_CITIES};
use crate::domain::entity::{slugify, Provenance};
use crate::domain::error::FetchError;
use crate::infrastructure::config::prepare_path;
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct WaqiApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: Option<String>,
    governor: Arc<RateGovernor>,
    patience: Duration,
}

#[derive(Debug, Deserialize)]
struct FeedDto {
    status: String,
    /// A station object on success, an error string otherwise.
    data: Value,
}

#[derive(Debug, Deserialize)]
struct StationDto {
    aqi: Value,
    city: Option<StationCityDto>,
    #[serde(default)]
    iaqi: HashMap<String, MeasureDto>,
    time: Option<StationTimeDto>,
}

#[derive(Debug, Deserialize)]
struct StationCityDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MeasureDto {
    v: f64,
}

#[derive(Debug, Deserialize)]
struct StationTimeDto {
    iso: Option<DateTime<FixedOffset>>,
}

impl WaqiApi {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        token: Option<String>,
        governor: Arc<RateGovernor>,
        patience: Duration,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            governor,
            patience,
        }
    }

    pub async fn feed(&self, city: &str, index: usize) -> Result<AirQualityReading, FetchError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| FetchError::Unauthorized("aqicn token".to_string()))?;
        // Feed paths take the dashed form, "addis-ababa".
        let slug = slugify(city);
        self.governor.acquire_within(self.patience).await?;

        let mut vars = HashMap::new();
        vars.insert("city".to_string(), slug.clone());
        let url = query_url(&self.base_url, &prepare_path("/feed/${city}/", &vars), &[("token", token)]);
        let feed: FeedDto = self.transport.get(HttpRequest::get(url)).await?.json(&slug)?;

        if feed.status != "ok" {
            let message = feed.data.as_str().unwrap_or("unknown error");
            return Err(match message {
                "Invalid key" => FetchError::Unauthorized(message.to_string()),
                "Over quota" => FetchError::RateLimited(message.to_string()),
                _ => FetchError::NotFound(slug),
            });
        }
        let station: StationDto =
            serde_json::from_value(feed.data).map_err(|e| FetchError::Malformed(format!("{slug}: {e}")))?;
        to_reading(&slug, index, station)
    }
}

fn to_reading(slug: &str, index: usize, station: StationDto) -> Result<AirQualityReading, FetchError> {
    // Stations without a current index report "-".
    let aqi = station
        .aqi
        .as_u64()
        .or_else(|| station.aqi.as_f64().map(|v| v.round() as u64))
        .ok_or_else(|| FetchError::NotFound(slug.to_string()))? as u32;
    let measure = |key: &str| station.iaqi.get(key).map(|m| m.v);
    let continent = if PRIORITY_AFRICAN_CITIES.contains(&slug) {
        Continent::Africa
    } else {
        Continent::for_search(slug)
    };

    Ok(AirQualityReading {
        id: format!("{slug}-{index}"),
        city: city_display_name(slug),
        station_name: station
            .city
            .map(|c| c.name)
            .unwrap_or_else(|| city_display_name(slug)),
        aqi,
        level: AqiLevel::from_aqi(aqi),
        pollutants: Pollutants {
            pm25: measure("pm25"),
            pm10: measure("pm10"),
            o3: measure("o3"),
            no2: measure("no2"),
            co: measure("co"),
        },
        continent,
        observed_at: station
            .time
            .and_then(|t| t.iso)
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        provenance: Provenance::Live,
    })
}

#[async_trait]
impl DataSource for WaqiApi {
    type Entity = AirQualityReading;
    type Options = ();

    fn name(&self) -> &'static str {
        "waqi"
    }

    fn has_credential(&self) -> bool {
        self.token.is_some()
    }

    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<AirQualityReading>, FetchError> {
        let mut readings = Vec::with_capacity(request.targets.len());
        let mut missing = Vec::new();
        let mut first_error = None;
        for (index, city) in request.targets.iter().enumerate() {
            match self.feed(city, index).await {
                Ok(reading) => readings.push(reading),
                Err(err) => {
                    tracing::debug!("waqi: no data for {}: {}", city, err);
                    missing.push(city.clone());
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if readings.is_empty() => Err(err),
            _ => Ok(Batch::new(readings).with_missing(missing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rate_governor::GovernorPolicy;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const NAIROBI: &str = r#"{"status":"ok","data":{"aqi":87,"idx":8672,
        "city":{"name":"Nairobi US Embassy, Kenya"},
        "iaqi":{"pm25":{"v":87},"pm10":{"v":40},"no2":{"v":12.5}},
        "time":{"s":"2024-03-01 13:00:00","tz":"+03:00","iso":"2024-03-01T13:00:00+03:00"}}}"#;

    fn api(transport: Arc<FakeTransport>) -> WaqiApi {
        WaqiApi::new(
            transport,
            "https://api.waqi.info",
            Some("t0k".to_string()),
            Arc::new(RateGovernor::new("waqi", GovernorPolicy::spacing(Duration::ZERO))),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_feed_mapping() {
        let transport = Arc::new(FakeTransport::new().route("/feed/nairobi/", 200, NAIROBI));
        let reading = api(transport.clone()).feed("Nairobi", 0).await.unwrap();

        assert_eq!(reading.id, "nairobi-0");
        assert_eq!(reading.city, "Nairobi");
        assert_eq!(reading.station_name, "Nairobi US Embassy, Kenya");
        assert_eq!(reading.level, AqiLevel::Moderate);
        assert_eq!(reading.pollutants.no2, Some(12.5));
        assert_eq!(reading.pollutants.o3, None);
        assert_eq!(reading.continent, Continent::Africa);
        assert_eq!(reading.observed_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(transport.calls()[0], "https://api.waqi.info/feed/nairobi/?token=t0k");
    }

    #[tokio::test]
    async fn test_unknown_station_and_missing_index() {
        let transport = Arc::new(
            FakeTransport::new()
                .route("/feed/atlantis/", 200, r#"{"status":"error","data":"Unknown station"}"#)
                .route("/feed/quiet-town/", 200, r#"{"status":"ok","data":{"aqi":"-","iaqi":{}}}"#)
                .route("/feed/nairobi/", 200, NAIROBI),
        );
        let api = api(transport);
        assert_eq!(api.feed("Atlantis", 0).await.unwrap_err(), FetchError::NotFound("atlantis".to_string()));
        assert!(matches!(api.feed("Quiet Town", 0).await, Err(FetchError::NotFound(_))));

        let request = FetchRequest::per_target(vec!["nairobi".to_string(), "atlantis".to_string()], ());
        let batch = api.fetch(&request).await.unwrap();
        assert_eq!(batch.entities.len(), 1);
        assert_eq!(batch.missing, vec!["atlantis"]);
    }
}
