// OpenWeatherMap adapter - current conditions per city and city geocoding
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::domain::pandemic::african_country;
use crate::domain::weather::{City, CityWeather, Condition};
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;

const GEOCODE_LIMIT: &str = "5";
/// UV needs a separate paid call; a mid-scale value is shown instead.
const DEFAULT_UV_INDEX: u8 = 5;
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

pub struct OpenWeatherApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentDto {
    main: MainDto,
    #[serde(default)]
    wind: WindDto,
    visibility: Option<f64>,
    #[serde(default)]
    weather: Vec<ConditionDto>,
    sys: SysDto,
    /// Shift from UTC in seconds.
    #[serde(default)]
    timezone: i32,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainDto {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Default, Deserialize)]
struct WindDto {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionDto {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct SysDto {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct GeoDto {
    name: String,
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl OpenWeatherApi {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| FetchError::Unauthorized("openweather api key".to_string()))
    }

    async fn current(&self, target: &str) -> Result<CityWeather, FetchError> {
        let city = City::parse_target(target);
        let query = city.target();
        let url = query_url(
            &self.base_url,
            "/data/2.5/weather",
            &[("q", query.as_str()), ("appid", self.key()?), ("units", "metric")],
        );
        let dto: CurrentDto = self.transport.get(HttpRequest::get(url)).await?.json(target)?;
        to_weather(&city, dto)
    }

    async fn geocode(&self, query: &str) -> Result<Vec<City>, FetchError> {
        let url = query_url(
            &self.base_url,
            "/geo/1.0/direct",
            &[("q", query), ("limit", GEOCODE_LIMIT), ("appid", self.key()?)],
        );
        let places: Vec<GeoDto> = self.transport.get(HttpRequest::get(url)).await?.json(query)?;
        Ok(places.into_iter().map(to_city).collect())
    }
}

#[async_trait]
impl DataSource for OpenWeatherApi {
    type Entity = CityWeather;
    type Options = ();

    fn name(&self) -> &'static str {
        "openweather"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<CityWeather>, FetchError> {
        let outcomes = join_all(request.targets.iter().map(|t| self.current(t))).await;

        let mut readings = Vec::with_capacity(outcomes.len());
        let mut missing = Vec::new();
        let mut first_error = None;
        for (target, outcome) in request.targets.iter().zip(outcomes) {
            match outcome {
                Ok(reading) => readings.push(reading),
                Err(err) => {
                    missing.push(target.clone());
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

/// City lookup backed by the geocoding endpoint.
pub struct CitySearch(pub Arc<OpenWeatherApi>);

#[async_trait]
impl DataSource for CitySearch {
    type Entity = City;
    type Options = ();

    fn name(&self) -> &'static str {
        "openweather-geocoding"
    }

    fn has_credential(&self) -> bool {
        self.0.has_credential()
    }

    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<City>, FetchError> {
        Ok(Batch::new(self.0.geocode(request.target().trim()).await?))
    }
}

fn to_weather(city: &City, dto: CurrentDto) -> Result<CityWeather, FetchError> {
    let condition = dto
        .weather
        .first()
        .ok_or_else(|| FetchError::Malformed(format!("{}: no weather conditions", city.name)))?;
    let offset = FixedOffset::east_opt(dto.timezone).unwrap_or_else(|| Utc.fix());

    Ok(CityWeather {
        city_id: city.id.clone(),
        city_name: city.name.clone(),
        country_code: city.country_code.clone(),
        temperature: dto.main.temp.round(),
        feels_like: dto.main.feels_like.round(),
        humidity: dto.main.humidity,
        wind_speed_kmh: (dto.wind.speed * 3.6).round(),
        pressure: dto.main.pressure,
        visibility_km: dto
            .visibility
            .map(|metres| (metres / 1000.0).round())
            .unwrap_or(DEFAULT_VISIBILITY_KM),
        uv_index: DEFAULT_UV_INDEX,
        condition: Condition::from_upstream(&condition.main),
        description: condition.description.clone(),
        sunrise: clock_time(dto.sys.sunrise, offset),
        sunset: clock_time(dto.sys.sunset, offset),
        observed_at: dto
            .dt
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now),
        provenance: Provenance::Live,
    })
}

/// Unix seconds -> "HH:MM" in the city's own time zone.
fn clock_time(unix: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|at| at.with_timezone(&offset).format("%H:%M").to_string())
        .unwrap_or_default()
}

fn to_city(place: GeoDto) -> City {
    let country = african_country(&place.country)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| place.country.clone());
    City {
        id: City::make_id(&place.name, &place.country),
        name: place.name,
        country,
        country_code: place.country,
        state: place.state.filter(|s| !s.is_empty()),
        lat: Some(place.lat),
        lon: Some(place.lon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const NAIROBI: &str = r#"{"weather":[{"main":"Clouds","description":"broken clouds"}],
        "main":{"temp":21.6,"feels_like":21.2,"humidity":60,"pressure":1018},
        "visibility":9000,"wind":{"speed":5.0},"dt":1700000000,
        "sys":{"sunrise":1699934400,"sunset":1699978200},"timezone":10800}"#;

    fn api(transport: Arc<FakeTransport>, key: Option<&str>) -> OpenWeatherApi {
        OpenWeatherApi::new(transport, "https://api.openweathermap.org", key.map(str::to_string))
    }

    #[tokio::test]
    async fn test_current_weather_mapping() {
        let transport = Arc::new(FakeTransport::new().route("q=Nairobi%2CKE", 200, NAIROBI));
        let request = FetchRequest::per_target(vec!["nairobi-ke".to_string()], ());

        let batch = api(transport.clone(), Some("k3y")).fetch(&request).await.unwrap();
        let reading = &batch.entities[0];

        assert_eq!(reading.city_id, "nairobi-ke");
        assert_eq!(reading.temperature, 22.0);
        assert_eq!(reading.wind_speed_kmh, 18.0);
        assert_eq!(reading.visibility_km, 9.0);
        assert_eq!(reading.uv_index, 5);
        assert_eq!(reading.condition, Condition::Cloudy);
        assert_eq!(reading.sunrise, "07:00");
        assert!(transport.calls()[0].contains("units=metric"));
    }

    #[tokio::test]
    async fn test_partial_targets_are_reported_missing() {
        let transport = Arc::new(
            FakeTransport::new()
                .route("q=Nairobi", 200, NAIROBI)
                .route("q=Atlantis", 404, r#"{"cod":"404","message":"city not found"}"#),
        );
        let request = FetchRequest::per_target(vec!["Nairobi".to_string(), "Atlantis".to_string()], ());

        let batch = api(transport, Some("k3y")).fetch(&request).await.unwrap();
        assert_eq!(batch.entities.len(), 1);
        assert_eq!(batch.missing, vec!["Atlantis"]);

        let only_missing = FetchRequest::per_target(vec!["Atlantis".to_string()], ());
        let transport = Arc::new(FakeTransport::new().route("q=Atlantis", 404, "{}"));
        let err = api(transport, Some("k3y")).fetch(&only_missing).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("Atlantis".to_string()));
    }

    #[tokio::test]
    async fn test_geocoding() {
        let transport = Arc::new(FakeTransport::new().route(
            "/geo/1.0/direct",
            200,
            r#"[{"name":"Kigali","country":"RW","lat":-1.95,"lon":30.06},
                {"name":"Kigali","country":"US","state":"Texas","lat":1.0,"lon":2.0}]"#,
        ));
        let search = CitySearch(Arc::new(api(transport.clone(), Some("k3y"))));

        let batch = search.fetch(&FetchRequest::new(vec!["kigali".to_string()], (), 5)).await.unwrap();
        assert_eq!(batch.entities[0].id, "kigali-rw");
        assert_eq!(batch.entities[0].country, "Rwanda");
        assert_eq!(batch.entities[1].state.as_deref(), Some("Texas"));
        assert!(transport.calls()[0].contains("limit=5"));
    }

    #[test]
    fn test_missing_key_means_no_credential() {
        assert!(!api(Arc::new(FakeTransport::new()), None).has_credential());
    }
}
