// disease.sh adapter - per-country pandemic totals, restricted to African countries
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::domain::pandemic::{african_country, CountryStats};
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub struct DiseaseApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryDto {
    country_info: CountryInfoDto,
    #[serde(default)]
    cases: u64,
    #[serde(default)]
    deaths: u64,
    #[serde(default)]
    recovered: u64,
    #[serde(default)]
    active: u64,
    #[serde(default)]
    critical: u64,
    #[serde(default)]
    today_cases: u64,
    #[serde(default)]
    today_deaths: u64,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    tests: u64,
    /// Epoch milliseconds.
    updated: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CountryInfoDto {
    iso2: Option<String>,
    flag: Option<String>,
}

impl DiseaseApi {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DataSource for DiseaseApi {
    type Entity = CountryStats;
    type Options = ();

    fn name(&self) -> &'static str {
        "disease.sh"
    }

    /// Targets, when given, narrow the result to those ISO2 codes.
    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<CountryStats>, FetchError> {
        let url = query_url(&self.base_url, "/v3/covid-19/countries", &[]);
        let countries: Vec<CountryDto> = self.transport.get(HttpRequest::get(url)).await?.json("countries")?;

        let stats: Vec<CountryStats> = countries
            .into_iter()
            .filter_map(to_stats)
            .filter(|c| request.targets.is_empty() || request.targets.iter().any(|t| t.eq_ignore_ascii_case(&c.id)))
            .collect();
        let missing = request
            .targets
            .iter()
            .filter(|t| !stats.iter().any(|c| c.id.eq_ignore_ascii_case(t)))
            .cloned()
            .collect();
        tracing::debug!("disease.sh: {} african countries", stats.len());
        Ok(Batch::new(stats).with_missing(missing))
    }
}

/// None for countries outside the African list.
fn to_stats(dto: CountryDto) -> Option<CountryStats> {
    let iso2 = dto.country_info.iso2?;
    let (name, region) = african_country(&iso2)?;
    let vaccinated = if dto.population > 0 {
        (dto.tests as f64 / dto.population as f64 * 100.0).round() as u64
    } else {
        0
    };

    Some(CountryStats {
        id: iso2.to_uppercase(),
        name: name.to_string(),
        region: region.to_string(),
        cases: dto.cases,
        deaths: dto.deaths,
        recovered: dto.recovered,
        active: dto.active,
        critical: dto.critical,
        today_cases: dto.today_cases,
        today_deaths: dto.today_deaths,
        population: (dto.population as f64 / 1_000_000.0).round() as u64,
        vaccinated,
        flag: dto.country_info.flag,
        updated: dto
            .updated
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now),
        provenance: Provenance::Live,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const COUNTRIES: &str = r#"[
        {"country":"Kenya","countryInfo":{"iso2":"KE","flag":"https://flags/ke.png"},"cases":343000,
         "deaths":5689,"recovered":337000,"active":311,"critical":0,"todayCases":3,"todayDeaths":0,
         "population":56215221,"tests":4000000,"updated":1709287200000},
        {"country":"France","countryInfo":{"iso2":"FR"},"cases":40000000,"population":65000000},
        {"country":"Diamond Princess","countryInfo":{"iso2":null},"cases":712}
    ]"#;

    #[tokio::test]
    async fn test_only_african_countries_are_kept() {
        let transport = Arc::new(FakeTransport::new().route("/v3/covid-19/countries", 200, COUNTRIES));
        let api = DiseaseApi::new(transport, "https://disease.sh");

        let batch = api.fetch(&FetchRequest::new(Vec::new(), (), 54)).await.unwrap();

        assert_eq!(batch.entities.len(), 1);
        let kenya = &batch.entities[0];
        assert_eq!(kenya.name, "Kenya");
        assert_eq!(kenya.region, "East Africa");
        assert_eq!(kenya.population, 56);
        assert_eq!(kenya.vaccinated, 7);
        assert_eq!(kenya.updated.timestamp(), 1_709_287_200);
    }

    #[tokio::test]
    async fn test_requested_countries_absent_upstream_are_missing() {
        let transport = Arc::new(FakeTransport::new().route("/v3/covid-19/countries", 200, COUNTRIES));
        let api = DiseaseApi::new(transport, "https://disease.sh");

        let request = FetchRequest::per_target(vec!["ke".to_string(), "NG".to_string()], ());
        let batch = api.fetch(&request).await.unwrap();
        assert_eq!(batch.entities.len(), 1);
        assert_eq!(batch.missing, vec!["NG"]);
    }
}
