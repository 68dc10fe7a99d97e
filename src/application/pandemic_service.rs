// Pandemic service - Use case for the African pandemic statistics dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::PandemicFallback;
use crate::application::pipeline::SharedPipeline;
use crate::application::session::DashboardSession;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, SeriesData, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;
use crate::domain::pandemic::{calculate_stats, CountryStats, HeatMetric, AFRICAN_COUNTRIES};

const TOP_COUNTRIES: usize = 10;

#[derive(Clone)]
pub struct PandemicService {
    pipeline: SharedPipeline<CountryStats, (), PandemicFallback>,
}

impl PandemicService {
    pub fn new(pipeline: SharedPipeline<CountryStats, (), PandemicFallback>) -> Self {
        Self { pipeline }
    }

    /// Every African country, most cases first.
    pub async fn load(&self, origin: Origin) -> FetchResult<CountryStats> {
        let request = FetchRequest::new(Vec::new(), (), AFRICAN_COUNTRIES.len()).with_origin(origin);
        match self.pipeline.load(&request).await {
            FetchResult::Success {
                mut data,
                fetched_at,
                warning,
            } => {
                data.sort_by(|a, b| b.cases.cmp(&a.cases));
                FetchResult::Success {
                    data,
                    fetched_at,
                    warning,
                }
            }
            other => other,
        }
    }

    pub fn dashboard(&self, session: &DashboardSession<CountryStats>, metric: HeatMetric) -> Dashboard<CountryStats> {
        let countries = session.entities();
        let stats = calculate_stats(countries);

        let tiles = vec![
            TileData::new("cases", "Total Cases", "M", stats.total_cases as f64 / 1_000_000.0, 2),
            TileData::new("deaths", "Total Deaths", "K", stats.total_deaths as f64 / 1_000.0, 1),
            TileData::new("recovered", "Recovered", "M", stats.total_recovered as f64 / 1_000_000.0, 2),
            TileData::new("active", "Active Cases", "K", stats.active_cases as f64 / 1_000.0, 1),
            TileData::new("vaccination", "Avg Vaccination", "%", stats.avg_vaccination, 0),
            TileData::new("mortality", "Mortality Rate", "%", stats.mortality_rate, 2),
            TileData::new("recovery", "Recovery Rate", "%", stats.recovery_rate, 1),
            TileData::new("countries", "Countries", "", stats.affected_countries as f64, 0),
        ];

        let mut ranked: Vec<&CountryStats> = countries.iter().collect();
        ranked.sort_by(|a, b| b.cases.cmp(&a.cases));
        let top = ranked
            .iter()
            .take(TOP_COUNTRIES)
            .map(|c| ChartPoint::new(c.name.clone(), c.cases as f64))
            .collect();

        // Countries sharing a fill colour form one series so the map legend stays small.
        let mut buckets: Vec<SeriesData> = Vec::new();
        for country in countries {
            let color = metric.color(country);
            let point = ChartPoint::new(country.name.clone(), heat_value(metric, country));
            match buckets.iter_mut().find(|s| s.color.as_deref() == Some(color)) {
                Some(series) => series.points.push(point),
                None => buckets.push(SeriesData::new(color, color, Some(color.to_string()), vec![point])),
            }
        }
        let (heat_id, heat_title) = match metric {
            HeatMetric::Cases => ("heat-cases", "Cases Heat Map"),
            HeatMetric::Deaths => ("heat-deaths", "Deaths Heat Map"),
            HeatMetric::Vaccinated => ("heat-vaccinated", "Vaccination Heat Map"),
        };

        let charts = vec![
            ChartData::single("top-cases", "Top 10 Countries by Cases", Some("cases"), ChartKind::Bar, top),
            ChartData::new(heat_id, heat_title, None, ChartKind::Heat, buckets),
        ];

        Dashboard::new("Pandemic Tracker".to_string(), tiles, charts, session.render())
            .with_notice(session.banner().visible().cloned())
    }
}

fn heat_value(metric: HeatMetric, country: &CountryStats) -> f64 {
    match metric {
        HeatMetric::Cases => country.cases as f64,
        HeatMetric::Deaths => country.deaths as f64,
        HeatMetric::Vaccinated => country.vaccinated as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::Pipeline;
    use crate::application::view_state::ViewState;
    use crate::domain::entity::Entity;
    use crate::domain::notice::Notice;
    use crate::infrastructure::disease_api::DiseaseApi;
    use crate::infrastructure::http_client::testing::FakeTransport;
    use std::sync::Arc;
    use std::time::Duration;

    const COUNTRIES: &str = r#"[
        {"countryInfo":{"iso2":"KE","flag":"ke.png"},"cases":340000,"deaths":5600,"recovered":330000,"population":54000000,"tests":4000000},
        {"countryInfo":{"iso2":"FR","flag":"fr.png"},"cases":39000000,"deaths":167000,"recovered":38000000,"population":65000000,"tests":270000000},
        {"countryInfo":{"iso2":"ZA","flag":"za.png"},"cases":4070000,"deaths":102000,"recovered":3910000,"population":60000000,"tests":25000000}
    ]"#;

    fn service(transport: Arc<FakeTransport>) -> PandemicService {
        let api = DiseaseApi::new(transport, "https://disease.sh");
        PandemicService::new(Pipeline::shared(Arc::new(api), PandemicFallback::seeded(3), Duration::from_secs(12)))
    }

    #[tokio::test]
    async fn test_keeps_african_countries_sorted_by_cases() {
        let transport = Arc::new(FakeTransport::new().route("/v3/covid-19/countries", 200, COUNTRIES));
        let result = service(transport).load(Origin::Initial).await;

        let ids: Vec<&str> = result.data().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ZA", "KE"]);
        assert!(result.is_live());
        assert_eq!(result.warning(), None);
    }

    #[tokio::test]
    async fn test_outage_covers_the_continent() {
        let result = service(Arc::new(FakeTransport::new())).load(Origin::Initial).await;

        assert_eq!(result.data().len(), 54);
        assert!(result.data().iter().all(|c| c.is_synthetic()));
        assert!(result.data().windows(2).all(|w| w[0].cases >= w[1].cases));
        assert!(matches!(result.warning(), Some(Notice::FallbackData { .. })));
    }

    #[tokio::test]
    async fn test_dashboard_heat_buckets_cover_every_country() {
        let service = service(Arc::new(FakeTransport::new()));
        let mut session = DashboardSession::new(ViewState::default());
        let ticket = session.begin(Origin::Initial);
        session.complete(ticket, service.load(Origin::Initial).await);

        let board = service.dashboard(&session, HeatMetric::Vaccinated);
        assert_eq!(board.tiles.len(), 8);
        assert_eq!(board.tiles[7].value, 54.0);
        assert_eq!(board.charts[0].series[0].points.len(), TOP_COUNTRIES);

        let heat = &board.charts[1];
        assert_eq!(heat.id, "heat-vaccinated");
        let mapped: usize = heat.series.iter().map(|s| s.points.len()).sum();
        assert_eq!(mapped, 54);
        assert!(heat.series.iter().all(|s| s.color.is_some()));
    }
}
