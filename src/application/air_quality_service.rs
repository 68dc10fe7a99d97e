// Air quality service - Use case for the African and global AQI dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::AirQualityFallback;
use crate::application::pipeline::{PartialPolicy, SharedPipeline};
use crate::application::session::DashboardSession;
use crate::domain::air_quality::{AirQualityReading, AqiLevel, Continent, GLOBAL_CITIES, PRIORITY_AFRICAN_CITIES};
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, SeriesData, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::entity::slugify;
use crate::domain::fetch_result::FetchResult;

const AFRICAN_SLOTS: usize = 15;
const GLOBAL_SLOTS: usize = 10;
const LEVELS: [AqiLevel; 6] = [
    AqiLevel::Good,
    AqiLevel::Moderate,
    AqiLevel::UnhealthyForSensitiveGroups,
    AqiLevel::Unhealthy,
    AqiLevel::VeryUnhealthy,
    AqiLevel::Hazardous,
];

#[derive(Clone)]
pub struct AirQualityService {
    pipeline: SharedPipeline<AirQualityReading, (), AirQualityFallback>,
}

impl AirQualityService {
    pub fn new(pipeline: SharedPipeline<AirQualityReading, (), AirQualityFallback>) -> Self {
        Self { pipeline }
    }

    /// Priority African cities first, then the global ones.
    pub fn default_targets() -> Vec<String> {
        PRIORITY_AFRICAN_CITIES
            .iter()
            .take(AFRICAN_SLOTS)
            .chain(GLOBAL_CITIES.iter().take(GLOBAL_SLOTS))
            .map(|slug| slug.to_string())
            .collect()
    }

    /// Stations that fail are dropped; only a total failure falls back to synthetic readings.
    pub async fn load(&self, origin: Origin) -> FetchResult<AirQualityReading> {
        let request = FetchRequest::per_target(Self::default_targets(), ()).with_origin(origin);
        self.pipeline.load_each(&request, PartialPolicy::Reduce).await
    }

    /// Puts the searched city at the front of its continent's list, which keeps its size limit.
    pub async fn search(&self, query: &str, current: &[AirQualityReading]) -> FetchResult<AirQualityReading> {
        let slug = slugify(query);
        if slug.is_empty() {
            return FetchResult::success(current.to_vec());
        }

        let request = FetchRequest::per_target(vec![slug.clone()], ()).with_origin(Origin::Search);
        let (hits, warning) = match self.pipeline.load(&request).await {
            FetchResult::Success { data, warning, .. } => (data, warning),
            other => return other,
        };
        tracing::info!("Air quality search for {} found {} stations", slug, hits.len());

        let mut merged: Vec<AirQualityReading> = Vec::with_capacity(current.len() + 1);
        for reading in hits.into_iter().chain(current.iter().cloned()) {
            if merged.iter().any(|r| r.city == reading.city) {
                continue;
            }
            let cap = match reading.continent {
                Continent::Africa => AFRICAN_SLOTS,
                Continent::Global => GLOBAL_SLOTS,
            };
            if merged.iter().filter(|r| r.continent == reading.continent).count() < cap {
                merged.push(reading);
            }
        }
        FetchResult::success_with(merged, warning)
    }

    pub fn dashboard(&self, session: &DashboardSession<AirQualityReading>) -> Dashboard<AirQualityReading> {
        let readings = session.entities();
        let average = if readings.is_empty() {
            0.0
        } else {
            readings.iter().map(|r| r.aqi as f64).sum::<f64>() / readings.len() as f64
        };
        let worst = readings.iter().map(|r| r.aqi).max().unwrap_or(0);
        let good = readings.iter().filter(|r| r.level == AqiLevel::Good).count();
        let unhealthy = readings.iter().filter(|r| r.aqi > 150).count();

        let tiles = vec![
            TileData::new("average", "Average AQI", "", average, 0),
            TileData::new("worst", "Worst AQI", "", worst as f64, 0),
            TileData::new("good", "Good Air", "cities", good as f64, 0),
            TileData::new("unhealthy", "Unhealthy", "cities", unhealthy as f64, 0),
        ];

        let by_city = readings
            .iter()
            .map(|r| ChartPoint::new(r.city.clone(), r.aqi as f64))
            .collect();
        let levels = LEVELS
            .iter()
            .filter_map(|level| {
                let count = readings.iter().filter(|r| r.level == *level).count();
                (count > 0).then(|| {
                    SeriesData::new(
                        level.label(),
                        level.label(),
                        Some(level.color().to_string()),
                        vec![ChartPoint::new(level.label(), count as f64)],
                    )
                })
            })
            .collect();
        let charts = vec![
            ChartData::single("aqi", "AQI by City", Some("AQI"), ChartKind::Bar, by_city),
            ChartData::new("levels", "Air Quality Levels", Some("cities"), ChartKind::Pie, levels),
        ];

        Dashboard::new("Air Quality".to_string(), tiles, charts, session.render())
            .with_notice(session.banner().visible().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data_source::FallbackGenerator;
    use crate::application::pipeline::Pipeline;
    use crate::application::rate_governor::{GovernorPolicy, RateGovernor};
    use crate::application::view_state::ViewState;
    use crate::domain::entity::Entity;
    use crate::domain::notice::Notice;
    use crate::infrastructure::http_client::testing::FakeTransport;
    use crate::infrastructure::waqi_api::WaqiApi;
    use std::sync::Arc;
    use std::time::Duration;

    fn feed(aqi: u32, station: &str) -> String {
        format!(r#"{{"status":"ok","data":{{"aqi":{aqi},"city":{{"name":"{station}"}},"iaqi":{{"pm25":{{"v":{aqi}}}}}}}}}"#)
    }

    fn service(transport: Arc<FakeTransport>) -> AirQualityService {
        let api = WaqiApi::new(
            transport,
            "https://api.waqi.info",
            Some("t0k".to_string()),
            Arc::new(RateGovernor::new("waqi", GovernorPolicy::spacing(Duration::ZERO))),
            Duration::ZERO,
        );
        AirQualityService::new(Pipeline::shared(
            Arc::new(api),
            AirQualityFallback::seeded(8),
            Duration::from_secs(12),
        ))
    }

    #[test]
    fn test_default_targets() {
        let targets = AirQualityService::default_targets();
        assert_eq!(targets.len(), 25);
        assert_eq!(targets[0], "nairobi");
        assert_eq!(targets[15], "beijing");
    }

    #[tokio::test]
    async fn test_failed_stations_reduce_the_set() {
        let transport = Arc::new(
            FakeTransport::new()
                .route("/feed/nairobi/", 200, &feed(42, "Nairobi"))
                .route("/feed/tokyo/", 200, &feed(160, "Tokyo")),
        );
        let result = service(transport.clone()).load(Origin::Initial).await;

        assert_eq!(transport.call_count(), 25);
        assert_eq!(result.data().len(), 2);
        assert!(result.is_live());
        match result.warning() {
            Some(Notice::PartialData { missing }) => assert_eq!(missing.len(), 23),
            other => panic!("unexpected notice {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_total_outage_falls_back() {
        let result = service(Arc::new(FakeTransport::new())).load(Origin::Initial).await;
        assert_eq!(result.data().len(), 25);
        assert!(result.data().iter().all(|r| r.is_synthetic()));
        assert!(result.warning().is_some_and(Notice::is_demo));
    }

    #[tokio::test]
    async fn test_search_prepends_and_caps() {
        let service = service(Arc::new(FakeTransport::new().route("/feed/kigali/", 200, &feed(75, "Kigali"))));
        let current = AirQualityFallback::seeded(1).generate(&AirQualityService::default_targets(), 25);

        let result = service.search(" Kigali ", &current).await;
        let data = result.data();

        assert_eq!(data[0].city, "Kigali");
        assert!(!data[0].is_synthetic());
        assert_eq!(data.iter().filter(|r| r.continent == Continent::Africa).count(), AFRICAN_SLOTS);
        assert_eq!(data.iter().filter(|r| r.continent == Continent::Global).count(), GLOBAL_SLOTS);
        assert!(!data.iter().any(|r| r.city == "Dakar"));
    }

    #[tokio::test]
    async fn test_dashboard_filters_by_continent() {
        let service = service(Arc::new(FakeTransport::new()));
        let mut session = DashboardSession::new(ViewState::default().with_sort("aqi"));
        let ticket = session.begin(Origin::Initial);
        session.complete(ticket, service.load(Origin::Initial).await);

        session.view.set_filter(Some("global"));
        let board = service.dashboard(&session);
        assert_eq!(board.page.total, GLOBAL_SLOTS);
        let aqis: Vec<u32> = board.page.entities().map(|r| r.aqi).collect();
        assert!(aqis.windows(2).all(|w| w[0] >= w[1]));
        let level_total: f64 = board.charts[1].series.iter().map(|s| s.points[0].value).sum();
        assert_eq!(level_total, 25.0);
    }
}
