// Weather service - Use case for the city weather watchlist dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::{CitySearchFallback, WeatherFallback};
use crate::application::pipeline::{PartialPolicy, SharedPipeline};
use crate::application::session::DashboardSession;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;
use crate::domain::watchlist::Watchlist;
use crate::domain::weather::{summarize, City, CityWeather};

const MIN_QUERY_CHARS: usize = 2;
const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Clone)]
pub struct WeatherService {
    weather: SharedPipeline<CityWeather, (), WeatherFallback>,
    cities: SharedPipeline<City, (), CitySearchFallback>,
}

impl WeatherService {
    pub fn new(
        weather: SharedPipeline<CityWeather, (), WeatherFallback>,
        cities: SharedPipeline<City, (), CitySearchFallback>,
    ) -> Self {
        Self { weather, cities }
    }

    /// Current weather for every watched city, in watchlist order. Cities that fail are back-filled.
    pub async fn load(&self, watchlist: &Watchlist<City>, origin: Origin) -> FetchResult<CityWeather> {
        let targets: Vec<String> = watchlist.items().iter().map(City::target).collect();
        tracing::info!("Loading weather for {} cities", targets.len());
        let request = FetchRequest::per_target(targets, ()).with_origin(origin);
        self.weather.load_each(&request, PartialPolicy::Backfill).await
    }

    /// Geocoding search. Short queries return nothing without a call.
    pub async fn search_cities(&self, query: &str) -> FetchResult<City> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return FetchResult::success(Vec::new());
        }
        let offline = CitySearchFallback::matching(query).len().min(MAX_SEARCH_RESULTS);
        let request = FetchRequest::new(vec![query.to_string()], (), offline).with_origin(Origin::Search);
        self.cities.load(&request).await
    }

    /// Temperatures are shown in the session's unit system.
    pub fn dashboard(&self, session: &DashboardSession<CityWeather>) -> Dashboard<CityWeather> {
        let readings = session.entities();
        let units = session.view.units;
        let summary = summarize(readings);

        let tiles = vec![
            TileData::new("average", "Average Temperature", units.symbol(), units.convert(summary.average), 0),
            TileData::new("highest", "Highest", units.symbol(), units.convert(summary.highest), 0),
            TileData::new("lowest", "Lowest", units.symbol(), units.convert(summary.lowest), 0),
            TileData::new("cities", "Cities", "", readings.len() as f64, 0),
        ];

        let temperatures = readings
            .iter()
            .map(|r| ChartPoint::new(r.city_name.clone(), units.convert(r.temperature)))
            .collect();
        let humidity = readings
            .iter()
            .map(|r| ChartPoint::new(r.city_name.clone(), r.humidity as f64))
            .collect();
        let charts = vec![
            ChartData::single("temperature", "Temperature", Some(units.symbol()), ChartKind::Bar, temperatures),
            ChartData::single("humidity", "Humidity", Some("%"), ChartKind::Bar, humidity),
        ];

        Dashboard::new("African Weather".to_string(), tiles, charts, session.render())
            .with_notice(session.banner().visible().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::Pipeline;
    use crate::application::view_state::ViewState;
    use crate::domain::entity::Entity;
    use crate::domain::notice::Notice;
    use crate::domain::weather::{default_cities, UnitSystem};
    use crate::infrastructure::http_client::testing::FakeTransport;
    use crate::infrastructure::openweather_api::{CitySearch, OpenWeatherApi};
    use std::sync::Arc;
    use std::time::Duration;

    const LAGOS: &str = r#"{"weather":[{"main":"Rain","description":"light rain"}],
        "main":{"temp":30.2,"feels_like":34.0,"humidity":78,"pressure":1010},
        "wind":{"speed":2.0},"sys":{"sunrise":1699941600,"sunset":1699985400},"timezone":3600}"#;

    fn service(transport: Arc<FakeTransport>, key: Option<&str>) -> WeatherService {
        let api = Arc::new(OpenWeatherApi::new(
            transport,
            "https://api.openweathermap.org",
            key.map(str::to_string),
        ));
        let timeout = Duration::from_secs(12);
        WeatherService::new(
            Pipeline::shared(api.clone(), WeatherFallback::seeded(11), timeout),
            Pipeline::shared(Arc::new(CitySearch(api)), CitySearchFallback, timeout),
        )
    }

    fn watchlist(names: &[&str]) -> Watchlist<City> {
        Watchlist::from_items(names.iter().map(|n| City::parse_target(n)))
    }

    #[tokio::test]
    async fn test_missing_key_serves_synthetic_readings_without_calls() {
        let transport = Arc::new(FakeTransport::new());
        let service = service(transport.clone(), None);

        let result = service.load(&watchlist(&["Nairobi", "Lagos"]), Origin::Initial).await;

        assert!(result.is_success());
        assert_eq!(result.data().len(), 2);
        assert!(result.data().iter().all(|r| r.is_synthetic()));
        assert!(result.data().iter().all(|r| !r.description.is_empty()));
        assert_eq!(result.warning(), Some(&Notice::DemoData));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_city_is_backfilled_in_place() {
        let transport = Arc::new(
            FakeTransport::new()
                .route("q=Lagos", 200, LAGOS)
                .route("q=Nairobi", 503, ""),
        );
        let service = service(transport, Some("k3y"));

        let result = service.load(&watchlist(&["Nairobi", "Lagos"]), Origin::Initial).await;
        let data = result.data();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0].city_id, "nairobi-ke");
        assert!(data[0].is_synthetic());
        assert_eq!(data[1].condition.as_str(), "rainy");
        assert!(!data[1].is_synthetic());
        assert_eq!(
            result.warning(),
            Some(&Notice::PartialData {
                missing: vec!["Nairobi,KE".to_string()]
            })
        );
    }

    #[tokio::test]
    async fn test_city_search_rules() {
        let transport = Arc::new(FakeTransport::new().route("/geo/1.0/direct", 500, ""));
        let service = service(transport.clone(), Some("k3y"));

        let short = service.search_cities("k").await;
        assert!(short.data().is_empty());
        assert_eq!(transport.call_count(), 0);

        // Geocoding is down, so the offline list answers.
        let found = service.search_cities("kampala").await;
        assert_eq!(found.data().len(), 1);
        assert_eq!(found.data()[0].id, "kampala-ug");
        assert!(found.warning().is_some_and(Notice::is_demo));
    }

    #[tokio::test]
    async fn test_dashboard_converts_units() {
        let service = service(Arc::new(FakeTransport::new()), None);
        let mut session = DashboardSession::new(ViewState::default());
        let ticket = session.begin(Origin::Initial);
        let cities = Watchlist::from_items(default_cities());
        session.complete(ticket, service.load(&cities, Origin::Initial).await);

        let metric = service.dashboard(&session);
        assert_eq!(metric.page.total, 6);
        assert_eq!(metric.tiles[0].unit, "°C");
        assert_eq!(metric.notice, Some(Notice::DemoData));

        session.view.units = UnitSystem::Imperial;
        let imperial = service.dashboard(&session);
        assert_eq!(imperial.tiles[0].unit, "°F");
        assert!(imperial.tiles[1].value > metric.tiles[1].value);
    }
}
