// Application state for route handlers
use crate::application::air_quality_service::AirQualityService;
use crate::application::apod_service::ApodService;
use crate::application::crypto_service::CryptoService;
use crate::application::fallback::{
    AirQualityFallback, ApodFallback, CitySearchFallback, CryptoFallback, GithubFallback, NewsFallback,
    PandemicFallback, StockFallback, SymbolSearchFallback, WeatherFallback,
};
use crate::application::favorites::KeyValueStore;
use crate::application::github_service::GithubService;
use crate::application::news_service::NewsService;
use crate::application::pandemic_service::PandemicService;
use crate::application::pipeline::Pipeline;
use crate::application::rate_governor::RateGovernor;
use crate::application::stock_service::StockService;
use crate::application::weather_service::WeatherService;
use crate::infrastructure::alpha_vantage_api::{AlphaVantageApi, QuoteSource, SymbolSearchSource};
use crate::infrastructure::apod_api::ApodApi;
use crate::infrastructure::coingecko_api::CoinGeckoApi;
use crate::infrastructure::config::{AppConfig, Credentials, DebounceSettings};
use crate::infrastructure::disease_api::DiseaseApi;
use crate::infrastructure::favorites_store::JsonFileStore;
use crate::infrastructure::github_api::GithubApi;
use crate::infrastructure::http_client::{HttpTransport, ReqwestTransport};
use crate::infrastructure::newsapi_api::NewsApi;
use crate::infrastructure::openweather_api::{CitySearch, OpenWeatherApi};
use crate::infrastructure::waqi_api::WaqiApi;
use crate::presentation::routes::DashboardKind;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub github_service: GithubService,
    pub weather_service: WeatherService,
    pub crypto_service: CryptoService,
    pub stock_service: StockService,
    pub news_service: NewsService,
    pub air_quality_service: AirQualityService,
    pub pandemic_service: PandemicService,
    pub apod_service: ApodService,
    pub credentials: Credentials,
    pub debounce: DebounceSettings,
    pub page_size: usize,
}

impl AppState {
    /// Real HTTP and the on-disk favorites store.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.http.user_agent, config.http.timeout())?);
        let store = Arc::new(JsonFileStore::new(config.storage.dir.clone()));
        Ok(Self::build(config, transport, store))
    }

    pub fn build(config: &AppConfig, transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        let credentials = config.credentials.clone();
        let endpoints = &config.endpoints;
        let governors = &config.governors;
        let timeout = config.http.timeout();

        let github = GithubApi::new(
            transport.clone(),
            &endpoints.github,
            credentials.github_token.clone(),
            config.paging.github_per_page,
            config.paging.gists_per_page,
        );

        let openweather = Arc::new(OpenWeatherApi::new(
            transport.clone(),
            &endpoints.openweather,
            credentials.openweather_api_key.clone(),
        ));

        let coingecko = CoinGeckoApi::new(transport.clone(), &endpoints.coingecko);

        // Governed adapters may wait for a slot inside the call, so their budget includes the patience.
        let stocks_governor = Arc::new(RateGovernor::new("alpha-vantage", governors.stocks.policy()));
        let alpha_vantage = Arc::new(AlphaVantageApi::new(
            transport.clone(),
            &endpoints.alpha_vantage,
            credentials.alpha_vantage_api_key.clone(),
            stocks_governor,
            governors.stocks.patience(),
        ));
        let stocks_timeout = timeout + governors.stocks.patience();

        let news = NewsApi::new(
            transport.clone(),
            &endpoints.newsapi,
            credentials.newsapi_key.clone(),
            Arc::new(RateGovernor::new("newsapi", governors.news.policy())),
            governors.news.patience(),
            config.paging.news_page_size,
        );

        let waqi = WaqiApi::new(
            transport.clone(),
            &endpoints.waqi,
            credentials.aqicn_token.clone(),
            Arc::new(RateGovernor::new("waqi", governors.air_quality.policy())),
            governors.air_quality.patience(),
        );

        let disease = DiseaseApi::new(transport.clone(), &endpoints.disease);
        let apod = ApodApi::new(transport, &endpoints.apod, credentials.nasa_key());

        Self {
            github_service: GithubService::new(Pipeline::shared(Arc::new(github), GithubFallback::default(), timeout)),
            weather_service: WeatherService::new(
                Pipeline::shared(openweather.clone(), WeatherFallback::default(), timeout),
                Pipeline::shared(Arc::new(CitySearch(openweather)), CitySearchFallback, timeout),
            ),
            crypto_service: CryptoService::new(
                Pipeline::shared(Arc::new(coingecko), CryptoFallback::default(), timeout),
                config.paging.crypto_per_page,
            ),
            stock_service: StockService::new(
                Pipeline::shared(Arc::new(QuoteSource(alpha_vantage.clone())), StockFallback::default(), stocks_timeout),
                Pipeline::shared(Arc::new(SymbolSearchSource(alpha_vantage)), SymbolSearchFallback, stocks_timeout),
                governors.stocks.live_quota,
            ),
            news_service: NewsService::new(
                Pipeline::shared(
                    Arc::new(news),
                    NewsFallback::default(),
                    timeout + governors.news.patience(),
                ),
                config.paging.news_page_size,
            ),
            air_quality_service: AirQualityService::new(Pipeline::shared(
                Arc::new(waqi),
                AirQualityFallback::default(),
                timeout + governors.air_quality.patience(),
            )),
            pandemic_service: PandemicService::new(Pipeline::shared(
                Arc::new(disease),
                PandemicFallback::default(),
                timeout,
            )),
            apod_service: ApodService::new(Pipeline::shared(Arc::new(apod), ApodFallback::default(), timeout), store),
            credentials,
            debounce: config.debounce.clone(),
            page_size: config.paging.page_size,
        }
    }

    /// Whether the dashboard can reach its upstream, or serves demo data only.
    pub fn is_live(&self, kind: DashboardKind) -> bool {
        match kind {
            DashboardKind::Weather => self.credentials.openweather_api_key.is_some(),
            DashboardKind::Stocks => self.credentials.alpha_vantage_api_key.is_some(),
            DashboardKind::News => self.credentials.newsapi_key.is_some(),
            DashboardKind::AirQuality => self.credentials.aqicn_token.is_some(),
            DashboardKind::Github | DashboardKind::Crypto | DashboardKind::Pandemic | DashboardKind::Astronomy => true,
        }
    }
}
