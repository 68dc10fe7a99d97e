// Infrastructure layer - External dependencies and adapters
pub mod alpha_vantage_api;
pub mod apod_api;
pub mod coingecko_api;
pub mod config;
pub mod disease_api;
pub mod favorites_store;
pub mod github_api;
pub mod http_client;
pub mod newsapi_api;
pub mod openweather_api;
pub mod waqi_api;
