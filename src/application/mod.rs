// Application layer - Fetch pipeline, per-dashboard use cases and view state
pub mod air_quality_service;
pub mod apod_service;
pub mod crypto_service;
pub mod data_source;
pub mod debounce;
pub mod fallback;
pub mod favorites;
pub mod github_service;
pub mod news_service;
pub mod pandemic_service;
pub mod pipeline;
pub mod rate_governor;
pub mod session;
pub mod stock_service;
pub mod view_state;
pub mod weather_service;
