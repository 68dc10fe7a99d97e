// Domain layer - Entity shapes, fetch outcomes and display models
pub mod air_quality;
pub mod astronomy;
pub mod chart;
pub mod crypto;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod fetch_result;
pub mod github;
pub mod news;
pub mod notice;
pub mod pandemic;
pub mod stock;
pub mod watchlist;
pub mod weather;
