// Library root - Fetch, fall back and render pipeline behind eight public-API dashboards
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
