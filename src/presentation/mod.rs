// Presentation layer - Route table, handlers and shared state
pub mod app_state;
pub mod handlers;
pub mod routes;
