// Static route table
use crate::infrastructure::config::DebounceSettings;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Github,
    Weather,
    Crypto,
    Stocks,
    News,
    AirQuality,
    Pandemic,
    Astronomy,
}

pub const DASHBOARDS: [DashboardKind; 8] = [
    DashboardKind::Github,
    DashboardKind::Weather,
    DashboardKind::Crypto,
    DashboardKind::Stocks,
    DashboardKind::News,
    DashboardKind::AirQuality,
    DashboardKind::Pandemic,
    DashboardKind::Astronomy,
];

impl DashboardKind {
    pub fn path(&self) -> &'static str {
        match self {
            DashboardKind::Github => "/dashboard-01",
            DashboardKind::Weather => "/dashboard-02",
            DashboardKind::Crypto => "/dashboard-03",
            DashboardKind::Stocks => "/dashboard-04",
            DashboardKind::News => "/dashboard-05",
            DashboardKind::AirQuality => "/dashboard-06",
            DashboardKind::Pandemic => "/dashboard-07",
            DashboardKind::Astronomy => "/dashboard-08",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DashboardKind::Github => "GitHub Profile",
            DashboardKind::Weather => "African Weather",
            DashboardKind::Crypto => "Crypto Markets",
            DashboardKind::Stocks => "Stock Watchlist",
            DashboardKind::News => "News",
            DashboardKind::AirQuality => "Air Quality",
            DashboardKind::Pandemic => "Pandemic Tracker",
            DashboardKind::Astronomy => "Astronomy Picture of the Day",
        }
    }

    /// How long typing must pause before a search on this dashboard runs.
    pub fn quiet_period(&self, debounce: &DebounceSettings) -> Duration {
        match self {
            DashboardKind::Weather => Duration::from_millis(debounce.weather_ms),
            DashboardKind::News => Duration::from_millis(debounce.news_ms),
            DashboardKind::AirQuality => Duration::from_millis(debounce.air_quality_ms),
            _ => Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Dashboard(DashboardKind),
}

/// A resolved path plus its decoded query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub route: Route,
    pub params: HashMap<String, String>,
}

impl RouteRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }
}

/// `None` for paths outside the table.
pub fn resolve(target: &str) -> Option<RouteRequest> {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let route = if path == "/" {
        Route::Index
    } else {
        Route::Dashboard(DASHBOARDS.into_iter().find(|kind| kind.path() == path)?)
    };
    Some(RouteRequest {
        route,
        params: parse_query(query),
    })
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(value: &str) -> String {
    let value = value.replace('+', " ");
    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value,
    }
}
