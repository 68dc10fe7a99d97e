// Route handlers - One fetch cycle per request, rendered to a JSON display model
use crate::application::data_source::Origin;
use crate::application::github_service::DEFAULT_USER;
use crate::application::session::DashboardSession;
use crate::application::view_state::ViewState;
use crate::domain::astronomy::DateRange;
use crate::domain::dashboard::Dashboard;
use crate::domain::entity::Entity;
use crate::domain::fetch_result::FetchResult;
use crate::domain::news::relative_time;
use crate::domain::pandemic::HeatMetric;
use crate::domain::stock::DEFAULT_SYMBOLS;
use crate::domain::watchlist::Watchlist;
use crate::domain::weather::{default_cities, City, UnitSystem};
use crate::presentation::app_state::AppState;
use crate::presentation::routes::{resolve, DashboardKind, Route, RouteRequest, DASHBOARDS};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;

/// No entity sorts on this key, so watchlists keep the order they were given in.
const WATCHLIST_ORDER: &str = "position";

/// Renders one route, e.g. `/dashboard-02?units=imperial&q=kampala`.
pub async fn render_route(state: &AppState, target: &str) -> anyhow::Result<Value> {
    let request = resolve(target).with_context(|| format!("Unknown route '{}'", target))?;
    tracing::info!("Rendering {}", target);

    match request.route {
        Route::Index => Ok(index(state)),
        Route::Dashboard(kind) => match kind {
            DashboardKind::Github => github(state, &request).await,
            DashboardKind::Weather => weather(state, &request).await,
            DashboardKind::Crypto => crypto(state, &request).await,
            DashboardKind::Stocks => stocks(state, &request).await,
            DashboardKind::News => news(state, &request).await,
            DashboardKind::AirQuality => air_quality(state, &request).await,
            DashboardKind::Pandemic => pandemic(state, &request).await,
            DashboardKind::Astronomy => astronomy(state, &request).await,
        },
    }
}

fn index(state: &AppState) -> Value {
    let dashboards: Vec<Value> = DASHBOARDS
        .iter()
        .map(|kind| {
            json!({
                "path": kind.path(),
                "title": kind.title(),
                "status": if state.is_live(*kind) { "live" } else { "demo" },
            })
        })
        .collect();
    json!({ "title": "API Dashboards", "dashboards": dashboards })
}

async fn github(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.github_service;
    let origin = if request.param("user").is_some() { Origin::Search } else { Origin::Initial };
    let user = request.param_or("user", DEFAULT_USER);

    let mut session = DashboardSession::new(base_view(state, "updated"));
    cycle(&mut session, origin, service.load(user, request.param_or("repo_sort", "updated"), origin)).await;
    apply_view(&mut session.view, request);

    let board = service.dashboard(&session, request.param_or("top", "stars"));
    let mut value = to_json(DashboardKind::Github, &board)?;
    if let Some(account) = session.entities().first() {
        value["profile"] = serde_json::to_value(&account.user)?;
    }
    Ok(value)
}

async fn weather(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.weather_service;
    let mut cities = match request.param("cities") {
        Some(list) => Watchlist::from_items(list.split(';').filter(|c| !c.trim().is_empty()).map(City::parse_target)),
        None => Watchlist::from_items(default_cities()),
    };
    if let Some(city) = request.param("add") {
        cities.add(City::parse_target(city));
    }
    if let Some(city) = request.param("remove") {
        cities.remove(&City::parse_target(city).id);
    }

    let mut session = DashboardSession::new(base_view(state, WATCHLIST_ORDER));
    cycle(&mut session, Origin::Initial, service.load(&cities, Origin::Initial)).await;
    apply_view(&mut session.view, request);

    let mut value = to_json(DashboardKind::Weather, &service.dashboard(&session))?;
    if let Some(query) = request.param("q") {
        value["search_results"] = serde_json::to_value(service.search_cities(query).await.data())?;
    }
    Ok(value)
}

async fn crypto(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.crypto_service;
    let mut session = DashboardSession::new(base_view(state, "market_cap"));
    cycle(&mut session, Origin::Initial, service.load(Origin::Initial)).await;
    apply_view(&mut session.view, request);
    to_json(DashboardKind::Crypto, &service.dashboard(&session))
}

async fn stocks(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.stock_service;
    let symbols: Vec<String> = match request.param("symbols") {
        Some(list) => list.split(',').map(str::to_string).collect(),
        None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
    };

    let mut session = DashboardSession::new(base_view(state, WATCHLIST_ORDER));
    cycle(&mut session, Origin::Initial, service.load(&symbols, Origin::Initial)).await;
    if let Some(symbol) = request.param("add") {
        let current = session.entities().to_vec();
        cycle(&mut session, Origin::Search, service.add_symbol(&current, symbol)).await;
    }
    apply_view(&mut session.view, request);

    let mut value = to_json(DashboardKind::Stocks, &service.dashboard(&session))?;
    if let Some(query) = request.param("q") {
        value["matches"] = serde_json::to_value(service.search(query).await.data())?;
    }
    Ok(value)
}

async fn news(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.news_service;
    let mut session = DashboardSession::new(base_view(state, "date"));
    match request.param("q") {
        Some(query) => cycle(&mut session, Origin::Search, service.search(query)).await,
        None => {
            let category = request.param_or("category", "general");
            let country = request.param_or("country", "us");
            cycle(&mut session, Origin::Initial, service.headlines(category, country, Origin::Initial)).await
        }
    }
    apply_view(&mut session.view, request);

    let mut bookmarks = Watchlist::new();
    for id in request.param("bookmark").into_iter().flat_map(|ids| ids.split(' ')) {
        if let Some(article) = session.entities().iter().find(|a| a.id == id) {
            bookmarks.toggle(article.clone());
        }
    }

    let board = service.dashboard(&session, &bookmarks);
    let now = Utc::now();
    let ages: serde_json::Map<String, Value> = board
        .page
        .entities()
        .map(|a| (a.id.clone(), Value::String(relative_time(a.published_at, now))))
        .collect();
    let mut value = to_json(DashboardKind::News, &board)?;
    value["ages"] = Value::Object(ages);
    value["bookmarks"] = serde_json::to_value(bookmarks.keys())?;
    Ok(value)
}

async fn air_quality(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.air_quality_service;
    let mut session = DashboardSession::new(base_view(state, "aqi"));
    cycle(&mut session, Origin::Initial, service.load(Origin::Initial)).await;
    if let Some(query) = request.param("q") {
        let current = session.entities().to_vec();
        cycle(&mut session, Origin::Search, service.search(query, &current)).await;
    }
    apply_view(&mut session.view, request);
    to_json(DashboardKind::AirQuality, &service.dashboard(&session))
}

async fn pandemic(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.pandemic_service;
    let metric = request.param("metric").and_then(HeatMetric::parse).unwrap_or_default();
    let mut session = DashboardSession::new(base_view(state, "cases"));
    cycle(&mut session, Origin::Initial, service.load(Origin::Initial)).await;
    apply_view(&mut session.view, request);
    to_json(DashboardKind::Pandemic, &service.dashboard(&session, metric))
}

async fn astronomy(state: &AppState, request: &RouteRequest) -> anyhow::Result<Value> {
    let service = &state.apod_service;
    let range = request.param("range").and_then(DateRange::parse).unwrap_or_default();
    let mut session = DashboardSession::new(base_view(state, "date"));
    cycle(&mut session, Origin::Initial, service.load(range, Origin::Initial)).await;
    apply_view(&mut session.view, request);

    let mut favorites = service.favorites();
    if let Some(id) = request.param("favorite") {
        if let Some(image) = session.entities().iter().find(|i| i.id == id) {
            if let Err(e) = service.toggle_favorite(&mut favorites, image) {
                tracing::error!("Failed to save favorite {}: {:#}", id, e);
            }
        }
    }

    let favorites_only = request.param("favorites") == Some("only");
    let mut value = to_json(DashboardKind::Astronomy, &service.dashboard(&session, &favorites, favorites_only))?;
    value["favorites"] = serde_json::to_value(favorites.items())?;
    Ok(value)
}

/// Starts a cycle before the fetch runs so a newer cycle would supersede it.
async fn cycle<E, F>(session: &mut DashboardSession<E>, origin: Origin, fetch: F)
where
    E: Entity + Clone,
    F: Future<Output = FetchResult<E>>,
{
    let ticket = session.begin(origin);
    let result = fetch.await;
    session.complete(ticket, result);
}

fn base_view(state: &AppState, sort_key: &str) -> ViewState {
    ViewState::default().with_page_size(state.page_size).with_sort(sort_key)
}

/// Applied after the fetch so a requested page is clamped against what was loaded.
fn apply_view(view: &mut ViewState, request: &RouteRequest) {
    if let Some(filter) = request.param("filter") {
        view.set_filter(Some(filter));
    }
    if let Some(search) = request.param("search") {
        view.set_search(search);
    }
    if let Some(sort) = request.param("sort") {
        view.set_sort(sort);
    }
    if let Some(page) = request.param("page").and_then(|p| p.parse().ok()) {
        view.set_page(page);
    }
    if let Some(id) = request.param("select") {
        view.select(id);
    }
    if request.param("units") == Some("imperial") {
        view.units = UnitSystem::Imperial;
    }
}

fn to_json<E: Serialize>(kind: DashboardKind, board: &Dashboard<E>) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(board).with_context(|| format!("Failed to serialize {}", kind.path()))?;
    value["route"] = Value::String(kind.path().to_string());
    value["banner"] = board.notice.as_ref().map_or(Value::Null, |n| Value::String(n.message()));
    Ok(value)
}
