// Stock service - Use case for the rate-limited stock watchlist dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::{StockFallback, SymbolSearchFallback};
use crate::application::pipeline::{PartialPolicy, SharedPipeline};
use crate::application::rate_governor::RateGovernor;
use crate::application::session::DashboardSession;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, SeriesData, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::entity::Entity;
use crate::domain::error::FetchError;
use crate::domain::fetch_result::FetchResult;
use crate::domain::notice::Notice;
use crate::domain::stock::{market_overview, StockQuote, SymbolMatch};

const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Clone)]
pub struct StockService {
    quotes: SharedPipeline<StockQuote, (), StockFallback>,
    search: SharedPipeline<SymbolMatch, (), SymbolSearchFallback>,
    live_quota: usize,
}

impl StockService {
    pub fn new(
        quotes: SharedPipeline<StockQuote, (), StockFallback>,
        search: SharedPipeline<SymbolMatch, (), SymbolSearchFallback>,
        live_quota: usize,
    ) -> Self {
        Self {
            quotes,
            search,
            live_quota,
        }
    }

    /// The first `live_quota` symbols are quoted live, the rest synthetically, keeping watchlist order.
    pub async fn load(&self, symbols: &[String], origin: Origin) -> FetchResult<StockQuote> {
        let symbols: Vec<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        let split = RateGovernor::partition(&symbols, self.live_quota);
        tracing::info!(
            "Loading {} quotes live, {} from the fallback",
            split.live.len(),
            split.fallback.len()
        );

        let (mut quotes, live_warning) = if split.live.is_empty() {
            (Vec::new(), None)
        } else {
            let request = FetchRequest::per_target(split.live, ()).with_origin(origin);
            match self.quotes.load_each(&request, PartialPolicy::Backfill).await {
                FetchResult::Success { data, warning, .. } => (data, warning),
                FetchResult::Failure(err) => return FetchResult::Failure(err),
                FetchResult::Pending => (Vec::new(), None),
            }
        };
        quotes.extend(self.quotes.synthesize(&FetchRequest::per_target(split.fallback.clone(), ())));

        let notice = match live_warning {
            Some(notice) if notice.is_demo() => Some(notice),
            Some(Notice::PartialData { mut missing }) => {
                missing.extend(split.fallback);
                Some(Notice::PartialData { missing })
            }
            other if split.fallback.is_empty() => other,
            _ => Some(Notice::PartialData {
                missing: split.fallback,
            }),
        };
        FetchResult::success_with(quotes, notice)
    }

    /// Adds one symbol to the loaded quotes. It is fetched live only while fewer than
    /// `live_quota` live quotes are on screen.
    pub async fn add_symbol(&self, current: &[StockQuote], symbol: &str) -> FetchResult<StockQuote> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return FetchResult::Failure(FetchError::NotFound(symbol));
        }
        if current.iter().any(|q| q.symbol == symbol) {
            return FetchResult::success(current.to_vec());
        }

        let live_count = current.iter().filter(|q| !q.is_synthetic()).count();
        let request = FetchRequest::per_target(vec![symbol.clone()], ()).with_origin(Origin::Search);
        let (added, warning) = if live_count < self.live_quota {
            match self.quotes.load(&request).await {
                FetchResult::Success { data, warning, .. } => (data, warning),
                FetchResult::Failure(err) => return FetchResult::Failure(err),
                FetchResult::Pending => (Vec::new(), None),
            }
        } else {
            tracing::info!("Live quota of {} reached, {} is synthetic", self.live_quota, symbol);
            (
                self.quotes.synthesize(&request),
                Some(Notice::PartialData {
                    missing: vec![symbol.clone()],
                }),
            )
        };

        let mut quotes = current.to_vec();
        quotes.extend(added);
        FetchResult::success_with(quotes, warning)
    }

    pub async fn search(&self, query: &str) -> FetchResult<SymbolMatch> {
        let query = query.trim();
        if query.is_empty() {
            return FetchResult::success(Vec::new());
        }
        let offline = SymbolSearchFallback::matching(query).len().min(MAX_SEARCH_RESULTS);
        let request = FetchRequest::new(vec![query.to_string()], (), offline).with_origin(Origin::Search);
        self.search.load(&request).await
    }

    /// The history chart follows the selected stock, or the first one.
    pub fn dashboard(&self, session: &DashboardSession<StockQuote>) -> Dashboard<StockQuote> {
        let quotes = session.entities();
        let gainers = quotes.iter().filter(|q| q.is_gaining()).count();
        let average_change = if quotes.is_empty() {
            0.0
        } else {
            quotes.iter().map(|q| q.change_percent).sum::<f64>() / quotes.len() as f64
        };
        let volume: u64 = quotes.iter().map(|q| q.volume).sum();

        let tiles = vec![
            TileData::new("gainers", "Gainers", "", gainers as f64, 0),
            TileData::new("losers", "Losers", "", (quotes.len() - gainers) as f64, 0),
            TileData::new("average-change", "Average Change", "%", average_change, 2),
            TileData::new("volume", "Total Volume", "M", volume as f64 / 1_000_000.0, 1),
        ];

        let mut charts = Vec::new();
        let focus = session
            .view
            .selected
            .as_deref()
            .and_then(|id| quotes.iter().find(|q| q.id() == id))
            .or_else(|| quotes.first());
        if let Some(quote) = focus {
            let title = format!("{} - 30 Day History", quote.symbol);
            charts.push(ChartData::single("history", &title, Some("USD"), ChartKind::Area, quote.history.clone()));
        }
        let sectors = market_overview()
            .into_iter()
            .map(|s| {
                SeriesData::new(
                    s.name,
                    s.name,
                    Some(s.color.to_string()),
                    vec![ChartPoint::new(s.name, s.value as f64)],
                )
            })
            .collect();
        charts.push(ChartData::new("sectors", "Market Overview", Some("%"), ChartKind::Pie, sectors));

        Dashboard::new("Stock Watchlist".to_string(), tiles, charts, session.render())
            .with_notice(session.banner().visible().cloned())
    }
}
