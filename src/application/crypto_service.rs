// Crypto service - Use case for the cryptocurrency markets dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::CryptoFallback;
use crate::application::pipeline::SharedPipeline;
use crate::application::session::DashboardSession;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, TileData};
use crate::domain::crypto::Coin;
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;

const BILLION: f64 = 1_000_000_000.0;

#[derive(Clone)]
pub struct CryptoService {
    pipeline: SharedPipeline<Coin, (), CryptoFallback>,
    per_page: usize,
}

impl CryptoService {
    pub fn new(pipeline: SharedPipeline<Coin, (), CryptoFallback>, per_page: usize) -> Self {
        Self { pipeline, per_page }
    }

    pub async fn load(&self, origin: Origin) -> FetchResult<Coin> {
        let request = FetchRequest::new(Vec::new(), (), self.per_page).with_origin(origin);
        self.pipeline.load(&request).await
    }

    pub fn dashboard(&self, session: &DashboardSession<Coin>) -> Dashboard<Coin> {
        let coins = session.entities();
        let gainers = coins.iter().filter(|c| c.is_gaining()).count();
        let total_cap: f64 = coins.iter().map(|c| c.market_cap).sum();
        let average_change = if coins.is_empty() {
            0.0
        } else {
            coins.iter().map(|c| c.price_change_percentage_24h).sum::<f64>() / coins.len() as f64
        };

        let tiles = vec![
            TileData::new("market-cap", "Total Market Cap", "B USD", total_cap / BILLION, 1),
            TileData::new("gainers", "Gainers (24h)", "", gainers as f64, 0),
            TileData::new("losers", "Losers (24h)", "", (coins.len() - gainers) as f64, 0),
            TileData::new("average-change", "Average Change", "%", average_change, 2),
        ];

        let caps = coins
            .iter()
            .map(|c| ChartPoint::new(c.symbol.clone(), c.market_cap / BILLION))
            .collect();
        let changes = coins
            .iter()
            .map(|c| ChartPoint::new(c.symbol.clone(), c.price_change_percentage_24h))
            .collect();
        let charts = vec![
            ChartData::single("market-cap", "Market Cap", Some("B USD"), ChartKind::Bar, caps),
            ChartData::single("change-24h", "24h Change", Some("%"), ChartKind::Bar, changes),
        ];

        Dashboard::new("Crypto Markets".to_string(), tiles, charts, session.render())
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
    use crate::infrastructure::coingecko_api::CoinGeckoApi;
    use crate::infrastructure::http_client::testing::FakeTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(transport: Arc<FakeTransport>) -> CryptoService {
        let api = CoinGeckoApi::new(transport, "https://api.coingecko.com/api/v3");
        CryptoService::new(
            Pipeline::shared(Arc::new(api), CryptoFallback::seeded(5), Duration::from_secs(12)),
            10,
        )
    }

    #[tokio::test]
    async fn test_upstream_error_degrades_to_ten_mock_coins() {
        let transport = Arc::new(FakeTransport::new().route("/coins/markets", 500, "oops"));
        let result = service(transport.clone()).load(Origin::Initial).await;

        assert!(result.is_success());
        assert_eq!(result.data().len(), 10);
        assert!(result.data().iter().all(|c| c.is_synthetic()));
        assert!(matches!(result.warning(), Some(Notice::FallbackData { .. })));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_sorts_and_filters() {
        let service = service(Arc::new(FakeTransport::new()));
        let mut session = DashboardSession::new(ViewState::default().with_sort("market_cap"));
        let ticket = session.begin(Origin::Initial);
        session.complete(ticket, service.load(Origin::Initial).await);

        let board = service.dashboard(&session);
        assert_eq!(board.page.items[0].entity.id, "bitcoin");
        let gainers = board.tiles.iter().find(|t| t.id == "gainers").map(|t| t.value).unwrap();

        session.view.set_filter(Some("gainers"));
        assert_eq!(service.dashboard(&session).page.total as f64, gainers);
    }
}
