// CoinGecko adapter - top coins by market capitalisation
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::domain::crypto::Coin;
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub struct CoinGeckoApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MarketDto {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    last_updated: Option<DateTime<Utc>>,
}

impl CoinGeckoApi {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DataSource for CoinGeckoApi {
    type Entity = Coin;
    type Options = ();

    fn name(&self) -> &'static str {
        "coingecko"
    }

    /// `count` is the page size.
    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<Coin>, FetchError> {
        let per_page = request.count.max(1).to_string();
        let url = query_url(
            &self.base_url,
            "/coins/markets",
            &[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ],
        );
        let markets: Vec<MarketDto> = self.transport.get(HttpRequest::get(url)).await?.json("coins/markets")?;
        Ok(Batch::new(markets.into_iter().map(to_coin).collect()))
    }
}

fn to_coin(market: MarketDto) -> Coin {
    Coin {
        id: market.id,
        symbol: market.symbol.to_uppercase(),
        name: market.name,
        image: market.image,
        current_price: market.current_price.unwrap_or_default(),
        market_cap: market.market_cap.unwrap_or_default(),
        market_cap_rank: market.market_cap_rank,
        total_volume: market.total_volume.unwrap_or_default(),
        price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or_default(),
        last_updated: market.last_updated.unwrap_or_else(Utc::now),
        provenance: Provenance::Live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::testing::FakeTransport;

    #[tokio::test]
    async fn test_markets_mapping() {
        let transport = Arc::new(FakeTransport::new().route(
            "/coins/markets",
            200,
            r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"https://img/btc.png",
                "current_price":64000.5,"market_cap":1.2e12,"market_cap_rank":1,"total_volume":3.1e10,
                "price_change_percentage_24h":-1.25,"last_updated":"2024-03-01T10:00:00.000Z"},
               {"id":"newcoin","symbol":"new","name":"New","current_price":null,"market_cap":null,
                "market_cap_rank":null,"total_volume":null,"price_change_percentage_24h":null}]"#,
        ));
        let api = CoinGeckoApi::new(transport.clone(), "https://api.coingecko.com/api/v3/");

        let batch = api.fetch(&FetchRequest::new(Vec::new(), (), 10)).await.unwrap();

        assert_eq!(batch.entities.len(), 2);
        assert_eq!(batch.entities[0].symbol, "BTC");
        assert!(!batch.entities[0].is_gaining());
        assert_eq!(batch.entities[1].market_cap_rank, None);
        assert_eq!(batch.entities[1].current_price, 0.0);
        assert_eq!(
            transport.calls()[0],
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10&page=1&sparkline=false"
        );
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let transport = Arc::new(FakeTransport::new().route("/coins/markets", 429, ""));
        let api = CoinGeckoApi::new(transport, "https://api.coingecko.com/api/v3");
        let err = api.fetch(&FetchRequest::new(Vec::new(), (), 10)).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited(_)));
    }
}
