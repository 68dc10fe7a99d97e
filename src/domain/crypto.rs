// Cryptocurrency market models
use super::entity::{Entity, Provenance, SortValue};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub total_volume: f64,
    pub price_change_percentage_24h: f64,
    pub last_updated: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Coin {
    pub fn is_gaining(&self) -> bool {
        self.price_change_percentage_24h >= 0.0
    }
}

impl Entity for Coin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.last_updated
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![if self.is_gaining() { "gainers" } else { "losers" }]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.symbol]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "market_cap" => Some(SortValue::Number(self.market_cap)),
            "price" => Some(SortValue::Number(self.current_price)),
            "change" => Some(SortValue::Number(self.price_change_percentage_24h)),
            "volume" => Some(SortValue::Number(self.total_volume)),
            "date" => Some(SortValue::Time(self.last_updated)),
            "name" => Some(SortValue::Text(self.name.clone())),
            _ => None,
        }
    }
}
