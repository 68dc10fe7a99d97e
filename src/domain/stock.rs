// Stock quote models
use super::chart::ChartPoint;
use super::entity::{Entity, Provenance, SortValue};
use super::watchlist::Keyed;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_SYMBOLS: [&str; 12] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "NFLX", "AMD", "ORCL", "CRM", "ADBE",
];

/// Symbols the offline search can find.
pub const SEARCHABLE_SYMBOLS: [&str; 18] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "NFLX", "JPM", "JNJ", "WMT", "PG",
    "UNH", "HD", "MA", "BAC", "DIS", "ADBE",
];

pub fn company_name(symbol: &str) -> String {
    let known = match symbol {
        "AAPL" => "Apple Inc.",
        "MSFT" => "Microsoft Corporation",
        "GOOGL" => "Alphabet Inc.",
        "AMZN" => "Amazon.com Inc.",
        "TSLA" => "Tesla Inc.",
        "NVDA" => "NVIDIA Corporation",
        "META" => "Meta Platforms Inc.",
        "NFLX" => "Netflix Inc.",
        "AMD" => "Advanced Micro Devices",
        "ORCL" => "Oracle Corporation",
        "CRM" => "Salesforce Inc.",
        "ADBE" => "Adobe Inc.",
        "JPM" => "JPMorgan Chase & Co.",
        "JNJ" => "Johnson & Johnson",
        "WMT" => "Walmart Inc.",
        "PG" => "Procter & Gamble",
        "UNH" => "UnitedHealth Group",
        "HD" => "Home Depot Inc.",
        "MA" => "Mastercard Inc.",
        "BAC" => "Bank of America",
        "DIS" => "Walt Disney Company",
        _ => return format!("{symbol} Corporation"),
    };
    known.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<String>,
    pub high: f64,
    pub low: f64,
    pub history: Vec<ChartPoint>,
    pub observed_at: DateTime<Utc>,
    pub provenance: Provenance,
}

impl StockQuote {
    pub fn is_gaining(&self) -> bool {
        self.change >= 0.0
    }
}

impl Keyed for StockQuote {
    fn key(&self) -> &str {
        &self.symbol
    }
}

impl Entity for StockQuote {
    fn id(&self) -> &str {
        &self.symbol
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![if self.is_gaining() { "gainers" } else { "losers" }]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.symbol, &self.name]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "price" => Some(SortValue::Number(self.price)),
            "change" => Some(SortValue::Number(self.change_percent)),
            "volume" => Some(SortValue::Number(self.volume as f64)),
            "date" => Some(SortValue::Time(self.observed_at)),
            "name" | "symbol" => Some(SortValue::Text(self.symbol.clone())),
            _ => None,
        }
    }
}

/// A symbol search hit; carries no price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub region: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorWeight {
    pub name: &'static str,
    pub value: u32,
    pub color: &'static str,
}

pub fn market_overview() -> Vec<SectorWeight> {
    vec![
        SectorWeight { name: "Tech", value: 32, color: "#3B82F6" },
        SectorWeight { name: "Healthcare", value: 18, color: "#10B981" },
        SectorWeight { name: "Finance", value: 24, color: "#8B5CF6" },
        SectorWeight { name: "Energy", value: 15, color: "#F59E0B" },
        SectorWeight { name: "Consumer", value: 11, color: "#EF4444" },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_name() {
        assert_eq!(company_name("AAPL"), "Apple Inc.");
        assert_eq!(company_name("ZZZ"), "ZZZ Corporation");
    }

    #[test]
    fn test_overview_sums_to_100() {
        assert_eq!(market_overview().iter().map(|s| s.value).sum::<u32>(), 100);
    }
}
