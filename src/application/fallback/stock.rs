// Stock fallback - Seeded quotes with price history and offline symbol search
use super::{fill_targets, rng_for};
use crate::application::data_source::FallbackGenerator;
use crate::domain::chart::ChartPoint;
use crate::domain::entity::Provenance;
use crate::domain::stock::{company_name, StockQuote, SymbolMatch, DEFAULT_SYMBOLS, SEARCHABLE_SYMBOLS};
use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;

const HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, Default)]
pub struct StockFallback {
    seed: Option<u64>,
}

impl StockFallback {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn quote(&self, symbol: &str) -> StockQuote {
        let mut rng = rng_for(self.seed, symbol);
        let price: f64 = rng.gen_range(50.0..550.0);
        let change_percent: f64 = rng.gen_range(-5.0..5.0);

        StockQuote {
            symbol: symbol.to_string(),
            name: company_name(symbol),
            price: round2(price),
            change: round2(price * change_percent / 100.0),
            change_percent: round2(change_percent),
            volume: rng.gen_range(0..10_000_000),
            market_cap: Some(format!("{}B", rng.gen_range(100..2100))),
            high: round2(price * 1.3),
            low: round2(price * 0.7),
            history: history(&mut rng),
            observed_at: Utc::now(),
            provenance: Provenance::Synthetic,
        }
    }
}

/// 30-day random walk starting at 150, floored at 50.
pub fn history(rng: &mut StdRng) -> Vec<ChartPoint> {
    let mut price: f64 = 150.0;
    (1..=HISTORY_DAYS)
        .map(|day| {
            price = (price + rng.gen_range(-5.0..5.0)).max(50.0);
            ChartPoint::new(format!("Day {day}"), round2(price))
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FallbackGenerator for StockFallback {
    type Entity = StockQuote;

    fn generate(&self, targets: &[String], count: usize) -> Vec<StockQuote> {
        fill_targets(targets, &DEFAULT_SYMBOLS, count)
            .iter()
            .map(|symbol| self.quote(&symbol.to_uppercase()))
            .collect()
    }
}

/// Offline symbol search over a fixed list of well-known tickers.
#[derive(Debug, Clone, Default)]
pub struct SymbolSearchFallback;

impl SymbolSearchFallback {
    /// Symbols whose ticker or company name contains `query`, case-insensitively.
    pub fn matching(query: &str) -> Vec<SymbolMatch> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Vec::new();
        }
        SEARCHABLE_SYMBOLS
            .iter()
            .map(|symbol| (symbol, company_name(symbol)))
            .filter(|(symbol, name)| symbol.contains(&query) || name.to_uppercase().contains(&query))
            .map(|(symbol, name)| SymbolMatch {
                symbol: symbol.to_string(),
                name,
                region: Some("United States".to_string()),
                currency: Some("USD".to_string()),
            })
            .collect()
    }
}

impl FallbackGenerator for SymbolSearchFallback {
    type Entity = SymbolMatch;

    fn generate(&self, targets: &[String], count: usize) -> Vec<SymbolMatch> {
        let query = targets.first().map(String::as_str).unwrap_or("");
        Self::matching(query).into_iter().take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_shape() {
        let quote = StockFallback::seeded(9).quote("AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.history.len(), 30);
        assert!(quote.history.iter().all(|p| p.value >= 50.0));
        assert!(quote.low < quote.price && quote.price < quote.high);
        assert_eq!(quote.provenance, Provenance::Synthetic);
    }

    #[test]
    fn test_generate_keeps_target_order() {
        let targets = vec!["tsla".to_string(), "MSFT".to_string()];
        let quotes = StockFallback::default().generate(&targets, 3);
        let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSLA", "MSFT", "AAPL"]);
    }

    #[test]
    fn test_symbol_search_matches_ticker_and_name() {
        let by_ticker = SymbolSearchFallback::matching("aapl");
        assert_eq!(by_ticker.len(), 1);
        assert_eq!(by_ticker[0].name, "Apple Inc.");

        let by_name = SymbolSearchFallback::matching("bank");
        assert_eq!(by_name[0].symbol, "BAC");
        assert!(SymbolSearchFallback::matching("  ").is_empty());

        let capped = SymbolSearchFallback.generate(&["A".to_string()], 2);
        assert_eq!(capped.len(), 2);

        let unpadded = SymbolSearchFallback.generate(&["aapl".to_string()], 5);
        assert_eq!(unpadded.len(), 1);
    }
}
