// Alpha Vantage adapter - global quotes and symbol search behind a shared rate governor
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::application::fallback::rng_for;
use crate::application::fallback::stock::history;
use crate::application::rate_governor::RateGovernor;
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::domain::stock::{company_name, StockQuote, SymbolMatch};
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_RESULTS: usize = 5;

/// The free tier allows five calls a minute, so every call goes through one governor.
pub struct AlphaVantageApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    governor: Arc<RateGovernor>,
    patience: Duration,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteDto {
    #[serde(rename = "01. symbol")]
    symbol: String,
    #[serde(rename = "03. high")]
    high: String,
    #[serde(rename = "04. low")]
    low: String,
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "06. volume")]
    volume: String,
    #[serde(rename = "09. change")]
    change: String,
    #[serde(rename = "10. change percent")]
    change_percent: String,
}

#[derive(Debug, Deserialize)]
struct SearchMatchDto {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: Option<String>,
    #[serde(rename = "4. region")]
    region: Option<String>,
    #[serde(rename = "8. currency")]
    currency: Option<String>,
}

impl AlphaVantageApi {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        api_key: Option<String>,
        governor: Arc<RateGovernor>,
        patience: Duration,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            governor,
            patience,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// One governed call. In-body notes about call frequency count as rate limiting.
    async fn query(&self, params: &[(&str, &str)], context: &str) -> Result<Value, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::Unauthorized("alpha vantage api key".to_string()))?;
        self.governor.acquire_within(self.patience).await?;

        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("apikey", api_key));
        let url = query_url(&self.base_url, "/query", &all);
        let json: Value = self.transport.get(HttpRequest::get(url)).await?.json(context)?;

        for key in ["Note", "Information"] {
            if let Some(message) = json.get(key).and_then(Value::as_str) {
                tracing::warn!("alpha vantage: {}", message);
                return Err(FetchError::RateLimited(message.to_string()));
            }
        }
        if let Some(message) = json.get("Error Message").and_then(Value::as_str) {
            tracing::debug!("alpha vantage: {} rejected: {}", context, message);
            return Err(FetchError::NotFound(context.to_string()));
        }
        Ok(json)
    }

    pub async fn quote(&self, symbol: &str) -> Result<StockQuote, FetchError> {
        let symbol = symbol.trim().to_uppercase();
        let json = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())], &symbol)
            .await?;

        let raw = json
            .get("Global Quote")
            .filter(|q| q.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or_else(|| FetchError::NotFound(symbol.clone()))?;
        let dto: GlobalQuoteDto = serde_json::from_value(raw.clone())
            .map_err(|e| FetchError::Malformed(format!("{symbol}: {e}")))?;
        to_quote(dto)
    }

    pub async fn search(&self, keywords: &str) -> Result<Vec<SymbolMatch>, FetchError> {
        let json = self
            .query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)], keywords)
            .await?;
        let matches = json
            .get("bestMatches")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Malformed("missing bestMatches".to_string()))?
            .iter()
            .filter_map(|v| serde_json::from_value::<SearchMatchDto>(v.clone()).ok())
            .take(SEARCH_RESULTS)
            .map(|m| SymbolMatch {
                name: m.name.unwrap_or_else(|| company_name(&m.symbol)),
                symbol: m.symbol,
                region: m.region,
                currency: m.currency,
            })
            .collect();
        Ok(matches)
    }
}

fn number(field: &str, raw: &str) -> Result<f64, FetchError> {
    raw.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| FetchError::Malformed(format!("{field}: '{raw}' is not a number")))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_quote(dto: GlobalQuoteDto) -> Result<StockQuote, FetchError> {
    // The free tier has no daily series, so the chart line is synthesized per symbol.
    let mut rng = rng_for(None, &dto.symbol);
    Ok(StockQuote {
        name: company_name(&dto.symbol),
        price: round2(number("price", &dto.price)?),
        change: round2(number("change", &dto.change)?),
        change_percent: round2(number("change percent", &dto.change_percent)?),
        volume: number("volume", &dto.volume)? as u64,
        market_cap: None,
        high: round2(number("high", &dto.high)?),
        low: round2(number("low", &dto.low)?),
        history: history(&mut rng),
        observed_at: Utc::now(),
        provenance: Provenance::Live,
        symbol: dto.symbol,
    })
}

/// Quotes for each target symbol, one governed call per symbol.
pub struct QuoteSource(pub Arc<AlphaVantageApi>);

#[async_trait]
impl DataSource for QuoteSource {
    type Entity = StockQuote;
    type Options = ();

    fn name(&self) -> &'static str {
        "alpha-vantage"
    }

    fn has_credential(&self) -> bool {
        self.0.has_key()
    }

    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<StockQuote>, FetchError> {
        let mut quotes = Vec::with_capacity(request.targets.len());
        let mut missing = Vec::new();
        let mut first_error = None;
        // Sequential on purpose: the governor would serialize them anyway.
        for symbol in &request.targets {
            match self.0.quote(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(err) => {
                    tracing::warn!("alpha vantage: {} failed: {}", symbol, err);
                    missing.push(symbol.clone());
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if quotes.is_empty() => Err(err),
            _ => Ok(Batch::new(quotes).with_missing(missing)),
        }
    }
}

/// Symbol lookup; the first target is the keyword.
pub struct SymbolSearchSource(pub Arc<AlphaVantageApi>);

#[async_trait]
impl DataSource for SymbolSearchSource {
    type Entity = SymbolMatch;
    type Options = ();

    fn name(&self) -> &'static str {
        "alpha-vantage-search"
    }

    fn has_credential(&self) -> bool {
        self.0.has_key()
    }

    async fn fetch(&self, request: &FetchRequest<()>) -> Result<Batch<SymbolMatch>, FetchError> {
        Ok(Batch::new(self.0.search(request.target().trim()).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rate_governor::GovernorPolicy;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const AAPL: &str = r#"{"Global Quote":{"01. symbol":"AAPL","02. open":"180.00","03. high":"182.50",
        "04. low":"179.10","05. price":"181.234","06. volume":"51234567","07. latest trading day":"2024-03-01",
        "08. previous close":"179.66","09. change":"1.574","10. change percent":"0.8761%"}}"#;

    fn api(transport: Arc<FakeTransport>, policy: GovernorPolicy, patience: Duration) -> AlphaVantageApi {
        AlphaVantageApi::new(
            transport,
            "https://www.alphavantage.co",
            Some("k3y".to_string()),
            Arc::new(RateGovernor::new("alpha-vantage", policy)),
            patience,
        )
    }

    fn relaxed(transport: Arc<FakeTransport>) -> AlphaVantageApi {
        api(transport, GovernorPolicy::spacing(Duration::ZERO), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_global_quote_mapping() {
        let transport = Arc::new(FakeTransport::new().route("function=GLOBAL_QUOTE", 200, AAPL));
        let quote = relaxed(transport.clone()).quote("aapl").await.unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.price, 181.23);
        assert_eq!(quote.change_percent, 0.88);
        assert_eq!(quote.volume, 51_234_567);
        assert_eq!(quote.history.len(), 30);
        assert_eq!(quote.provenance, Provenance::Live);
        assert!(transport.calls()[0].contains("symbol=AAPL&apikey=k3y"));
    }

    #[tokio::test]
    async fn test_in_body_errors() {
        let noted = Arc::new(FakeTransport::new().route(
            "GLOBAL_QUOTE",
            200,
            r#"{"Note":"Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"}"#,
        ));
        assert!(matches!(relaxed(noted).quote("MSFT").await, Err(FetchError::RateLimited(_))));

        let limited = Arc::new(FakeTransport::new().route("GLOBAL_QUOTE", 429, ""));
        assert!(matches!(relaxed(limited).quote("MSFT").await, Err(FetchError::RateLimited(_))));

        let unknown = Arc::new(FakeTransport::new().route("GLOBAL_QUOTE", 200, r#"{"Global Quote":{}}"#));
        assert_eq!(relaxed(unknown).quote("zzzz").await.unwrap_err(), FetchError::NotFound("ZZZZ".to_string()));

        let invalid = Arc::new(FakeTransport::new().route("GLOBAL_QUOTE", 200, r#"{"Error Message":"Invalid API call."}"#));
        assert!(matches!(relaxed(invalid).quote("??").await, Err(FetchError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_governor_rejects_without_calling_upstream() {
        let transport = Arc::new(FakeTransport::new().route("GLOBAL_QUOTE", 200, AAPL));
        let api = api(
            transport.clone(),
            GovernorPolicy::spacing(Duration::from_secs(12)),
            Duration::from_secs(1),
        );

        assert!(api.quote("AAPL").await.is_ok());
        assert!(matches!(api.quote("AAPL").await, Err(FetchError::RateLimited(_))));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_symbol_search() {
        let transport = Arc::new(FakeTransport::new().route(
            "SYMBOL_SEARCH",
            200,
            r#"{"bestMatches":[
                {"1. symbol":"TSCO.LON","2. name":"Tesco PLC","4. region":"United Kingdom","8. currency":"GBX"},
                {"1. symbol":"TSLA","2. name":"Tesla Inc","4. region":"United States","8. currency":"USD"}]}"#,
        ));
        let search = SymbolSearchSource(Arc::new(relaxed(transport)));

        let batch = search.fetch(&FetchRequest::new(vec!["tes".to_string()], (), 5)).await.unwrap();
        assert_eq!(batch.entities.len(), 2);
        assert_eq!(batch.entities[1].symbol, "TSLA");
        assert_eq!(batch.entities[0].currency.as_deref(), Some("GBX"));
    }
}
