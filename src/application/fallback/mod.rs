// Synthetic data generators used when an upstream is unavailable
pub mod air_quality;
pub mod astronomy;
pub mod crypto;
pub mod github;
pub mod news;
pub mod pandemic;
pub mod stock;
pub mod weather;

pub use air_quality::AirQualityFallback;
pub use astronomy::ApodFallback;
pub use crypto::CryptoFallback;
pub use github::GithubFallback;
pub use news::NewsFallback;
pub use pandemic::PandemicFallback;
pub use stock::{StockFallback, SymbolSearchFallback};
pub use weather::{CitySearchFallback, WeatherFallback};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Fresh entropy by default; a fixed seed makes every target's values reproducible.
pub(crate) fn rng_for(seed: Option<u64>, key: &str) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ fnv1a(key)),
        None => StdRng::from_entropy(),
    }
}

fn fnv1a(value: &str) -> u64 {
    value.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Targets first, then `defaults` cycled, until `count` keys are produced.
pub(crate) fn fill_targets(targets: &[String], defaults: &[&str], count: usize) -> Vec<String> {
    let mut keys: Vec<String> = targets.iter().take(count).cloned().collect();
    let mut pool = defaults.iter().filter(|d| !targets.iter().any(|t| t.eq_ignore_ascii_case(d)));
    while keys.len() < count {
        match pool.next() {
            Some(default) => keys.push(default.to_string()),
            None => keys.push(format!("mock-{}", keys.len() + 1)),
        }
    }
    keys
}
