// News fallback - Seeded headlines for a category or search query
use super::rng_for;
use crate::application::data_source::FallbackGenerator;
use crate::domain::entity::Provenance;
use crate::domain::news::Article;
use chrono::{Duration, Utc};
use rand::Rng;

const TITLES: [&str; 15] = [
    "Technology Giants Report Strong Q3 Earnings Despite Market Volatility",
    "Climate Change Summit Reaches Historic Agreement on Carbon Reduction",
    "New Medical Breakthrough Shows Promise for Cancer Treatment",
    "Global Markets React to Federal Reserve Interest Rate Decision",
    "Revolutionary AI Model Demonstrates Human-Level Reasoning Capabilities",
    "Space Exploration Mission Discovers Potential Signs of Ancient Life",
    "Renewable Energy Adoption Reaches All-Time High Globally",
    "Cybersecurity Experts Warn of Emerging Threats in Digital Banking",
    "Olympic Games Preparations Enter Final Phase with New Safety Protocols",
    "Scientific Study Reveals Surprising Benefits of Remote Work",
    "Major Automotive Manufacturer Announces Full Electric Vehicle Lineup",
    "International Trade Relations Show Signs of Improvement",
    "Healthcare Innovation Conference Showcases Latest Medical Technologies",
    "Educational Technology Transforms Learning in Post-Pandemic Era",
    "Environmental Conservation Efforts Show Measurable Impact on Wildlife",
];

const SOURCES: [&str; 12] = [
    "TechCrunch",
    "Reuters",
    "BBC News",
    "CNN",
    "The Guardian",
    "Associated Press",
    "Wall Street Journal",
    "Financial Times",
    "National Geographic",
    "Scientific American",
    "ESPN",
    "NBC News",
];

const DESCRIPTIONS: [&str; 5] = [
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
    "Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.",
    "Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur.",
    "Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.",
    "Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque laudantium.",
];

/// Headlines spread over the last week. The first target, when present, is the category
/// for browsing or the query for a search.
#[derive(Debug, Clone, Default)]
pub struct NewsFallback {
    seed: Option<u64>,
}

impl NewsFallback {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl FallbackGenerator for NewsFallback {
    type Entity = Article;

    fn generate(&self, targets: &[String], count: usize) -> Vec<Article> {
        let topic = targets.first().map(String::as_str).unwrap_or("general");
        let mut rng = rng_for(self.seed, topic);
        let now = Utc::now();

        (0..count)
            .map(|i| {
                let n = i + 1;
                Article {
                    id: format!("mock-{n}"),
                    title: TITLES[i % TITLES.len()].to_string(),
                    description: DESCRIPTIONS[i % DESCRIPTIONS.len()].to_string(),
                    url: format!("https://example.com/article-{n}"),
                    image_url: Some(format!("https://picsum.photos/400/250?random={n}")),
                    source: SOURCES[i % SOURCES.len()].to_string(),
                    author: Some(format!("Reporter {n}")),
                    category: topic.to_string(),
                    published_at: now - Duration::seconds(rng.gen_range(0..7 * 24 * 3600)),
                    provenance: Provenance::Synthetic,
                }
            })
            .collect()
    }
}
