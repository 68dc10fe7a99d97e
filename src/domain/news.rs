// News article models
use super::entity::{Entity, Provenance, SortValue};
use super::watchlist::Keyed;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CATEGORIES: [&str; 7] = [
    "general",
    "business",
    "technology",
    "sports",
    "health",
    "science",
    "entertainment",
];

pub const COUNTRIES: [(&str, &str); 15] = [
    ("us", "United States"),
    ("gb", "United Kingdom"),
    ("ca", "Canada"),
    ("au", "Australia"),
    ("de", "Germany"),
    ("fr", "France"),
    ("ke", "Kenya"),
    ("tz", "Tanzania"),
    ("ug", "Uganda"),
    ("et", "Ethiopia"),
    ("rw", "Rwanda"),
    ("za", "South Africa"),
    ("ng", "Nigeria"),
    ("eg", "Egypt"),
    ("ma", "Morocco"),
];

/// What a news fetch asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsQuery {
    Headlines { category: String, country: String },
    Search { query: String },
}

impl Default for NewsQuery {
    fn default() -> Self {
        NewsQuery::Headlines {
            category: "general".to_string(),
            country: "us".to_string(),
        }
    }
}

const REMOVED: &str = "[Removed]";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub author: Option<String>,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Article {
    /// NewsAPI marks takedowns with "[Removed]"; such articles are not shown.
    pub fn is_removed(&self) -> bool {
        self.title.is_empty()
            || self.title == REMOVED
            || self.description.is_empty()
            || self.description == REMOVED
            || self.source == REMOVED
    }
}

impl Keyed for Article {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Entity for Article {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![&self.category, &self.source]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "date" => Some(SortValue::Time(self.published_at)),
            "source" => Some(SortValue::Text(self.source.clone())),
            "name" => Some(SortValue::Text(self.title.clone())),
            _ => None,
        }
    }
}

/// "Just now", "5m ago", "3h ago", "2d ago".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}
