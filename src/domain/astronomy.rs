// Astronomy picture of the day models
use super::entity::{Entity, Provenance, SortValue};
use super::watchlist::Keyed;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApodImage {
    /// ISO date, unique per picture.
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub url: String,
    pub hd_url: Option<String>,
    pub media_type: MediaType,
    pub copyright: Option<String>,
    pub provenance: Provenance,
}

impl Entity for ApodImage {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![self.media_type.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.explanation]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "date" => Some(SortValue::Time(self.observed_at())),
            "name" => Some(SortValue::Text(self.title.clone())),
            _ => None,
        }
    }
}

/// The persisted part of a favorited picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteImage {
    pub id: String,
    pub title: String,
    pub url: String,
    pub media_type: MediaType,
}

impl From<&ApodImage> for FavoriteImage {
    fn from(image: &ApodImage) -> Self {
        Self {
            id: image.id.clone(),
            title: image.title.clone(),
            url: image.url.clone(),
            media_type: image.media_type,
        }
    }
}

impl Keyed for FavoriteImage {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[default]
    Week,
    Month,
    Random,
}

/// How a date range is requested upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeQuery {
    Span { start: NaiveDate, end: NaiveDate },
    Count(u32),
}

impl DateRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "week" => Some(DateRange::Week),
            "month" => Some(DateRange::Month),
            "random" => Some(DateRange::Random),
            _ => None,
        }
    }

    pub fn query(&self, today: NaiveDate) -> RangeQuery {
        match self {
            DateRange::Week => RangeQuery::Span {
                start: today - Duration::days(7),
                end: today,
            },
            DateRange::Month => RangeQuery::Span {
                start: today - Duration::days(30),
                end: today,
            },
            DateRange::Random => RangeQuery::Count(30),
        }
    }

    /// Number of pictures the range is expected to produce.
    pub fn expected_count(&self) -> usize {
        match self {
            DateRange::Week => 8,
            DateRange::Month => 31,
            DateRange::Random => 30,
        }
    }
}
