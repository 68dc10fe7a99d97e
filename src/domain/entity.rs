// Normalized entity contract shared by every dashboard
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Where an entity's values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Synthetic,
}

/// A value an entity exposes under a named sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortValue {
    /// Numbers and times order descending, text orders ascending.
    pub fn display_cmp(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                b.partial_cmp(a).unwrap_or(Ordering::Equal)
            }
            (SortValue::Time(a), SortValue::Time(b)) => b.cmp(a),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => Ordering::Equal,
        }
    }
}

pub trait Entity {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn observed_at(&self) -> DateTime<Utc>;

    fn provenance(&self) -> Provenance;

    fn is_synthetic(&self) -> bool {
        self.provenance() == Provenance::Synthetic
    }

    /// Category/status/type memberships used by the view filter.
    fn categories(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Free-text fields searched case-insensitively.
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name()]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "date" => Some(SortValue::Time(self.observed_at())),
            "name" => Some(SortValue::Text(self.name().to_string())),
            _ => None,
        }
    }
}

/// Lowercase, dash separated identifier: "Dar es Salaam" -> "dar-es-salaam".
pub fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dar es Salaam"), "dar-es-salaam");
        assert_eq!(slugify("  Cape   Town "), "cape-town");
    }

    #[test]
    fn test_sort_value_ordering() {
        let big = SortValue::Number(10.0);
        let small = SortValue::Number(2.0);
        assert_eq!(big.display_cmp(&small), Ordering::Less);

        let newer = SortValue::Time(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
        let older = SortValue::Time(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(newer.display_cmp(&older), Ordering::Less);

        let a = SortValue::Text("alpha".into());
        let b = SortValue::Text("Beta".into());
        assert_eq!(a.display_cmp(&b), Ordering::Less);
    }
}
