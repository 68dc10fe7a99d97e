// Air quality station models
use super::entity::{Entity, Provenance, SortValue};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const PRIORITY_AFRICAN_CITIES: [&str; 30] = [
    "nairobi", "lagos", "johannesburg", "casablanca", "alexandria", "khartoum", "cairo",
    "dar-es-salaam", "addis-ababa", "accra", "kinshasa", "luanda", "algiers", "tunis", "dakar",
    "bamako", "ouagadougou", "abidjan", "kampala", "kigali", "lusaka", "maputo", "harare",
    "gaborone", "windhoek", "libreville", "malabo", "brazzaville", "ndjamena", "niamey",
];

pub const GLOBAL_CITIES: [&str; 18] = [
    "beijing", "delhi", "tokyo", "london", "new-york", "paris", "los-angeles", "mumbai",
    "shanghai", "mexico-city", "seoul", "bangkok", "jakarta", "manila", "singapore", "sydney",
    "moscow", "berlin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    Africa,
    Global,
}

impl Continent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Africa => "africa",
            Continent::Global => "global",
        }
    }

    /// A search term belongs to Africa when it overlaps a priority city slug.
    pub fn for_search(term: &str) -> Self {
        let term = term.trim().to_lowercase().replace(' ', "-");
        let african = PRIORITY_AFRICAN_CITIES
            .iter()
            .any(|city| city.contains(term.as_str()) || term.contains(city));
        if african { Continent::Africa } else { Continent::Global }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiLevel {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiLevel::Good,
            51..=100 => AqiLevel::Moderate,
            101..=150 => AqiLevel::UnhealthyForSensitiveGroups,
            151..=200 => AqiLevel::Unhealthy,
            201..=300 => AqiLevel::VeryUnhealthy,
            _ => AqiLevel::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiLevel::Unhealthy => "Unhealthy",
            AqiLevel::VeryUnhealthy => "Very Unhealthy",
            AqiLevel::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiLevel::Good => "#22C55E",
            AqiLevel::Moderate => "#EAB308",
            AqiLevel::UnhealthyForSensitiveGroups => "#F97316",
            AqiLevel::Unhealthy => "#EF4444",
            AqiLevel::VeryUnhealthy => "#A855F7",
            AqiLevel::Hazardous => "#991B1B",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pollutants {
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReading {
    pub id: String,
    pub city: String,
    pub station_name: String,
    pub aqi: u32,
    pub level: AqiLevel,
    pub pollutants: Pollutants,
    pub continent: Continent,
    pub observed_at: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Entity for AirQualityReading {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.city
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![self.continent.as_str(), self.level.label()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.city, &self.station_name]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "aqi" => Some(SortValue::Number(self.aqi as f64)),
            "pm25" => self.pollutants.pm25.map(SortValue::Number),
            "date" => Some(SortValue::Time(self.observed_at)),
            "name" => Some(SortValue::Text(self.city.clone())),
            _ => None,
        }
    }
}

/// "dar-es-salaam" -> "Dar Es Salaam"
pub fn city_display_name(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_levels() {
        assert_eq!(AqiLevel::from_aqi(50), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(51), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_aqi(150), AqiLevel::UnhealthyForSensitiveGroups);
        assert_eq!(AqiLevel::from_aqi(200), AqiLevel::Unhealthy);
        assert_eq!(AqiLevel::from_aqi(300), AqiLevel::VeryUnhealthy);
        assert_eq!(AqiLevel::from_aqi(301), AqiLevel::Hazardous);
    }

    #[test]
    fn test_city_display_name() {
        assert_eq!(city_display_name("dar-es-salaam"), "Dar Es Salaam");
        assert_eq!(city_display_name("nairobi"), "Nairobi");
    }

    #[test]
    fn test_continent_for_search() {
        assert_eq!(Continent::for_search("Nairobi"), Continent::Africa);
        assert_eq!(Continent::for_search("addis ababa"), Continent::Africa);
        assert_eq!(Continent::for_search("tokyo"), Continent::Global);
    }
}
