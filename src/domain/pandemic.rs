// Pandemic statistics for African countries
use super::entity::{Entity, Provenance, SortValue};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// ISO2 code, display name, region.
pub const AFRICAN_COUNTRIES: [(&str, &str, &str); 54] = [
    ("DZ", "Algeria", "North Africa"),
    ("AO", "Angola", "Central Africa"),
    ("BJ", "Benin", "West Africa"),
    ("BW", "Botswana", "Southern Africa"),
    ("BF", "Burkina Faso", "West Africa"),
    ("BI", "Burundi", "East Africa"),
    ("CM", "Cameroon", "Central Africa"),
    ("CV", "Cabo Verde", "West Africa"),
    ("CF", "Central African Republic", "Central Africa"),
    ("TD", "Chad", "Central Africa"),
    ("KM", "Comoros", "East Africa"),
    ("CG", "Congo", "Central Africa"),
    ("CD", "DR Congo", "Central Africa"),
    ("CI", "Côte d'Ivoire", "West Africa"),
    ("DJ", "Djibouti", "East Africa"),
    ("EG", "Egypt", "North Africa"),
    ("GQ", "Equatorial Guinea", "Central Africa"),
    ("ER", "Eritrea", "East Africa"),
    ("SZ", "Eswatini", "Southern Africa"),
    ("ET", "Ethiopia", "East Africa"),
    ("GA", "Gabon", "Central Africa"),
    ("GM", "Gambia", "West Africa"),
    ("GH", "Ghana", "West Africa"),
    ("GN", "Guinea", "West Africa"),
    ("GW", "Guinea-Bissau", "West Africa"),
    ("KE", "Kenya", "East Africa"),
    ("LS", "Lesotho", "Southern Africa"),
    ("LR", "Liberia", "West Africa"),
    ("LY", "Libya", "North Africa"),
    ("MG", "Madagascar", "East Africa"),
    ("MW", "Malawi", "Southern Africa"),
    ("ML", "Mali", "West Africa"),
    ("MR", "Mauritania", "West Africa"),
    ("MU", "Mauritius", "East Africa"),
    ("MA", "Morocco", "North Africa"),
    ("MZ", "Mozambique", "Southern Africa"),
    ("NA", "Namibia", "Southern Africa"),
    ("NE", "Niger", "West Africa"),
    ("NG", "Nigeria", "West Africa"),
    ("RW", "Rwanda", "East Africa"),
    ("ST", "São Tomé and Príncipe", "Central Africa"),
    ("SN", "Senegal", "West Africa"),
    ("SC", "Seychelles", "East Africa"),
    ("SL", "Sierra Leone", "West Africa"),
    ("SO", "Somalia", "East Africa"),
    ("ZA", "South Africa", "Southern Africa"),
    ("SS", "South Sudan", "East Africa"),
    ("SD", "Sudan", "East Africa"),
    ("TZ", "Tanzania", "East Africa"),
    ("TG", "Togo", "West Africa"),
    ("TN", "Tunisia", "North Africa"),
    ("UG", "Uganda", "East Africa"),
    ("ZM", "Zambia", "Southern Africa"),
    ("ZW", "Zimbabwe", "Southern Africa"),
];

pub fn african_country(iso2: &str) -> Option<(&'static str, &'static str)> {
    AFRICAN_COUNTRIES
        .iter()
        .find(|(code, _, _)| code.eq_ignore_ascii_case(iso2))
        .map(|(_, name, region)| (*name, *region))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStats {
    pub id: String,
    pub name: String,
    pub region: String,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub active: u64,
    pub critical: u64,
    pub today_cases: u64,
    pub today_deaths: u64,
    /// Millions, rounded.
    pub population: u64,
    /// Tests per population as a percentage, used as a vaccination proxy.
    pub vaccinated: u64,
    pub flag: Option<String>,
    pub updated: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Entity for CountryStats {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.updated
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![&self.region]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.id]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "cases" => Some(SortValue::Number(self.cases as f64)),
            "deaths" => Some(SortValue::Number(self.deaths as f64)),
            "recovered" => Some(SortValue::Number(self.recovered as f64)),
            "vaccinated" => Some(SortValue::Number(self.vaccinated as f64)),
            "date" => Some(SortValue::Time(self.updated)),
            "name" => Some(SortValue::Text(self.name.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PandemicStats {
    pub total_cases: u64,
    pub total_deaths: u64,
    pub total_recovered: u64,
    pub active_cases: u64,
    pub avg_vaccination: f64,
    pub mortality_rate: f64,
    pub recovery_rate: f64,
    pub affected_countries: usize,
}

pub fn calculate_stats(countries: &[CountryStats]) -> PandemicStats {
    if countries.is_empty() {
        return PandemicStats::default();
    }
    let total_cases: u64 = countries.iter().map(|c| c.cases).sum();
    let total_deaths: u64 = countries.iter().map(|c| c.deaths).sum();
    let total_recovered: u64 = countries.iter().map(|c| c.recovered).sum();
    let vaccinated: u64 = countries.iter().map(|c| c.vaccinated).sum();
    let rate = |part: u64| {
        if total_cases == 0 { 0.0 } else { part as f64 / total_cases as f64 * 100.0 }
    };

    PandemicStats {
        total_cases,
        total_deaths,
        total_recovered,
        active_cases: total_cases.saturating_sub(total_deaths + total_recovered),
        avg_vaccination: (vaccinated as f64 / countries.len() as f64).round(),
        mortality_rate: rate(total_deaths),
        recovery_rate: rate(total_recovered),
        affected_countries: countries.len(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatMetric {
    #[default]
    Cases,
    Deaths,
    Vaccinated,
}

impl HeatMetric {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cases" => Some(HeatMetric::Cases),
            "deaths" => Some(HeatMetric::Deaths),
            "vaccinated" => Some(HeatMetric::Vaccinated),
            _ => None,
        }
    }

    /// Map fill colour for a country under this metric.
    pub fn color(&self, country: &CountryStats) -> &'static str {
        let per_capita = |n: u64| {
            if country.population == 0 { 0.0 } else { n as f64 / country.population as f64 * 1000.0 }
        };
        match self {
            HeatMetric::Cases => match per_capita(country.cases) {
                v if v > 50.0 => "#DC2626",
                v if v > 30.0 => "#EA580C",
                v if v > 15.0 => "#F59E0B",
                v if v > 5.0 => "#FCD34D",
                _ => "#86EFAC",
            },
            HeatMetric::Deaths => match per_capita(country.deaths) {
                v if v > 2.0 => "#7C2D12",
                v if v > 1.0 => "#DC2626",
                v if v > 0.5 => "#F97316",
                v if v > 0.2 => "#FBBF24",
                _ => "#A7F3D0",
            },
            HeatMetric::Vaccinated => match country.vaccinated {
                v if v >= 80 => "#059669",
                v if v >= 60 => "#10B981",
                v if v >= 40 => "#FBBF24",
                v if v >= 20 => "#F97316",
                _ => "#DC2626",
            },
        }
    }
}
