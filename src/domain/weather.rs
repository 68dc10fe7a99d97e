// City weather models
use super::entity::{slugify, Entity, Provenance, SortValue};
use super::watchlist::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: String,
    pub country_code: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl City {
    pub fn new(name: &str, country: &str, country_code: &str) -> Self {
        Self {
            id: Self::make_id(name, country_code),
            name: name.to_string(),
            country: country.to_string(),
            country_code: country_code.to_string(),
            state: None,
            lat: None,
            lon: None,
        }
    }

    /// "Cape Town", "ZA" -> "cape-town-za"
    pub fn make_id(name: &str, country_code: &str) -> String {
        if country_code.is_empty() {
            return slugify(name);
        }
        format!("{}-{}", slugify(name), country_code.to_lowercase())
    }

    /// Upstream query form, "Cape Town,ZA".
    pub fn target(&self) -> String {
        if self.country_code.is_empty() {
            self.name.clone()
        } else {
            format!("{},{}", self.name, self.country_code)
        }
    }

    /// Accepts a city id ("cape-town-za"), a query ("Cape Town,ZA") or a bare name.
    pub fn parse_target(target: &str) -> City {
        let (name, code) = match target.split_once(',') {
            Some((name, code)) => (name.trim(), code.trim()),
            None => (target.trim(), ""),
        };
        default_cities()
            .into_iter()
            .find(|c| {
                c.id == target
                    || (c.name.eq_ignore_ascii_case(name)
                        && (code.is_empty() || c.country_code.eq_ignore_ascii_case(code)))
            })
            .unwrap_or_else(|| City::new(name, "", &code.to_uppercase()))
    }
}

impl Keyed for City {
    fn key(&self) -> &str {
        &self.id
    }
}

pub fn default_cities() -> Vec<City> {
    vec![
        City::new("Nairobi", "Kenya", "KE"),
        City::new("Arusha", "Tanzania", "TZ"),
        City::new("Dar es Salaam", "Tanzania", "TZ"),
        City::new("Lagos", "Nigeria", "NG"),
        City::new("Cape Town", "South Africa", "ZA"),
        City::new("Cairo", "Egypt", "EG"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Overcast,
}

impl Condition {
    /// Maps an OpenWeatherMap `weather[0].main` group.
    pub fn from_upstream(group: &str) -> Self {
        match group.to_lowercase().as_str() {
            "clear" => Condition::Sunny,
            "clouds" => Condition::Cloudy,
            "rain" | "drizzle" | "thunderstorm" => Condition::Rainy,
            "snow" | "mist" | "fog" => Condition::Overcast,
            _ => Condition::Sunny,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::Rainy => "rainy",
            Condition::Overcast => "overcast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityWeather {
    pub city_id: String,
    pub city_name: String,
    pub country_code: String,
    /// Degrees Celsius.
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed_kmh: f64,
    pub pressure: u32,
    pub visibility_km: f64,
    pub uv_index: u8,
    pub condition: Condition,
    pub description: String,
    pub sunrise: String,
    pub sunset: String,
    pub observed_at: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Entity for CityWeather {
    fn id(&self) -> &str {
        &self.city_id
    }

    fn name(&self) -> &str {
        &self.city_name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        vec![self.condition.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.city_name, &self.description]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "temperature" => Some(SortValue::Number(self.temperature)),
            "humidity" => Some(SortValue::Number(self.humidity as f64)),
            "wind" => Some(SortValue::Number(self.wind_speed_kmh)),
            "date" => Some(SortValue::Time(self.observed_at)),
            "name" => Some(SortValue::Text(self.city_name.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Converts a Celsius reading for display, rounded to whole degrees.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            UnitSystem::Metric => celsius.round(),
            UnitSystem::Imperial => (celsius * 9.0 / 5.0 + 32.0).round(),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}

/// Average, highest and lowest temperature in Celsius. Zeroes when empty.
pub fn summarize(readings: &[CityWeather]) -> WeatherSummary {
    if readings.is_empty() {
        return WeatherSummary::default();
    }
    let temps: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    WeatherSummary {
        average: (temps.iter().sum::<f64>() / temps.len() as f64).round(),
        highest: temps.iter().cloned().fold(f64::MIN, f64::max),
        lowest: temps.iter().cloned().fold(f64::MAX, f64::min),
    }
}
