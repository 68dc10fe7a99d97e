// Summary tiles and chart series shown above each dashboard's entity list
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: f64, precision: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
            precision,
        }
    }

    /// Value rounded to the tile's precision, as displayed.
    pub fn formatted(&self) -> String {
        let digits = self.precision.max(0) as usize;
        if self.unit.is_empty() {
            format!("{:.*}", digits, self.value)
        } else {
            format!("{:.*} {}", digits, self.value, self.unit)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl SeriesData {
    pub fn new(id: &str, name: &str, color: Option<String>, points: Vec<ChartPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Pie,
    /// Choropleth; each series is one fill colour.
    Heat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(id: &str, title: &str, unit: Option<&str>, kind: ChartKind, series: Vec<SeriesData>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.map(str::to_string),
            kind,
            series,
        }
    }

    /// Single-series chart, the common case.
    pub fn single(id: &str, title: &str, unit: Option<&str>, kind: ChartKind, points: Vec<ChartPoint>) -> Self {
        let series = SeriesData::new(id, title, None, points);
        Self::new(id, title, unit, kind, vec![series])
    }
}
