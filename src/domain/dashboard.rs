// Dashboard display model
use super::chart::{ChartData, TileData};
use super::notice::Notice;
use serde::Serialize;

/// One rendered page of entities plus pagination and selection state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel<E> {
    pub items: Vec<DisplayItem<E>>,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

impl<E> DisplayModel<E> {
    pub fn entities(&self) -> impl Iterator<Item = &E> {
        self.items.iter().map(|i| &i.entity)
    }

    pub fn selected(&self) -> Option<&E> {
        self.items.iter().find(|i| i.selected).map(|i| &i.entity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayItem<E> {
    #[serde(flatten)]
    pub entity: E,
    pub selected: bool,
}

/// Everything a route renders: summary tiles, charts, the entity page and the banner.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<E> {
    pub title: String,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
    pub page: DisplayModel<E>,
    pub notice: Option<Notice>,
}

impl<E> Dashboard<E> {
    pub fn new(title: String, tiles: Vec<TileData>, charts: Vec<ChartData>, page: DisplayModel<E>) -> Self {
        Self {
            title,
            tiles,
            charts,
            page,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }
}
