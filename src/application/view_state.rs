// View state and renderer - Pure projection of fetched entities onto one page
use crate::domain::dashboard::{DisplayItem, DisplayModel};
use crate::domain::entity::Entity;
use crate::domain::weather::UnitSystem;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Category filter; `None` and "all" show everything.
    pub filter: Option<String>,
    pub search: String,
    pub sort_key: String,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub selected: Option<String>,
    pub units: UnitSystem,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: None,
            search: String::new(),
            sort_key: "date".to_string(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            selected: None,
            units: UnitSystem::Metric,
        }
    }
}

impl ViewState {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_sort(mut self, sort_key: &str) -> Self {
        self.sort_key = sort_key.to_string();
        self
    }

    pub fn set_filter(&mut self, filter: Option<&str>) {
        self.filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        self.page = 1;
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort_key: &str) {
        self.sort_key = sort_key.to_string();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Selection is exclusive: selecting an entity replaces any previous selection.
    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn toggle_units(&mut self) {
        self.units = self.units.toggled();
    }

    /// Pulls `page` back into range after the underlying list shrank.
    pub fn clamp_page(&mut self, visible: usize) {
        self.page = self.page.clamp(1, page_count(visible, self.page_size));
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Filter, search and sort without paginating.
pub fn visible<'a, E: Entity>(entities: &'a [E], view: &ViewState) -> Vec<&'a E> {
    let needle = view.search.trim().to_lowercase();
    let mut matched: Vec<&E> = entities
        .iter()
        .filter(|e| match &view.filter {
            Some(filter) => e.categories().iter().any(|c| c.eq_ignore_ascii_case(filter)),
            None => true,
        })
        .filter(|e| {
            needle.is_empty()
                || e.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect();

    // Stable: entities without a value for the key keep their relative order at the end.
    matched.sort_by(|a, b| match (a.sort_value(&view.sort_key), b.sort_value(&view.sort_key)) {
        (Some(x), Some(y)) => x.display_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    matched
}

/// Sorts before paginating, so the default `date` key shows the newest entities
/// first. A key no entity sorts on keeps the input order.
pub fn render<E: Entity + Clone>(entities: &[E], view: &ViewState) -> DisplayModel<E> {
    let matched = visible(entities, view);
    let total = matched.len();
    let page_size = view.page_size.max(1);
    let page_count = page_count(total, page_size);
    let page = view.page.clamp(1, page_count);

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|e| DisplayItem {
            selected: view.selected.as_deref() == Some(e.id()),
            entity: e.clone(),
        })
        .collect();

    DisplayModel {
        items,
        total,
        page,
        page_count,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Provenance, SortValue};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Task {
        id: String,
        title: String,
        status: &'static str,
        at: DateTime<Utc>,
    }

    impl Entity for Task {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.title
        }

        fn observed_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn provenance(&self) -> Provenance {
            Provenance::Live
        }

        fn categories(&self) -> Vec<&str> {
            vec![self.status]
        }

        fn sort_value(&self, key: &str) -> Option<SortValue> {
            match key {
                "date" => Some(SortValue::Time(self.at)),
                "name" => Some(SortValue::Text(self.title.clone())),
                _ => None,
            }
        }
    }

    fn tasks(n: usize) -> Vec<Task> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Task {
                id: format!("t{i}"),
                title: format!("Task {i}"),
                status: if i % 2 == 0 { "completed" } else { "planned" },
                at: base + Duration::hours(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_filter_keeps_only_matching_category() {
        let items = tasks(3);
        let mut view = ViewState::default();
        view.set_filter(Some("Completed"));

        let model = render(&items, &view);
        assert_eq!(model.total, 2);
        assert!(model.entities().all(|t| t.status == "completed"));
    }

    #[test]
    fn test_filter_keeps_relative_order_under_unsorted_key() {
        let items = tasks(3);
        let mut view = ViewState::default().with_sort("position");
        view.set_filter(Some("completed"));

        let model = render(&items, &view);
        let ids: Vec<&str> = model.entities().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t0", "t2"]);
    }

    #[test]
    fn test_page_is_clamped() {
        let items = tasks(25);
        let mut view = ViewState::default();
        view.set_page(4);

        let model = render(&items, &view);
        assert_eq!(model.page_count, 3);
        assert_eq!(model.page, 3);
        assert_eq!(model.items.len(), 1);

        view.clamp_page(model.total);
        assert_eq!(view.page, 3);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let model = render::<Task>(&[], &ViewState::default());
        assert_eq!(model.page, 1);
        assert_eq!(model.page_count, 1);
        assert!(model.items.is_empty());
    }

    #[test]
    fn test_default_sort_is_newest_first_and_search_resets_page() {
        let items = tasks(25);
        let mut view = ViewState::default();
        view.set_page(2);
        view.set_search("task 2");
        assert_eq!(view.page, 1);

        let model = render(&items, &view);
        let ids: Vec<&str> = model.entities().map(|t| t.id.as_str()).collect();
        assert_eq!(ids[0], "t24");
        assert_eq!(ids.last(), Some(&"t2"));
    }

    #[test]
    fn test_selection_is_exclusive() {
        let items = tasks(3);
        let mut view = ViewState::default();
        view.select("t1");
        view.select("t2");

        let model = render(&items, &view);
        assert_eq!(model.items.iter().filter(|i| i.selected).count(), 1);
        assert_eq!(model.selected().map(|t| t.id.as_str()), Some("t2"));
    }
}
