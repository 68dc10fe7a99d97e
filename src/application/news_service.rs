// News service - Use case for the headlines and article search dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::NewsFallback;
use crate::application::pipeline::SharedPipeline;
use crate::application::session::DashboardSession;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;
use crate::domain::news::{Article, NewsQuery, CATEGORIES, COUNTRIES};
use crate::domain::watchlist::Watchlist;
use std::collections::HashMap;

const TOP_SOURCES: usize = 8;

#[derive(Clone)]
pub struct NewsService {
    pipeline: SharedPipeline<Article, NewsQuery, NewsFallback>,
    page_size: usize,
}

impl NewsService {
    pub fn new(pipeline: SharedPipeline<Article, NewsQuery, NewsFallback>, page_size: usize) -> Self {
        Self { pipeline, page_size }
    }

    /// Unknown categories and countries fall back to "general" and "us".
    pub async fn headlines(&self, category: &str, country: &str, origin: Origin) -> FetchResult<Article> {
        let category = if CATEGORIES.contains(&category) { category } else { "general" };
        let country = if COUNTRIES.iter().any(|(code, _)| *code == country) { country } else { "us" };
        tracing::info!("Loading {} headlines for {}", category, country);

        let request = FetchRequest::new(
            vec![category.to_string()],
            NewsQuery::Headlines {
                category: category.to_string(),
                country: country.to_string(),
            },
            self.page_size,
        )
        .with_origin(origin);
        self.pipeline.load(&request).await
    }

    pub async fn search(&self, query: &str) -> FetchResult<Article> {
        let query = query.trim();
        if query.is_empty() {
            return FetchResult::success(Vec::new());
        }
        let request = FetchRequest::new(
            vec![query.to_string()],
            NewsQuery::Search {
                query: query.to_string(),
            },
            self.page_size,
        )
        .with_origin(Origin::Search);
        self.pipeline.load(&request).await
    }

    /// Bookmarks live only as long as the caller keeps the watchlist.
    pub fn dashboard(&self, session: &DashboardSession<Article>, bookmarks: &Watchlist<Article>) -> Dashboard<Article> {
        let articles = session.entities();
        let mut per_source: HashMap<&str, usize> = HashMap::new();
        for article in articles {
            *per_source.entry(article.source.as_str()).or_default() += 1;
        }

        let tiles = vec![
            TileData::new("articles", "Articles", "", articles.len() as f64, 0),
            TileData::new("sources", "Sources", "", per_source.len() as f64, 0),
            TileData::new("bookmarks", "Bookmarked", "", bookmarks.len() as f64, 0),
        ];

        let mut sources: Vec<(&str, usize)> = per_source.into_iter().collect();
        sources.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let points = sources
            .into_iter()
            .take(TOP_SOURCES)
            .map(|(source, count)| ChartPoint::new(source, count as f64))
            .collect();
        let charts = vec![ChartData::single("sources", "Top Sources", Some("articles"), ChartKind::Bar, points)];

        Dashboard::new("News".to_string(), tiles, charts, session.render())
            .with_notice(session.banner().visible().cloned())
    }
}
