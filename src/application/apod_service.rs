// APOD service - Use case for the NASA astronomy picture gallery
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::ApodFallback;
use crate::application::favorites::{Favorites, KeyValueStore};
use crate::application::pipeline::SharedPipeline;
use crate::application::session::DashboardSession;
use crate::application::view_state;
use crate::domain::astronomy::{ApodImage, DateRange, FavoriteImage, MediaType};
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;
use std::sync::Arc;

pub const FAVORITES_KEY: &str = "nasa-favorites";

#[derive(Clone)]
pub struct ApodService {
    pipeline: SharedPipeline<ApodImage, DateRange, ApodFallback>,
    store: Arc<dyn KeyValueStore>,
}

impl ApodService {
    pub fn new(pipeline: SharedPipeline<ApodImage, DateRange, ApodFallback>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { pipeline, store }
    }

    /// Favorites as last persisted.
    pub fn favorites(&self) -> Favorites<FavoriteImage> {
        Favorites::load(self.store.clone(), FAVORITES_KEY)
    }

    pub async fn load(&self, range: DateRange, origin: Origin) -> FetchResult<ApodImage> {
        tracing::info!("Loading APOD pictures for {:?}", range);
        let request = FetchRequest::new(Vec::new(), range, range.expected_count()).with_origin(origin);
        self.pipeline.load(&request).await
    }

    /// Returns whether the picture is a favorite afterwards.
    pub fn toggle_favorite(&self, favorites: &mut Favorites<FavoriteImage>, image: &ApodImage) -> anyhow::Result<bool> {
        favorites.toggle(FavoriteImage::from(image))
    }

    /// With `favorites_only`, the gallery shows loaded pictures that are also favorites.
    pub fn dashboard(
        &self,
        session: &DashboardSession<ApodImage>,
        favorites: &Favorites<FavoriteImage>,
        favorites_only: bool,
    ) -> Dashboard<ApodImage> {
        let images = session.entities();
        let videos = images.iter().filter(|i| i.media_type == MediaType::Video).count();

        let tiles = vec![
            TileData::new("pictures", "Pictures", "", images.len() as f64, 0),
            TileData::new("images", "Images", "", (images.len() - videos) as f64, 0),
            TileData::new("videos", "Videos", "", videos as f64, 0),
            TileData::new("favorites", "Favorites", "", favorites.len() as f64, 0),
        ];
        let charts = vec![ChartData::single(
            "media",
            "Media Types",
            None,
            ChartKind::Pie,
            vec![
                ChartPoint::new("image", (images.len() - videos) as f64),
                ChartPoint::new("video", videos as f64),
            ],
        )];

        let page = if favorites_only {
            let kept: Vec<ApodImage> = images.iter().filter(|i| favorites.contains(&i.id)).cloned().collect();
            view_state::render(&kept, &session.view)
        } else {
            session.render()
        };

        Dashboard::new("Astronomy Picture of the Day".to_string(), tiles, charts, page)
            .with_notice(session.banner().visible().cloned())
    }
}
