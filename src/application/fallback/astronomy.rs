// Astronomy fallback - Seeded picture-of-the-day entries for a date range
use super::rng_for;
use crate::application::data_source::FallbackGenerator;
use crate::domain::astronomy::{ApodImage, MediaType};
use crate::domain::entity::Provenance;
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;

const SUBJECTS: [(&str, &str); 6] = [
    ("The Andromeda Galaxy", "Our nearest large galactic neighbour spans more than six full moons across the sky."),
    ("Pillars of Creation", "Columns of cold gas and dust in the Eagle Nebula are nurseries for new stars."),
    ("Saturn at Opposition", "The ringed planet shines brightly as Earth passes between it and the Sun."),
    ("Aurora over Iceland", "Charged particles from the solar wind paint the northern sky green and violet."),
    ("The Orion Nebula", "A stellar nursery 1,300 light-years away, visible to the unaided eye."),
    ("Total Solar Eclipse", "The Moon's shadow reveals the Sun's pearly corona for a few precious minutes."),
];

/// One picture per day, newest first. Targets may carry ISO dates to anchor the pictures.
#[derive(Debug, Clone, Default)]
pub struct ApodFallback {
    seed: Option<u64>,
}

impl ApodFallback {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn image(&self, date: NaiveDate) -> ApodImage {
        let id = date.format("%Y-%m-%d").to_string();
        let mut rng = rng_for(self.seed, &id);
        let (title, explanation) = SUBJECTS[rng.gen_range(0..SUBJECTS.len())];
        ApodImage {
            url: format!("https://picsum.photos/seed/{id}/960/640"),
            hd_url: None,
            id,
            date,
            title: title.to_string(),
            explanation: explanation.to_string(),
            media_type: MediaType::Image,
            copyright: None,
            provenance: Provenance::Synthetic,
        }
    }
}

impl FallbackGenerator for ApodFallback {
    type Entity = ApodImage;

    fn generate(&self, targets: &[String], count: usize) -> Vec<ApodImage> {
        let today = Utc::now().date_naive();
        (0..count)
            .map(|i| {
                let date = targets
                    .get(i)
                    .and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok())
                    .unwrap_or_else(|| today - Duration::days(i as i64));
                self.image(date)
            })
            .collect()
    }
}
