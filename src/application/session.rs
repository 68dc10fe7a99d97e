// Dashboard session - Owns one dashboard's data, view state and banner across fetch cycles
use crate::application::data_source::Origin;
use crate::application::view_state::{self, ViewState};
use crate::domain::dashboard::DisplayModel;
use crate::domain::entity::Entity;
use crate::domain::error::FetchError;
use crate::domain::fetch_result::FetchResult;
use crate::domain::notice::{Banner, Notice};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Issued when a fetch cycle starts; only the newest ticket may write its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    pub origin: Origin,
}

/// Shared between a session and its in-flight fetches.
#[derive(Debug)]
pub struct RequestSequencer {
    latest: AtomicU64,
    mounted: AtomicBool,
}

impl Default for RequestSequencer {
    fn default() -> Self {
        Self {
            latest: AtomicU64::new(0),
            mounted: AtomicBool::new(true),
        }
    }
}

impl RequestSequencer {
    pub fn issue(&self, origin: Origin) -> Ticket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { seq, origin }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct DashboardSession<E> {
    sequencer: Arc<RequestSequencer>,
    result: FetchResult<E>,
    pub view: ViewState,
    banner: Banner,
}

impl<E: Entity + Clone> DashboardSession<E> {
    pub fn new(view: ViewState) -> Self {
        Self {
            sequencer: Arc::new(RequestSequencer::default()),
            result: FetchResult::Pending,
            view,
            banner: Banner::default(),
        }
    }

    pub fn sequencer(&self) -> Arc<RequestSequencer> {
        self.sequencer.clone()
    }

    pub fn begin(&self, origin: Origin) -> Ticket {
        self.sequencer.issue(origin)
    }

    /// Applies a finished fetch. Returns false when the result was discarded because a
    /// newer cycle started or the dashboard was unmounted.
    pub fn complete(&mut self, ticket: Ticket, result: FetchResult<E>) -> bool {
        if !self.sequencer.is_current(&ticket) {
            tracing::debug!("discarding stale result (origin {:?})", ticket.origin);
            return false;
        }

        match result {
            FetchResult::Pending => {}
            FetchResult::Success {
                warning: Some(Notice::FallbackData { reason }),
                ..
            } if ticket.origin != Origin::Initial && self.result.is_live() => {
                // A failed user action keeps live data on screen.
                self.banner.show(Notice::ActionFailed { reason });
            }
            FetchResult::Success {
                data,
                fetched_at,
                warning,
            } => {
                match &warning {
                    Some(notice) => self.banner.show(notice.clone()),
                    None => self.banner.clear(),
                }
                self.result = FetchResult::Success {
                    data,
                    fetched_at,
                    warning,
                };
                let visible = view_state::visible(self.result.data(), &self.view).len();
                self.view.clamp_page(visible);
            }
            FetchResult::Failure(FetchError::NotFound(target)) => {
                self.banner.show(Notice::NotFound { target });
            }
            FetchResult::Failure(err) => {
                self.banner.show(Notice::ActionFailed { reason: err.kind() });
                if self.result.is_pending() {
                    self.result = FetchResult::Failure(err);
                }
            }
        }
        true
    }

    pub fn unmount(&self) {
        self.sequencer.unmount();
    }

    pub fn result(&self) -> &FetchResult<E> {
        &self.result
    }

    pub fn entities(&self) -> &[E] {
        self.result.data()
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn dismiss_banner(&mut self) {
        self.banner.dismiss();
    }

    pub fn render(&self) -> DisplayModel<E> {
        view_state::render(self.result.data(), &self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::entity::Provenance;
    use crate::domain::news::Article;
    use chrono::Utc;

    fn article(id: &str, provenance: Provenance) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Headline {id}"),
            description: format!("Summary {id}"),
            url: format!("https://news.example/{id}"),
            image_url: None,
            source: "Example".to_string(),
            author: None,
            category: "general".to_string(),
            published_at: Utc::now(),
            provenance,
        }
    }

    #[test]
    fn test_last_writer_wins() {
        let mut session = DashboardSession::new(ViewState::default());
        let first = session.begin(Origin::Search);
        let second = session.begin(Origin::Search);

        assert!(session.complete(second, FetchResult::success(vec![article("b", Provenance::Live)])));
        assert!(!session.complete(first, FetchResult::success(vec![article("a", Provenance::Live)])));
        assert_eq!(session.entities()[0].id, "b");
    }

    #[test]
    fn test_unmount_discards_in_flight_result() {
        let mut session = DashboardSession::<Article>::new(ViewState::default());
        let ticket = session.begin(Origin::Initial);
        session.unmount();

        assert!(!session.complete(ticket, FetchResult::success(vec![article("a", Provenance::Live)])));
        assert!(session.result().is_pending());
    }

    #[test]
    fn test_failed_refresh_keeps_live_data() {
        let mut session = DashboardSession::new(ViewState::default());
        let initial = session.begin(Origin::Initial);
        session.complete(initial, FetchResult::success(vec![article("live", Provenance::Live)]));
        assert!(session.banner().visible().is_none());

        let refresh = session.begin(Origin::Refresh);
        let degraded = FetchResult::success_with(
            vec![article("mock", Provenance::Synthetic)],
            Some(Notice::FallbackData { reason: ErrorKind::Network }),
        );
        session.complete(refresh, degraded);

        assert_eq!(session.entities()[0].id, "live");
        assert_eq!(
            session.banner().visible(),
            Some(&Notice::ActionFailed { reason: ErrorKind::Network })
        );
    }

    #[test]
    fn test_initial_fallback_shows_demo_data() {
        let mut session = DashboardSession::new(ViewState::default());
        let ticket = session.begin(Origin::Initial);
        session.complete(
            ticket,
            FetchResult::success_with(
                vec![article("mock", Provenance::Synthetic)],
                Some(Notice::FallbackData { reason: ErrorKind::RateLimited }),
            ),
        );

        assert!(session.entities()[0].provenance == Provenance::Synthetic);
        assert!(session.banner().visible().is_some_and(Notice::is_demo));
    }

    #[test]
    fn test_not_found_keeps_previous_data() {
        let mut session = DashboardSession::new(ViewState::default());
        let initial = session.begin(Origin::Initial);
        session.complete(initial, FetchResult::success(vec![article("a", Provenance::Live)]));

        let search = session.begin(Origin::Search);
        session.complete(search, FetchResult::Failure(FetchError::NotFound("zzz".into())));

        assert_eq!(session.entities().len(), 1);
        assert_eq!(
            session.banner().visible(),
            Some(&Notice::NotFound { target: "zzz".into() })
        );
    }
}
