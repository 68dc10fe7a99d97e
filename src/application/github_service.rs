// GitHub service - Use case for the developer profile dashboard
use crate::application::data_source::{FetchRequest, Origin};
use crate::application::fallback::GithubFallback;
use crate::application::pipeline::SharedPipeline;
use crate::application::session::DashboardSession;
use crate::application::view_state;
use crate::domain::chart::{ChartData, ChartKind, ChartPoint, TileData};
use crate::domain::dashboard::Dashboard;
use crate::domain::fetch_result::FetchResult;
use crate::domain::github::{
    activity_by_day, event_type_breakdown, language_breakdown, repo_totals, top_repos, GithubAccount,
    GithubOptions, Repository, REPO_SORT_KEYS,
};

pub const DEFAULT_USER: &str = "lizardcat";
const ACTIVITY_DAYS: usize = 14;

#[derive(Clone)]
pub struct GithubService {
    pipeline: SharedPipeline<GithubAccount, GithubOptions, GithubFallback>,
}

impl GithubService {
    pub fn new(pipeline: SharedPipeline<GithubAccount, GithubOptions, GithubFallback>) -> Self {
        Self { pipeline }
    }

    /// Loads one account. A blank login means the default profile; an unknown sort key means "updated".
    pub async fn load(&self, login: &str, sort: &str, origin: Origin) -> FetchResult<GithubAccount> {
        let login = match login.trim() {
            "" => DEFAULT_USER,
            other => other,
        };
        let sort = if REPO_SORT_KEYS.contains(&sort) { sort } else { "updated" };
        let request = FetchRequest::per_target(
            vec![login.to_string()],
            GithubOptions {
                sort: sort.to_string(),
            },
        )
        .with_origin(origin);

        tracing::info!("Loading GitHub profile {} (sorted by {})", login, sort);
        self.pipeline.load(&request).await
    }

    /// The repository page follows the session's view; `top_metric` picks the top-repos chart.
    pub fn dashboard(&self, session: &DashboardSession<GithubAccount>, top_metric: &str) -> Dashboard<Repository> {
        let notice = session.banner().visible().cloned();
        let Some(account) = session.entities().first() else {
            let page = view_state::render::<Repository>(&[], &session.view);
            return Dashboard::new("GitHub".to_string(), Vec::new(), Vec::new(), page).with_notice(notice);
        };

        let title = format!("{} on GitHub", account.user.display_name());
        let page = view_state::render(&account.repos, &session.view);
        Dashboard::new(title, tiles(account), charts(account, top_metric), page).with_notice(notice)
    }
}

fn tiles(account: &GithubAccount) -> Vec<TileData> {
    let totals = repo_totals(&account.repos);
    vec![
        TileData::new("repos", "Public Repos", "", account.user.public_repos as f64, 0),
        TileData::new("followers", "Followers", "", account.user.followers as f64, 0),
        TileData::new("following", "Following", "", account.user.following as f64, 0),
        TileData::new("stars", "Total Stars", "", totals.stars as f64, 0),
        TileData::new("forks", "Total Forks", "", totals.forks as f64, 0),
        TileData::new("watchers", "Watchers", "", totals.watchers as f64, 0),
        TileData::new("orgs", "Organizations", "", account.organizations.len() as f64, 0),
        TileData::new("gists", "Gists", "", account.gists.len() as f64, 0),
    ]
}

fn charts(account: &GithubAccount, top_metric: &str) -> Vec<ChartData> {
    let languages = language_breakdown(&account.repos)
        .into_iter()
        .map(|stat| ChartPoint::new(stat.name, stat.count as f64))
        .collect();

    let activity = activity_by_day(&account.events, ACTIVITY_DAYS)
        .into_iter()
        .map(|(day, count)| ChartPoint::new(day.format("%b %d").to_string(), count as f64))
        .collect();

    let event_types = event_type_breakdown(&account.events)
        .into_iter()
        .map(|(kind, count)| ChartPoint::new(kind, count as f64))
        .collect();

    let (metric, unit) = match top_metric {
        "forks" => ("forks", "forks"),
        "size" => ("size", "KB"),
        "updated" => ("updated", "stars"),
        _ => ("stars", "stars"),
    };
    let top = top_repos(&account.repos, metric, false)
        .into_iter()
        .map(|repo| ChartPoint::new(repo.name.clone(), repo_metric(repo, metric)))
        .collect();

    vec![
        ChartData::single("languages", "Languages", Some("repos"), ChartKind::Pie, languages),
        ChartData::single("activity", "Contribution Activity", Some("events"), ChartKind::Line, activity),
        ChartData::single("event-types", "Event Types", Some("events"), ChartKind::Bar, event_types),
        ChartData::single("top-repos", "Top Repositories", Some(unit), ChartKind::Bar, top),
    ]
}

fn repo_metric(repo: &Repository, metric: &str) -> f64 {
    match metric {
        "forks" => repo.forks as f64,
        "size" => repo.size as f64,
        // Ordered by recency, plotted by stars.
        _ => repo.stars as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::Pipeline;
    use crate::application::view_state::ViewState;
    use crate::domain::notice::Notice;
    use crate::infrastructure::github_api::GithubApi;
    use crate::infrastructure::http_client::testing::FakeTransport;
    use std::sync::Arc;
    use std::time::Duration;

    const USER: &str = r#"{"login":"lizardcat","name":"Lizard Cat","avatar_url":"https://a/1",
        "public_repos":2,"followers":5,"following":1,"created_at":"2019-04-01T00:00:00Z"}"#;
    const REPOS: &str = r#"[
        {"full_name":"lizardcat/dash","name":"dash","description":"dashboards","language":"TypeScript",
         "stargazers_count":10,"forks_count":2,"watchers_count":10,"size":300,"fork":false,
         "html_url":"https://github.com/lizardcat/dash","created_at":"2023-01-01T00:00:00Z",
         "updated_at":"2024-02-01T00:00:00Z","pushed_at":"2024-02-01T00:00:00Z"},
        {"full_name":"lizardcat/tokio","name":"tokio","description":"fork","language":"Rust",
         "stargazers_count":0,"forks_count":0,"watchers_count":0,"size":900,"fork":true,
         "html_url":"https://github.com/lizardcat/tokio","created_at":"2023-06-01T00:00:00Z",
         "updated_at":"2024-01-01T00:00:00Z","pushed_at":null}]"#;

    fn service(transport: Arc<FakeTransport>) -> GithubService {
        let api = GithubApi::new(transport, "https://api.github.com", None, 100, 20);
        GithubService::new(Pipeline::shared(Arc::new(api), GithubFallback::seeded(3), Duration::from_secs(12)))
    }

    fn live_transport() -> Arc<FakeTransport> {
        Arc::new(
            FakeTransport::new()
                .route("/users/lizardcat/repos", 200, REPOS)
                .route("/users/lizardcat/events", 200, "[]")
                .route("/users/lizardcat/orgs", 200, "[]")
                .route("/users/lizardcat/gists", 200, "[]")
                .route("/users/lizardcat", 200, USER),
        )
    }

    #[tokio::test]
    async fn test_blank_login_loads_default_user() {
        let transport = live_transport();
        let result = service(transport.clone()).load("  ", "bogus", Origin::Initial).await;

        assert!(result.is_live());
        assert_eq!(result.data()[0].user.login, "lizardcat");
        assert!(transport.calls().iter().any(|u| u.contains("sort=updated")));
    }

    #[tokio::test]
    async fn test_searching_unknown_user_reports_not_found() {
        let transport = Arc::new(FakeTransport::new().route("/users/", 404, r#"{"message":"Not Found"}"#));
        let service = service(transport);

        let searched = service.load("ghost-user", "updated", Origin::Search).await;
        assert_eq!(searched.error().map(|e| e.kind()), Some(crate::domain::error::ErrorKind::NotFound));

        // The same miss on first load degrades to a synthetic profile.
        let initial = service.load("ghost-user", "updated", Origin::Initial).await;
        assert!(initial.is_success());
        assert!(matches!(initial.warning(), Some(Notice::FallbackData { .. })));
    }

    #[tokio::test]
    async fn test_dashboard_filters_repositories() {
        let service = service(live_transport());
        let mut session = DashboardSession::new(ViewState::default().with_sort("updated"));
        let ticket = session.begin(Origin::Initial);
        session.complete(ticket, service.load("lizardcat", "updated", Origin::Initial).await);

        let all = service.dashboard(&session, "stars");
        assert_eq!(all.title, "Lizard Cat on GitHub");
        assert_eq!(all.page.total, 2);
        assert_eq!(all.tiles.iter().find(|t| t.id == "stars").map(|t| t.value), Some(10.0));
        let top = all.charts.iter().find(|c| c.id == "top-repos").unwrap();
        assert_eq!(top.series[0].points.len(), 1);

        session.view.set_filter(Some("forks"));
        let forks = service.dashboard(&session, "stars");
        assert_eq!(forks.page.total, 1);
        assert_eq!(forks.page.items[0].entity.name, "tokio");
        assert_eq!(forks.notice, None);
    }
}
