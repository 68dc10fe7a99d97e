// GitHub REST adapter - profile, repositories, activity, organizations and gists for one user
use crate::application::data_source::{Batch, DataSource, FetchRequest};
use crate::domain::entity::Provenance;
use crate::domain::error::FetchError;
use crate::domain::github::{ActivityEvent, GithubAccount, GithubOptions, GithubUser, Gist, Organization, Repository};
use crate::infrastructure::config::prepare_path;
use crate::infrastructure::http_client::{query_url, HttpRequest, HttpTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

pub struct GithubApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: Option<String>,
    per_page: usize,
    gists_per_page: usize,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    login: String,
    name: Option<String>,
    avatar_url: String,
    bio: Option<String>,
    location: Option<String>,
    company: Option<String>,
    blog: Option<String>,
    #[serde(default)]
    public_repos: u64,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RepoDto {
    full_name: String,
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    fork: bool,
    html_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EventDto {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    repo: EventRepoDto,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct EventRepoDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OrgDto {
    login: String,
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct GistDto {
    id: String,
    description: Option<String>,
    #[serde(default)]
    files: HashMap<String, serde_json::Value>,
    html_url: String,
    created_at: DateTime<Utc>,
}

impl GithubApi {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        token: Option<String>,
        per_page: usize,
        gists_per_page: usize,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            per_page,
            gists_per_page,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        template: &str,
        login: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut vars = HashMap::new();
        vars.insert("user".to_string(), login.to_string());
        let url = query_url(&self.base_url, &prepare_path(template, &vars), params);

        let mut request = HttpRequest::get(url).header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        self.transport.get(request).await?.json(login)
    }
}

#[async_trait]
impl DataSource for GithubApi {
    type Entity = GithubAccount;
    type Options = GithubOptions;

    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, request: &FetchRequest<GithubOptions>) -> Result<Batch<GithubAccount>, FetchError> {
        let login = request.target().trim();
        if login.is_empty() {
            return Err(FetchError::NotFound(String::new()));
        }

        // The profile decides whether the user exists; everything else is optional.
        let user: UserDto = self.get_json("/users/${user}", login, &[]).await?;

        let per_page = self.per_page.to_string();
        let gists_per_page = self.gists_per_page.to_string();
        let repo_params = [("sort", request.options.sort.as_str()), ("per_page", per_page.as_str())];
        let event_params = [("per_page", per_page.as_str())];
        let gist_params = [("per_page", gists_per_page.as_str())];
        let (repos, events, orgs, gists) = tokio::join!(
            self.get_json::<Vec<RepoDto>>("/users/${user}/repos", login, &repo_params),
            self.get_json::<Vec<EventDto>>("/users/${user}/events", login, &event_params),
            self.get_json::<Vec<OrgDto>>("/users/${user}/orgs", login, &[]),
            self.get_json::<Vec<GistDto>>("/users/${user}/gists", login, &gist_params),
        );

        let mut missing = Vec::new();
        let repos = section("repos", repos, &mut missing);
        let events = section("events", events, &mut missing);
        let orgs = section("orgs", orgs, &mut missing);
        let gists = section("gists", gists, &mut missing);

        let account = to_account(user, repos, events, orgs, gists);
        tracing::debug!(
            "github: {} with {} repos, {} events",
            account.user.login,
            account.repos.len(),
            account.events.len()
        );
        Ok(Batch::new(vec![account]).with_missing(missing))
    }
}

fn section<T>(name: &str, result: Result<Vec<T>, FetchError>, missing: &mut Vec<String>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!("github: {} unavailable: {}", name, err);
            missing.push(name.to_string());
            Vec::new()
        }
    }
}

fn to_account(
    user: UserDto,
    repos: Vec<RepoDto>,
    events: Vec<EventDto>,
    orgs: Vec<OrgDto>,
    gists: Vec<GistDto>,
) -> GithubAccount {
    GithubAccount {
        user: GithubUser {
            login: user.login,
            name: user.name.filter(|n| !n.is_empty()),
            avatar_url: user.avatar_url,
            bio: user.bio,
            location: user.location,
            company: user.company,
            blog: user.blog.filter(|b| !b.is_empty()),
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
        },
        repos: repos
            .into_iter()
            .map(|r| Repository {
                full_name: r.full_name,
                name: r.name,
                description: r.description,
                language: r.language,
                stars: r.stargazers_count,
                forks: r.forks_count,
                watchers: r.watchers_count,
                size: r.size,
                fork: r.fork,
                html_url: r.html_url,
                created_at: r.created_at,
                updated_at: r.updated_at,
                pushed_at: r.pushed_at,
                provenance: Provenance::Live,
            })
            .collect(),
        events: events
            .into_iter()
            .map(|e| ActivityEvent {
                id: e.id,
                kind: e.kind,
                repo: e.repo.name,
                created_at: e.created_at,
            })
            .collect(),
        organizations: orgs
            .into_iter()
            .map(|o| Organization {
                login: o.login,
                avatar_url: o.avatar_url,
            })
            .collect(),
        gists: gists
            .into_iter()
            .map(|g| Gist {
                id: g.id,
                description: g.description.filter(|d| !d.is_empty()),
                files: g.files.len(),
                html_url: g.html_url,
                created_at: g.created_at,
            })
            .collect(),
        provenance: Provenance::Live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::testing::FakeTransport;

    const USER: &str = r#"{"login":"octocat","name":"The Octocat","avatar_url":"https://a/1","bio":null,
        "location":"SF","company":"@github","blog":"","public_repos":8,"followers":100,"following":9,
        "created_at":"2011-01-25T18:44:36Z"}"#;
    const REPOS: &str = r#"[{"full_name":"octocat/hello","name":"hello","description":"hi","language":"Rust",
        "stargazers_count":42,"forks_count":3,"watchers_count":42,"size":120,"fork":false,
        "html_url":"https://github.com/octocat/hello","created_at":"2020-01-01T00:00:00Z",
        "updated_at":"2024-01-01T00:00:00Z","pushed_at":null}]"#;
    const GISTS: &str = r#"[{"id":"g1","description":"","files":{"a.rs":{},"b.rs":{}},
        "html_url":"https://gist.github.com/g1","created_at":"2023-05-01T00:00:00Z"}]"#;

    fn api(transport: Arc<FakeTransport>) -> GithubApi {
        GithubApi::new(transport, "https://api.github.com", Some("t0k".to_string()), 100, 20)
    }

    #[tokio::test]
    async fn test_fetch_assembles_account_and_reports_missing_sections() {
        let transport = Arc::new(
            FakeTransport::new()
                .route("/users/octocat/repos", 200, REPOS)
                .route("/users/octocat/events", 500, "")
                .route("/users/octocat/orgs", 200, r#"[{"login":"github","avatar_url":"https://a/2"}]"#)
                .route("/users/octocat/gists", 200, GISTS)
                .route("/users/octocat", 200, USER),
        );
        let request = FetchRequest::per_target(vec!["octocat".to_string()], GithubOptions::default());

        let batch = api(transport.clone()).fetch(&request).await.unwrap();
        let account = &batch.entities[0];

        assert_eq!(batch.missing, vec!["events"]);
        assert_eq!(account.user.display_name(), "The Octocat");
        assert_eq!(account.user.blog, None);
        assert_eq!(account.repos[0].stars, 42);
        assert_eq!(account.gists[0].files, 2);
        assert_eq!(account.gists[0].description, None);
        assert!(transport.calls().iter().any(|u| u.ends_with("/repos?sort=updated&per_page=100")));
        assert!(transport.calls().iter().any(|u| u.ends_with("/gists?per_page=20")));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let transport = Arc::new(FakeTransport::new().route("/users/", 404, r#"{"message":"Not Found"}"#));
        let request = FetchRequest::per_target(vec!["nobody-here".to_string()], GithubOptions::default());

        let err = api(transport.clone()).fetch(&request).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("nobody-here".to_string()));
        assert_eq!(transport.call_count(), 1);
    }
}
