// GitHub fallback - Seeded profile, repositories and activity
use super::rng_for;
use crate::application::data_source::FallbackGenerator;
use crate::domain::entity::Provenance;
use crate::domain::github::{ActivityEvent, GithubAccount, GithubUser, Repository};
use chrono::{Duration, Utc};
use rand::Rng;

const LANGUAGES: [&str; 6] = ["Rust", "TypeScript", "Python", "Go", "JavaScript", "Shell"];
const EVENT_KINDS: [&str; 4] = ["PushEvent", "CreateEvent", "IssuesEvent", "PullRequestEvent"];
const REPO_COUNT: usize = 8;
const EVENT_COUNT: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct GithubFallback {
    seed: Option<u64>,
}

impl GithubFallback {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn account(&self, login: &str) -> GithubAccount {
        let mut rng = rng_for(self.seed, login);
        let now = Utc::now();

        let repos: Vec<Repository> = (1..=REPO_COUNT)
            .map(|n| {
                let name = format!("project-{n}");
                let created_at = now - Duration::days(rng.gen_range(60..1500));
                Repository {
                    full_name: format!("{login}/{name}"),
                    name,
                    description: Some(format!("Sample repository {n}")),
                    language: Some(LANGUAGES[rng.gen_range(0..LANGUAGES.len())].to_string()),
                    stars: rng.gen_range(0..500),
                    forks: rng.gen_range(0..80),
                    watchers: rng.gen_range(0..60),
                    size: rng.gen_range(50..20_000),
                    fork: n % 4 == 0,
                    html_url: format!("https://github.com/{login}/project-{n}"),
                    created_at,
                    updated_at: now - Duration::days(rng.gen_range(0..60)),
                    pushed_at: Some(now - Duration::days(rng.gen_range(0..60))),
                    provenance: Provenance::Synthetic,
                }
            })
            .collect();

        let events = (0..EVENT_COUNT)
            .map(|i| ActivityEvent {
                id: format!("mock-event-{i}"),
                kind: EVENT_KINDS[rng.gen_range(0..EVENT_KINDS.len())].to_string(),
                repo: repos[i % repos.len()].full_name.clone(),
                created_at: now - Duration::hours(rng.gen_range(0..24 * 30)),
            })
            .collect();

        GithubAccount {
            user: GithubUser {
                login: login.to_string(),
                name: None,
                avatar_url: format!("https://github.com/{login}.png"),
                bio: Some("Demo profile".to_string()),
                location: None,
                company: None,
                blog: None,
                public_repos: REPO_COUNT as u64,
                followers: rng.gen_range(0..2000),
                following: rng.gen_range(0..200),
                created_at: now - Duration::days(rng.gen_range(365..3650)),
            },
            repos,
            events,
            organizations: Vec::new(),
            gists: Vec::new(),
            provenance: Provenance::Synthetic,
        }
    }
}

impl FallbackGenerator for GithubFallback {
    type Entity = GithubAccount;

    fn generate(&self, targets: &[String], count: usize) -> Vec<GithubAccount> {
        (0..count)
            .map(|i| {
                let login = targets.get(i).map(String::as_str).unwrap_or("octocat");
                self.account(login)
            })
            .collect()
    }
}
