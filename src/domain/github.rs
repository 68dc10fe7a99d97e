// GitHub account, repository and activity models
use super::entity::{Entity, Provenance, SortValue};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const REPO_SORT_KEYS: [&str; 4] = ["updated", "created", "pushed", "full_name"];

const ACTIVITY_EVENT_TYPES: [&str; 4] = ["PushEvent", "CreateEvent", "IssuesEvent", "PullRequestEvent"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubOptions {
    /// One of `REPO_SORT_KEYS`.
    pub sort: String,
}

impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            sort: "updated".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubUser {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: DateTime<Utc>,
}

impl GithubUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repository {
    pub full_name: String,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub size: u64,
    pub fork: bool,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub provenance: Provenance,
}

impl Entity for Repository {
    fn id(&self) -> &str {
        &self.full_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn categories(&self) -> Vec<&str> {
        let mut categories = vec![if self.fork { "forks" } else { "original" }];
        if let Some(language) = &self.language {
            categories.push(language);
        }
        categories
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(description) = &self.description {
            fields.push(description);
        }
        fields
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "updated" | "date" => Some(SortValue::Time(self.updated_at)),
            "created" => Some(SortValue::Time(self.created_at)),
            "pushed" => Some(SortValue::Time(self.pushed_at.unwrap_or(self.updated_at))),
            "full_name" | "name" => Some(SortValue::Text(self.full_name.clone())),
            "stars" => Some(SortValue::Number(self.stars as f64)),
            "forks" => Some(SortValue::Number(self.forks as f64)),
            "size" => Some(SortValue::Number(self.size as f64)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub id: String,
    pub kind: String,
    pub repo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gist {
    pub id: String,
    pub description: Option<String>,
    pub files: usize,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the GitHub dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubAccount {
    pub user: GithubUser,
    pub repos: Vec<Repository>,
    pub events: Vec<ActivityEvent>,
    pub organizations: Vec<Organization>,
    pub gists: Vec<Gist>,
    pub provenance: Provenance,
}

impl Entity for GithubAccount {
    fn id(&self) -> &str {
        &self.user.login
    }

    fn name(&self) -> &str {
        self.user.display_name()
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.repos
            .iter()
            .map(|r| r.updated_at)
            .max()
            .unwrap_or(self.user.created_at)
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub name: String,
    pub count: usize,
    pub stars: u64,
    pub size: u64,
}

/// Repositories per language, most used first, at most eight.
pub fn language_breakdown(repos: &[Repository]) -> Vec<LanguageStat> {
    let mut by_language: HashMap<&str, LanguageStat> = HashMap::new();
    for repo in repos {
        let Some(language) = repo.language.as_deref() else {
            continue;
        };
        let stat = by_language.entry(language).or_insert_with(|| LanguageStat {
            name: language.to_string(),
            count: 0,
            stars: 0,
            size: 0,
        });
        stat.count += 1;
        stat.stars += repo.stars;
        stat.size += repo.size;
    }

    let mut stats: Vec<LanguageStat> = by_language.into_values().collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    stats.truncate(8);
    stats
}

/// Contribution events per day, oldest first, limited to the last `days` active days.
pub fn activity_by_day(events: &[ActivityEvent], days: usize) -> Vec<(NaiveDate, usize)> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for event in events
        .iter()
        .filter(|e| ACTIVITY_EVENT_TYPES.contains(&e.kind.as_str()))
    {
        *per_day.entry(event.created_at.date_naive()).or_default() += 1;
    }
    let skip = per_day.len().saturating_sub(days);
    per_day.into_iter().skip(skip).collect()
}

/// Event counts by type with the "Event" suffix stripped, top five.
pub fn event_type_breakdown(events: &[ActivityEvent]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for event in events {
        *counts
            .entry(event.kind.trim_end_matches("Event").to_string())
            .or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(5);
    sorted
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepoTotals {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub size: u64,
}

pub fn repo_totals(repos: &[Repository]) -> RepoTotals {
    repos.iter().fold(RepoTotals::default(), |acc, r| RepoTotals {
        stars: acc.stars + r.stars,
        forks: acc.forks + r.forks,
        watchers: acc.watchers + r.watchers,
        size: acc.size + r.size,
    })
}

/// Six best repositories by `metric` (stars, forks, updated, size). Forks only count when `include_forks`.
pub fn top_repos<'a>(repos: &'a [Repository], metric: &str, include_forks: bool) -> Vec<&'a Repository> {
    let mut candidates: Vec<&Repository> = repos
        .iter()
        .filter(|r| !r.fork || include_forks)
        .collect();
    candidates.sort_by(|a, b| match (a.sort_value(metric), b.sort_value(metric)) {
        (Some(x), Some(y)) => x.display_cmp(&y),
        _ => std::cmp::Ordering::Equal,
    });
    candidates.truncate(6);
    candidates
}
