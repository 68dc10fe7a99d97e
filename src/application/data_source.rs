// Data source and fallback contracts implemented once per upstream API
use crate::domain::error::FetchError;
use async_trait::async_trait;

/// What triggered a fetch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Origin {
    #[default]
    Initial,
    Refresh,
    Search,
}

#[derive(Debug, Clone)]
pub struct FetchRequest<O> {
    /// Usernames, city ids, tickers, country codes...
    pub targets: Vec<String>,
    pub options: O,
    /// Number of entities a fallback must produce for this request.
    pub count: usize,
    pub origin: Origin,
}

impl<O> FetchRequest<O> {
    pub fn new(targets: Vec<String>, options: O, count: usize) -> Self {
        Self {
            targets,
            options,
            count,
            origin: Origin::Initial,
        }
    }

    /// One entity per target.
    pub fn per_target(targets: Vec<String>, options: O) -> Self {
        let count = targets.len();
        Self::new(targets, options, count)
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// The first target, or "" for target-less requests.
    pub fn target(&self) -> &str {
        self.targets.first().map(String::as_str).unwrap_or("")
    }
}

impl<O: Clone> FetchRequest<O> {
    pub fn for_target(&self, target: &str) -> Self {
        Self {
            targets: vec![target.to_string()],
            options: self.options.clone(),
            count: 1,
            origin: self.origin,
        }
    }
}

/// Entities from one successful upstream round trip, plus targets that could not be served.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<E> {
    pub entities: Vec<E>,
    pub missing: Vec<String>,
}

impl<E> Batch<E> {
    pub fn new(entities: Vec<E>) -> Self {
        Self {
            entities,
            missing: Vec::new(),
        }
    }

    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }
}

impl<E> From<Vec<E>> for Batch<E> {
    fn from(entities: Vec<E>) -> Self {
        Self::new(entities)
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    type Entity: Send + 'static;
    type Options: Send + Sync;

    /// Upstream name used in logs.
    fn name(&self) -> &'static str;

    /// False when the upstream needs a credential and none is configured.
    fn has_credential(&self) -> bool {
        true
    }

    /// Exactly one set of network round trips per call.
    async fn fetch(&self, request: &FetchRequest<Self::Options>) -> Result<Batch<Self::Entity>, FetchError>;
}

/// Produces synthetic entities shaped like a data source's output. Never fails.
pub trait FallbackGenerator: Send + Sync {
    type Entity;

    /// Exactly `count` entities; targets seed the values where plausible.
    /// Offline search generators are the exception: they return at most `count`
    /// matches for the query in `targets[0]` and never pad with unrelated entries.
    fn generate(&self, targets: &[String], count: usize) -> Vec<Self::Entity>;
}
