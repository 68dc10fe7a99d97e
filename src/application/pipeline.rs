// Fetch -> fallback -> result pipeline shared by every dashboard
use crate::application::data_source::{Batch, DataSource, FallbackGenerator, FetchRequest, Origin};
use crate::domain::error::FetchError;
use crate::domain::fetch_result::FetchResult;
use crate::domain::notice::Notice;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// What to do with targets that failed while others succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialPolicy {
    /// Drop them and report them as missing.
    Reduce,
    /// Replace each with a synthetic entity in place.
    Backfill,
}

/// A pipeline over a type-erased source, the form services hold.
pub type SharedPipeline<E, O, G> = Pipeline<dyn DataSource<Entity = E, Options = O>, G>;

pub struct Pipeline<S: ?Sized, G> {
    source: Arc<S>,
    fallback: Arc<G>,
    timeout: Duration,
}

impl<S: ?Sized, G> Clone for Pipeline<S, G> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            fallback: self.fallback.clone(),
            timeout: self.timeout,
        }
    }
}

impl<E, O, G> SharedPipeline<E, O, G>
where
    E: Send + 'static,
    O: Send + Sync + 'static,
    G: FallbackGenerator<Entity = E>,
{
    /// Erases the concrete source so services can hold any adapter.
    pub fn shared<S>(source: Arc<S>, fallback: G, timeout: Duration) -> Self
    where
        S: DataSource<Entity = E, Options = O> + 'static,
    {
        let source: Arc<dyn DataSource<Entity = E, Options = O>> = source;
        Self::new(source, Arc::new(fallback), timeout)
    }
}

impl<S, G> Pipeline<S, G>
where
    S: DataSource + ?Sized,
    G: FallbackGenerator<Entity = S::Entity>,
{
    pub fn new(source: Arc<S>, fallback: Arc<G>, timeout: Duration) -> Self {
        Self {
            source,
            fallback,
            timeout,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn fallback(&self) -> &G {
        &self.fallback
    }

    pub fn has_credential(&self) -> bool {
        self.source.has_credential()
    }

    /// Raw adapter outcome. Without a credential no call is made and synthetic data is returned.
    pub async fn fetch(&self, request: &FetchRequest<S::Options>) -> FetchResult<S::Entity> {
        if !self.source.has_credential() {
            tracing::debug!("{}: no credential configured, serving demo data", self.source.name());
            return FetchResult::success_with(self.synthesize(request), Some(Notice::DemoData));
        }

        match self.fetch_live(request).await {
            Ok(batch) => {
                let warning = if batch.missing.is_empty() {
                    None
                } else {
                    Some(Notice::PartialData {
                        missing: batch.missing,
                    })
                };
                FetchResult::success_with(batch.entities, warning)
            }
            Err(err) => FetchResult::Failure(err),
        }
    }

    /// Degrade-not-fail: every failure becomes synthetic data plus a notice, except a
    /// user search for an identifier that does not exist.
    pub async fn load(&self, request: &FetchRequest<S::Options>) -> FetchResult<S::Entity> {
        match self.fetch(request).await {
            FetchResult::Failure(FetchError::NotFound(target)) if request.origin == Origin::Search => {
                tracing::info!("{}: '{}' not found", self.source.name(), target);
                FetchResult::Failure(FetchError::NotFound(target))
            }
            FetchResult::Failure(err) => {
                tracing::warn!("{}: {}, falling back to mock data", self.source.name(), err);
                FetchResult::success_with(
                    self.synthesize(request),
                    Some(Notice::FallbackData { reason: err.kind() }),
                )
            }
            other => other,
        }
    }

    /// Fetches each target separately and merges the outcomes. Only when every target
    /// fails does the whole request fall back.
    pub async fn load_each(&self, request: &FetchRequest<S::Options>, policy: PartialPolicy) -> FetchResult<S::Entity>
    where
        S::Options: Clone,
    {
        if !self.source.has_credential() || request.targets.is_empty() {
            return self.load(request).await;
        }

        let singles: Vec<FetchRequest<S::Options>> =
            request.targets.iter().map(|t| request.for_target(t)).collect();
        let outcomes = join_all(singles.iter().map(|single| self.fetch_live(single))).await;

        let mut entities = Vec::with_capacity(request.targets.len());
        let mut missing = Vec::new();
        let mut first_error = None;

        for (target, outcome) in request.targets.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    entities.extend(batch.entities);
                    missing.extend(batch.missing);
                }
                Err(err) => {
                    tracing::warn!("{}: {} failed: {}", self.source.name(), target, err);
                    if policy == PartialPolicy::Backfill {
                        entities.extend(self.fallback.generate(std::slice::from_ref(target), 1));
                    }
                    missing.push(target.clone());
                    first_error.get_or_insert(err);
                }
            }
        }

        if missing.len() == request.targets.len() {
            if let Some(err) = first_error {
                return FetchResult::success_with(
                    self.synthesize(request),
                    Some(Notice::FallbackData { reason: err.kind() }),
                );
            }
        }

        let warning = if missing.is_empty() {
            None
        } else {
            Some(Notice::PartialData { missing })
        };
        FetchResult::success_with(entities, warning)
    }

    pub fn synthesize(&self, request: &FetchRequest<S::Options>) -> Vec<S::Entity> {
        self.fallback.generate(&request.targets, request.count)
    }

    async fn fetch_live(&self, request: &FetchRequest<S::Options>) -> Result<Batch<S::Entity>, FetchError> {
        match tokio::time::timeout(self.timeout, self.source.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}
