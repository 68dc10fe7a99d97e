// Rate governor - Spaces and budgets calls to quota-limited upstreams
use crate::domain::error::FetchError;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorPolicy {
    /// Minimum spacing between two consecutive calls.
    pub min_interval: Duration,
    /// Calls allowed inside `window`; 0 disables the window budget.
    pub max_calls: usize,
    pub window: Duration,
}

impl GovernorPolicy {
    pub fn spacing(min_interval: Duration) -> Self {
        Self {
            min_interval,
            max_calls: 0,
            window: Duration::ZERO,
        }
    }

    pub fn with_budget(mut self, max_calls: usize, window: Duration) -> Self {
        self.max_calls = max_calls;
        self.window = window;
        self
    }
}

#[derive(Debug, Default)]
struct RateBudget {
    last_call_at: Option<Instant>,
    /// Reserved slots still inside the window, oldest first.
    calls: VecDeque<Instant>,
}

/// Targets split between live calls and synthetic data, original order kept inside each half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    pub live: Vec<T>,
    pub fallback: Vec<T>,
}

#[derive(Debug)]
pub struct RateGovernor {
    name: String,
    policy: GovernorPolicy,
    budget: Mutex<RateBudget>,
}

impl RateGovernor {
    pub fn new(name: impl Into<String>, policy: GovernorPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            budget: Mutex::new(RateBudget::default()),
        }
    }

    pub fn policy(&self) -> GovernorPolicy {
        self.policy
    }

    /// Waits until a call is allowed. Slots are reserved under the lock so concurrent
    /// callers are serialized in arrival order.
    pub async fn acquire(&self) {
        let slot = self.reserve(None).await.unwrap_or_else(|_| Instant::now());
        tokio::time::sleep_until(slot).await;
    }

    /// Like `acquire`, but gives up without consuming budget when the wait would exceed `patience`.
    pub async fn acquire_within(&self, patience: Duration) -> Result<(), FetchError> {
        let slot = self.reserve(Some(patience)).await?;
        tokio::time::sleep_until(slot).await;
        Ok(())
    }

    /// First `live_quota` targets go live, the rest are served synthetically.
    pub fn partition<T: Clone>(targets: &[T], live_quota: usize) -> Partition<T> {
        let split = live_quota.min(targets.len());
        Partition {
            live: targets[..split].to_vec(),
            fallback: targets[split..].to_vec(),
        }
    }

    async fn reserve(&self, patience: Option<Duration>) -> Result<Instant, FetchError> {
        let mut budget = self.budget.lock().await;
        let now = Instant::now();
        let slot = self.earliest(&mut budget, now);
        let wait = slot.saturating_duration_since(now);

        if let Some(patience) = patience {
            if wait > patience {
                tracing::warn!("{}: next slot in {:?}, over patience {:?}", self.name, wait, patience);
                return Err(FetchError::RateLimited(format!(
                    "{} quota exhausted, retry in {}s",
                    self.name,
                    wait.as_secs()
                )));
            }
        }

        if !wait.is_zero() {
            tracing::debug!("{}: throttling call for {:?}", self.name, wait);
        }
        budget.last_call_at = Some(slot);
        if self.policy.max_calls > 0 {
            budget.calls.push_back(slot);
        }
        Ok(slot)
    }

    fn earliest(&self, budget: &mut RateBudget, now: Instant) -> Instant {
        let window = self.policy.window;
        while budget.calls.front().is_some_and(|t| *t + window <= now) {
            budget.calls.pop_front();
        }

        let mut slot = now;
        if let Some(last) = budget.last_call_at {
            slot = slot.max(last + self.policy.min_interval);
        }
        let max_calls = self.policy.max_calls;
        if max_calls > 0 && budget.calls.len() >= max_calls {
            let oldest = budget.calls[budget.calls.len() - max_calls];
            slot = slot.max(oldest + window);
        }
        slot
    }
}
