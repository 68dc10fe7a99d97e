// Debouncer - Emits a value only after input has been quiet for a period
use futures::Stream;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::Sender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet: Duration) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(16);
        (Self::with_sender(quiet, tx), rx)
    }

    /// Settled values go to an existing channel, shared with other debouncers.
    pub fn with_sender(quiet: Duration, tx: mpsc::Sender<T>) -> Self {
        Self {
            quiet,
            pending: None,
            tx,
        }
    }

    /// Restarts the quiet period; a value still waiting is dropped.
    pub fn push(&mut self, value: T) {
        self.push_after(value, self.quiet);
    }

    /// Like `push`, with a quiet period for this value only.
    pub fn push_after(&mut self, value: T, quiet: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = tx.send(value).await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// One debouncer per key, all feeding the same receiver. Input only cancels
/// a pending value under the same key.
pub struct KeyedDebouncer<K, T> {
    tx: mpsc::Sender<T>,
    lanes: HashMap<K, Debouncer<T>>,
}

impl<K: Eq + Hash, T: Send + 'static> KeyedDebouncer<K, T> {
    pub fn new() -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(16);
        let debouncer = Self {
            tx,
            lanes: HashMap::new(),
        };
        (debouncer, rx)
    }

    pub fn push_after(&mut self, key: K, value: T, quiet: Duration) {
        let tx = &self.tx;
        self.lanes
            .entry(key)
            .or_insert_with(|| Debouncer::with_sender(quiet, tx.clone()))
            .push_after(value, quiet);
    }

    pub fn cancel(&mut self, key: &K) {
        if let Some(lane) = self.lanes.get_mut(key) {
            lane.cancel();
        }
    }
}

/// Adapts the debouncer's receiver into a stream of settled values.
pub fn settled<T>(mut rx: mpsc::Receiver<T>) -> impl Stream<Item = T> {
    async_stream::stream! {
        while let Some(value) = rx.recv().await {
            yield value;
        }
    }
}
