use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: Instant,
}

/// Time-boxed memo of the last full load. Callers go through
/// `get_or_recompute`, `refresh`, or `invalidate`; nothing else touches
/// the stored value.
pub struct RecordCache<T> {
    ttl: Duration,
    entry: Option<CacheEntry<T>>,
}

impl<T> RecordCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored value if it is younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<T>> {
        self.entry
            .as_ref()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.value))
    }

    /// The stored value regardless of age.
    pub fn last(&self) -> Option<Arc<T>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.value))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    fn store(&mut self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entry = Some(CacheEntry { value: Arc::clone(&value), stored_at: Instant::now() });
        value
    }

    /// Returns the fresh value, or runs `recompute` and stores its output.
    /// On error the previous value (if any) is kept.
    pub async fn get_or_recompute<F, Fut, E>(&mut self, recompute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh() {
            return Ok(value);
        }
        self.refresh(recompute).await
    }

    /// Recomputes unconditionally.
    pub async fn refresh<F, Fut, E>(&mut self, recompute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = recompute().await?;
        Ok(self.store(value))
    }
}
