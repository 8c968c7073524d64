//! Per-namespace memoisation of pet service account tokens.
//!
//! # Design
//! - Each namespace owns a slot holding a once-initialised future result, so
//!   concurrent callers join the fetch already in flight instead of starting
//!   their own.
//! - A slot is valid for a fixed window counted from issuance; an expired slot
//!   is swapped for an empty one under the map lock.
//! - Failed or cancelled fetches leave the slot empty; the next caller fetches.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use saturn_telemetry::ClientMetrics;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::clock::Clock;
use crate::error::{AjaxError, AjaxResult};

/// Validity window of a cached token.
pub const TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Issued {
    token: String,
    at: Instant,
}

type Slot = Arc<OnceCell<Issued>>;

enum InitFailure {
    Cancelled,
    Failed(AjaxError),
}

/// Time-bounded token memo keyed by namespace.
pub struct TokenCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    metrics: ClientMetrics,
    slots: Mutex<HashMap<String, Slot>>,
}

impl TokenCache {
    /// Cache with the standard window.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, metrics: ClientMetrics) -> Self {
        Self::with_ttl(clock, metrics, TOKEN_TTL)
    }

    /// Cache with a custom window.
    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, metrics: ClientMetrics, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            metrics,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached token for `namespace`, or run `fetch` to obtain one.
    ///
    /// `fetch` resolving to `Ok(None)` means its signal fired; that result is
    /// passed through and nothing is cached.
    ///
    /// # Errors
    ///
    /// Propagates the error of the fetch this call ran.
    pub async fn get_or_fetch<F, Fut>(&self, namespace: &str, fetch: F) -> AjaxResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AjaxResult<String>>,
    {
        let slot = self.live_slot(namespace);
        if let Some(issued) = slot.get() {
            self.metrics.inc_token_fetch("hit");
            return Ok(Some(issued.token.clone()));
        }

        let mut ran_fetch = false;
        let ran = &mut ran_fetch;
        let outcome = slot
            .get_or_try_init(|| async move {
                *ran = true;
                match fetch().await {
                    Ok(Some(token)) => Ok(Issued {
                        token,
                        at: self.clock.now(),
                    }),
                    Ok(None) => Err(InitFailure::Cancelled),
                    Err(err) => Err(InitFailure::Failed(err)),
                }
            })
            .await;

        match outcome {
            Ok(issued) => {
                let result = if ran_fetch { "ok" } else { "hit" };
                self.metrics.inc_token_fetch(result);
                debug!(namespace, result, "pet token resolved");
                Ok(Some(issued.token.clone()))
            }
            Err(InitFailure::Cancelled) => Ok(None),
            Err(InitFailure::Failed(err)) => {
                self.metrics.inc_token_fetch("failed");
                Err(err)
            }
        }
    }

    /// Drop every cached token.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn live_slot(&self, namespace: &str) -> Slot {
        let now = self.clock.now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()));
        let expired = slot
            .get()
            .is_some_and(|issued| now.saturating_duration_since(issued.at) >= self.ttl);
        if expired {
            debug!(namespace, "pet token expired");
            *slot = Arc::new(OnceCell::new());
        }
        Arc::clone(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(clock: Arc<ManualClock>) -> TokenCache {
        TokenCache::new(clock, ClientMetrics::new().expect("metrics"))
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(Arc::clone(&clock));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("ns", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AjaxError::MissingSession)
            })
            .await;
        assert!(matches!(first, Err(AjaxError::MissingSession)));

        let second = cache
            .get_or_fetch("ns", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some("tok".to_string()))
            })
            .await
            .expect("second fetch");
        assert_eq!(second.as_deref(), Some("tok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.metrics.snapshot().token_fetches_failed, 1);
    }

    #[tokio::test]
    async fn cancelled_fetch_passes_through_and_caches_nothing() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock);

        let cancelled = cache
            .get_or_fetch("ns", || async { Ok(None) })
            .await
            .expect("no error");
        assert_eq!(cancelled, None);

        let fetched = cache
            .get_or_fetch("ns", || async { Ok(Some("fresh".to_string())) })
            .await
            .expect("fetch");
        assert_eq!(fetched.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn namespaces_are_cached_independently() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock);
        let a = cache
            .get_or_fetch("a", || async { Ok(Some("tok-a".to_string())) })
            .await
            .expect("a");
        let b = cache
            .get_or_fetch("b", || async { Ok(Some("tok-b".to_string())) })
            .await
            .expect("b");
        assert_eq!(a.as_deref(), Some("tok-a"));
        assert_eq!(b.as_deref(), Some("tok-b"));

        let again = cache
            .get_or_fetch("a", || async { Ok(Some("other".to_string())) })
            .await
            .expect("a again");
        assert_eq!(again.as_deref(), Some("tok-a"));
        assert_eq!(cache.metrics.snapshot().token_cache_hits, 1);
    }

    #[tokio::test]
    async fn window_boundary_triggers_refetch() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(Arc::clone(&clock));
        let fetch =
            |token: &'static str| move || async move { Ok::<_, AjaxError>(Some(token.to_string())) };

        cache.get_or_fetch("ns", fetch("first")).await.expect("first");
        clock.advance(TOKEN_TTL - Duration::from_secs(1));
        let cached = cache.get_or_fetch("ns", fetch("second")).await.expect("cached");
        assert_eq!(cached.as_deref(), Some("first"));

        clock.advance(Duration::from_secs(1));
        let refreshed = cache.get_or_fetch("ns", fetch("third")).await.expect("refresh");
        assert_eq!(refreshed.as_deref(), Some("third"));

        cache.clear();
        let cleared = cache.get_or_fetch("ns", fetch("fourth")).await.expect("cleared");
        assert_eq!(cleared.as_deref(), Some("fourth"));
    }
}
