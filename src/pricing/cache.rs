//! In-memory price table cache with single-flight loading
//!
//! The table is loaded at most once per process unless a load fails or the
//! optional max age elapses. Callers arriving while a load is running block
//! on the same flight and share its outcome. A failed load never discards a
//! table that was already in hand.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::provider::PriceTableFetcher;
use super::types::PriceTable;

type Outcome = Option<Arc<PriceTable>>;

enum CacheState {
    Empty,
    Fetching {
        flight: Arc<Flight>,
        previous: Option<(Arc<PriceTable>, Instant)>,
    },
    Populated {
        table: Arc<PriceTable>,
        fetched_at: Instant,
    },
}

/// One in-progress load and the callers waiting on it
struct Flight {
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Flight {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Outcome {
        let guard = lock(&self.outcome);
        let guard = self
            .done
            .wait_while(guard, |outcome| outcome.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        (*guard).clone().flatten()
    }

    fn publish(&self, outcome: Outcome) {
        *lock(&self.outcome) = Some(outcome);
        self.done.notify_all();
    }
}

pub(crate) struct PriceCache {
    fetcher: Box<dyn PriceTableFetcher>,
    max_age: Option<Duration>,
    state: Mutex<CacheState>,
}

impl PriceCache {
    pub(crate) fn new(fetcher: Box<dyn PriceTableFetcher>, max_age: Option<Duration>) -> Self {
        PriceCache {
            fetcher,
            max_age,
            state: Mutex::new(CacheState::Empty),
        }
    }

    /// Cache that never fetches and always answers with `table`
    pub(crate) fn preloaded(table: PriceTable) -> Self {
        PriceCache {
            fetcher: Box::new(NoFetch),
            max_age: None,
            state: Mutex::new(CacheState::Populated {
                table: Arc::new(table),
                fetched_at: Instant::now(),
            }),
        }
    }

    /// Current table, loading it first if needed. `None` when no load has
    /// ever succeeded.
    pub(crate) fn table(&self) -> Outcome {
        let mut state = lock(&self.state);

        let waiting = match &*state {
            CacheState::Populated { table, fetched_at } if self.is_fresh(*fetched_at) => {
                return Some(Arc::clone(table));
            }
            CacheState::Fetching { flight, .. } => Some(Arc::clone(flight)),
            _ => None,
        };
        if let Some(flight) = waiting {
            drop(state);
            return flight.wait();
        }

        let previous = match std::mem::replace(&mut *state, CacheState::Empty) {
            CacheState::Populated { table, fetched_at } => Some((table, fetched_at)),
            _ => None,
        };
        let flight = Arc::new(Flight::new());
        *state = CacheState::Fetching {
            flight: Arc::clone(&flight),
            previous,
        };
        drop(state);

        let leader = FlightLeader {
            cache: self,
            flight,
            finished: false,
        };
        let started = Instant::now();
        let fetched = match self.fetcher.fetch() {
            Ok(table) => {
                if table.is_empty() {
                    tracing::warn!(source = %self.fetcher.describe(), "pricing table has no models");
                }
                tracing::debug!(
                    source = %self.fetcher.describe(),
                    models = table.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "loaded pricing table"
                );
                Some(Arc::new(table))
            }
            Err(e) => {
                tracing::warn!(source = %self.fetcher.describe(), error = %e, "failed to load pricing table");
                None
            }
        };
        leader.finish(fetched)
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        self.max_age
            .is_none_or(|max_age| fetched_at.elapsed() < max_age)
    }

    /// Leave the fetching state and wake every waiter
    fn complete(&self, flight: &Flight, fetched: Outcome) -> Outcome {
        let mut state = lock(&self.state);
        let previous = match std::mem::replace(&mut *state, CacheState::Empty) {
            CacheState::Fetching { previous, .. } => previous,
            CacheState::Populated { table, fetched_at } => Some((table, fetched_at)),
            CacheState::Empty => None,
        };

        let outcome = match fetched {
            Some(table) => {
                *state = CacheState::Populated {
                    table: Arc::clone(&table),
                    fetched_at: Instant::now(),
                };
                Some(table)
            }
            None => match previous {
                Some((table, fetched_at)) => {
                    *state = CacheState::Populated {
                        table: Arc::clone(&table),
                        fetched_at,
                    };
                    Some(table)
                }
                None => None,
            },
        };
        drop(state);

        flight.publish(outcome.clone());
        outcome
    }
}

/// Owns a flight until its outcome is published. Dropped unfinished (the
/// fetch unwound), it releases waiters with a failure.
struct FlightLeader<'a> {
    cache: &'a PriceCache,
    flight: Arc<Flight>,
    finished: bool,
}

impl FlightLeader<'_> {
    fn finish(mut self, fetched: Outcome) -> Outcome {
        self.finished = true;
        self.cache.complete(&self.flight, fetched)
    }
}

impl Drop for FlightLeader<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.cache.complete(&self.flight, None);
        }
    }
}

struct NoFetch;

impl PriceTableFetcher for NoFetch {
    fn fetch(&self) -> Result<PriceTable, crate::error::PricingError> {
        Ok(PriceTable::default())
    }

    fn describe(&self) -> String {
        "preloaded".to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::pricing::types::ModelPricing;
    use std::collections::HashMap;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Fetcher that fails on the listed call numbers (1-based)
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        fail_on: Vec<usize>,
        panic_on: Vec<usize>,
        delay: Duration,
    }

    impl CountingFetcher {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            CountingFetcher {
                calls,
                fail_on: Vec::new(),
                panic_on: Vec::new(),
                delay: Duration::ZERO,
            }
        }
    }

    impl PriceTableFetcher for CountingFetcher {
        fn fetch(&self) -> Result<PriceTable, PricingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            thread::sleep(self.delay);
            if self.panic_on.contains(&call) {
                panic!("fetch {call} blew up");
            }
            if self.fail_on.contains(&call) {
                return Err(PricingError::Status { code: 503 });
            }
            let mut models = HashMap::new();
            models.insert(format!("model-{call}"), ModelPricing::default());
            Ok(PriceTable::new(models))
        }

        fn describe(&self) -> String {
            "test".to_string()
        }
    }

    fn has_model(table: &Outcome, name: &str) -> bool {
        table
            .as_ref()
            .is_some_and(|t| t.models.contains_key(name))
    }

    #[test]
    fn fetches_once_and_reuses_table() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PriceCache::new(Box::new(CountingFetcher::new(calls.clone())), None);

        let first = cache.table();
        let second = cache.table();
        assert!(has_model(&first, "model-1"));
        assert!(Arc::ptr_eq(first.as_ref().unwrap(), second.as_ref().unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        const CALLERS: usize = 8;
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetcher = CountingFetcher::new(calls.clone());
        fetcher.delay = Duration::from_millis(100);
        let cache = Arc::new(PriceCache::new(Box::new(fetcher), None));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.table()
                })
            })
            .collect();

        for handle in handles {
            assert!(has_model(&handle.join().unwrap(), "model-1"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_fetch_is_retried_on_next_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetcher = CountingFetcher::new(calls.clone());
        fetcher.fail_on = vec![1];
        let cache = PriceCache::new(Box::new(fetcher), None);

        assert!(cache.table().is_none());
        assert!(has_model(&cache.table(), "model-2"));
        assert!(has_model(&cache.table(), "model-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_refresh_keeps_previous_table() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetcher = CountingFetcher::new(calls.clone());
        fetcher.fail_on = vec![2];
        let cache = PriceCache::new(Box::new(fetcher), Some(Duration::ZERO));

        assert!(has_model(&cache.table(), "model-1"));
        // max age of zero makes every call a refresh; the second one fails
        assert!(has_model(&cache.table(), "model-1"));
        assert!(has_model(&cache.table(), "model-3"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn fresh_table_is_not_refetched_within_max_age() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PriceCache::new(
            Box::new(CountingFetcher::new(calls.clone())),
            Some(Duration::from_secs(3600)),
        );
        cache.table();
        cache.table();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_leader_releases_state_for_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetcher = CountingFetcher::new(calls.clone());
        fetcher.panic_on = vec![1];
        let cache = Arc::new(PriceCache::new(Box::new(fetcher), None));

        let leader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.table())
        };
        assert!(leader.join().is_err());

        assert!(has_model(&cache.table(), "model-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn preloaded_cache_never_fetches() {
        let mut models = HashMap::new();
        models.insert("seeded".to_string(), ModelPricing::default());
        let cache = PriceCache::preloaded(PriceTable::new(models));
        assert!(has_model(&cache.table(), "seeded"));
    }
}
