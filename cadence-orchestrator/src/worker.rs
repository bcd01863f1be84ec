//! Scope worker pool: crossbeam queue, bounded retry, failure isolation.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use cadence_core::config::ScheduleConfig;
use cadence_core::errors::{CadenceError, CadenceResult, LearnError};
use cadence_core::model::Scope;

/// Fans scope units out over worker threads. A unit that keeps failing
/// after the retry budget is reported as `RetriesExhausted`; sibling
/// scopes are unaffected.
pub struct WorkerPool {
    workers: usize,
    max_retries: u32,
    initial_backoff: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            workers: workers.max(1),
            max_retries,
            initial_backoff,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            config.workers,
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Run `handler` once per scope. Results come back in completion order;
    /// every input scope appears exactly once.
    pub fn run_scopes<T, F>(&self, scopes: Vec<Scope>, handler: F) -> Vec<(Scope, CadenceResult<T>)>
    where
        T: Send,
        F: Fn(&Scope) -> CadenceResult<T> + Sync,
    {
        let total = scopes.len();
        let (unit_tx, unit_rx): (Sender<Scope>, Receiver<Scope>) = unbounded();
        let (result_tx, result_rx) = unbounded();
        for scope in scopes {
            // Send on an unbounded channel only fails when the receiver is
            // gone, which cannot happen before the workers spawn.
            let _ = unit_tx.send(scope);
        }
        drop(unit_tx);

        let handler = &handler;
        thread::scope(|s| {
            for _ in 0..self.workers {
                let unit_rx = unit_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    while let Ok(scope) = unit_rx.recv() {
                        let result = self.attempt(&scope, handler);
                        if result_tx.send((scope, result)).is_err() {
                            return;
                        }
                    }
                });
            }
            drop(result_tx);
        });

        let mut results = Vec::with_capacity(total);
        while let Ok(entry) = result_rx.recv() {
            results.push(entry);
        }
        results
    }

    fn attempt<T, F>(&self, scope: &Scope, handler: &F) -> CadenceResult<T>
    where
        F: Fn(&Scope) -> CadenceResult<T> + Sync,
    {
        let mut backoff = self.initial_backoff;
        let mut last_reason = String::new();
        for attempt in 0..=self.max_retries {
            match handler(scope) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    last_reason = error.to_string();
                    tracing::warn!(
                        scope = %scope.key(),
                        attempt = attempt + 1,
                        %error,
                        "scope computation failed"
                    );
                    if attempt < self.max_retries {
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                }
            }
        }
        Err(CadenceError::Learn(LearnError::RetriesExhausted {
            scope: scope.key(),
            attempts: self.max_retries + 1,
            reason: last_reason,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn scopes(n: usize) -> Vec<Scope> {
        (0..n).map(|i| Scope::Client(format!("c{i}"))).collect()
    }

    #[test]
    fn every_scope_is_processed_exactly_once() {
        let pool = WorkerPool::new(4, 0, Duration::from_millis(1));
        let results = pool.run_scopes(scopes(25), |scope| Ok(scope.key()));
        assert_eq!(results.len(), 25);
        let mut seen: Vec<String> = results.into_iter().map(|(s, _)| s.key()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn one_failing_scope_does_not_abort_siblings() {
        let pool = WorkerPool::new(2, 1, Duration::from_millis(1));
        let results = pool.run_scopes(scopes(10), |scope| {
            if scope.key() == "client://c3" {
                Err(CadenceError::Learn(LearnError::ScopeFailed {
                    scope: scope.key(),
                    reason: "boom".into(),
                }))
            } else {
                Ok(())
            }
        });
        let failures: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.key(), "client://c3");
        assert_eq!(results.iter().filter(|(_, r)| r.is_ok()).count(), 9);
    }

    #[test]
    fn retries_are_bounded_and_counted() {
        let attempts: Mutex<HashMap<String, usize>> = Mutex::new(HashMap::new());
        let pool = WorkerPool::new(1, 2, Duration::from_millis(1));
        let results = pool.run_scopes(scopes(1), |scope| {
            *attempts.lock().unwrap().entry(scope.key()).or_insert(0) += 1;
            Err::<(), _>(CadenceError::Learn(LearnError::ScopeFailed {
                scope: scope.key(),
                reason: "always".into(),
            }))
        });
        assert_eq!(attempts.lock().unwrap()["client://c0"], 3);
        assert!(matches!(
            results[0].1,
            Err(CadenceError::Learn(LearnError::RetriesExhausted { attempts: 3, .. }))
        ));
    }

    #[test]
    fn transient_failure_recovers_on_retry() {
        let calls = AtomicUsize::new(0);
        let pool = WorkerPool::new(1, 2, Duration::from_millis(1));
        let results = pool.run_scopes(scopes(1), |scope| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CadenceError::Learn(LearnError::ScopeFailed {
                    scope: scope.key(),
                    reason: "transient".into(),
                }))
            } else {
                Ok(42)
            }
        });
        assert!(matches!(results[0].1, Ok(42)));
    }
}
