//! Per-session runner pool
//!
//! Lazily creates exactly one [`AgentRunner`] per session id and keeps it for
//! the session's lifetime. Concurrent first requests for the same id share a
//! single factory call.

use crate::agent::{AgentRunner, RunnerFactory};
use crate::error::{ChatError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

type RunnerSlot = Arc<OnceCell<Arc<dyn AgentRunner>>>;

/// Lazily populated map of session id to runner
pub struct RunnerPool {
    factory: Arc<dyn RunnerFactory>,
    /// DashMap for per-key locking
    runners: DashMap<String, RunnerSlot>,
}

impl RunnerPool {
    pub fn new(factory: Arc<dyn RunnerFactory>) -> Self {
        Self {
            factory,
            runners: DashMap::new(),
        }
    }

    /// Return the session's runner, creating it on first use
    ///
    /// A failed creation leaves no entry behind, so the next call retries.
    /// If the session is removed while its runner is being created, the new
    /// runner is shut down and `NotFound` is returned.
    pub async fn get_or_create(&self, session_id: &str) -> Result<Arc<dyn AgentRunner>> {
        let slot = self.runners.entry(session_id.to_string()).or_default().clone();
        let runner = slot
            .get_or_try_init(|| async {
                tracing::debug!(
                    session_id = %session_id,
                    backend = %self.factory.name(),
                    "Creating agent runner"
                );
                self.factory.create(session_id).await
            })
            .await?
            .clone();

        if !self.is_registered(session_id, &slot) {
            tracing::info!(session_id = %session_id, "Session removed while its runner was created");
            runner.shutdown().await;
            return Err(ChatError::NotFound(session_id.to_string()));
        }
        Ok(runner)
    }

    fn is_registered(&self, session_id: &str, slot: &RunnerSlot) -> bool {
        self.runners
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot))
    }

    /// Drop the session's runner, shutting it down if it was created
    ///
    /// Returns whether a runner existed. A runner still being created is
    /// shut down by its creator once creation finishes.
    pub async fn remove(&self, session_id: &str) -> bool {
        let Some((_, slot)) = self.runners.remove(session_id) else {
            return false;
        };
        match slot.get() {
            Some(runner) => {
                runner.shutdown().await;
                tracing::info!(session_id = %session_id, "Agent runner removed");
                true
            }
            None => false,
        }
    }

    /// Whether a runner has been created for the session
    pub async fn contains(&self, session_id: &str) -> bool {
        self.runners
            .get(session_id)
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of created runners
    pub async fn len(&self) -> usize {
        self.runners
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn factory_name(&self) -> &str {
        self.factory.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentEventStream;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopRunner {
        session_id: String,
        shut_down: Arc<AtomicBool>,
    }

    #[async_trait]
    impl AgentRunner for NoopRunner {
        fn session_id(&self) -> &str {
            &self.session_id
        }

        async fn run(&self, _message: &str) -> Result<AgentEventStream> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn shutdown(&self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
        fail_first: AtomicBool,
        shut_down: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RunnerFactory for CountingFactory {
        async fn create(&self, session_id: &str) -> Result<Arc<dyn AgentRunner>> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(ChatError::Agent("backend unavailable".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NoopRunner {
                session_id: session_id.to_string(),
                shut_down: self.shut_down.clone(),
            }))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_runner() {
        let factory = Arc::new(CountingFactory::default());
        let pool = RunnerPool::new(factory.clone());

        let a = pool.get_or_create("s1").await.unwrap();
        let b = pool.get_or_create("s1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert_eq!(a.session_id(), "s1");
    }

    #[tokio::test]
    async fn test_concurrent_first_use_creates_once() {
        let factory = Arc::new(CountingFactory::default());
        let pool = Arc::new(RunnerPool::new(factory.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.get_or_create("s1").await.unwrap() })
            })
            .collect();
        let runners: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert!(runners.iter().all(|r| Arc::ptr_eq(r, &runners[0])));
    }

    #[tokio::test]
    async fn test_distinct_sessions_get_distinct_runners() {
        let factory = Arc::new(CountingFactory::default());
        let pool = RunnerPool::new(factory.clone());

        let a = pool.get_or_create("s1").await.unwrap();
        let b = pool.get_or_create("s2").await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_creation_is_retried() {
        let factory = Arc::new(CountingFactory::default());
        factory.fail_first.store(true, Ordering::SeqCst);
        let pool = RunnerPool::new(factory.clone());

        let Err(err) = pool.get_or_create("s1").await else {
            panic!("expected creation to fail");
        };
        assert!(matches!(err, ChatError::Agent(_)));
        assert!(!pool.contains("s1").await);

        pool.get_or_create("s1").await.unwrap();
        assert!(pool.contains("s1").await);
    }

    #[tokio::test]
    async fn test_remove_shuts_down_runner() {
        let factory = Arc::new(CountingFactory::default());
        let pool = RunnerPool::new(factory.clone());

        pool.get_or_create("s1").await.unwrap();
        assert!(pool.remove("s1").await);
        assert!(factory.shut_down.load(Ordering::SeqCst));
        assert!(!pool.contains("s1").await);
        assert!(!pool.remove("s1").await);
        assert!(pool.is_empty().await);

        // Recreated on next use
        pool.get_or_create("s1").await.unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_remove_during_creation_shuts_down_new_runner() {
        let factory = Arc::new(CountingFactory::default());
        let pool = Arc::new(RunnerPool::new(factory.clone()));

        let creating = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.get_or_create("s1").await })
        };
        tokio::time::sleep(Duration::from_millis(2)).await;

        // Creation takes 10ms, so nothing is initialized yet
        assert!(!pool.remove("s1").await);

        let Err(err) = creating.await.unwrap() else {
            panic!("expected the orphaned runner to be rejected");
        };
        assert!(matches!(err, ChatError::NotFound(_)));
        assert!(factory.shut_down.load(Ordering::SeqCst));
        assert!(!pool.contains("s1").await);
    }
}
