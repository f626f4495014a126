//! TXT resolver handles.
//!
//! A [`Resolver`] owns exactly one engine-side resolver context. It is
//! *active* from construction until [`Resolver::destroy`], after which it is
//! *destroyed* for good: the context is released and every later query
//! fails with [`NetError::ResolverDestroyed`].
//!
//! Dropping a resolver is not a destroy. Queries submitted before the drop
//! still complete normally; the context is released once the last of them
//! has finished.

use super::engine::{ContextId, Engine};
use super::lookup::DnsClient;
use super::resolve::{Name, TxtRecordSet};
use crate::base::neterror::NetError;
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active(ContextId),
    /// Handle dropped; the context lives until in-flight queries finish.
    Draining(ContextId),
    Destroyed,
}

#[derive(Debug)]
struct Lifecycle {
    phase: Phase,
    in_flight: usize,
}

/// State shared between a handle and the completion handlers of its queries.
struct Shared {
    engine: Arc<dyn Engine>,
    lifecycle: Mutex<Lifecycle>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves to `Destroyed`, returning the context to release if any.
    fn take_context(lifecycle: &mut Lifecycle) -> Option<ContextId> {
        match std::mem::replace(&mut lifecycle.phase, Phase::Destroyed) {
            Phase::Active(context) | Phase::Draining(context) => Some(context),
            Phase::Destroyed => None,
        }
    }

    fn release(&self, context: ContextId) {
        tracing::trace!(context = %context, "resolver context released");
        self.engine.release_context(context);
    }

    /// Bookkeeping after one query's callback has run.
    fn query_finished(&self) {
        let drained = {
            let mut lifecycle = self.lock();
            lifecycle.in_flight -= 1;
            let phase = lifecycle.phase;
            match phase {
                Phase::Draining(_) if lifecycle.in_flight == 0 => {
                    Shared::take_context(&mut lifecycle)
                }
                _ => None,
            }
        };
        if let Some(context) = drained {
            self.release(context);
        }
    }
}

/// An owned TXT resolver context.
///
/// Concurrent queries on one resolver are fine. Destroying it while queries
/// are in flight makes those queries complete with
/// [`NetError::ResolverDestroyed`]. Dropping an active resolver lets them
/// finish and releases the context afterwards.
pub struct Resolver {
    shared: Arc<Shared>,
}

static GLOBAL: Mutex<Option<Arc<Resolver>>> = Mutex::new(None);

impl Resolver {
    /// Creates a resolver on the process-wide [`DnsClient`]'s engine.
    pub fn new() -> Result<Self, NetError> {
        Self::with_engine(Arc::clone(DnsClient::global().engine()))
    }

    /// Creates a resolver with its own context on `engine`.
    ///
    /// Fails if the engine cannot allocate a context.
    pub fn with_engine(engine: Arc<dyn Engine>) -> Result<Self, NetError> {
        let context = engine.create_context()?;
        tracing::trace!(context = %context, "resolver active");
        Ok(Self {
            shared: Arc::new(Shared {
                engine,
                lifecycle: Mutex::new(Lifecycle {
                    phase: Phase::Active(context),
                    in_flight: 0,
                }),
            }),
        })
    }

    /// The process-wide default resolver, created on first use.
    ///
    /// It is never destroyed implicitly. Calling [`destroy`](Self::destroy)
    /// on it is permanent for the rest of the process.
    pub fn global() -> Result<Arc<Resolver>, NetError> {
        let mut global = GLOBAL.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolver) = global.as_ref() {
            return Ok(Arc::clone(resolver));
        }
        let resolver = Arc::new(Resolver::new()?);
        *global = Some(Arc::clone(&resolver));
        Ok(resolver)
    }

    /// Queries the TXT records of `hostname`.
    ///
    /// `callback` runs exactly once: with the records, with the engine's
    /// error, or with [`NetError::ResolverDestroyed`] if this resolver has
    /// been destroyed (in which case it runs before this call returns).
    pub fn resolve_txt<F>(&self, hostname: impl Into<Name>, callback: F)
    where
        F: FnOnce(Result<TxtRecordSet, NetError>) + Send + 'static,
    {
        let context = {
            let mut lifecycle = self.shared.lock();
            let phase = lifecycle.phase;
            match phase {
                Phase::Active(context) => {
                    lifecycle.in_flight += 1;
                    context
                }
                Phase::Draining(_) | Phase::Destroyed => {
                    drop(lifecycle);
                    callback(Err(NetError::ResolverDestroyed));
                    return;
                }
            }
        };
        let name = hostname.into();
        tracing::trace!(host = %name, context = %context, "submitting TXT query");

        let shared = Arc::clone(&self.shared);
        let on_complete = move |result| {
            callback(result);
            shared.query_finished();
        };
        self.shared.engine.submit_resolve_txt(context, name, Box::new(on_complete));
    }

    /// Future-returning form of [`resolve_txt`](Self::resolve_txt).
    pub async fn txt(&self, hostname: impl Into<Name>) -> Result<TxtRecordSet, NetError> {
        let (tx, rx) = oneshot::channel();
        self.resolve_txt(hostname, move |result| {
            let _ = tx.send(result);
        });
        // A dropped sender means the engine discarded the handler.
        rx.await.unwrap_or(Err(NetError::NameResolutionFailed))
    }

    /// Releases the context and moves to the destroyed state.
    ///
    /// Calling this again has no further effect.
    pub fn destroy(&self) {
        let context = Shared::take_context(&mut self.shared.lock());
        match context {
            Some(context) => {
                tracing::trace!(context = %context, "resolver destroyed");
                self.shared.release(context);
            }
            None => tracing::trace!("resolver already destroyed"),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.context().is_none()
    }

    /// The engine context this resolver owns, while active.
    pub fn context(&self) -> Option<ContextId> {
        match self.shared.lock().phase {
            Phase::Active(context) => Some(context),
            Phase::Draining(_) | Phase::Destroyed => None,
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        let released = {
            let mut lifecycle = self.shared.lock();
            let phase = lifecycle.phase;
            match phase {
                Phase::Active(context) if lifecycle.in_flight > 0 => {
                    tracing::trace!(
                        context = %context,
                        in_flight = lifecycle.in_flight,
                        "resolver dropped, draining"
                    );
                    lifecycle.phase = Phase::Draining(context);
                    None
                }
                _ => Shared::take_context(&mut lifecycle),
            }
        };
        if let Some(context) = released {
            self.shared.release(context);
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle = self.shared.lock();
        f.debug_struct("Resolver")
            .field("phase", &lifecycle.phase)
            .field("in_flight", &lifecycle.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::engine::{LookupHandler, TxtHandler};
    use crate::dns::family::Family;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::mpsc;

    #[derive(Default)]
    struct CountingEngine {
        next: AtomicU64,
        released: Mutex<Vec<ContextId>>,
        queries: Mutex<Vec<ContextId>>,
        fail_create: bool,
    }

    impl Engine for CountingEngine {
        fn submit_lookup(&self, _name: Name, _family: Family, _all: bool, on_complete: LookupHandler) {
            on_complete(Err(NetError::NameNotResolved));
        }

        fn create_context(&self) -> Result<ContextId, NetError> {
            if self.fail_create {
                return Err(NetError::ResolverInitFailed("no channel".into()));
            }
            Ok(ContextId::new(self.next.fetch_add(1, Ordering::SeqCst)))
        }

        fn submit_resolve_txt(&self, context: ContextId, name: Name, on_complete: TxtHandler) {
            self.queries.lock().unwrap().push(context);
            on_complete(Ok(vec![vec![name.to_string()]]));
        }

        fn release_context(&self, context: ContextId) {
            self.released.lock().unwrap().push(context);
        }
    }

    #[test]
    fn test_sequential_queries() {
        let engine = Arc::new(CountingEngine::default());
        let resolver = Resolver::with_engine(engine.clone()).unwrap();

        for host in ["a.example", "b.example"] {
            let (tx, rx) = mpsc::channel();
            resolver.resolve_txt(host, move |result| tx.send(result).unwrap());
            assert_eq!(rx.recv().unwrap().unwrap(), vec![vec![host.to_string()]]);
            assert!(rx.try_recv().is_err());
        }
        assert_eq!(engine.queries.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_destroy_releases_once() {
        let engine = Arc::new(CountingEngine::default());
        let resolver = Resolver::with_engine(engine.clone()).unwrap();
        let context = resolver.context().unwrap();

        resolver.destroy();
        resolver.destroy();
        drop(resolver);

        assert_eq!(*engine.released.lock().unwrap(), vec![context]);
    }

    #[test]
    fn test_query_after_destroy() {
        let engine = Arc::new(CountingEngine::default());
        let resolver = Resolver::with_engine(engine.clone()).unwrap();
        resolver.destroy();
        assert!(resolver.is_destroyed());

        let (tx, rx) = mpsc::channel();
        resolver.resolve_txt("example.com", move |result| tx.send(result).unwrap());

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, NetError::ResolverDestroyed));
        assert!(engine.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_construction_failure_propagates() {
        let engine = Arc::new(CountingEngine {
            fail_create: true,
            ..Default::default()
        });
        let err = Resolver::with_engine(engine).unwrap_err();
        assert!(matches!(err, NetError::ResolverInitFailed(_)));
    }

    #[test]
    fn test_drop_releases_context() {
        let engine = Arc::new(CountingEngine::default());
        {
            let _resolver = Resolver::with_engine(engine.clone()).unwrap();
        }
        assert_eq!(engine.released.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_txt_future() {
        let engine = Arc::new(CountingEngine::default());
        let resolver = Resolver::with_engine(engine).unwrap();

        let records = resolver.txt("wikipedia.org").await.unwrap();
        assert_eq!(records, vec![vec!["wikipedia.org".to_string()]]);
    }
}
