//! The query manager: one asynchronous resource, its state, and its subscribers.
//!
//! A [`QueryManager`] wraps a fetcher closure. Every call to
//! [`QueryManager::query`] walks the state through `Started` and then either
//! `Succeeded` or `Failed`, notifying every subscriber after each step.
//!
//! Overlapping `query` calls are not serialized. Whichever fetch settles last
//! writes the final state, regardless of the order the calls were issued in.
//! [`QueryManager::generation`] lets a caller notice that a newer query was
//! issued after its own.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error};

use super::error::FetchError;
use super::state::{QueryState, Transition};

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send>>;
type Fetcher<T, A> = Arc<dyn Fn(A) -> FetchFuture<T> + Send + Sync>;
type Listener = Arc<dyn Fn() + Send + Sync>;

// Listeners run outside every lock, so a poisoned mutex only means a panic
// happened somewhere else while the data was consistent.
fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stable identity of one `subscribe` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    // Ids are handed out in increasing order, so iteration is registration order.
    entries: BTreeMap<SubscriberId, Listener>,
}

/// Handle returned by [`QueryManager::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: SubscriberId,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the listener this handle was created for. Further calls do nothing.
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Weak read-only view of a manager's state.
///
/// Listeners can capture a reader to snapshot the state at notification time
/// without keeping the manager alive.
pub struct StateReader<T> {
    state: Weak<Mutex<QueryState<T>>>,
}

impl<T> Clone for StateReader<T> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<T: Clone> StateReader<T> {
    /// Current state, or `None` once every manager handle has been dropped.
    pub fn snapshot(&self) -> Option<QueryState<T>> {
        self.state.upgrade().map(|state| lock(&state).clone())
    }
}

/// Callbacks run once per `query` call, after subscribers have seen the settled state.
pub struct QueryOptions<T> {
    on_success: Option<Box<dyn FnOnce(&T) + Send>>,
    on_error: Option<Box<dyn FnOnce(&FetchError) + Send>>,
}

impl<T> Default for QueryOptions<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> QueryOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, callback: impl FnOnce(&T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&FetchError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Asynchronous state container for a single data source.
///
/// `T` is the fetched payload, `A` the argument passed to the fetcher on each
/// query (`()` for none, a tuple for several). Clones share state and subscribers.
pub struct QueryManager<T, A = ()> {
    name: Arc<str>,
    fetcher: Fetcher<T, A>,
    state: Arc<Mutex<QueryState<T>>>,
    listeners: Arc<Mutex<Listeners>>,
    generation: Arc<AtomicU64>,
}

impl<T, A> Clone for QueryManager<T, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            fetcher: Arc::clone(&self.fetcher),
            state: Arc::clone(&self.state),
            listeners: Arc::clone(&self.listeners),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<T, A> fmt::Debug for QueryManager<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryManager")
            .field("name", &self.name)
            .field("subscribers", &lock(&self.listeners).entries.len())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T, A> QueryManager<T, A>
where
    T: Clone + Send + 'static,
    A: Send + 'static,
{
    /// Create a manager around `fetcher`. The fetcher is called once per query
    /// and should depend on nothing but its argument.
    pub fn new<F, Fut>(fetcher: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let fetcher: Fetcher<T, A> =
            Arc::new(move |args: A| -> FetchFuture<T> { Box::pin(fetcher(args)) });
        Self {
            name: Arc::from("query"),
            fetcher,
            state: Arc::new(Mutex::new(QueryState::default())),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Label used in log events.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<T> {
        lock(&self.state).clone()
    }

    /// Read the current state without cloning the payload.
    ///
    /// `f` runs under the state lock and must not call back into this manager.
    pub fn with_state<R>(&self, f: impl FnOnce(&QueryState<T>) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn reader(&self) -> StateReader<T> {
        StateReader {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Number of `query` calls issued so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    /// Register `listener` to run after every state transition.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = SubscriberId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        debug!(query = %self.name, subscriber = %id, "subscribed");

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Run the fetcher with `args` and record the outcome.
    ///
    /// Never fails: a fetch error ends up in [`QueryState::error`] and in
    /// `options.on_error`.
    pub async fn query(&self, options: QueryOptions<T>, args: A) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(Transition::Started, generation);

        let fetch = (self.fetcher)(args);
        match fetch.await {
            Ok(data) => {
                self.dispatch(Transition::Succeeded(data.clone()), generation);
                if let Some(on_success) = options.on_success {
                    on_success(&data);
                }
            }
            Err(err) => {
                self.dispatch(Transition::Failed(err.clone()), generation);
                if let Some(on_error) = options.on_error {
                    on_error(&err);
                }
            }
        }
    }

    /// `query` with no callbacks.
    pub async fn fetch(&self, args: A) {
        self.query(QueryOptions::default(), args).await
    }

    fn dispatch(&self, transition: Transition<T>, generation: u64) {
        match &transition {
            Transition::Failed(err) => {
                debug!(query = %self.name, generation, %transition, error = %err, "query transition")
            }
            _ => debug!(query = %self.name, generation, %transition, "query transition"),
        }

        {
            let mut state = lock(&self.state);
            let current = std::mem::take(&mut *state);
            *state = current.apply(transition);
        }
        self.notify();
    }

    fn notify(&self) {
        // Snapshot first: listeners may subscribe or unsubscribe while we deliver.
        let round: Vec<(SubscriberId, Listener)> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in round {
            if panic::catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                error!(query = %self.name, subscriber = %id, "listener panicked");
            }
        }
    }
}
