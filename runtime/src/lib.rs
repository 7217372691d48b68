//! # Cinema Runtime
//!
//! The imperative shell around the booking reducers.
//!
//! A [`Store`] owns the state, runs the reducer for every action and executes
//! the effects the reducer returns. Actions produced by effects are queued,
//! reduced in arrival order and then broadcast to observers, so a caller that
//! waits for an action with [`Store::send_and_wait_for`] always sees the state
//! that action produced.
//!
//! ## Example
//!
//! ```ignore
//! use cinema_runtime::Store;
//!
//! let store = Store::new(CheckoutState::default(), CheckoutReducer::new(), env);
//!
//! store.send(CheckoutAction::Submit).await;
//!
//! let stage = store.state(|s| s.phase()).await;
//! ```

use cinema_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while talking to a [`Store`](crate::Store)
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// No matching action arrived before the deadline
        #[error("Timeout waiting for action")]
        Timeout,

        /// The action broadcast channel closed (store dropped)
        #[error("Action channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Capacity of the observer broadcast channel.
const BROADCAST_CAPACITY: usize = 64;

struct Inner<R: Reducer> {
    state: RwLock<R::State>,
    reducer: R,
    environment: R::Environment,
    feedback: mpsc::UnboundedSender<R::Action>,
    observed: broadcast::Sender<R::Action>,
    pending_effects: Arc<AtomicUsize>,
}

/// The Store: state container and effect executor.
///
/// Cloning a store is cheap and yields another handle to the same state.
pub struct Store<R: Reducer> {
    inner: Arc<Inner<R>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
    R::Action: Clone + Send + Sync + std::fmt::Debug + 'static,
    R::Environment: Send + Sync + 'static,
{
    /// Create a store with an initial state, reducer and environment.
    ///
    /// Spawns the task that reduces actions produced by effects, so this must
    /// be called from within a tokio runtime.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        let (feedback, mut feedback_rx) = mpsc::unbounded_channel::<R::Action>();
        let (observed, _) = broadcast::channel(BROADCAST_CAPACITY);

        let inner = Arc::new(Inner {
            state: RwLock::new(initial_state),
            reducer,
            environment,
            feedback,
            observed,
            pending_effects: Arc::new(AtomicUsize::new(0)),
        });

        let weak = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(action) = feedback_rx.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let store = Self { inner };
                tracing::trace!(?action, "Reducing action produced by effect");
                store.dispatch(action.clone()).await;
                // Receivers may not exist; that is fine
                let _ = store.inner.observed.send(action);
            }
            tracing::trace!("Store feedback loop finished");
        });

        Self { inner }
    }

    /// Send an action through the reducer and execute its effects.
    ///
    /// Returns once the state has been updated. Effects keep running in the
    /// background and feed their actions back into the store.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: R::Action) {
        self.dispatch(action).await;
    }

    /// Send an action and wait for the first effect-produced action matching
    /// `predicate`.
    ///
    /// The subscription is taken before the action is sent, so a fast effect
    /// cannot slip past the waiter.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if nothing matches within `timeout`
    /// - [`StoreError::ChannelClosed`] if the store goes away while waiting
    pub async fn send_and_wait_for<F>(
        &self,
        action: R::Action,
        predicate: F,
        timeout: Duration,
    ) -> Result<R::Action, StoreError>
    where
        F: Fn(&R::Action) -> bool,
    {
        let mut rx = self.inner.observed.subscribe();
        self.dispatch(action).await;

        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Observer lagged behind store actions");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to actions produced by effects, after they have been reduced.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<R::Action> {
        self.inner.observed.subscribe()
    }

    /// Read state through a closure.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.inner.state.read().await;
        f(&state)
    }

    /// Number of effects currently executing.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.inner.pending_effects.load(Ordering::SeqCst)
    }

    async fn dispatch(&self, action: R::Action) {
        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&self, effect: Effect<R::Action>) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
            },
            Effect::Future(fut) => {
                tracing::trace!("Executing Effect::Future");
                let pending = Arc::clone(&self.inner.pending_effects);
                pending.fetch_add(1, Ordering::SeqCst);
                let feedback = self.inner.feedback.clone();

                tokio::spawn(async move {
                    if let Some(action) = fut.await {
                        if feedback.send(action).is_err() {
                            tracing::debug!("Store dropped before effect completed");
                        }
                    }
                    pending.fetch_sub(1, Ordering::SeqCst);
                });
            },
        }
    }
}
