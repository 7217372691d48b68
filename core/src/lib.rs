//! # Cinema Core
//!
//! The functional core shared by every part of the booking engine.
//!
//! Business rules live in reducers: pure functions from
//! `(State, Action, Environment)` to `(State, Effects)`. Reducers never perform
//! I/O themselves. Anything that has to reach the outside world (submitting a
//! booking to the remote API, for instance) is returned as an [`effect::Effect`]
//! and executed by the runtime, which feeds the resulting action back into the
//! reducer.
//!
//! ## Example
//!
//! ```ignore
//! use cinema_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CheckoutReducer {
//!     type State = CheckoutState;
//!     type Action = CheckoutAction;
//!     type Environment = CheckoutEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CheckoutState,
//!         action: CheckoutAction,
//!         env: &CheckoutEnvironment,
//!     ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
//!         SmallVec::new()
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// The reducer trait.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Core abstraction for business logic.
    ///
    /// A reducer validates an action against the current state, mutates the
    /// state in place and describes the side effects that should follow.
    /// Given the same state, action and environment it always produces the
    /// same result.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects.
        ///
        /// Most actions produce zero or one effect, so the return type keeps
        /// up to four effects inline.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Side effect descriptions.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future produced by an [`Effect::Future`].
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// A side effect to be executed by the runtime.
    ///
    /// Effects are values. Returning one from a reducer does nothing until a
    /// store executes it.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation.
        ///
        /// If the future resolves to `Some(action)`, the action is fed back
        /// into the reducer.
        Future(EffectFuture<Action>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation as an effect.
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Self::Future(Box::pin(fut))
        }

        /// Whether this effect does nothing.
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }

    // Futures are opaque, so Debug is written by hand
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => write!(f, "Effect::None"),
                Self::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }
}

/// Dependency injection traits.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Abstracts the wall clock so reducers stay deterministic under test.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
