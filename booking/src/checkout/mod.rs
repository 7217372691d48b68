//! Booking lifecycle: the checkout state machine.
//!
//! ```text
//!            ProceedToCheckout            Submit
//!   Empty ─────────────────────► Drafting ───────► Submitting
//!                                  ▲  │                │
//!                 edits, refusals ─┘  │ rejected /     │ accepted
//!                                     │ conflict       ▼
//!                                     └──────────── Confirmed
//! ```
//!
//! The reducer is pure; the only side effect is the booking request issued on
//! `Submit`, returned as an [`cinema_core::effect::Effect`]. Its outcome comes
//! back as `SubmissionAccepted` or `SubmissionRejected` tagged with the
//! attempt id, so an answer arriving after the customer moved on is ignored.

pub mod actions;
pub mod environment;
pub mod reducer;
#[cfg(test)]
mod tests;
pub mod types;

pub use actions::CheckoutAction;
pub use environment::{CheckoutEnvironment, DEFAULT_SUBMIT_TIMEOUT};
pub use reducer::CheckoutReducer;
pub use types::{
    CheckoutNotice, CheckoutPhase, CheckoutStage, CheckoutState, ConfirmedBooking, Draft,
};
