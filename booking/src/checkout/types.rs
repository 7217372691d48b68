//! Checkout state: the draft, the stage it is in and the last notice shown.

use crate::customer::{CustomerDetails, FieldInvalid};
use crate::fare::{FareError, PriceTable};
use crate::seat_map::{SeatId, SeatMap};
use crate::selection::{Selection, SelectionRejected};
use crate::services::{Booking, SubmissionFailure};
use crate::types::{AttemptId, BookingId, Money, Showing};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A booking being put together, before it is submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    /// The screening
    pub showing: Showing,
    /// Title shown in the booking summary
    pub movie_title: String,
    /// Seat map the selection was made against, with seats reported as taken
    /// by the booking service merged in
    pub seat_map: SeatMap,
    /// Prices for this screening
    pub price_table: PriceTable,
    /// Chosen seats
    pub selection: Selection,
    /// Price of the selection under `price_table`
    pub total: Money,
    /// Contact details, exactly as typed
    pub customer: CustomerDetails,
}

/// What the customer sees once a booking went through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedBooking {
    /// Server-issued identifier
    pub booking_id: BookingId,
    /// The screening
    pub showing: Showing,
    /// Movie title, if known
    pub movie_title: Option<String>,
    /// Reserved seats, in pick order
    pub seats: Vec<SeatId>,
    /// Amount charged
    pub total: Money,
    /// Contact details as submitted
    pub customer: CustomerDetails,
    /// When the booking was confirmed
    pub confirmed_at: DateTime<Utc>,
}

impl ConfirmedBooking {
    /// Rebuild the confirmation of a stored booking, e.g. to show or print it
    /// again later.
    ///
    /// `fallback_time` is used when the service does not report a creation
    /// time; a missing price counts as zero.
    #[must_use]
    pub fn from_booking(booking: &Booking, fallback_time: DateTime<Utc>) -> Self {
        Self {
            booking_id: booking.id.clone(),
            showing: booking.showing(),
            movie_title: booking.movie_title.clone(),
            seats: booking.seats.clone(),
            total: booking.total_price.unwrap_or(Money::ZERO),
            customer: booking.customer(),
            confirmed_at: booking.created_at.unwrap_or(fallback_time),
        }
    }
}

/// Where the checkout flow currently is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutStage {
    /// No draft
    #[default]
    Empty,

    /// Seats chosen, customer form open
    Drafting(Draft),

    /// Waiting for the booking service.
    ///
    /// The draft is frozen until the attempt resolves.
    Submitting {
        /// Draft as submitted
        draft: Draft,
        /// Only a response carrying this id is applied
        attempt: AttemptId,
    },

    /// Booking accepted
    Confirmed(ConfirmedBooking),
}

/// Stage without its data, for display and assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckoutPhase {
    /// No draft
    Empty,
    /// Seats chosen, customer form open
    Drafting,
    /// Waiting for the booking service
    Submitting,
    /// Booking accepted
    Confirmed,
}

/// A message explaining why the last command did not do what was asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutNotice {
    /// The selection cannot be booked
    Selection(SelectionRejected),
    /// The selection cannot be priced
    Pricing(FareError),
    /// A contact field needs attention
    Field(FieldInvalid),
    /// The booking service did not accept the booking
    Submission(SubmissionFailure),
    /// Nothing can change while a submission is in flight
    Busy,
    /// The command needs a draft and there is none
    NoDraft,
}

impl fmt::Display for CheckoutNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection(reason) => write!(f, "{reason}"),
            Self::Pricing(reason) => write!(f, "{reason}"),
            Self::Field(reason) => write!(f, "{reason}"),
            Self::Submission(reason) => write!(f, "{reason}"),
            Self::Busy => f.write_str("Your booking is being submitted"),
            Self::NoDraft => f.write_str("No booking information found"),
        }
    }
}

/// State of one customer's checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutState {
    /// Current stage
    pub stage: CheckoutStage,
    /// Explanation for the most recent refused command or failed submission
    pub notice: Option<CheckoutNotice>,
}

impl CheckoutState {
    /// An empty checkout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        match self.stage {
            CheckoutStage::Empty => CheckoutPhase::Empty,
            CheckoutStage::Drafting(_) => CheckoutPhase::Drafting,
            CheckoutStage::Submitting { .. } => CheckoutPhase::Submitting,
            CheckoutStage::Confirmed(_) => CheckoutPhase::Confirmed,
        }
    }

    /// The draft, while drafting or submitting
    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        match &self.stage {
            CheckoutStage::Drafting(draft) | CheckoutStage::Submitting { draft, .. } => Some(draft),
            CheckoutStage::Empty | CheckoutStage::Confirmed(_) => None,
        }
    }

    /// The confirmation, once confirmed
    #[must_use]
    pub fn confirmed(&self) -> Option<&ConfirmedBooking> {
        match &self.stage {
            CheckoutStage::Confirmed(booking) => Some(booking),
            _ => None,
        }
    }

    /// The attempt currently awaited, if any
    #[must_use]
    pub fn attempt(&self) -> Option<AttemptId> {
        match &self.stage {
            CheckoutStage::Submitting { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }

    /// Notice text, if any
    #[must_use]
    pub fn notice_message(&self) -> Option<String> {
        self.notice.as_ref().map(ToString::to_string)
    }
}
