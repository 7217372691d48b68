//! Commands and service responses driving the checkout.

use crate::customer::CustomerField;
use crate::fare::PriceTable;
use crate::seat_map::{SeatId, SeatMap};
use crate::selection::Selection;
use crate::services::{Booking, SubmissionFailure};
use crate::types::{AttemptId, Showing};

/// Everything that can happen to a checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Leave seat selection and open the customer form.
    ///
    /// Refused unless the selection validates against `seat_map` and can be
    /// priced. Starts a fresh draft, replacing any previous draft or
    /// confirmation.
    ProceedToCheckout {
        /// The screening
        showing: Showing,
        /// Title for the booking summary
        movie_title: String,
        /// Seat map the selection was made against
        seat_map: SeatMap,
        /// Prices for this screening
        price_table: PriceTable,
        /// Chosen seats
        selection: Selection,
    },

    /// Customer typed into a contact field
    EditCustomer {
        /// Field being edited
        field: CustomerField,
        /// New value, as typed
        value: String,
    },

    /// Customer clicked a seat in the booking summary, e.g. to drop a seat
    /// that turned out to be taken
    ToggleSeat {
        /// Seat clicked
        seat: SeatId,
    },

    /// Customer confirmed the booking
    Submit,

    /// The booking service created the booking
    SubmissionAccepted {
        /// Attempt this response belongs to
        attempt: AttemptId,
        /// Stored booking
        booking: Booking,
    },

    /// The booking service refused the booking or could not be reached
    SubmissionRejected {
        /// Attempt this response belongs to
        attempt: AttemptId,
        /// Why
        failure: SubmissionFailure,
    },

    /// Customer left the checkout. Discards the draft; an in-flight
    /// submission keeps running but its outcome is ignored.
    NavigateAway,
}

impl CheckoutAction {
    /// Whether this action is the outcome of a submission attempt
    #[must_use]
    pub const fn is_submission_outcome(&self) -> bool {
        matches!(
            self,
            Self::SubmissionAccepted { .. } | Self::SubmissionRejected { .. }
        )
    }
}
