//! Reducer for the checkout flow.

use crate::checkout::{
    CheckoutAction, CheckoutEnvironment, CheckoutNotice, CheckoutStage, CheckoutState,
    ConfirmedBooking, Draft,
};
use crate::customer::CustomerDetails;
use crate::fare::total_price;
use crate::selection::validate;
use crate::services::{Booking, BookingRequest, SubmissionFailure};
use crate::types::{AttemptId, Money};
use cinema_core::{effect::Effect, reducer::Reducer};
use smallvec::{smallvec, SmallVec};

type Effects = SmallVec<[Effect<CheckoutAction>; 4]>;

/// Drives a single checkout from seat selection to confirmation.
///
/// Transitions:
/// - `Empty | Drafting | Confirmed` + `ProceedToCheckout` → `Drafting`
/// - `Drafting` + edits → `Drafting`
/// - `Drafting` + `Submit` → `Submitting` (issues the booking request)
/// - `Submitting` + accepted → `Confirmed`
/// - `Submitting` + rejected → `Drafting`, selection and customer input kept
/// - anything + `NavigateAway` → `Empty`
///
/// Refused commands leave the stage untouched and set a notice. Responses for
/// an attempt other than the one in flight are dropped.
pub struct CheckoutReducer;

impl CheckoutReducer {
    /// Create a new checkout reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn proceed(state: &mut CheckoutState, env: &CheckoutEnvironment, draft: Draft) -> Effects {
        if let Err(reason) = validate(&draft.seat_map, &draft.selection, env.max_seats()) {
            tracing::warn!(%reason, "Selection refused");
            state.notice = Some(CheckoutNotice::Selection(reason));
            return smallvec![Effect::None];
        }

        let total = match total_price(&draft.seat_map, &draft.price_table, &draft.selection) {
            Ok(total) => total,
            Err(reason) => {
                tracing::warn!(%reason, "Selection cannot be priced");
                state.notice = Some(CheckoutNotice::Pricing(reason));
                return smallvec![Effect::None];
            },
        };

        tracing::debug!(
            showing = %draft.showing,
            seats = %draft.selection,
            %total,
            "Checkout opened"
        );
        state.stage = CheckoutStage::Drafting(Draft { total, ..draft });
        state.notice = None;
        smallvec![Effect::None]
    }

    fn submit(state: &mut CheckoutState, env: &CheckoutEnvironment, mut draft: Draft) -> Effects {
        if let Err(reason) = draft.customer.validate() {
            tracing::debug!(%reason, "Customer details incomplete");
            state.stage = CheckoutStage::Drafting(draft);
            state.notice = Some(CheckoutNotice::Field(reason));
            return smallvec![Effect::None];
        }

        if let Err(reason) = validate(&draft.seat_map, &draft.selection, env.max_seats()) {
            tracing::warn!(%reason, "Selection no longer valid");
            state.stage = CheckoutStage::Drafting(draft);
            state.notice = Some(CheckoutNotice::Selection(reason));
            return smallvec![Effect::None];
        }

        match total_price(&draft.seat_map, &draft.price_table, &draft.selection) {
            Ok(total) => draft.total = total,
            Err(reason) => {
                tracing::warn!(%reason, "Selection cannot be priced");
                state.stage = CheckoutStage::Drafting(draft);
                state.notice = Some(CheckoutNotice::Pricing(reason));
                return smallvec![Effect::None];
            },
        }

        let attempt = AttemptId::new();
        let request = BookingRequest::new(
            &draft.showing,
            draft.selection.as_slice().to_vec(),
            &draft.customer,
        );
        tracing::debug!(
            %attempt,
            seats = %draft.selection,
            total = %draft.total,
            "Submitting booking"
        );

        state.stage = CheckoutStage::Submitting { draft, attempt };
        state.notice = None;

        let bookings = env.bookings();
        let timeout = env.submit_timeout();
        smallvec![Effect::future(async move {
            let outcome = tokio::time::timeout(timeout, bookings.create_booking(request)).await;
            Some(match outcome {
                Ok(Ok(booking)) => CheckoutAction::SubmissionAccepted { attempt, booking },
                Ok(Err(error)) => CheckoutAction::SubmissionRejected {
                    attempt,
                    failure: SubmissionFailure::from(error),
                },
                Err(_) => CheckoutAction::SubmissionRejected {
                    attempt,
                    failure: SubmissionFailure::Failed {
                        message: "Booking request timed out".to_string(),
                    },
                },
            })
        })]
    }

    fn accept(
        state: &mut CheckoutState,
        env: &CheckoutEnvironment,
        attempt: AttemptId,
        booking: Booking,
    ) -> Effects {
        let (draft, awaited) = match std::mem::take(&mut state.stage) {
            CheckoutStage::Submitting { draft, attempt: awaited } => (draft, awaited),
            other => {
                tracing::warn!(
                    %attempt,
                    booking_id = %booking.id,
                    "Dropping late booking confirmation"
                );
                state.stage = other;
                return smallvec![Effect::None];
            },
        };

        if awaited != attempt {
            tracing::warn!(%attempt, %awaited, "Dropping confirmation for a stale attempt");
            state.stage = CheckoutStage::Submitting {
                draft,
                attempt: awaited,
            };
            return smallvec![Effect::None];
        }

        tracing::info!(
            booking_id = %booking.id,
            seats = %draft.selection,
            total = %draft.total,
            "Booking confirmed"
        );

        state.stage = CheckoutStage::Confirmed(ConfirmedBooking {
            booking_id: booking.id,
            movie_title: Some(draft.movie_title),
            seats: draft.selection.into(),
            total: draft.total,
            customer: draft.customer.trimmed(),
            showing: draft.showing,
            confirmed_at: env.clock().now(),
        });
        state.notice = None;
        smallvec![Effect::None]
    }

    fn reject(
        state: &mut CheckoutState,
        attempt: AttemptId,
        failure: SubmissionFailure,
    ) -> Effects {
        let (mut draft, awaited) = match std::mem::take(&mut state.stage) {
            CheckoutStage::Submitting { draft, attempt: awaited } => (draft, awaited),
            other => {
                tracing::warn!(%attempt, %failure, "Dropping late submission failure");
                state.stage = other;
                return smallvec![Effect::None];
            },
        };

        if awaited != attempt {
            tracing::warn!(%attempt, %awaited, "Dropping failure for a stale attempt");
            state.stage = CheckoutStage::Submitting {
                draft,
                attempt: awaited,
            };
            return smallvec![Effect::None];
        }

        if let SubmissionFailure::Conflict { seats } = &failure {
            let marked = draft.seat_map.mark_unavailable(seats);
            tracing::warn!(%attempt, %failure, marked, "Seats taken by another booking");
        } else {
            tracing::warn!(%attempt, %failure, "Booking submission failed");
        }

        state.stage = CheckoutStage::Drafting(draft);
        state.notice = Some(CheckoutNotice::Submission(failure));
        smallvec![Effect::None]
    }

    /// Apply `edit` to the draft if one is open for editing.
    fn edit_draft(
        state: &mut CheckoutState,
        edit: impl FnOnce(&mut Draft) -> Result<(), CheckoutNotice>,
    ) -> Effects {
        match &mut state.stage {
            CheckoutStage::Drafting(draft) => {
                state.notice = edit(draft).err();
            },
            CheckoutStage::Submitting { attempt, .. } => {
                tracing::warn!(%attempt, "Checkout is frozen while submitting");
                state.notice = Some(CheckoutNotice::Busy);
            },
            CheckoutStage::Empty | CheckoutStage::Confirmed(_) => {
                tracing::debug!("No draft to edit");
                state.notice = Some(CheckoutNotice::NoDraft);
            },
        }
        smallvec![Effect::None]
    }
}

impl Default for CheckoutReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::ProceedToCheckout {
                showing,
                movie_title,
                seat_map,
                price_table,
                selection,
            } => {
                if let CheckoutStage::Submitting { attempt, .. } = &state.stage {
                    tracing::warn!(%attempt, "Cannot start a new checkout while submitting");
                    state.notice = Some(CheckoutNotice::Busy);
                    return smallvec![Effect::None];
                }

                let customer = match &state.stage {
                    CheckoutStage::Drafting(open) => open.customer.clone(),
                    _ => CustomerDetails::default(),
                };
                let draft = Draft {
                    showing,
                    movie_title,
                    seat_map,
                    price_table,
                    selection,
                    total: Money::ZERO,
                    customer,
                };
                Self::proceed(state, env, draft)
            },

            CheckoutAction::EditCustomer { field, value } => Self::edit_draft(state, |draft| {
                draft.customer.set(field, value);
                Ok(())
            }),

            CheckoutAction::ToggleSeat { seat } => {
                let max_seats = env.max_seats();
                Self::edit_draft(state, |draft| {
                    let mut selection = draft.selection.clone();
                    selection
                        .toggle(&draft.seat_map, seat, max_seats)
                        .map_err(CheckoutNotice::Selection)?;
                    let total = total_price(&draft.seat_map, &draft.price_table, &selection)
                        .map_err(CheckoutNotice::Pricing)?;
                    draft.selection = selection;
                    draft.total = total;
                    tracing::debug!(%seat, %total, "Selection revised");
                    Ok(())
                })
            },

            CheckoutAction::Submit => match std::mem::take(&mut state.stage) {
                CheckoutStage::Drafting(draft) => Self::submit(state, env, draft),
                other => {
                    state.notice = Some(if matches!(other, CheckoutStage::Submitting { .. }) {
                        CheckoutNotice::Busy
                    } else {
                        CheckoutNotice::NoDraft
                    });
                    tracing::warn!(notice = ?state.notice, "Submit ignored");
                    state.stage = other;
                    smallvec![Effect::None]
                },
            },

            CheckoutAction::SubmissionAccepted { attempt, booking } => {
                Self::accept(state, env, attempt, booking)
            },

            CheckoutAction::SubmissionRejected { attempt, failure } => {
                Self::reject(state, attempt, failure)
            },

            CheckoutAction::NavigateAway => {
                if let Some(attempt) = state.attempt() {
                    tracing::debug!(%attempt, "Leaving checkout with a submission in flight");
                }
                *state = CheckoutState::new();
                smallvec![Effect::None]
            },
        }
    }
}
