//! Unit tests for `CheckoutReducer`.
//!
//! Covers opening a draft, edits, validation order on submit, the frozen
//! submitting stage, conflict handling and dropping of stale responses.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use super::*;
use crate::customer::{CustomerDetails, CustomerField, FieldInvalid};
use crate::fare::{FareError, PriceTable};
use crate::mocks::MockBookingService;
use crate::seat_map::{Row, Seat, SeatCategory, SeatId, SeatMap};
use crate::selection::{Selection, SelectionRejected};
use crate::services::{Booking, BookingStatus, ServiceError, SubmissionFailure};
use crate::types::{AttemptId, BookingId, Money, MovieId, Showing};
use chrono::NaiveDate;
use cinema_core::{effect::Effect, reducer::Reducer};
use cinema_testing::{assertions, test_clock, ReducerTest};
use std::sync::Arc;
use std::time::Duration;

fn id(raw: &str) -> SeatId {
    raw.parse().unwrap()
}

fn showing() -> Showing {
    Showing::new(
        MovieId::new("m-1"),
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        "19:30",
    )
}

/// Row A: four standard seats, A4 taken. Row B: four premium seats.
fn seat_map() -> SeatMap {
    SeatMap::new(vec![
        Row::new(
            'A',
            (1..=4)
                .map(|n| Seat {
                    available: n != 4,
                    ..Seat::new(n, SeatCategory::Standard)
                })
                .collect(),
        ),
        Row::new('B', (1..=4).map(|n| Seat::new(n, SeatCategory::Premium)).collect()),
    ])
    .unwrap()
}

fn prices() -> PriceTable {
    PriceTable::new()
        .with_price(SeatCategory::Standard, Money::from_dollars(10))
        .with_price(SeatCategory::Premium, Money::from_dollars(15))
}

fn selection(raw: &[&str]) -> Selection {
    raw.iter().map(|s| id(s)).collect()
}

fn proceed(seats: &[&str]) -> CheckoutAction {
    CheckoutAction::ProceedToCheckout {
        showing: showing(),
        movie_title: "Arrival".to_string(),
        seat_map: seat_map(),
        price_table: prices(),
        selection: selection(seats),
    }
}

fn edit(field: CustomerField, value: &str) -> CheckoutAction {
    CheckoutAction::EditCustomer {
        field,
        value: value.to_string(),
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails::new("Ada Lovelace", "ada@example.com", "555-0100")
}

fn draft(seats: &[&str]) -> Draft {
    Draft {
        showing: showing(),
        movie_title: "Arrival".to_string(),
        seat_map: seat_map(),
        price_table: prices(),
        selection: selection(seats),
        total: Money::ZERO,
        customer: customer(),
    }
}

fn drafting(seats: &[&str]) -> CheckoutState {
    let mut draft = draft(seats);
    draft.total = crate::fare::total_price(&draft.seat_map, &draft.price_table, &draft.selection)
        .unwrap();
    CheckoutState {
        stage: CheckoutStage::Drafting(draft),
        notice: None,
    }
}

fn submitting(seats: &[&str], attempt: AttemptId) -> CheckoutState {
    let CheckoutStage::Drafting(draft) = drafting(seats).stage else {
        unreachable!("drafting() builds a draft");
    };
    CheckoutState {
        stage: CheckoutStage::Submitting { draft, attempt },
        notice: None,
    }
}

fn test_env() -> CheckoutEnvironment {
    CheckoutEnvironment::new(Arc::new(test_clock()), Arc::new(MockBookingService::new()))
}

fn booking_for(seats: &[&str]) -> Booking {
    Booking {
        id: BookingId::new("BK0001"),
        movie_id: MovieId::new("m-1"),
        movie_title: None,
        showtime: "19:30".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        seats: seats.iter().map(|s| id(s)).collect(),
        customer_name: "Ada Lovelace".to_string(),
        customer_email: "ada@example.com".to_string(),
        customer_phone: "555-0100".to_string(),
        total_price: None,
        status: BookingStatus::Confirmed,
        created_at: None,
    }
}

/// Run the single future effect and return the action it produces.
async fn run_effect(mut effects: Vec<Effect<CheckoutAction>>) -> CheckoutAction {
    assert_eq!(effects.len(), 1, "expected exactly one effect");
    let Some(Effect::Future(fut)) = effects.pop() else {
        panic!("expected a future effect");
    };
    fut.await.expect("effect should produce an action")
}

// ============================================================================
// Opening a draft
// ============================================================================

#[test]
fn test_proceed_opens_draft_with_total() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(proceed(&["A1", "B2"]))
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Drafting);
            let draft = state.draft().unwrap();
            assert_eq!(draft.total, Money::from_dollars(25));
            assert_eq!(draft.selection.as_slice(), &[id("A1"), id("B2")]);
            assert_eq!(draft.customer, CustomerDetails::default());
            assert_eq!(state.notice, None);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_proceed_refuses_empty_selection() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(proceed(&[]))
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(
                state.notice,
                Some(CheckoutNotice::Selection(SelectionRejected::Empty))
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_proceed_refuses_taken_seat() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(proceed(&["A1", "A4"]))
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(
                state.notice,
                Some(CheckoutNotice::Selection(SelectionRejected::Unavailable(id("A4"))))
            );
        })
        .run();
}

#[test]
fn test_proceed_respects_configured_seat_limit() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env().with_max_seats(2))
        .given_state(CheckoutState::new())
        .when_action(proceed(&["A1", "A2", "A3"]))
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(
                state.notice,
                Some(CheckoutNotice::Selection(SelectionRejected::TooMany {
                    selected: 3,
                    max: 2
                }))
            );
        })
        .run();
}

#[test]
fn test_proceed_replaces_confirmed_booking() {
    let reducer = CheckoutReducer::new();
    let env = test_env();
    let attempt = AttemptId::new();
    let mut state = submitting(&["A1"], attempt);
    reducer.reduce(
        &mut state,
        CheckoutAction::SubmissionAccepted {
            attempt,
            booking: booking_for(&["A1"]),
        },
        &env,
    );
    assert_eq!(state.phase(), CheckoutPhase::Confirmed);

    reducer.reduce(&mut state, proceed(&["B1"]), &env);

    assert_eq!(state.phase(), CheckoutPhase::Drafting);
    assert_eq!(state.draft().unwrap().selection.as_slice(), &[id("B1")]);
}

#[test]
fn test_proceed_again_keeps_customer_input() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(proceed(&["A1"]))
        .when_action(edit(CustomerField::Name, "Ada"))
        .when_action(proceed(&["A1", "A2"]))
        .then_state(|state| {
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1"), id("A2")]);
            assert_eq!(draft.total, Money::from_dollars(20));
            assert_eq!(draft.customer.name, "Ada");
        })
        .run();
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_edit_customer_keeps_raw_input() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(proceed(&["A1"]))
        .when_action(edit(CustomerField::Name, "  Ada  "))
        .when_action(edit(CustomerField::Email, "ada@example.com"))
        .then_state(|state| {
            let customer = &state.draft().unwrap().customer;
            assert_eq!(customer.name, "  Ada  ");
            assert_eq!(customer.email, "ada@example.com");
            assert_eq!(customer.phone, "");
        })
        .run();
}

#[test]
fn test_edit_without_draft() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(edit(CustomerField::Name, "Ada"))
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(state.notice, Some(CheckoutNotice::NoDraft));
            assert_eq!(
                state.notice_message().as_deref(),
                Some("No booking information found")
            );
        })
        .run();
}

#[test]
fn test_toggle_seat_reprices() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1"]))
        .when_action(CheckoutAction::ToggleSeat { seat: id("B3") })
        .then_state(|state| {
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1"), id("B3")]);
            assert_eq!(draft.total, Money::from_dollars(25));
        })
        .run();

    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1", "B3"]))
        .when_action(CheckoutAction::ToggleSeat { seat: id("A1") })
        .then_state(|state| {
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("B3")]);
            assert_eq!(draft.total, Money::from_dollars(15));
        })
        .run();
}

#[test]
fn test_toggle_taken_seat_is_refused() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1"]))
        .when_action(CheckoutAction::ToggleSeat { seat: id("A4") })
        .then_state(|state| {
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1")]);
            assert_eq!(draft.total, Money::from_dollars(10));
            assert_eq!(
                state.notice,
                Some(CheckoutNotice::Selection(SelectionRejected::Unavailable(id("A4"))))
            );
        })
        .run();
}

#[test]
fn test_toggle_that_cannot_be_priced_keeps_selection() {
    let huge = Money::from_cents(u64::MAX / 2 + 1);
    let mut state = drafting(&["A1"]);
    if let CheckoutStage::Drafting(draft) = &mut state.stage {
        draft.price_table = PriceTable::new().with_price(SeatCategory::Standard, huge);
        draft.total = huge;
    }

    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(CheckoutAction::ToggleSeat { seat: id("A2") })
        .then_state(move |state| {
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1")]);
            assert_eq!(draft.total, huge);
            assert_eq!(state.notice, Some(CheckoutNotice::Pricing(FareError::Overflow)));
        })
        .run();
}

#[test]
fn test_successful_edit_clears_notice() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1"]))
        .when_action(CheckoutAction::ToggleSeat { seat: id("A4") })
        .when_action(CheckoutAction::ToggleSeat { seat: id("A2") })
        .then_state(|state| {
            assert_eq!(state.notice, None);
            assert_eq!(state.draft().unwrap().selection.len(), 2);
        })
        .run();
}

// ============================================================================
// Submitting
// ============================================================================

#[test]
fn test_submit_checks_fields_in_form_order() {
    let reducer = CheckoutReducer::new();
    let env = test_env();
    let mut state = CheckoutState::new();
    reducer.reduce(&mut state, proceed(&["A1"]), &env);

    let expected = [
        (CustomerField::Name, "Ada", FieldInvalid::MissingName),
        (CustomerField::Email, "ada.example.com", FieldInvalid::MissingEmail),
        (CustomerField::Email, "ada@example.com", FieldInvalid::MalformedEmail),
        (CustomerField::Phone, "555", FieldInvalid::MissingPhone),
    ];
    for (field, value, refusal) in expected {
        let effects = reducer.reduce(&mut state, CheckoutAction::Submit, &env);
        assert!(effects.iter().all(Effect::is_none));
        assert_eq!(state.phase(), CheckoutPhase::Drafting);
        assert_eq!(state.notice, Some(CheckoutNotice::Field(refusal)));
        reducer.reduce(&mut state, edit(field, value), &env);
    }

    let effects = reducer.reduce(&mut state, CheckoutAction::Submit, &env);
    assert_eq!(state.phase(), CheckoutPhase::Submitting);
    assert_eq!(state.notice, None);
    assertions::assert_has_future_effect(&effects);
}

#[test]
fn test_submit_without_draft() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(state.notice, Some(CheckoutNotice::NoDraft));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_submit_issues_one_request() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1", "A2"]))
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Submitting);
            assert!(state.attempt().is_some());
            assert_eq!(state.draft().unwrap().total, Money::from_dollars(20));
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();
}

#[test]
fn test_submitting_freezes_the_draft() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1"], attempt))
        .when_action(CheckoutAction::ToggleSeat { seat: id("A2") })
        .when_action(edit(CustomerField::Name, "Someone else"))
        .when_action(CheckoutAction::Submit)
        .then_state(move |state| {
            assert_eq!(state.attempt(), Some(attempt));
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1")]);
            assert_eq!(draft.customer, customer());
            assert_eq!(state.notice, Some(CheckoutNotice::Busy));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_proceed_while_submitting_is_refused() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1"], attempt))
        .when_action(proceed(&["B1"]))
        .then_state(move |state| {
            assert_eq!(state.attempt(), Some(attempt));
            assert_eq!(state.notice, Some(CheckoutNotice::Busy));
        })
        .run();
}

#[tokio::test]
async fn test_submit_sends_trimmed_request_and_confirms() {
    let bookings = MockBookingService::new();
    let env = CheckoutEnvironment::new(Arc::new(test_clock()), Arc::new(bookings.clone()));
    let reducer = CheckoutReducer::new();

    let mut state = drafting(&["A2", "B1"]);
    if let CheckoutStage::Drafting(draft) = &mut state.stage {
        draft.customer = CustomerDetails::new(" Ada Lovelace ", "ada@example.com ", "555-0100");
    }

    let effects = reducer.reduce(&mut state, CheckoutAction::Submit, &env);
    let attempt = state.attempt().unwrap();
    let outcome = run_effect(effects.into_vec()).await;
    assert!(matches!(
        &outcome,
        CheckoutAction::SubmissionAccepted { attempt: answered, .. } if *answered == attempt
    ));

    let requests = bookings.requests().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].seats, vec![id("A2"), id("B1")]);
    assert_eq!(requests[0].customer_name, "Ada Lovelace");
    assert_eq!(requests[0].customer_email, "ada@example.com");

    reducer.reduce(&mut state, outcome, &env);
    let confirmed = state.confirmed().unwrap();
    assert_eq!(confirmed.booking_id, BookingId::new("BK0001"));
    assert_eq!(confirmed.seats, vec![id("A2"), id("B1")]);
    assert_eq!(confirmed.total, Money::from_dollars(25));
    assert_eq!(confirmed.movie_title.as_deref(), Some("Arrival"));
    assert_eq!(confirmed.customer, customer());
    assert_eq!(confirmed.showing, showing());
    assert_eq!(confirmed.confirmed_at, cinema_core::environment::Clock::now(&test_clock()));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let bookings = MockBookingService::new();
    bookings.set_delay(Duration::from_secs(5)).unwrap();
    let env = CheckoutEnvironment::new(Arc::new(test_clock()), Arc::new(bookings))
        .with_submit_timeout(Duration::from_millis(20));
    let reducer = CheckoutReducer::new();

    let mut state = drafting(&["A1"]);
    let effects = reducer.reduce(&mut state, CheckoutAction::Submit, &env);
    let outcome = run_effect(effects.into_vec()).await;
    reducer.reduce(&mut state, outcome, &env);

    assert_eq!(state.phase(), CheckoutPhase::Drafting);
    assert_eq!(
        state.notice_message().as_deref(),
        Some("Booking request timed out")
    );
}

#[tokio::test]
async fn test_service_failure_returns_to_drafting() {
    let bookings = MockBookingService::new();
    bookings
        .fail_next(ServiceError::RequestFailed("connection refused".to_string()))
        .unwrap();
    let env = CheckoutEnvironment::new(Arc::new(test_clock()), Arc::new(bookings));
    let reducer = CheckoutReducer::new();

    let mut state = drafting(&["A1"]);
    let effects = reducer.reduce(&mut state, CheckoutAction::Submit, &env);
    let outcome = run_effect(effects.into_vec()).await;
    reducer.reduce(&mut state, outcome, &env);

    assert_eq!(state.phase(), CheckoutPhase::Drafting);
    assert_eq!(state.draft().unwrap().customer, customer());
    assert_eq!(
        state.notice_message().as_deref(),
        Some("Request failed: connection refused")
    );
}

// ============================================================================
// Conflicts and stale responses
// ============================================================================

#[test]
fn test_conflict_marks_seats_and_keeps_selection() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1", "A2"], attempt))
        .when_action(CheckoutAction::SubmissionRejected {
            attempt,
            failure: SubmissionFailure::Conflict {
                seats: vec![id("A1")],
            },
        })
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Drafting);
            let draft = state.draft().unwrap();
            assert_eq!(draft.selection.as_slice(), &[id("A1"), id("A2")]);
            assert!(!draft.seat_map.seat(&id("A1")).unwrap().available);
            assert!(draft.seat_map.seat(&id("A2")).unwrap().available);
            assert_eq!(draft.customer, customer());
            assert_eq!(
                state.notice_message().as_deref(),
                Some("Seats A1 are no longer available")
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_resubmit_after_conflict_is_refused_until_reselected() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1", "A2"], attempt))
        .when_action(CheckoutAction::SubmissionRejected {
            attempt,
            failure: SubmissionFailure::Conflict {
                seats: vec![id("A1")],
            },
        })
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Drafting);
            assert_eq!(
                state.notice,
                Some(CheckoutNotice::Selection(SelectionRejected::Unavailable(id("A1"))))
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_stale_attempt_is_dropped() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1"], attempt))
        .when_action(CheckoutAction::SubmissionRejected {
            attempt: AttemptId::new(),
            failure: SubmissionFailure::Failed {
                message: "boom".to_string(),
            },
        })
        .when_action(CheckoutAction::SubmissionAccepted {
            attempt: AttemptId::new(),
            booking: booking_for(&["A1"]),
        })
        .then_state(move |state| {
            assert_eq!(state.phase(), CheckoutPhase::Submitting);
            assert_eq!(state.attempt(), Some(attempt));
            assert_eq!(state.notice, None);
        })
        .run();
}

#[test]
fn test_late_response_after_navigate_away_is_dropped() {
    let attempt = AttemptId::new();
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(submitting(&["A1"], attempt))
        .when_action(CheckoutAction::NavigateAway)
        .when_action(CheckoutAction::SubmissionAccepted {
            attempt,
            booking: booking_for(&["A1"]),
        })
        .then_state(|state| {
            assert_eq!(*state, CheckoutState::new());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn test_navigate_away_clears_everything() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(test_env())
        .given_state(drafting(&["A1"]))
        .when_action(CheckoutAction::ToggleSeat { seat: id("A4") })
        .when_action(CheckoutAction::NavigateAway)
        .then_state(|state| {
            assert_eq!(state.phase(), CheckoutPhase::Empty);
            assert_eq!(state.notice, None);
        })
        .run();
}
