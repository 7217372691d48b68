//! End-to-end checkout through a `Store` against the in-memory services.
//!
//! Covers the happy path from seat loading to confirmation, double bookings
//! rejected by the booking service, and two customers racing for one seat.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

mod common;

use common::{id, ids, services, showing};
use cinema_booking::catalog::{load_seating, Seating};
use cinema_booking::fare::DEFAULT_SEAT_PRICE;
use cinema_booking::mocks::MockBookingService;
use cinema_booking::{
    CheckoutAction, CheckoutEnvironment, CheckoutNotice, CheckoutPhase, CheckoutReducer,
    CheckoutState, CustomerField, Money, Selection, SubmissionFailure,
};
use cinema_runtime::Store;
use cinema_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn store(bookings: &MockBookingService) -> Store<CheckoutReducer> {
    let env = CheckoutEnvironment::new(Arc::new(test_clock()), Arc::new(bookings.clone()));
    Store::new(CheckoutState::new(), CheckoutReducer::new(), env)
}

async fn open_checkout(store: &Store<CheckoutReducer>, seating: &Seating, seats: &[&str]) {
    store
        .send(CheckoutAction::ProceedToCheckout {
            showing: seating.showing.clone(),
            movie_title: seating.movie.title.clone(),
            seat_map: seating.seat_map.clone(),
            price_table: seating.price_table().clone(),
            selection: ids(seats).into_iter().collect::<Selection>(),
        })
        .await;

    for (field, value) in [
        (CustomerField::Name, "Grace Hopper"),
        (CustomerField::Email, "grace@example.com"),
        (CustomerField::Phone, "555-0199"),
    ] {
        store
            .send(CheckoutAction::EditCustomer {
                field,
                value: value.to_string(),
            })
            .await;
    }
}

async fn submit(store: &Store<CheckoutReducer>) -> CheckoutAction {
    store
        .send_and_wait_for(
            CheckoutAction::Submit,
            CheckoutAction::is_submission_outcome,
            WAIT,
        )
        .await
        .expect("booking service should answer")
}

#[tokio::test]
async fn test_booking_round_trip() {
    let svc = services();
    let seating = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    let store = store(&svc.bookings);

    open_checkout(&store, &seating, &["A1", "A2", "B5"]).await;
    let total = store.state(|s| s.draft().map(|d| d.total)).await;
    assert_eq!(total, Some(Money::from_dollars(35)));

    let outcome = submit(&store).await;
    assert!(matches!(outcome, CheckoutAction::SubmissionAccepted { .. }));

    let confirmed = store.state(|s| s.confirmed().cloned()).await.unwrap();
    assert_eq!(confirmed.seats, ids(&["A1", "A2", "B5"]));
    assert_eq!(confirmed.total, Money::from_dollars(35));
    assert_eq!(confirmed.showing, showing());
    assert_eq!(confirmed.customer.name, "Grace Hopper");

    // What was requested is what was stored
    let stored = svc.bookings.bookings().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, confirmed.booking_id);
    assert_eq!(stored[0].seats, confirmed.seats);
    assert_eq!(stored[0].showing(), confirmed.showing);
    assert_eq!(stored[0].customer(), confirmed.customer);
}

#[tokio::test]
async fn test_seat_taken_after_selection_is_reported() {
    let svc = services();
    let seating = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    let store = store(&svc.bookings);
    open_checkout(&store, &seating, &["A1", "A2"]).await;

    // Someone else books A1 between seat selection and submission
    svc.bookings.take_seats(&showing(), &[id("A1")]).unwrap();

    let outcome = submit(&store).await;
    assert!(matches!(
        outcome,
        CheckoutAction::SubmissionRejected {
            failure: SubmissionFailure::Conflict { .. },
            ..
        }
    ));

    let state = store.state(CheckoutState::clone).await;
    assert_eq!(state.phase(), CheckoutPhase::Drafting);
    let draft = state.draft().unwrap();
    assert_eq!(draft.selection.as_slice(), &ids(&["A1", "A2"])[..]);
    assert!(!draft.seat_map.seat(&id("A1")).unwrap().available);
    assert_eq!(
        state.notice_message().as_deref(),
        Some("Seats A1 are no longer available")
    );
    assert!(svc.bookings.bookings().unwrap().is_empty());

    // Dropping the taken seat lets the booking through
    store.send(CheckoutAction::ToggleSeat { seat: id("A1") }).await;
    let outcome = submit(&store).await;
    assert!(matches!(outcome, CheckoutAction::SubmissionAccepted { .. }));
    let confirmed = store.state(|s| s.confirmed().cloned()).await.unwrap();
    assert_eq!(confirmed.seats, ids(&["A2"]));
    assert_eq!(confirmed.total, Money::from_dollars(10));
}

#[tokio::test]
async fn test_two_customers_race_for_one_seat() {
    let svc = services();
    let seating = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    let first = store(&svc.bookings);
    let second = store(&svc.bookings);
    open_checkout(&first, &seating, &["B3", "B4"]).await;
    open_checkout(&second, &seating, &["B4"]).await;

    let (a, b) = tokio::join!(submit(&first), submit(&second));
    let accepted = [&a, &b]
        .iter()
        .filter(|o| matches!(o, CheckoutAction::SubmissionAccepted { .. }))
        .count();
    assert_eq!(accepted, 1, "exactly one booking may win seat B4");

    let stored = svc.bookings.bookings().unwrap();
    assert_eq!(stored.len(), 1);

    let loser = if matches!(a, CheckoutAction::SubmissionAccepted { .. }) {
        second
    } else {
        first
    };
    let notice = loser.state(|s| s.notice.clone()).await;
    assert_eq!(
        notice,
        Some(CheckoutNotice::Submission(SubmissionFailure::Conflict {
            seats: vec![id("B4")]
        }))
    );
}

#[tokio::test]
async fn test_refused_checkout_issues_no_request() {
    let svc = services();
    let seating = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    let store = store(&svc.bookings);

    // Seven seats is over the default limit of six
    open_checkout(&store, &seating, &["A1", "A2", "A3", "A4", "A5", "A6", "A7"]).await;
    store.send(CheckoutAction::Submit).await;

    let state = store.state(CheckoutState::clone).await;
    assert_eq!(state.phase(), CheckoutPhase::Empty);
    assert_eq!(state.notice, Some(CheckoutNotice::NoDraft));
    assert!(svc.bookings.requests().unwrap().is_empty());
}

#[tokio::test]
async fn test_booked_seats_are_unavailable_on_reload() {
    let svc = services();
    let seating = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    let store = store(&svc.bookings);
    open_checkout(&store, &seating, &["C1"]).await;
    submit(&store).await;

    let confirmed = store.state(|s| s.confirmed().cloned()).await.unwrap();
    svc.catalog.book(&confirmed.showing, &confirmed.seats).unwrap();

    let reloaded = load_seating(&svc.catalog, &svc.catalog, &showing(), DEFAULT_SEAT_PRICE)
        .await
        .unwrap();
    assert!(!reloaded.seat_map.seat(&id("C1")).unwrap().available);
    assert_eq!(
        reloaded.seat_map.available_count(),
        seating.seat_map.available_count() - 1
    );
}
