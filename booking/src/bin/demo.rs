//! Cinema Booking Demo
//!
//! Books the first free seats of today's first screening against a running
//! cinema API:
//! - loads the movie list and picks a screening
//! - fetches the seat map and prices in parallel
//! - drives the checkout reducer through a `Store` until the booking service
//!   answers
//!
//! # Usage
//!
//! ```bash
//! CINEMA_API_URL=http://localhost:5000/api cargo run --bin cinema-demo
//! ```

use anyhow::{bail, Context};
use chrono::Utc;
use cinema_booking::{
    load_seating, ApiClient, CheckoutAction, CheckoutEnvironment, CheckoutPhase, CheckoutReducer,
    CheckoutState, Config, CustomerField, Selection, Showing,
};
use cinema_booking::services::CatalogService;
use cinema_core::environment::SystemClock;
use cinema_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Seats the demo tries to book.
const DEMO_SEATS: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n============================================");
    println!("   Cinema Booking - Live Demo");
    println!("============================================\n");

    let client = ApiClient::new(&config.api)?;
    println!("API: {}", client.base_url());

    // Step 1: pick a screening
    let movies = client.list_movies().await.context("loading movies")?;
    let Some((movie, showtime)) = movies
        .iter()
        .find_map(|m| m.showtimes.first().map(|time| (m, time.clone())))
    else {
        bail!("no movie has a showtime");
    };
    let showing = Showing::new(movie.id.clone(), Utc::now().date_naive(), showtime);
    println!("1. Screening: {} ({showing})", movie.title);

    // Step 2: seats and prices
    let seating = load_seating(&client, &client, &showing, config.booking.default_seat_price)
        .await
        .context("loading seats")?;
    let selection: Selection = seating
        .seat_map
        .seats()
        .filter(|(_, seat)| seat.available)
        .map(|(id, _)| id)
        .take(DEMO_SEATS)
        .collect();
    if selection.is_empty() {
        bail!("screening is sold out");
    }
    println!(
        "2. {} seats free, picking {selection}",
        seating.seat_map.available_count()
    );

    // Step 3: checkout
    let env = CheckoutEnvironment::new(Arc::new(SystemClock), Arc::new(client.clone()))
        .with_max_seats(config.booking.max_seats)
        .with_submit_timeout(config.booking.submit_timeout());
    let store = Store::new(CheckoutState::new(), CheckoutReducer::new(), env);

    store
        .send(CheckoutAction::ProceedToCheckout {
            price_table: seating.price_table().clone(),
            movie_title: seating.movie.title.clone(),
            seat_map: seating.seat_map,
            showing: seating.showing,
            selection,
        })
        .await;
    let (phase, notice) = store.state(|s| (s.phase(), s.notice_message())).await;
    if phase != CheckoutPhase::Drafting {
        bail!("checkout refused: {}", notice.unwrap_or_default());
    }
    let total = store
        .state(|s| s.draft().map(|d| d.total.to_string()))
        .await
        .unwrap_or_default();
    println!("3. Checkout opened, total {total}");

    for (field, value) in [
        (CustomerField::Name, "Demo Customer"),
        (CustomerField::Email, "demo@example.com"),
        (CustomerField::Phone, "555-0100"),
    ] {
        store
            .send(CheckoutAction::EditCustomer {
                field,
                value: value.to_string(),
            })
            .await;
    }

    // Step 4: submit and wait for the booking service
    let wait = config.booking.submit_timeout() + Duration::from_secs(5);
    let outcome = store
        .send_and_wait_for(
            CheckoutAction::Submit,
            CheckoutAction::is_submission_outcome,
            wait,
        )
        .await;
    if let Err(error) = outcome {
        let notice = store.state(CheckoutState::notice_message).await;
        bail!("{}", notice.unwrap_or_else(|| error.to_string()));
    }

    match store.state(|s| s.confirmed().cloned()).await {
        Some(confirmed) => {
            println!("4. Booking confirmed");
            println!("   Booking:  {}", confirmed.booking_id);
            println!("   Seats:    {}", cinema_booking::seat_map::join_seat_ids(&confirmed.seats));
            println!("   Total:    {}", confirmed.total);
            println!("   Customer: {}", confirmed.customer.name);
        },
        None => {
            let notice = store.state(CheckoutState::notice_message).await;
            println!("4. Booking not accepted: {}", notice.unwrap_or_default());
        },
    }

    println!("\n============================================\n");
    Ok(())
}
