//! Cinema Booking - seat selection, fares and the booking lifecycle
//!
//! The client-side core of a cinema ticketing system:
//!
//! - **Seat maps**: rows of typed seats, with a single parser for seat
//!   identifiers such as `"B7"`
//! - **Fares**: per-category price tables and exact totals in cents
//! - **Selection**: ordered, duplicate-free seat picks validated against the
//!   seat map and a per-booking limit
//! - **Checkout**: the booking lifecycle as a reducer, from draft to
//!   confirmation, including conflicts reported by the booking service
//! - **Admin**: an explicit, expiring session for privileged calls
//!
//! # Architecture
//!
//! ```text
//!  catalog ──► load_seating ──► Seating ──► ProceedToCheckout
//!                                               │
//!                                               ▼
//!                              ┌─────────────────────────────┐
//!                              │  CheckoutReducer (pure)     │
//!                              │  Empty → Drafting →         │
//!                              │  Submitting → Confirmed     │
//!                              └─────────────────────────────┘
//!                                               │ Effect::Future
//!                                               ▼
//!                                  BookingService::create_booking
//! ```
//!
//! Every collaborator sits behind a trait in [`services`]. [`client::ApiClient`]
//! implements them over HTTP; `mocks` has in-memory versions.
//!
//! # Usage
//!
//! Run the reducer in a [`cinema_runtime::Store`]; see `src/bin/demo.rs` for
//! a complete booking against a running API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod config;
pub mod customer;
pub mod fare;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod seat_map;
pub mod selection;
pub mod services;
pub mod types;

pub use admin::{AdminConsole, AdminDashboard, AdminSession};
pub use catalog::{load_seating, Movie, MovieFilter, Seating};
pub use checkout::{
    CheckoutAction, CheckoutEnvironment, CheckoutNotice, CheckoutPhase, CheckoutReducer,
    CheckoutState, ConfirmedBooking,
};
pub use client::ApiClient;
pub use config::Config;
pub use customer::{CustomerDetails, CustomerField};
pub use fare::{total_price, PriceTable};
pub use seat_map::{Seat, SeatCategory, SeatId, SeatMap};
pub use selection::{validate, Selection, SelectionRejected};
pub use services::{ServiceError, SubmissionFailure};
pub use types::*;
