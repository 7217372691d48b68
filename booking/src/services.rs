//! Collaborator interfaces: catalog, availability, bookings and admin.
//!
//! The booking engine only talks to the outside world through these traits.
//! [`crate::client::ApiClient`] implements all of them against the REST API;
//! in-memory versions live in `crate::mocks`.

use crate::admin::dashboard::DashboardOverview;
use crate::catalog::Movie;
use crate::customer::CustomerDetails;
use crate::seat_map::{join_seat_ids, Availability, SeatId};
use crate::types::{BookingId, Money, MovieId, Showing};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failures reported by (or while reaching) a collaborator service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Credentials were refused; any bearer token used must be discarded
    #[error("Unauthorized")]
    Unauthorized,

    /// The admin session expired or was invalidated before the call
    #[error("Admin session expired, please log in again")]
    SessionExpired,

    /// Login attempted with a blank password
    #[error("Password is required")]
    MissingPassword,

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The movie does not list the requested showtime
    #[error("Movie {movie_id} has no showtime {showtime}")]
    UnknownShowtime {
        /// Movie that was asked for
        movie_id: MovieId,
        /// Showtime that is not listed
        showtime: String,
    },

    /// Requested seats were taken by a concurrent booking
    #[error("{message}")]
    Conflict {
        /// Message from the service
        message: String,
        /// Seats that are no longer free
        conflicting_seats: Vec<SeatId>,
    },

    /// The service answered with an error status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// The request could not be sent or no response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be understood
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Local file system failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Why a booking submission did not produce a booking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Seats were taken by someone else before the booking committed
    #[error("Seats {} are no longer available", join_seat_ids(.seats))]
    Conflict {
        /// Seats reported as taken
        seats: Vec<SeatId>,
    },

    /// Any other failure (network, server, timeout)
    #[error("{message}")]
    Failed {
        /// Message to show the customer
        message: String,
    },
}

impl From<ServiceError> for SubmissionFailure {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Conflict {
                conflicting_seats, ..
            } if !conflicting_seats.is_empty() => Self::Conflict {
                seats: conflicting_seats,
            },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Payload sent to create a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Movie being booked
    pub movie_id: MovieId,
    /// Showtime label
    pub showtime: String,
    /// Screening date
    pub date: NaiveDate,
    /// Seats to reserve
    pub seats: Vec<SeatId>,
    /// Customer name
    pub customer_name: String,
    /// Customer email
    pub customer_email: String,
    /// Customer phone
    pub customer_phone: String,
}

impl BookingRequest {
    /// Build a request for `seats` at `showing`, trimming the customer fields.
    #[must_use]
    pub fn new(showing: &Showing, seats: Vec<SeatId>, customer: &CustomerDetails) -> Self {
        let customer = customer.trimmed();
        Self {
            movie_id: showing.movie_id.clone(),
            showtime: showing.showtime.clone(),
            date: showing.date,
            seats,
            customer_name: customer.name,
            customer_email: customer.email,
            customer_phone: customer.phone,
        }
    }
}

/// Status of a stored booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Seats are reserved
    Confirmed,
    /// Booking was cancelled
    Cancelled,
}

/// A booking as stored by the booking service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Server-issued identifier
    pub id: BookingId,
    /// Movie booked
    pub movie_id: MovieId,
    /// Title, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_title: Option<String>,
    /// Showtime label
    pub showtime: String,
    /// Screening date
    pub date: NaiveDate,
    /// Reserved seats
    pub seats: Vec<SeatId>,
    /// Customer name
    pub customer_name: String,
    /// Customer email
    pub customer_email: String,
    /// Customer phone
    pub customer_phone: String,
    /// Amount charged, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Money>,
    /// Current status
    pub status: BookingStatus,
    /// Creation time, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// The screening this booking is for
    #[must_use]
    pub fn showing(&self) -> Showing {
        Showing::new(self.movie_id.clone(), self.date, self.showtime.clone())
    }

    /// Customer details as stored
    #[must_use]
    pub fn customer(&self) -> CustomerDetails {
        CustomerDetails::new(&self.customer_name, &self.customer_email, &self.customer_phone)
    }
}

// ============================================================================
// Service traits
// ============================================================================

/// Movie catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All movies currently listed
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the catalog cannot be reached.
    async fn list_movies(&self) -> Result<Vec<Movie>, ServiceError>;

    /// One movie by id
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, ServiceError>;
}

/// Seat availability per screening.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Seat map and booked seats for a screening
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if availability cannot be fetched.
    async fn get_availability(&self, showing: &Showing) -> Result<Availability, ServiceError>;
}

/// Booking persistence. The service is the final judge of seat conflicts.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Create a booking
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] with the taken seats when another
    /// booking got there first.
    async fn create_booking(&self, request: BookingRequest) -> Result<Booking, ServiceError>;

    /// Fetch a stored booking
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    async fn get_booking(&self, id: &BookingId) -> Result<Booking, ServiceError>;
}

/// Privileged operations. Every call except `login` takes a bearer token.
///
/// Callers should go through [`crate::admin`], which manages the token's
/// lifetime and drops it when the service answers `Unauthorized`.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Exchange the admin password for a bearer token
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] for a wrong password.
    async fn login(&self, password: &str) -> Result<String, ServiceError>;

    /// Aggregate statistics
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] if the token is refused.
    async fn dashboard(&self, token: &str) -> Result<DashboardOverview, ServiceError>;

    /// Every booking, newest first
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] if the token is refused.
    async fn list_bookings(&self, token: &str) -> Result<Vec<Booking>, ServiceError>;

    /// Remove a movie from the catalog
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    async fn delete_movie(&self, token: &str, id: &MovieId) -> Result<(), ServiceError>;

    /// Full data export
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] if the token is refused.
    async fn backup(&self, token: &str) -> Result<serde_json::Value, ServiceError>;
}
