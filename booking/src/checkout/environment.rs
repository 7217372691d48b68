//! Dependencies of the checkout reducer.

use crate::selection::DEFAULT_MAX_SEATS;
use crate::services::BookingService;
use cinema_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed for the booking service to answer a submission.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment for the checkout reducer.
///
/// Production wires in `SystemClock` and the HTTP client; tests use
/// `FixedClock` and an in-memory booking service.
#[derive(Clone)]
pub struct CheckoutEnvironment {
    clock: Arc<dyn Clock>,
    bookings: Arc<dyn BookingService>,
    max_seats: usize,
    submit_timeout: Duration,
}

impl CheckoutEnvironment {
    /// Create an environment with the default seat limit and submit timeout.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, bookings: Arc<dyn BookingService>) -> Self {
        Self {
            clock,
            bookings,
            max_seats: DEFAULT_MAX_SEATS,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Override the number of seats one booking may hold
    #[must_use]
    pub fn with_max_seats(mut self, max_seats: usize) -> Self {
        self.max_seats = max_seats;
        self
    }

    /// Override how long a submission may take before it counts as failed
    #[must_use]
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Clock for confirmation timestamps
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Booking service used for submissions
    #[must_use]
    pub fn bookings(&self) -> Arc<dyn BookingService> {
        Arc::clone(&self.bookings)
    }

    /// Seats one booking may hold
    #[must_use]
    pub const fn max_seats(&self) -> usize {
        self.max_seats
    }

    /// Time allowed for a submission
    #[must_use]
    pub const fn submit_timeout(&self) -> Duration {
        self.submit_timeout
    }
}
