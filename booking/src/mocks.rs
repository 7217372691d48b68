//! In-memory service implementations for tests and local runs.
//!
//! State lives behind `Arc<Mutex<_>>` so clones share it: a test can keep one
//! handle for assertions and hand another to the code under test.

use crate::admin::dashboard::DashboardOverview;
use crate::catalog::Movie;
use crate::seat_map::{Availability, SeatId, SeatMap};
use crate::services::{
    AdminService, AvailabilityService, Booking, BookingRequest, BookingService, BookingStatus,
    CatalogService, ServiceError,
};
use crate::types::{BookingId, MovieId, Showing};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
    mutex
        .lock()
        .map_err(|_| ServiceError::RequestFailed("mock state poisoned".to_string()))
}

// ============================================================================
// Catalog and availability
// ============================================================================

#[derive(Debug, Default)]
struct CatalogData {
    movies: Vec<Movie>,
    layout: SeatMap,
    booked: HashMap<Showing, Vec<SeatId>>,
}

/// In-memory catalog and seat availability.
///
/// Every screening shares one seat layout; booked seats are tracked per
/// screening.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    data: Arc<Mutex<CatalogData>>,
}

impl MockCatalog {
    /// A catalog listing `movies`, with `layout` in every auditorium.
    #[must_use]
    pub fn new(movies: Vec<Movie>, layout: SeatMap) -> Self {
        Self {
            data: Arc::new(Mutex::new(CatalogData {
                movies,
                layout,
                booked: HashMap::new(),
            })),
        }
    }

    /// Report `seats` as booked for `showing`.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn book(&self, showing: &Showing, seats: &[SeatId]) -> Result<(), ServiceError> {
        lock(&self.data)?
            .booked
            .entry(showing.clone())
            .or_default()
            .extend_from_slice(seats);
        Ok(())
    }

    /// Drop a movie, as an admin deletion would.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the movie is not listed.
    pub fn remove_movie(&self, id: &MovieId) -> Result<(), ServiceError> {
        let mut data = lock(&self.data)?;
        let before = data.movies.len();
        data.movies.retain(|m| &m.id != id);
        if data.movies.len() == before {
            return Err(ServiceError::NotFound(format!("movie {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn list_movies(&self) -> Result<Vec<Movie>, ServiceError> {
        Ok(lock(&self.data)?.movies.clone())
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Movie, ServiceError> {
        lock(&self.data)?
            .movies
            .iter()
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("movie {id}")))
    }
}

#[async_trait]
impl AvailabilityService for MockCatalog {
    async fn get_availability(&self, showing: &Showing) -> Result<Availability, ServiceError> {
        let data = lock(&self.data)?;
        Ok(Availability {
            seat_map: data.layout.clone(),
            booked_seats: data.booked.get(showing).cloned().unwrap_or_default(),
        })
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Default)]
struct Ledger {
    bookings: Vec<Booking>,
    taken: HashMap<Showing, HashSet<SeatId>>,
    requests: Vec<BookingRequest>,
    fail_next: Option<ServiceError>,
    delay: Duration,
}

/// In-memory booking service that rejects double bookings the way the real
/// service does.
#[derive(Debug, Clone, Default)]
pub struct MockBookingService {
    ledger: Arc<Mutex<Ledger>>,
}

impl MockBookingService {
    /// An empty booking service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark seats as taken by someone else.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn take_seats(&self, showing: &Showing, seats: &[SeatId]) -> Result<(), ServiceError> {
        lock(&self.ledger)?
            .taken
            .entry(showing.clone())
            .or_default()
            .extend(seats.iter().copied());
        Ok(())
    }

    /// Make the next `create_booking` fail with `error`.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn fail_next(&self, error: ServiceError) -> Result<(), ServiceError> {
        lock(&self.ledger)?.fail_next = Some(error);
        Ok(())
    }

    /// Delay every `create_booking` answer by `delay`.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn set_delay(&self, delay: Duration) -> Result<(), ServiceError> {
        lock(&self.ledger)?.delay = delay;
        Ok(())
    }

    /// Every request received, in order.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn requests(&self) -> Result<Vec<BookingRequest>, ServiceError> {
        Ok(lock(&self.ledger)?.requests.clone())
    }

    /// Every booking created, in order.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn bookings(&self) -> Result<Vec<Booking>, ServiceError> {
        Ok(lock(&self.ledger)?.bookings.clone())
    }
}

#[async_trait]
impl BookingService for MockBookingService {
    async fn create_booking(&self, request: BookingRequest) -> Result<Booking, ServiceError> {
        let delay = {
            let mut ledger = lock(&self.ledger)?;
            ledger.requests.push(request.clone());
            ledger.delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut ledger = lock(&self.ledger)?;
        if let Some(error) = ledger.fail_next.take() {
            return Err(error);
        }

        let showing = Showing::new(
            request.movie_id.clone(),
            request.date,
            request.showtime.clone(),
        );
        let taken = ledger.taken.entry(showing).or_default();
        let conflicting_seats: Vec<SeatId> = request
            .seats
            .iter()
            .filter(|seat| taken.contains(*seat))
            .copied()
            .collect();
        if !conflicting_seats.is_empty() {
            return Err(ServiceError::Conflict {
                message: "Some seats are already booked".to_string(),
                conflicting_seats,
            });
        }
        taken.extend(request.seats.iter().copied());

        let booking = Booking {
            id: BookingId::new(format!("BK{:04}", ledger.bookings.len() + 1)),
            movie_id: request.movie_id,
            movie_title: None,
            showtime: request.showtime,
            date: request.date,
            seats: request.seats,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            total_price: None,
            status: BookingStatus::Confirmed,
            created_at: None,
        };
        ledger.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: &BookingId) -> Result<Booking, ServiceError> {
        lock(&self.ledger)?
            .bookings
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("booking {id}")))
    }
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Default)]
struct AuthData {
    password: String,
    issued: Vec<String>,
    overview: DashboardOverview,
    deleted: Vec<MovieId>,
}

/// In-memory admin service.
///
/// Tokens stay valid until [`MockAuth::revoke_all`] is called. Bookings and
/// deletions are served from the given [`MockBookingService`] and
/// [`MockCatalog`].
#[derive(Debug, Clone)]
pub struct MockAuth {
    data: Arc<Mutex<AuthData>>,
    catalog: MockCatalog,
    bookings: MockBookingService,
}

impl MockAuth {
    /// Admin service accepting `password`
    #[must_use]
    pub fn new(
        password: impl Into<String>,
        catalog: MockCatalog,
        bookings: MockBookingService,
    ) -> Self {
        Self {
            data: Arc::new(Mutex::new(AuthData {
                password: password.into(),
                ..AuthData::default()
            })),
            catalog,
            bookings,
        }
    }

    /// Figures reported by `dashboard`.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn set_overview(&self, overview: DashboardOverview) -> Result<(), ServiceError> {
        lock(&self.data)?.overview = overview;
        Ok(())
    }

    /// Invalidate every token issued so far.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn revoke_all(&self) -> Result<(), ServiceError> {
        lock(&self.data)?.issued.clear();
        Ok(())
    }

    /// Movies deleted through the admin service, in order.
    ///
    /// # Errors
    ///
    /// Fails only if the mock's lock is poisoned.
    pub fn deleted(&self) -> Result<Vec<MovieId>, ServiceError> {
        Ok(lock(&self.data)?.deleted.clone())
    }

    fn check(&self, token: &str) -> Result<(), ServiceError> {
        if lock(&self.data)?.issued.iter().any(|t| t == token) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }
}

#[async_trait]
impl AdminService for MockAuth {
    async fn login(&self, password: &str) -> Result<String, ServiceError> {
        let mut data = lock(&self.data)?;
        if data.password != password {
            return Err(ServiceError::Unauthorized);
        }
        let token = format!("mock-admin-token-{}", data.issued.len() + 1);
        data.issued.push(token.clone());
        Ok(token)
    }

    async fn dashboard(&self, token: &str) -> Result<DashboardOverview, ServiceError> {
        self.check(token)?;
        Ok(lock(&self.data)?.overview.clone())
    }

    async fn list_bookings(&self, token: &str) -> Result<Vec<Booking>, ServiceError> {
        self.check(token)?;
        let mut bookings = self.bookings.bookings()?;
        bookings.reverse();
        Ok(bookings)
    }

    async fn delete_movie(&self, token: &str, id: &MovieId) -> Result<(), ServiceError> {
        self.check(token)?;
        self.catalog.remove_movie(id)?;
        lock(&self.data)?.deleted.push(id.clone());
        Ok(())
    }

    async fn backup(&self, token: &str) -> Result<serde_json::Value, ServiceError> {
        self.check(token)?;
        let movies = self.catalog.list_movies().await?;
        let bookings = self.bookings.bookings()?;
        Ok(serde_json::json!({
            "movies": movies,
            "bookings": bookings,
        }))
    }
}
