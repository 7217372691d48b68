//! REST API client.
//!
//! Successful responses wrap their payload as `{ "data": ... }`; failures
//! carry `{ "error": "...", "conflictingSeats": [...] }`.

use crate::admin::dashboard::DashboardOverview;
use crate::catalog::Movie;
use crate::config::ApiConfig;
use crate::seat_map::{Availability, SeatId};
use crate::services::{
    AdminService, AvailabilityService, Booking, BookingRequest, BookingService, CatalogService,
    ServiceError,
};
use crate::types::{BookingId, MovieId, Showing};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    conflicting_seats: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct LoginGrant {
    token: String,
}

#[derive(Deserialize)]
struct DashboardData {
    #[serde(default)]
    overview: DashboardOverview,
}

/// HTTP client for the cinema API
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RequestFailed`] if the HTTP client cannot be
    /// built (e.g. TLS backend initialisation fails).
    pub fn new(config: &ApiConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = error_from_response(status, &body);
        tracing::debug!(status = status.as_u16(), %error, "API request failed");
        Err(error)
    }

    async fn data<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ServiceError> {
        let envelope: Envelope<T> = Self::execute(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::ResponseParseFailed(e.to_string()))?;
        Ok(envelope.data)
    }
}

/// Map a failed response to a [`ServiceError`].
///
/// A body naming conflicting seats is a conflict whatever the status.
fn error_from_response(status: StatusCode, body: &str) -> ServiceError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Something went wrong").to_string());

    let conflicting_seats: Vec<SeatId> = parsed
        .conflicting_seats
        .unwrap_or_default()
        .iter()
        .filter_map(|raw| raw.parse().ok())
        .collect();

    if status == StatusCode::CONFLICT || !conflicting_seats.is_empty() {
        return ServiceError::Conflict {
            message,
            conflicting_seats,
        };
    }

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized,
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        _ => ServiceError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CatalogService for ApiClient {
    #[tracing::instrument(skip_all)]
    async fn list_movies(&self) -> Result<Vec<Movie>, ServiceError> {
        let movies: Option<Vec<Movie>> = Self::data(self.client.get(self.url("/movies"))).await?;
        Ok(movies.unwrap_or_default())
    }

    #[tracing::instrument(skip_all, fields(movie_id = %id))]
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, ServiceError> {
        Self::data(self.client.get(self.url(&format!("/movies/{id}")))).await
    }
}

#[async_trait]
impl AvailabilityService for ApiClient {
    #[tracing::instrument(skip_all, fields(showing = %showing))]
    async fn get_availability(&self, showing: &Showing) -> Result<Availability, ServiceError> {
        let date = showing.date.format("%Y-%m-%d").to_string();
        let request = self.client.get(self.url("/seats/availability")).query(&[
            ("movieId", showing.movie_id.as_str()),
            ("showtime", showing.showtime.as_str()),
            ("date", date.as_str()),
        ]);
        Self::data(request).await
    }
}

#[async_trait]
impl BookingService for ApiClient {
    #[tracing::instrument(
        skip_all,
        fields(movie_id = %request.movie_id, seats = request.seats.len())
    )]
    async fn create_booking(&self, request: BookingRequest) -> Result<Booking, ServiceError> {
        Self::data(self.client.post(self.url("/bookings")).json(&request)).await
    }

    #[tracing::instrument(skip_all, fields(booking_id = %id))]
    async fn get_booking(&self, id: &BookingId) -> Result<Booking, ServiceError> {
        Self::data(self.client.get(self.url(&format!("/bookings/{id}")))).await
    }
}

#[async_trait]
impl AdminService for ApiClient {
    #[tracing::instrument(skip_all)]
    async fn login(&self, password: &str) -> Result<String, ServiceError> {
        let body = serde_json::json!({ "password": password });
        let grant: LoginGrant =
            Self::data(self.client.post(self.url("/admin/login")).json(&body)).await?;
        Ok(grant.token)
    }

    #[tracing::instrument(skip_all)]
    async fn dashboard(&self, token: &str) -> Result<DashboardOverview, ServiceError> {
        let request = self.client.get(self.url("/admin/dashboard")).bearer_auth(token);
        let dashboard: DashboardData = Self::data(request).await?;
        Ok(dashboard.overview)
    }

    #[tracing::instrument(skip_all)]
    async fn list_bookings(&self, token: &str) -> Result<Vec<Booking>, ServiceError> {
        let request = self.client.get(self.url("/bookings")).bearer_auth(token);
        let bookings: Option<Vec<Booking>> = Self::data(request).await?;
        Ok(bookings.unwrap_or_default())
    }

    #[tracing::instrument(skip_all, fields(movie_id = %id))]
    async fn delete_movie(&self, token: &str, id: &MovieId) -> Result<(), ServiceError> {
        let request = self
            .client
            .delete(self.url(&format!("/movies/{id}")))
            .bearer_auth(token);
        Self::execute(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn backup(&self, token: &str) -> Result<serde_json::Value, ServiceError> {
        let request = self.client.post(self.url("/admin/backup")).bearer_auth(token);
        Self::data(request).await
    }
}
