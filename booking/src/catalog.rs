//! Movie catalog: listing, filtering, bookable dates and seat loading.

use crate::fare::PriceTable;
use crate::seat_map::SeatMap;
use crate::services::{AvailabilityService, CatalogService, ServiceError};
use crate::types::{Money, MovieId, Showing};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How many days ahead, including today, a screening can be booked.
pub const BOOKING_WINDOW_DAYS: u64 = 7;

/// A listed movie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Catalog id
    pub id: MovieId,
    /// Title
    pub title: String,
    /// Synopsis
    #[serde(default)]
    pub description: String,
    /// Comma-separated genres, e.g. `"Drama, Sci-Fi"`
    #[serde(default)]
    pub genre: String,
    /// Running time in minutes
    #[serde(default)]
    pub duration: u32,
    /// Age rating, e.g. `"PG-13"`
    #[serde(default)]
    pub rating: String,
    /// Poster image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// Seat prices for this movie
    #[serde(default)]
    pub price: PriceTable,
    /// Daily showtimes, e.g. `["14:00", "19:30"]`
    #[serde(default)]
    pub showtimes: Vec<String>,
}

impl Movie {
    /// Genres listed for this movie, trimmed, in listed order
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre
            .split(',')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
    }

    /// Whether the movie is screened at `showtime`
    #[must_use]
    pub fn has_showtime(&self, showtime: &str) -> bool {
        self.showtimes.iter().any(|s| s == showtime)
    }
}

/// Search and genre filter over the movie list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Matches title or description, case-insensitively
    pub search: Option<String>,
    /// Matches any part of the genre field, case-insensitively
    pub genre: Option<String>,
}

impl MovieFilter {
    /// A filter that matches every movie
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search: None,
            genre: None,
        }
    }

    /// Only movies whose title or description contain `term`
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Only movies whose genre contains `genre`
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Whether `movie` passes the filter. Empty terms match everything.
    #[must_use]
    pub fn matches(&self, movie: &Movie) -> bool {
        let search_ok = self.search.as_deref().filter(|t| !t.is_empty()).is_none_or(|term| {
            let term = term.to_lowercase();
            movie.title.to_lowercase().contains(&term)
                || movie.description.to_lowercase().contains(&term)
        });

        let genre_ok = self
            .genre
            .as_deref()
            .filter(|g| !g.is_empty())
            .is_none_or(|genre| movie.genre.to_lowercase().contains(&genre.to_lowercase()));

        search_ok && genre_ok
    }

    /// Movies that pass the filter, in their original order
    #[must_use]
    pub fn apply<'a>(&self, movies: &'a [Movie]) -> Vec<&'a Movie> {
        movies.iter().filter(|movie| self.matches(movie)).collect()
    }
}

/// Every genre mentioned across `movies`, de-duplicated and sorted.
#[must_use]
pub fn unique_genres(movies: &[Movie]) -> Vec<String> {
    movies
        .iter()
        .flat_map(Movie::genres)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The dates a screening can be booked for, starting with `today`.
#[must_use]
pub fn booking_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..BOOKING_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}

/// Everything needed to pick seats for one screening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seating {
    /// The screening
    pub showing: Showing,
    /// The movie, including its price table
    pub movie: Movie,
    /// Seat map with booked seats marked unavailable
    pub seat_map: SeatMap,
}

impl Seating {
    /// Prices for this screening
    #[must_use]
    pub const fn price_table(&self) -> &PriceTable {
        &self.movie.price
    }
}

/// Fetch the movie and the seat availability for a screening in parallel.
///
/// Seat categories the movie does not price cost `price_fallback`.
///
/// # Errors
///
/// - any [`ServiceError`] from either fetch
/// - [`ServiceError::UnknownShowtime`] if the movie does not list the
///   requested showtime
#[tracing::instrument(skip_all, fields(showing = %showing))]
pub async fn load_seating(
    catalog: &dyn CatalogService,
    availability: &dyn AvailabilityService,
    showing: &Showing,
    price_fallback: Money,
) -> Result<Seating, ServiceError> {
    let (mut movie, seats) = tokio::try_join!(
        catalog.get_movie(&showing.movie_id),
        availability.get_availability(showing),
    )?;

    if !movie.has_showtime(&showing.showtime) {
        tracing::warn!(showtime = %showing.showtime, "Showtime not listed for movie");
        return Err(ServiceError::UnknownShowtime {
            movie_id: movie.id,
            showtime: showing.showtime.clone(),
        });
    }

    movie.price = movie.price.with_fallback(price_fallback);
    let seat_map = seats.into_seat_map();
    tracing::debug!(available = seat_map.available_count(), "Seating loaded");

    Ok(Seating {
        showing: showing.clone(),
        movie,
        seat_map,
    })
}
