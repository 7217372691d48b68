//! Admin dashboard figures.

use crate::catalog::Movie;
use crate::services::Booking;
use crate::types::Money;
use serde::{Deserialize, Serialize};

/// How many bookings the dashboard lists as recent.
pub const RECENT_BOOKINGS: usize = 5;

/// Aggregate figures reported by the admin service. Any of them may be
/// missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Movies in the catalog
    #[serde(default)]
    pub total_movies: Option<u64>,
    /// Bookings ever made
    #[serde(default)]
    pub total_bookings: Option<u64>,
    /// Bookings made today
    #[serde(default)]
    pub today_bookings: Option<u64>,
    /// Revenue across all bookings
    #[serde(default)]
    pub total_revenue: Option<Money>,
}

/// Overview plus the movie and booking lists it summarises.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminDashboard {
    /// Figures from the admin service
    pub overview: DashboardOverview,
    /// Every movie
    pub movies: Vec<Movie>,
    /// Every booking, newest first
    pub bookings: Vec<Booking>,
}

impl AdminDashboard {
    /// Movie count; a missing or zero figure falls back to the list length.
    #[must_use]
    pub fn total_movies(&self) -> u64 {
        nonzero_or(self.overview.total_movies, self.movies.len())
    }

    /// Booking count; a missing or zero figure falls back to the list length.
    #[must_use]
    pub fn total_bookings(&self) -> u64 {
        nonzero_or(self.overview.total_bookings, self.bookings.len())
    }

    /// Bookings made today, zero if not reported
    #[must_use]
    pub fn today_bookings(&self) -> u64 {
        self.overview.today_bookings.unwrap_or(0)
    }

    /// Revenue, zero if not reported
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.overview.total_revenue.unwrap_or(Money::ZERO)
    }

    /// The first few bookings
    #[must_use]
    pub fn recent_bookings(&self) -> &[Booking] {
        &self.bookings[..self.bookings.len().min(RECENT_BOOKINGS)]
    }
}

fn nonzero_or(figure: Option<u64>, fallback: usize) -> u64 {
    figure
        .filter(|n| *n > 0)
        .unwrap_or_else(|| u64::try_from(fallback).unwrap_or(u64::MAX))
}
