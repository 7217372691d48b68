//! Fixtures shared by the integration tests.

#![allow(dead_code)] // Not every test file uses every fixture
#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use cinema_booking::catalog::Movie;
use cinema_booking::mocks::{MockAuth, MockBookingService, MockCatalog};
use cinema_booking::seat_map::{Row, Seat, SeatCategory, SeatId, SeatMap};
use cinema_booking::{Money, MovieId, PriceTable, Showing};

pub const ADMIN_PASSWORD: &str = "letmein";

pub fn id(raw: &str) -> SeatId {
    raw.parse().unwrap()
}

pub fn ids(raw: &[&str]) -> Vec<SeatId> {
    raw.iter().map(|s| id(s)).collect()
}

/// Row A: ten standard seats. Row B: ten premium seats. Row C: four VIP
/// seats, C1 wheelchair accessible.
pub fn layout() -> SeatMap {
    SeatMap::new(vec![
        Row::new('A', (1..=10).map(|n| Seat::new(n, SeatCategory::Standard)).collect()),
        Row::new('B', (1..=10).map(|n| Seat::new(n, SeatCategory::Premium)).collect()),
        Row::new(
            'C',
            (1..=4)
                .map(|n| Seat {
                    accessible: n == 1,
                    ..Seat::new(n, SeatCategory::Vip)
                })
                .collect(),
        ),
    ])
    .unwrap()
}

pub fn movie(id: &str, title: &str, genre: &str) -> Movie {
    Movie {
        id: MovieId::new(id),
        title: title.to_string(),
        description: format!("{title}, now showing"),
        genre: genre.to_string(),
        duration: 116,
        rating: "PG-13".to_string(),
        poster: None,
        price: PriceTable::new()
            .with_price(SeatCategory::Standard, Money::from_dollars(10))
            .with_price(SeatCategory::Premium, Money::from_dollars(15)),
        showtimes: vec!["14:00".to_string(), "19:30".to_string()],
    }
}

pub fn movies() -> Vec<Movie> {
    vec![
        movie("m-1", "Arrival", "Drama, Sci-Fi"),
        movie("m-2", "Paddington 2", "Family, Comedy"),
    ]
}

pub fn showing() -> Showing {
    Showing::new(
        MovieId::new("m-1"),
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        "19:30",
    )
}

pub struct Services {
    pub catalog: MockCatalog,
    pub bookings: MockBookingService,
    pub auth: MockAuth,
}

pub fn services() -> Services {
    let catalog = MockCatalog::new(movies(), layout());
    let bookings = MockBookingService::new();
    let auth = MockAuth::new(ADMIN_PASSWORD, catalog.clone(), bookings.clone());
    Services {
        catalog,
        bookings,
        auth,
    }
}
