//! Seat map model: rows, seats, categories and seat identifiers.
//!
//! A seat is addressed by a [`SeatId`] such as `A12` (row letter followed by
//! the seat number). Parsing happens in exactly one place,
//! [`SeatId::from_str`], and every lookup goes through [`SeatMap::seat`] or
//! [`SeatMap::resolve`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// A string that is not a well-formed seat identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatIdError {
    /// Not an uppercase row letter followed by a positive seat number
    #[error("malformed seat identifier {0:?}")]
    Malformed(String),
}

/// A seat identifier that does not resolve within a seat map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The row is absent, the number does not exist in that row, or the
    /// identifier is malformed
    #[error("seat {0} not found")]
    NotFound(String),
}

/// Rows that violate the seat map invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatMapError {
    /// Row labels must be a single uppercase ASCII letter
    #[error("invalid row label {0:?}")]
    InvalidRowLabel(char),

    /// The same row label appears twice
    #[error("duplicate row {0}")]
    DuplicateRow(char),

    /// Seat numbers start at 1
    #[error("row {row} has a seat numbered 0")]
    ZeroSeatNumber {
        /// Row containing the seat
        row: char,
    },

    /// The same seat number appears twice within a row
    #[error("duplicate seat {0}")]
    DuplicateSeat(SeatId),
}

// ============================================================================
// Seat identifiers
// ============================================================================

/// Row letter plus seat number, e.g. `A12`.
///
/// Serialized as its string form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId {
    row: char,
    number: u32,
}

impl SeatId {
    /// Build an identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`SeatIdError::Malformed`] if `row` is not an uppercase ASCII
    /// letter or `number` is zero.
    pub fn new(row: char, number: u32) -> Result<Self, SeatIdError> {
        if !row.is_ascii_uppercase() || number == 0 {
            return Err(SeatIdError::Malformed(format!("{row}{number}")));
        }
        Ok(Self { row, number })
    }

    /// The row letter
    #[must_use]
    pub const fn row(&self) -> char {
        self.row
    }

    /// The seat number within the row
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }
}

impl FromStr for SeatId {
    type Err = SeatIdError;

    /// Parses `<ROW><NUMBER>`.
    ///
    /// The number must be written without sign or leading zeros so that every
    /// seat has exactly one textual identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SeatIdError::Malformed(s.to_string());

        let mut chars = s.chars();
        let row = chars.next().ok_or_else(malformed)?;
        if !row.is_ascii_uppercase() {
            return Err(malformed());
        }

        let digits = chars.as_str();
        let canonical = !digits.is_empty()
            && !digits.starts_with('0')
            && digits.bytes().all(|b| b.is_ascii_digit());
        if !canonical {
            return Err(malformed());
        }

        let number = digits.parse::<u32>().map_err(|_| malformed())?;
        Ok(Self { row, number })
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

impl Serialize for SeatId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Join identifiers for display, e.g. `A1, A2`.
#[must_use]
pub fn join_seat_ids(ids: &[SeatId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Seats and rows
// ============================================================================

/// Price tier of a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatCategory {
    /// Regular seating
    #[serde(alias = "regular")]
    Standard,
    /// Premium seating
    Premium,
    /// VIP seating
    Vip,
}

impl SeatCategory {
    /// All categories, cheapest tier first
    pub const ALL: [Self; 3] = [Self::Standard, Self::Premium, Self::Vip];

    /// Wire name of the category
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Vip => "vip",
        }
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single seat within a row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Seat number, unique within its row
    pub number: u32,
    /// Price tier
    #[serde(rename = "type")]
    pub category: SeatCategory,
    /// Whether the seat can currently be selected
    pub available: bool,
    /// Wheelchair-accessible space
    #[serde(rename = "isWheelchair", default)]
    pub accessible: bool,
}

impl Seat {
    /// An available, non-accessible seat
    #[must_use]
    pub const fn new(number: u32, category: SeatCategory) -> Self {
        Self {
            number,
            category,
            available: true,
            accessible: false,
        }
    }
}

/// A lettered row of seats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Row letter
    #[serde(rename = "row")]
    pub label: char,
    /// Seats in display order
    pub seats: Vec<Seat>,
}

impl Row {
    /// Creates a new row
    #[must_use]
    pub const fn new(label: char, seats: Vec<Seat>) -> Self {
        Self { label, seats }
    }
}

// ============================================================================
// Seat map
// ============================================================================

/// Ordered rows of seats for one screening.
///
/// Construction checks that every `(row, number)` pair is unique, so an
/// identifier resolves to at most one seat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Row>", into = "Vec<Row>")]
pub struct SeatMap {
    rows: Vec<Row>,
}

impl SeatMap {
    /// Build a seat map from rows.
    ///
    /// # Errors
    ///
    /// Returns a [`SeatMapError`] if a row label is not an uppercase letter,
    /// a row label or seat number repeats, or a seat is numbered zero.
    pub fn new(rows: Vec<Row>) -> Result<Self, SeatMapError> {
        let mut labels = HashSet::new();
        for row in &rows {
            if !row.label.is_ascii_uppercase() {
                return Err(SeatMapError::InvalidRowLabel(row.label));
            }
            if !labels.insert(row.label) {
                return Err(SeatMapError::DuplicateRow(row.label));
            }

            let mut numbers = HashSet::new();
            for seat in &row.seats {
                if seat.number == 0 {
                    return Err(SeatMapError::ZeroSeatNumber { row: row.label });
                }
                if !numbers.insert(seat.number) {
                    return Err(SeatMapError::DuplicateSeat(SeatId {
                        row: row.label,
                        number: seat.number,
                    }));
                }
            }
        }

        Ok(Self { rows })
    }

    /// Rows in display order
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Look up a seat by identifier.
    #[must_use]
    pub fn seat(&self, id: &SeatId) -> Option<&Seat> {
        self.rows
            .iter()
            .find(|row| row.label == id.row)?
            .seats
            .iter()
            .find(|seat| seat.number == id.number)
    }

    /// Resolve a textual identifier to its seat.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the identifier is malformed, its
    /// row is absent, or the row has no seat with that number.
    pub fn resolve(&self, identifier: &str) -> Result<&Seat, ResolveError> {
        identifier
            .parse::<SeatId>()
            .ok()
            .and_then(|id| self.seat(&id))
            .ok_or_else(|| ResolveError::NotFound(identifier.to_string()))
    }

    /// Every seat with its identifier, row by row.
    pub fn seats(&self) -> impl Iterator<Item = (SeatId, &Seat)> + '_ {
        self.rows.iter().flat_map(|row| {
            row.seats.iter().map(move |seat| {
                (
                    SeatId {
                        row: row.label,
                        number: seat.number,
                    },
                    seat,
                )
            })
        })
    }

    /// Number of seats currently available
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.seats().filter(|(_, seat)| seat.available).count()
    }

    /// Mark seats as taken. Unknown identifiers are ignored.
    ///
    /// Returns how many seats changed from available to unavailable.
    pub fn mark_unavailable<'a>(&mut self, ids: impl IntoIterator<Item = &'a SeatId>) -> usize {
        let mut changed = 0;
        for id in ids {
            let seat = self
                .rows
                .iter_mut()
                .find(|row| row.label == id.row)
                .and_then(|row| row.seats.iter_mut().find(|seat| seat.number == id.number));
            if let Some(seat) = seat {
                if seat.available {
                    seat.available = false;
                    changed += 1;
                }
            }
        }
        changed
    }
}

impl TryFrom<Vec<Row>> for SeatMap {
    type Error = SeatMapError;

    fn try_from(rows: Vec<Row>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<SeatMap> for Vec<Row> {
    fn from(map: SeatMap) -> Self {
        map.rows
    }
}

/// Seat availability for a screening, as reported by the availability service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Layout with per-seat availability
    pub seat_map: SeatMap,
    /// Seats already booked for this screening
    #[serde(default)]
    pub booked_seats: Vec<SeatId>,
}

impl Availability {
    /// Seat map with every booked seat marked unavailable.
    #[must_use]
    pub fn into_seat_map(self) -> SeatMap {
        let mut map = self.seat_map;
        map.mark_unavailable(&self.booked_seats);
        map
    }
}
