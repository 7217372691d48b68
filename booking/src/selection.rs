//! Seat selection and its validation.

use crate::seat_map::{SeatId, SeatMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default upper bound on seats per booking.
pub const DEFAULT_MAX_SEATS: usize = 6;

/// Why a selection cannot be booked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionRejected {
    /// No seats selected
    #[error("select at least one seat")]
    Empty,

    /// More seats than a single booking allows
    #[error("{selected} seats selected, at most {max} allowed")]
    TooMany {
        /// Seats in the selection
        selected: usize,
        /// Configured maximum
        max: usize,
    },

    /// The seat is taken or does not exist
    #[error("seat {0} is not available")]
    Unavailable(SeatId),
}

/// Seats a customer is trying to book, in the order they were picked.
///
/// Never contains the same seat twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeatId>", into = "Vec<SeatId>")]
pub struct Selection {
    seats: Vec<SeatId>,
}

impl Selection {
    /// An empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self { seats: Vec::new() }
    }

    /// Add a seat. Returns `false` if it was already selected.
    pub fn insert(&mut self, id: SeatId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.seats.push(id);
        true
    }

    /// Remove a seat. Returns `false` if it was not selected.
    pub fn remove(&mut self, id: &SeatId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| s != id);
        self.seats.len() != before
    }

    /// Click on a seat: deselect it if selected, otherwise select it.
    ///
    /// Returns whether the seat is selected afterwards.
    ///
    /// # Errors
    ///
    /// Selecting is refused with [`SelectionRejected::Unavailable`] if the
    /// seat is taken or unknown, and with [`SelectionRejected::TooMany`] if
    /// the selection already holds `max_seats` seats. Deselecting never fails.
    pub fn toggle(
        &mut self,
        seat_map: &SeatMap,
        id: SeatId,
        max_seats: usize,
    ) -> Result<bool, SelectionRejected> {
        if self.remove(&id) {
            return Ok(false);
        }

        if !seat_map.seat(&id).is_some_and(|seat| seat.available) {
            return Err(SelectionRejected::Unavailable(id));
        }
        if self.seats.len() >= max_seats {
            return Err(SelectionRejected::TooMany {
                selected: self.seats.len() + 1,
                max: max_seats,
            });
        }

        self.seats.push(id);
        Ok(true)
    }

    /// Whether the seat is selected
    #[must_use]
    pub fn contains(&self, id: &SeatId) -> bool {
        self.seats.contains(id)
    }

    /// Number of selected seats
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Selected seats in pick order
    pub fn iter(&self) -> std::slice::Iter<'_, SeatId> {
        self.seats.iter()
    }

    /// Selected seats in pick order
    #[must_use]
    pub fn as_slice(&self) -> &[SeatId] {
        &self.seats
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SeatId;
    type IntoIter = std::slice::Iter<'a, SeatId>;

    fn into_iter(self) -> Self::IntoIter {
        self.seats.iter()
    }
}

impl FromIterator<SeatId> for Selection {
    /// Later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = SeatId>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

impl TryFrom<Vec<SeatId>> for Selection {
    type Error = DuplicateSeat;

    fn try_from(seats: Vec<SeatId>) -> Result<Self, Self::Error> {
        let mut selection = Self::new();
        for id in seats {
            if !selection.insert(id) {
                return Err(DuplicateSeat(id));
            }
        }
        Ok(selection)
    }
}

impl From<Selection> for Vec<SeatId> {
    fn from(selection: Selection) -> Self {
        selection.seats
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::seat_map::join_seat_ids(&self.seats))
    }
}

/// A serialized selection listed the same seat twice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("seat {0} selected twice")]
pub struct DuplicateSeat(pub SeatId);

/// Check that a selection can be submitted.
///
/// Checks run in order and the first failure wins: empty, more than
/// `max_seats`, then the first seat (in pick order) that is unavailable or
/// missing from `seat_map`.
///
/// # Errors
///
/// Returns the [`SelectionRejected`] reason of the first failing check.
pub fn validate(
    seat_map: &SeatMap,
    selection: &Selection,
    max_seats: usize,
) -> Result<(), SelectionRejected> {
    if selection.is_empty() {
        return Err(SelectionRejected::Empty);
    }

    if selection.len() > max_seats {
        return Err(SelectionRejected::TooMany {
            selected: selection.len(),
            max: max_seats,
        });
    }

    match selection
        .iter()
        .find(|id| !seat_map.seat(id).is_some_and(|seat| seat.available))
    {
        Some(id) => Err(SelectionRejected::Unavailable(*id)),
        None => Ok(()),
    }
}
