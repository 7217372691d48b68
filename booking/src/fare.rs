//! Fare calculation: category prices and selection totals.

use crate::seat_map::{SeatCategory, SeatId, SeatMap};
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Price charged for a category missing from the table.
pub const DEFAULT_SEAT_PRICE: Money = Money::from_dollars(12);

/// Pricing failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FareError {
    /// A selected seat does not exist in the seat map
    #[error("seat {0} does not exist in this screening")]
    InvalidSeat(SeatId),

    /// The total does not fit in a `Money` value
    #[error("total price overflows")]
    Overflow,
}

/// Price per seat category for one movie.
///
/// Lookups never fail: a category absent from the table costs the fallback
/// price ([`DEFAULT_SEAT_PRICE`] unless configured otherwise).
///
/// On the wire this is an object keyed by category name. `regular` is read as
/// `standard` and unknown categories are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Money>", into = "BTreeMap<SeatCategory, Money>")]
pub struct PriceTable {
    prices: HashMap<SeatCategory, Money>,
    fallback: Money,
}

impl PriceTable {
    /// An empty table: every category costs the fallback price
    #[must_use]
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            fallback: DEFAULT_SEAT_PRICE,
        }
    }

    /// Set the price of a category
    #[must_use]
    pub fn with_price(mut self, category: SeatCategory, price: Money) -> Self {
        self.prices.insert(category, price);
        self
    }

    /// Replace the price used for categories absent from the table
    #[must_use]
    pub const fn with_fallback(mut self, fallback: Money) -> Self {
        self.fallback = fallback;
        self
    }

    /// Price of one seat of `category`
    #[must_use]
    pub fn price_of(&self, category: SeatCategory) -> Money {
        self.prices.get(&category).copied().unwrap_or(self.fallback)
    }

    /// Price used for categories absent from the table
    #[must_use]
    pub const fn fallback(&self) -> Money {
        self.fallback
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<String, Money>> for PriceTable {
    fn from(raw: BTreeMap<String, Money>) -> Self {
        let mut table = Self::new();
        // `standard` wins over its `regular` alias when both are present
        for key in ["regular", "standard", "premium", "vip"] {
            let Some(price) = raw.get(key) else {
                continue;
            };
            let category = match key {
                "premium" => SeatCategory::Premium,
                "vip" => SeatCategory::Vip,
                _ => SeatCategory::Standard,
            };
            table.prices.insert(category, *price);
        }
        table
    }
}

impl From<PriceTable> for BTreeMap<SeatCategory, Money> {
    fn from(table: PriceTable) -> Self {
        table.prices.into_iter().collect()
    }
}

/// Price of one seat of `category` under `prices`.
#[must_use]
pub fn price_of(prices: &PriceTable, category: SeatCategory) -> Money {
    prices.price_of(category)
}

/// Sum the price of every selected seat.
///
/// # Errors
///
/// - [`FareError::InvalidSeat`] for the first seat that does not exist in
///   `seat_map`; unknown seats are never skipped
/// - [`FareError::Overflow`] if the sum does not fit
pub fn total_price<'a>(
    seat_map: &SeatMap,
    prices: &PriceTable,
    seats: impl IntoIterator<Item = &'a SeatId>,
) -> Result<Money, FareError> {
    seats.into_iter().try_fold(Money::ZERO, |total, id| {
        let seat = seat_map.seat(id).ok_or(FareError::InvalidSeat(*id))?;
        total
            .checked_add(prices.price_of(seat.category))
            .ok_or(FareError::Overflow)
    })
}
