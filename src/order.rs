//! Order types.
//!
//! A closed sum type over the three ways a caller can express intent:
//! market (fill at the next eligible close), limit (fill only when the
//! price range between two consecutive closes reaches the limit), and
//! position-target (a desired absolute position, translated by the engine
//! into a sized market order). The enum is matched exhaustively at
//! submission time, so an unsupported variant is a compile-time
//! impossibility everywhere except the two entry points that reject it.

use crate::types::{Lot, Price, Side};
use chrono::{DateTime, TimeZone};

/// Fills unconditionally at the close of the first bar whose timestamp is
/// not before `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOrder<Tz: TimeZone> {
    pub timestamp: DateTime<Tz>,
    pub side: Side,
    pub lot: Lot,
}

/// Fills only when `price` falls inside the range spanned by two
/// consecutive closes. The executed price depends on the engine's
/// `LimitOrderExecMode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrder<Tz: TimeZone> {
    pub timestamp: DateTime<Tz>,
    pub side: Side,
    pub lot: Lot,
    pub price: Price,
}

/// A desired absolute position rather than a quantity delta. Never
/// executed directly: the engine sizes a market order from the difference
/// against the position one second before `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionTargetOrder<Tz: TimeZone> {
    pub timestamp: DateTime<Tz>,
    pub target_position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order<Tz: TimeZone> {
    Market(MarketOrder<Tz>),
    Limit(LimitOrder<Tz>),
    PositionTarget(PositionTargetOrder<Tz>),
}

impl<Tz: TimeZone> Order<Tz> {
    pub fn market(timestamp: DateTime<Tz>, side: Side, lot: Lot) -> Self {
        Order::Market(MarketOrder {
            timestamp,
            side,
            lot,
        })
    }

    pub fn limit(timestamp: DateTime<Tz>, side: Side, lot: Lot, price: Price) -> Self {
        Order::Limit(LimitOrder {
            timestamp,
            side,
            lot,
            price,
        })
    }

    pub fn position_target(timestamp: DateTime<Tz>, target_position: i64) -> Self {
        Order::PositionTarget(PositionTargetOrder {
            timestamp,
            target_position,
        })
    }

    /// The timestamp at which the order becomes effective.
    pub fn timestamp(&self) -> &DateTime<Tz> {
        match self {
            Order::Market(o) => &o.timestamp,
            Order::Limit(o) => &o.timestamp,
            Order::PositionTarget(o) => &o.timestamp,
        }
    }
}
