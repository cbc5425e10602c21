// 6.0: every state change produces an event. the trail is the engine's only
// observability surface: queued orders, fills, and daily settlements land
// here in execution order, bounded by EngineConfig::max_events.

use crate::types::{Price, Qty, Quote, Side};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<Tz: TimeZone> {
    pub id: EventId,
    /// For order events, the order's effective timestamp; for fills and
    /// settlements, the timestamp of the bar that produced them.
    pub timestamp: DateTime<Tz>,
    pub payload: EventPayload,
}

impl<Tz: TimeZone> Event<Tz> {
    pub fn new(id: EventId, timestamp: DateTime<Tz>, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    OrderQueued(OrderQueuedEvent),
    Fill(FillEvent),
    DailySettlement(SettlementEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueuedOrderKind {
    Market,
    Limit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueuedEvent {
    pub kind: QueuedOrderKind,
    pub side: Side,
    pub lot: u64,
    /// Limit price; `None` for market orders.
    pub price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    pub qty: Qty,
    pub price: Price,
    pub cost: Quote,
    pub slippage: Quote,
    pub squared_off: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEvent {
    pub position: Qty,
    pub settle_price: Price,
    pub realized: Quote,
}
