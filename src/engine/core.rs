// 7.1 engine/core.rs: the simulator. owns the only mutable state: augmented
// series, cursor, pending queues, settlement schedule, audit trail.

use super::config::EngineConfig;
use super::results::EngineError;
use crate::events::{Event, EventId, EventPayload};
use crate::order::{LimitOrder, MarketOrder};
use crate::series::{AugmentedSeries, Bar, BarRow};
use crate::settlement::SettlementClock;
use crate::types::{Qty, Quote};
use chrono::{DateTime, TimeZone};

/** 7.1.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine<Tz: TimeZone> {
    pub(super) config: EngineConfig,
    pub(super) series: AugmentedSeries<Tz>,
    /// Index of the next bar to process. Starts at 1: bar 0 can never
    /// receive a fill because no prior bar exists to form a price range.
    pub(super) cursor: usize,
    pub(super) pending_limit: Vec<LimitOrder<Tz>>,
    pub(super) pending_market: Vec<MarketOrder<Tz>>,
    pub(super) clock: SettlementClock,
    pub(super) next_settlement: Option<DateTime<Tz>>,
    pub(super) events: Vec<Event<Tz>>,
    pub(super) next_event_id: u64,
}

impl<Tz: TimeZone> Engine<Tz> {
    pub fn new(bars: Vec<Bar<Tz>>, config: EngineConfig) -> Result<Self, EngineError> {
        if bars.is_empty() {
            return Err(EngineError::EmptySeries);
        }
        let clock = SettlementClock::new(config.settlement_time);
        Ok(Self {
            config,
            series: AugmentedSeries::from_bars(bars),
            cursor: 1,
            pending_limit: Vec::new(),
            pending_market: Vec::new(),
            clock,
            next_settlement: None,
            events: Vec::new(),
            next_event_id: 1,
        })
    }

    /// Processes bars in order while their timestamps are within `target`.
    ///
    /// A `target` earlier than the bar already reached is a no-op: the
    /// cursor never rewinds, and queries keep returning the last computed
    /// values. Callers are expected to query with non-decreasing
    /// timestamps.
    pub fn advance(&mut self, target: &DateTime<Tz>) {
        while self.cursor < self.series.len() && self.series.timestamp(self.cursor) <= target {
            let index = self.cursor;
            self.series.carry_position_forward(index);
            self.match_limit_orders(index);
            self.match_market_orders(index);
            self.settle_bar(index);
            self.cursor += 1;
        }
    }

    /// Advances to the final bar of the series.
    pub fn complete(&mut self) {
        let last = self.series.timestamp(self.series.len() - 1).clone();
        self.advance(&last);
    }

    /// Position after the last bar within `timestamp`.
    pub fn get_position(&mut self, timestamp: &DateTime<Tz>) -> Qty {
        self.advance(timestamp);
        self.last_processed().position
    }

    /// Running continuous mark-to-market after the last bar within
    /// `timestamp`.
    pub fn get_mark_to_market(&mut self, timestamp: &DateTime<Tz>) -> Quote {
        self.advance(timestamp);
        self.last_processed().m2m_cont
    }

    /// Running continuous mark-to-market net of cost and slippage after
    /// the last bar within `timestamp`.
    pub fn get_mark_to_market_net_of_costs(&mut self, timestamp: &DateTime<Tz>) -> Quote {
        self.advance(timestamp);
        self.last_processed().m2m_cont_net
    }

    /// The full augmented series, as computed so far. Read-only: no bars
    /// are processed by this call; run `complete()` first for a full run.
    pub fn export_table(&self) -> &[BarRow<Tz>] {
        self.series.rows()
    }

    /// Number of bars processed so far.
    pub fn bars_processed(&self) -> usize {
        self.cursor - 1
    }

    pub fn pending_limit_orders(&self) -> &[LimitOrder<Tz>] {
        &self.pending_limit
    }

    pub fn pending_market_orders(&self) -> &[MarketOrder<Tz>] {
        &self.pending_market
    }

    pub fn events(&self) -> &[Event<Tz>] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event<Tz>] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    // row the queries read: the last processed bar, or row 0 before any
    // bar has been processed
    fn last_processed(&self) -> &BarRow<Tz> {
        self.series.row(self.cursor - 1)
    }

    pub(super) fn emit_event(&mut self, timestamp: DateTime<Tz>, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), timestamp, payload);
        self.next_event_id += 1;
        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
