//! Order submission and per-bar matching.

use super::config::LimitOrderExecMode;
use super::core::Engine;
use super::results::EngineError;
use crate::events::{EventPayload, FillEvent, OrderQueuedEvent, QueuedOrderKind};
use crate::order::Order;
use crate::position::{blend_fill, square_off_pnl};
use crate::types::{Lot, Price, Qty, Quote, Side};
use chrono::{Duration, TimeZone};
use rust_decimal::Decimal;

impl<Tz: TimeZone> Engine<Tz> {
    /// Queues a market or limit order. Position-target orders are not
    /// accepted here; they go through [`place_order_position_aware`].
    ///
    /// [`place_order_position_aware`]: Engine::place_order_position_aware
    pub fn place_order(&mut self, order: Order<Tz>) -> Result<(), EngineError> {
        match order {
            Order::Market(order) => {
                let queued = OrderQueuedEvent {
                    kind: QueuedOrderKind::Market,
                    side: order.side,
                    lot: order.lot.get(),
                    price: None,
                };
                let timestamp = order.timestamp.clone();
                self.pending_market.push(order);
                self.emit_event(timestamp, EventPayload::OrderQueued(queued));
                Ok(())
            }
            Order::Limit(order) => {
                let queued = OrderQueuedEvent {
                    kind: QueuedOrderKind::Limit,
                    side: order.side,
                    lot: order.lot.get(),
                    price: Some(order.price),
                };
                let timestamp = order.timestamp.clone();
                self.pending_limit.push(order);
                self.emit_event(timestamp, EventPayload::OrderQueued(queued));
                Ok(())
            }
            Order::PositionTarget(_) => Err(EngineError::InvalidOrderKind),
        }
    }

    /// Translates a position-target order into a sized market order.
    ///
    /// The delta is measured against the position one second before the
    /// order's timestamp, so the read can never process the order's own
    /// bar. A zero delta is a no-op.
    pub fn place_order_position_aware(&mut self, order: Order<Tz>) -> Result<(), EngineError> {
        let target = match order {
            Order::PositionTarget(target) => target,
            _ => return Err(EngineError::WrongOrderKindForPositionAware),
        };

        let read_at = target.timestamp.clone() - Duration::seconds(1);
        let current = self.get_position(&read_at);

        let delta = target.target_position - current.value();
        if delta == 0 {
            return Ok(());
        }

        let side = if delta > 0 { Side::Buy } else { Side::Sell };
        let lot = Lot::new_unchecked(delta.unsigned_abs());
        self.place_order(Order::market(target.timestamp, side, lot))
    }

    // step 2 of bar processing: pending limit orders against the range
    // spanned by the previous and current closes. an order not yet
    // effective or outside the range is re-queued unchanged.
    pub(super) fn match_limit_orders(&mut self, index: usize) {
        if self.pending_limit.is_empty() {
            return;
        }

        let bar_ts = self.series.timestamp(index).clone();
        let prev_close = self.series.row(index - 1).close;
        let curr_close = self.series.row(index).close;
        let lo = prev_close.min(curr_close);
        let hi = prev_close.max(curr_close);

        let pending = std::mem::take(&mut self.pending_limit);
        for order in pending {
            let not_yet_effective = order.timestamp > bar_ts;
            let out_of_range = match order.side {
                Side::Buy => order.price < lo,
                Side::Sell => order.price > hi,
            };
            if not_yet_effective || out_of_range {
                self.pending_limit.push(order);
                continue;
            }

            // eligibility always uses [lo, hi]; only the executed price
            // differs by mode
            let fill_price = match self.config.exec_mode {
                LimitOrderExecMode::GivenPrice => order.price,
                LimitOrderExecMode::WorstCase => match order.side {
                    Side::Buy => hi,
                    Side::Sell => lo,
                },
            };
            let qty = Qty::from_side(order.side, order.lot);
            self.apply_fill(index, qty, fill_price);
        }
    }

    // step 3: pending market orders fill unconditionally at the close once
    // their timestamp is reached.
    pub(super) fn match_market_orders(&mut self, index: usize) {
        if self.pending_market.is_empty() {
            return;
        }

        let bar_ts = self.series.timestamp(index).clone();
        let close = self.series.row(index).close;

        let pending = std::mem::take(&mut self.pending_market);
        for order in pending {
            if order.timestamp > bar_ts {
                self.pending_market.push(order);
                continue;
            }
            let qty = Qty::from_side(order.side, order.lot);
            self.apply_fill(index, qty, close);
        }
    }

    // one fill against the current bar: ledger blend, square-off
    // realization, cost and slippage accrual.
    fn apply_fill(&mut self, index: usize, fill_qty: Qty, fill_price: Price) {
        let charged = Decimal::from(fill_qty.abs());
        let cost = Quote::new(self.config.trade_cost * charged);
        let slippage = Quote::new(self.config.slippage * charged);

        let row = self.series.row_mut(index);
        let effect = blend_fill(row.position_price, row.position, fill_price, fill_qty);
        let squared_off = effect.squared_off.is_some();

        if let Some(closed) = effect.squared_off {
            let realized = square_off_pnl(row.position_price, fill_price, closed);
            row.m2m = row.m2m.add(realized);
            row.m2m_cont = row.m2m_cont.add(realized);
            row.m2m_cont_net = row.m2m_cont_net.add(realized);
        }

        row.position_price = effect.avg_price;
        row.position = row.position.add(fill_qty);
        row.exec = row.exec.add(fill_qty);
        row.cost = row.cost.add(cost);
        row.slippage = row.slippage.add(slippage);
        row.m2m_cont_net = row.m2m_cont_net.sub(cost.add(slippage));

        let bar_ts = row.timestamp.clone();
        self.emit_event(
            bar_ts,
            EventPayload::Fill(FillEvent {
                qty: fill_qty,
                price: fill_price,
                cost,
                slippage,
                squared_off,
            }),
        );
    }
}
