//! The per-bar settlement step.

use super::core::Engine;
use crate::events::{EventPayload, SettlementEvent};
use crate::position::settlement_pnl;
use chrono::TimeZone;

impl<Tz: TimeZone> Engine<Tz> {
    // step 4 of bar processing. the schedule is seeded from the first
    // processed bar's calendar date; bookkeeping only happens while a
    // position is open.
    //
    // two accounting rules are deliberate and pinned by tests: the running
    // accumulators are not carried into a settlement bar (they restart
    // from that day's realization), and they are not carried while flat.
    pub(super) fn settle_bar(&mut self, index: usize) {
        let bar_ts = self.series.timestamp(index).clone();

        let next = match &self.next_settlement {
            Some(next) => next.clone(),
            None => {
                let seeded = self.clock.on_bar_date(&bar_ts);
                self.next_settlement = Some(seeded.clone());
                seeded
            }
        };

        if self.series.row(index).position.is_zero() {
            return;
        }

        if bar_ts >= next {
            self.next_settlement = Some(self.clock.on_next_date(&bar_ts));

            let row = self.series.row_mut(index);
            let settle_price = row.close;
            let realized = settlement_pnl(row.position, row.position_price, settle_price);
            row.position_price = settle_price;
            row.m2m = row.m2m.add(realized);
            row.m2m_cont = row.m2m_cont.add(realized);
            row.m2m_cont_net = row.m2m_cont_net.add(realized);
            let position = row.position;

            self.emit_event(
                bar_ts,
                EventPayload::DailySettlement(SettlementEvent {
                    position,
                    settle_price,
                    realized,
                }),
            );
        } else if index > 1 {
            let prev_cont = self.series.row(index - 1).m2m_cont;
            let prev_net = self.series.row(index - 1).m2m_cont_net;
            let row = self.series.row_mut(index);
            row.m2m_cont = row.m2m_cont.add(prev_cont);
            row.m2m_cont_net = row.m2m_cont_net.add(prev_net);
        }
    }
}
