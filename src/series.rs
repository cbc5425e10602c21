// 4.0: the augmented bar series. fixed schema, typed named fields, mutated in
// place by the engine as the cursor walks forward. one BarRow per input bar.
//
// input contract (assumed, not validated): strictly increasing timezone-aware
// timestamps, no duplicates, at least a closing price per bar. gaps are fine,
// missing bars are simply never visited.

use crate::types::{Price, Qty, Quote};
use chrono::{DateTime, TimeZone};

/// One row of the input series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar<Tz: TimeZone> {
    pub timestamp: DateTime<Tz>,
    pub close: Price,
}

impl<Tz: TimeZone> Bar<Tz> {
    pub fn new(timestamp: DateTime<Tz>, close: Price) -> Self {
        Self { timestamp, close }
    }
}

/// An input bar plus every engine-computed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarRow<Tz: TimeZone> {
    pub timestamp: DateTime<Tz>,
    pub close: Price,
    /// Net quantity executed on this bar.
    pub exec: Qty,
    /// Running position after this bar.
    pub position: Qty,
    /// Weighted average entry price of the open side; zero while flat.
    pub position_price: Price,
    /// P&L realized on this bar (square-offs and settlement).
    pub m2m: Quote,
    /// Running continuous mark-to-market.
    pub m2m_cont: Quote,
    /// Trade cost accrued on this bar.
    pub cost: Quote,
    /// Slippage accrued on this bar.
    pub slippage: Quote,
    /// Running continuous mark-to-market net of cost and slippage.
    pub m2m_cont_net: Quote,
}

impl<Tz: TimeZone> BarRow<Tz> {
    fn from_bar(bar: Bar<Tz>) -> Self {
        Self {
            timestamp: bar.timestamp,
            close: bar.close,
            exec: Qty::zero(),
            position: Qty::zero(),
            position_price: Price::ZERO,
            m2m: Quote::zero(),
            m2m_cont: Quote::zero(),
            cost: Quote::zero(),
            slippage: Quote::zero(),
            m2m_cont_net: Quote::zero(),
        }
    }
}

/// The full series with its computed columns.
#[derive(Debug, Clone)]
pub struct AugmentedSeries<Tz: TimeZone> {
    rows: Vec<BarRow<Tz>>,
}

impl<Tz: TimeZone> AugmentedSeries<Tz> {
    pub fn from_bars(bars: Vec<Bar<Tz>>) -> Self {
        Self {
            rows: bars.into_iter().map(BarRow::from_bar).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &BarRow<Tz> {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[BarRow<Tz>] {
        &self.rows
    }

    pub fn timestamp(&self, index: usize) -> &DateTime<Tz> {
        &self.rows[index].timestamp
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> &mut BarRow<Tz> {
        &mut self.rows[index]
    }

    /// Step 1 of bar processing: the position and its reference price roll
    /// forward from the previous bar before any order is matched.
    pub(crate) fn carry_position_forward(&mut self, index: usize) {
        debug_assert!(index >= 1);
        let position = self.rows[index - 1].position;
        let position_price = self.rows[index - 1].position_price;
        let row = &mut self.rows[index];
        row.position = position;
        row.position_price = position_price;
    }
}
