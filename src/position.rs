// 3.0: the averaging ledger. pure functions only, no engine state.
// a position is a signed quantity plus the weighted average entry price of the
// currently open side. the reference price is meaningless (held at zero) while flat.
// 3.1 has the blend/square-off logic, 3.2 the realized-pnl helpers.

use crate::types::{Price, Qty, Quote};
use rust_decimal::Decimal;

/// Outcome of applying one signed fill to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillEffect {
    /// Reference price after the fill.
    pub avg_price: Price,
    /// Signed quantity closed by this fill, when the fill opposed the open
    /// side. `None` means the fill opened or extended the position.
    pub squared_off: Option<Qty>,
}

// 3.1: weighted-average blending with square-off detection.
//
// same-side fills extend the position and re-average the reference price.
// opposite-side fills realize pnl on the overlapped quantity:
//   - exact offset: flat, reference resets to zero
//   - smaller than open: partial close, reference unchanged
//   - larger than open: flip, reference jumps to the fill price
pub fn blend_fill(prev_price: Price, prev_pos: Qty, fill_price: Price, fill_qty: Qty) -> FillEffect {
    let prev = prev_pos.value();
    let fill = fill_qty.value();

    if prev == 0 {
        return FillEffect {
            avg_price: fill_price,
            squared_off: None,
        };
    }

    let same_side = (prev < 0 && fill < 0) || (prev >= 0 && fill >= 0);
    if same_side {
        let weighted = Decimal::from(prev) * prev_price.value()
            + Decimal::from(fill) * fill_price.value();
        let avg = weighted / Decimal::from(prev + fill);
        return FillEffect {
            avg_price: Price::new(avg),
            squared_off: None,
        };
    }

    let closed = squared_off_qty(prev_pos, fill_qty);
    let avg_price = if prev + fill == 0 {
        Price::ZERO
    } else if prev.abs() > fill.abs() {
        prev_price
    } else {
        fill_price
    };

    FillEffect {
        avg_price,
        squared_off: Some(closed),
    }
}

// 3.2: the quantity a square-off closes: the overlap between the open side
// and the incoming fill, carrying the fill's sign.
pub fn squared_off_qty(prev_pos: Qty, fill_qty: Qty) -> Qty {
    let sign = if fill_qty.value() >= 0 { 1 } else { -1 };
    Qty::new(sign * prev_pos.abs().min(fill_qty.abs()))
}

/// P&L crystallized on the closed portion of a square-off, measured before
/// the new reference price takes effect: `-(fill - reference) * closed`.
pub fn square_off_pnl(prev_price: Price, fill_price: Price, closed: Qty) -> Quote {
    let pnl = (fill_price.value() - prev_price.value()) * Decimal::from(closed.value());
    Quote::new(-pnl)
}

/// Full-day mark-to-market realized at settlement:
/// `(settle - reference) * position`.
pub fn settlement_pnl(position: Qty, reference: Price, settle: Price) -> Quote {
    let pnl = (settle.value() - reference.value()) * Decimal::from(position.value());
    Quote::new(pnl)
}
