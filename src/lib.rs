// backtest-core: futures backtest position/P&L engine.
// accounting-first architecture: fill matching, weighted-average bookkeeping,
// and daily settlement take priority. all computation is deterministic with
// no external I/O; data acquisition and continuous-series construction are
// external collaborators.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Side, Lot, Qty, Price, Quote
//   2.x  order.rs: order sum type: market, limit, position-target
//   3.x  position.rs: averaging ledger: blend, square-off, realized pnl
//   4.x  series.rs: fixed-schema augmented bar series
//   5.x  settlement.rs: daily settlement clock, timezone composition
//   6.x  events.rs: state transition events for audit
//   7.x  engine/: cursor/advancer, matching, settle step, query surface

pub mod engine;
pub mod events;
pub mod order;
pub mod position;
pub mod series;
pub mod settlement;
pub mod types;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use order::*;
pub use position::*;
pub use series::*;
pub use settlement::*;
pub use types::*;
