//! Engine configuration options.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a limit order's executed price is chosen once it is eligible.
/// Eligibility itself never depends on this mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LimitOrderExecMode {
    /// Fill exactly at the order's limit price.
    GivenPrice,
    /// Fill at the adverse extreme of the two closes spanning the bar: a
    /// buy at the higher close, a sell at the lower. Models the limit
    /// touching its trigger without assuming a better intrabar fill.
    #[default]
    WorstCase,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wall-clock time of the daily settlement, in the series' timezone.
    pub settlement_time: NaiveTime,
    /// Currency charged per unit lot traded.
    pub trade_cost: Decimal,
    /// Currency of slippage assumed per unit lot traded.
    pub slippage: Decimal,
    pub exec_mode: LimitOrderExecMode,
    /// Maximum number of audit events to retain in memory.
    pub max_events: usize,
}

impl EngineConfig {
    /// Builds a config from a `"HH:MM:SS"` settlement time string.
    pub fn new(
        settlement_time: &str,
        trade_cost: Decimal,
        slippage: Decimal,
    ) -> Result<Self, ConfigError> {
        let time = NaiveTime::parse_from_str(settlement_time, "%H:%M:%S")
            .map_err(|_| ConfigError::InvalidSettlementTime(settlement_time.to_string()))?;
        Ok(Self {
            settlement_time: time,
            trade_cost,
            slippage,
            exec_mode: LimitOrderExecMode::default(),
            max_events: 100_000,
        })
    }

    pub fn with_exec_mode(mut self, exec_mode: LimitOrderExecMode) -> Self {
        self.exec_mode = exec_mode;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid settlement time '{0}', expected HH:MM:SS")]
    InvalidSettlementTime(String),
}
