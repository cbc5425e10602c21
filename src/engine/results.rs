// 7.2: error types for engine operations. all of these are caller
// programming errors; the engine performs no I/O and has nothing to retry.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("order kind not accepted by place_order; position-target orders go through place_order_position_aware")]
    InvalidOrderKind,

    #[error("place_order_position_aware accepts only position-target orders")]
    WrongOrderKindForPositionAware,

    #[error("price series must contain at least one bar")]
    EmptySeries,
}
