//! End-to-end engine scenarios: submission, matching, averaging, queries.

use backtest_core::*;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, min, 0).unwrap()
}

fn bars(rows: &[(DateTime<Utc>, Decimal)]) -> Vec<Bar<Utc>> {
    rows.iter()
        .map(|(ts, close)| Bar::new(*ts, Price::new(*close)))
        .collect()
}

// settlement late in the day so intraday scenarios never cross it
fn frictionless() -> EngineConfig {
    EngineConfig::new("23:00:00", dec!(0), dec!(0)).unwrap()
}

fn lot(n: u64) -> Lot {
    Lot::new(n).unwrap()
}

#[test]
fn empty_series_is_rejected() {
    let result = Engine::<Utc>::new(Vec::new(), frictionless());
    assert!(matches!(result, Err(EngineError::EmptySeries)));
}

#[test]
fn market_order_fills_at_close() {
    // closes [100, 105, 95]; buy 1 at the second bar
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(105)),
        (at(1, 12, 0), dec!(95)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
        .unwrap();

    assert_eq!(engine.get_position(&at(1, 11, 0)), Qty::new(1));
    let row = &engine.export_table()[1];
    assert_eq!(row.exec, Qty::new(1));
    assert_eq!(row.position_price, Price::new(dec!(105)));

    // next bar: no settlement crossed, running m2m unchanged, position kept
    assert_eq!(engine.get_mark_to_market(&at(1, 12, 0)), Quote::zero());
    assert_eq!(engine.get_position(&at(1, 12, 0)), Qty::new(1));
}

#[test]
fn partial_square_off_realizes_on_the_closed_portion() {
    // long 10 @ 50, then sell 4 when the close is 55
    let series = bars(&[
        (at(1, 10, 0), dec!(50)),
        (at(1, 11, 0), dec!(50)),
        (at(1, 12, 0), dec!(55)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(10)))
        .unwrap();
    engine
        .place_order(Order::market(at(1, 12, 0), Side::Sell, lot(4)))
        .unwrap();
    engine.complete();

    assert_eq!(engine.get_position(&at(1, 12, 0)), Qty::new(6));
    let row = &engine.export_table()[2];
    // reference price unchanged on a partial close
    assert_eq!(row.position_price, Price::new(dec!(50)));
    // -(55 - 50) * (-4) = 20 crystallized
    assert_eq!(row.m2m, Quote::new(dec!(20)));
    assert_eq!(engine.get_mark_to_market(&at(1, 12, 0)), Quote::new(dec!(20)));
}

#[test]
fn full_offset_flattens_and_resets_reference() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(100)),
        (at(1, 12, 0), dec!(110)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(3)))
        .unwrap();
    engine
        .place_order(Order::market(at(1, 12, 0), Side::Sell, lot(3)))
        .unwrap();
    engine.complete();

    let row = &engine.export_table()[2];
    assert!(row.position.is_zero());
    assert_eq!(row.position_price, Price::ZERO);
    // -(110 - 100) * (-3) = 30
    assert_eq!(row.m2m, Quote::new(dec!(30)));
}

#[test]
fn same_side_fills_average_the_reference_price() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(100)),
        (at(1, 12, 0), dec!(106)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
        .unwrap();
    engine
        .place_order(Order::market(at(1, 12, 0), Side::Buy, lot(2)))
        .unwrap();
    engine.complete();

    // (1*100 + 2*106) / 3 = 104
    let row = &engine.export_table()[2];
    assert_eq!(row.position, Qty::new(3));
    assert_eq!(row.position_price, Price::new(dec!(104)));
}

#[test]
fn limit_buy_at_range_high_is_eligible() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::limit(
            at(1, 11, 0),
            Side::Buy,
            lot(1),
            Price::new(dec!(105)),
        ))
        .unwrap();
    engine.complete();

    assert_eq!(engine.get_position(&at(1, 11, 0)), Qty::new(1));
    assert!(engine.pending_limit_orders().is_empty());
    // worst case: buy fills at the higher of the two closes
    assert_eq!(
        engine.export_table()[1].position_price,
        Price::new(dec!(105))
    );
}

#[test]
fn limit_buy_below_range_stays_pending() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::limit(
            at(1, 11, 0),
            Side::Buy,
            lot(1),
            Price::new(dec!(99)),
        ))
        .unwrap();
    engine.complete();

    assert!(engine.get_position(&at(1, 11, 0)).is_zero());
    assert_eq!(engine.pending_limit_orders().len(), 1);
}

#[test]
fn worst_case_sell_fills_at_range_low() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::limit(
            at(1, 11, 0),
            Side::Sell,
            lot(2),
            Price::new(dec!(102)),
        ))
        .unwrap();
    engine.complete();

    assert_eq!(engine.get_position(&at(1, 11, 0)), Qty::new(-2));
    assert_eq!(
        engine.export_table()[1].position_price,
        Price::new(dec!(100))
    );
}

#[test]
fn given_price_mode_fills_at_the_limit_price() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let config = frictionless().with_exec_mode(LimitOrderExecMode::GivenPrice);
    let mut engine = Engine::new(series, config).unwrap();

    engine
        .place_order(Order::limit(
            at(1, 11, 0),
            Side::Buy,
            lot(1),
            Price::new(dec!(103)),
        ))
        .unwrap();
    engine.complete();

    assert_eq!(
        engine.export_table()[1].position_price,
        Price::new(dec!(103))
    );
}

#[test]
fn orders_dated_in_the_future_wait_for_their_bar() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(101)),
        (at(1, 12, 0), dec!(102)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 12, 0), Side::Buy, lot(1)))
        .unwrap();

    assert!(engine.get_position(&at(1, 11, 0)).is_zero());
    assert_eq!(engine.pending_market_orders().len(), 1);
    assert_eq!(engine.get_position(&at(1, 12, 0)), Qty::new(1));
    assert!(engine.pending_market_orders().is_empty());
    // filled at its own bar's close
    assert_eq!(
        engine.export_table()[2].position_price,
        Price::new(dec!(102))
    );
}

#[test]
fn cost_and_slippage_accrue_per_lot() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let config = EngineConfig::new("23:00:00", dec!(2), dec!(1)).unwrap();
    let mut engine = Engine::new(series, config).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(2)))
        .unwrap();
    engine.complete();

    let row = &engine.export_table()[1];
    assert_eq!(row.cost, Quote::new(dec!(4)));
    assert_eq!(row.slippage, Quote::new(dec!(2)));
    assert_eq!(row.m2m_cont, Quote::zero());
    assert_eq!(
        engine.get_mark_to_market_net_of_costs(&at(1, 11, 0)),
        Quote::new(dec!(-6))
    );
}

#[test]
fn queries_are_idempotent() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(105)),
        (at(1, 12, 0), dec!(95)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();
    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
        .unwrap();

    let first = engine.get_position(&at(1, 11, 0));
    let processed = engine.bars_processed();
    let events = engine.events().len();

    let second = engine.get_position(&at(1, 11, 0));
    assert_eq!(first, second);
    assert_eq!(engine.bars_processed(), processed);
    assert_eq!(engine.events().len(), events);
}

#[test]
fn queries_never_rewind() {
    // an earlier timestamp after a later one returns the later state
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(105)),
        (at(1, 12, 0), dec!(95)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();
    engine
        .place_order(Order::market(at(1, 12, 0), Side::Buy, lot(1)))
        .unwrap();

    let late = engine.get_position(&at(1, 12, 0));
    assert_eq!(late, Qty::new(1));

    assert_eq!(engine.get_position(&at(1, 10, 0)), late);
    assert_eq!(engine.bars_processed(), 2);
}

#[test]
fn position_target_orders_size_from_the_prior_position() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(101)),
        (at(1, 12, 0), dec!(102)),
        (at(1, 13, 0), dec!(103)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order_position_aware(Order::position_target(at(1, 11, 0), 3))
        .unwrap();
    assert_eq!(engine.get_position(&at(1, 11, 0)), Qty::new(3));
    assert_eq!(
        engine.export_table()[1].position_price,
        Price::new(dec!(101))
    );

    // shrinking the target sells the difference and realizes the overlap
    engine
        .place_order_position_aware(Order::position_target(at(1, 12, 0), 1))
        .unwrap();
    assert_eq!(engine.get_position(&at(1, 12, 0)), Qty::new(1));
    // -(102 - 101) * (-2) = 2
    assert_eq!(engine.export_table()[2].m2m, Quote::new(dec!(2)));

    // a target equal to the current position queues nothing
    engine
        .place_order_position_aware(Order::position_target(at(1, 13, 0), 1))
        .unwrap();
    assert!(engine.pending_market_orders().is_empty());
    assert_eq!(engine.get_position(&at(1, 13, 0)), Qty::new(1));
}

#[test]
fn order_kind_misuse_is_rejected() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(101))]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    let err = engine
        .place_order(Order::position_target(at(1, 11, 0), 5))
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOrderKind);

    let err = engine
        .place_order_position_aware(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
        .unwrap_err();
    assert_eq!(err, EngineError::WrongOrderKindForPositionAware);

    let err = engine
        .place_order_position_aware(Order::limit(
            at(1, 11, 0),
            Side::Sell,
            lot(1),
            Price::new(dec!(99)),
        ))
        .unwrap_err();
    assert_eq!(err, EngineError::WrongOrderKindForPositionAware);
}

#[test]
fn audit_trail_records_the_lifecycle() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let mut engine = Engine::new(series, frictionless()).unwrap();

    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(2)))
        .unwrap();
    engine.complete();

    let events = engine.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].payload, EventPayload::OrderQueued(_)));
    match &events[1].payload {
        EventPayload::Fill(fill) => {
            assert_eq!(fill.qty, Qty::new(2));
            assert_eq!(fill.price, Price::new(dec!(105)));
            assert!(!fill.squared_off);
        }
        other => panic!("expected a fill event, got {other:?}"),
    }
    assert_eq!(engine.recent_events(1).len(), 1);
}

#[test]
fn audit_trail_is_bounded() {
    let series = bars(&[(at(1, 10, 0), dec!(100)), (at(1, 11, 0), dec!(105))]);
    let config = frictionless().with_max_events(2);
    let mut engine = Engine::new(series, config).unwrap();

    for _ in 0..5 {
        engine
            .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
            .unwrap();
    }
    assert_eq!(engine.events().len(), 2);
}

#[test]
fn export_covers_every_bar() {
    let series = bars(&[
        (at(1, 10, 0), dec!(100)),
        (at(1, 11, 0), dec!(105)),
        (at(1, 12, 0), dec!(95)),
    ]);
    let mut engine = Engine::new(series, frictionless()).unwrap();
    engine
        .place_order(Order::market(at(1, 11, 0), Side::Buy, lot(1)))
        .unwrap();
    engine.complete();

    let table = engine.export_table();
    assert_eq!(table.len(), 3);
    assert_eq!(table[0].close, Price::new(dec!(100)));
    assert!(table[0].exec.is_zero());
    assert_eq!(table[1].exec, Qty::new(1));
    assert_eq!(table[2].position, Qty::new(1));
}
