mod common;

use common::{
    settings, FailingGateway, FailingReporter, MemoryReporter, RecordingNotifier, ScriptedMarket, SYMBOL,
};
use pretty_assertions::assert_eq;
use price_trader::connectors::{PaperGateway, ReplayMarket};
use price_trader::core::{StepOutcome, TradingEngine};
use price_trader::storage::CsvReporter;
use price_trader::strategies::{
    build_strategy_with, AgreementMode, ChanceRoller, CompositeStrategy, IterationStrategy,
    PercentualPositionStrategy, RandomStrategy, RngRoller, StrategyParams, StrategySpec,
};
use price_trader::types::{Action, PositionSide, ReportRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::watch;

fn engine_with(
    max_iterations: Option<u64>,
    strategy: price_trader::strategies::BoxedStrategy,
    market: ScriptedMarket,
) -> (TradingEngine, MemoryReporter) {
    let reporter = MemoryReporter::default();
    let engine = TradingEngine::new(
        settings(max_iterations),
        strategy,
        Box::new(market),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter.clone()),
    );
    (engine, reporter)
}

fn constant(price: Decimal, n: usize) -> ScriptedMarket {
    ScriptedMarket::new(std::iter::repeat(Some(price)).take(n))
}

/// Drops timestamps so two runs can be compared row by row.
fn without_time(rows: &[ReportRecord]) -> Vec<(Decimal, PositionSide, Decimal, Decimal, Decimal, Option<Action>)> {
    rows.iter()
        .map(|r| {
            (
                r.price,
                r.position_side,
                r.position_quantity,
                r.unrealized_pnl,
                r.realized_pnl,
                r.signal,
            )
        })
        .collect()
}

#[tokio::test]
async fn iteration_strategy_round_trip_at_flat_price() {
    let (mut engine, reporter) = engine_with(
        None,
        Box::new(IterationStrategy::new(3)),
        constant(dec!(100), 4),
    );

    let first = engine.step().await.unwrap();
    assert!(matches!(first, StepOutcome::Executed { action: Action::Buy, .. }));
    assert_eq!(engine.tracker().position().side(), PositionSide::Long);
    assert_eq!(engine.tracker().position().quantity(), dec!(1));

    assert!(matches!(engine.step().await.unwrap(), StepOutcome::Held(_)));
    assert!(matches!(
        engine.step().await.unwrap(),
        StepOutcome::Executed { action: Action::Sell, .. }
    ));
    assert!(matches!(engine.step().await.unwrap(), StepOutcome::Held(_)));

    let rows = reporter.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows.iter().map(|r| r.signal).collect::<Vec<_>>(),
        vec![Some(Action::Buy), None, Some(Action::Sell), None]
    );
    assert_eq!(rows[1].position_side, PositionSide::Long);
    assert_eq!(rows[3].position_side, PositionSide::Flat);
    assert_eq!(rows[3].realized_pnl, Decimal::ZERO);
    assert_eq!(engine.tracker().history().len(), 1);
}

#[tokio::test]
async fn failed_execution_leaves_state_untouched() {
    let gateway = FailingGateway::default();
    let reporter = MemoryReporter::default();
    let mut engine = TradingEngine::new(
        settings(None),
        Box::new(IterationStrategy::new(2)),
        Box::new(constant(dec!(100), 2)),
        Box::new(gateway.clone()),
        Box::new(reporter.clone()),
    );

    let outcome = engine.step().await.unwrap();
    assert!(matches!(
        outcome,
        StepOutcome::ExecutionFailed { action: Action::Buy, .. }
    ));
    assert!(engine.tracker().position().is_flat());
    assert_eq!(engine.tracker().pnl().realized, Decimal::ZERO);

    // The strategy never opened anything, so it must not try to sell.
    assert!(matches!(engine.step().await.unwrap(), StepOutcome::Held(_)));
    assert_eq!(gateway.calls(), 1);

    let rows = reporter.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].signal, None);
    assert_eq!(rows[0].position_side, PositionSide::Flat);
    assert_eq!(engine.summary().failed_executions, 1);
}

#[tokio::test]
async fn market_outage_skips_without_reporting() {
    let (mut engine, reporter) = engine_with(
        None,
        Box::new(IterationStrategy::new(2)),
        ScriptedMarket::new([None, Some(dec!(0)), Some(dec!(100))]),
    );

    assert_eq!(engine.step().await.unwrap(), StepOutcome::Skipped);
    assert_eq!(engine.step().await.unwrap(), StepOutcome::Skipped);
    // The strategy was not consulted on skipped ticks, so this is its first call.
    assert!(matches!(
        engine.step().await.unwrap(),
        StepOutcome::Executed { action: Action::Buy, .. }
    ));

    assert_eq!(reporter.rows().len(), 1);
    let summary = engine.summary();
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn certain_random_strategy_alternates_buy_and_sell() {
    let strategy = RandomStrategy::new(100, 100, Box::new(RngRoller::seeded(7)));
    let (mut engine, reporter) = engine_with(Some(3), Box::new(strategy), constant(dec!(50), 3));

    let (_tx, rx) = watch::channel(false);
    engine.run(rx).await.unwrap();

    assert_eq!(
        reporter.rows().iter().map(|r| r.signal).collect::<Vec<_>>(),
        vec![Some(Action::Buy), Some(Action::Sell), Some(Action::Buy)]
    );
    assert_eq!(engine.tracker().position().side(), PositionSide::Long);
}

#[tokio::test]
async fn composite_stop_loss_closes_at_a_loss() {
    let composite = CompositeStrategy::new(
        vec![
            Box::new(IterationStrategy::new(100)),
            Box::new(PercentualPositionStrategy::new(dec!(5), dec!(10))),
        ],
        AgreementMode::All,
        AgreementMode::Any,
    );
    let (mut engine, reporter) = engine_with(
        Some(3),
        Box::new(composite),
        ScriptedMarket::new([Some(dec!(100)), Some(dec!(97)), Some(dec!(94))]),
    );

    let (_tx, rx) = watch::channel(false);
    let summary = engine.run(rx).await.unwrap();

    let rows = reporter.rows();
    assert_eq!(rows[0].signal, Some(Action::Buy));
    assert_eq!(rows[1].signal, None);
    assert_eq!(rows[1].unrealized_pnl, dec!(-3));
    assert_eq!(rows[2].signal, Some(Action::Sell));
    assert_eq!(rows[2].position_side, PositionSide::Flat);
    assert_eq!(summary.realized_pnl, dec!(-6));
    assert_eq!(summary.trades_closed, 1);
    assert_eq!(summary.profitable_trades, 0);
    assert_eq!(summary.hold_pnl, Some(dec!(-6)));
}

#[tokio::test]
async fn unsizable_order_is_held() {
    let reporter = MemoryReporter::default();
    let mut cramped = settings(None);
    cramped.order_size = dec!(1);
    let mut engine = TradingEngine::new(
        cramped,
        Box::new(IterationStrategy::new(2)),
        Box::new(constant(dec!(100), 1)),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter.clone()),
    );

    assert!(matches!(engine.step().await.unwrap(), StepOutcome::Held(_)));
    assert!(engine.tracker().position().is_flat());
}

#[tokio::test]
async fn raised_shutdown_stops_before_first_tick() {
    let (mut engine, reporter) = engine_with(
        None,
        Box::new(IterationStrategy::new(2)),
        constant(dec!(100), 10),
    );

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let summary = engine.run(rx).await.unwrap();

    assert_eq!(summary.iterations, 0);
    assert!(reporter.rows().is_empty());
}

#[tokio::test]
async fn dropped_shutdown_sender_ends_the_loop_between_ticks() {
    let reporter = MemoryReporter::default();
    let mut slow = settings(None);
    slow.interval = std::time::Duration::from_secs(3600);
    let mut engine = TradingEngine::new(
        slow,
        Box::new(IterationStrategy::new(2)),
        Box::new(constant(dec!(100), 10)),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter.clone()),
    );

    let (tx, rx) = watch::channel(false);
    drop(tx);
    let summary = engine.run(rx).await.unwrap();

    assert_eq!(summary.iterations, 1);
    assert_eq!(reporter.rows().len(), 1);
}

#[tokio::test]
async fn seeded_replay_is_reproducible() {
    let spec = StrategySpec::new(
        "composite",
        StrategyParams::new().with("buy_mode", "any").with("sell_mode", "any"),
    )
    .with_child(StrategySpec::new(
        "random",
        StrategyParams::new().with("buy_chance", 40).with("sell_chance", 30),
    ))
    .with_child(StrategySpec::new(
        "percentual_position",
        StrategyParams::new()
            .with("stop_loss_percentual", 2)
            .with("gain_treshold", 2),
    ));
    let prices = vec![
        dec!(100), dec!(101.5), dec!(99), dec!(103), dec!(97.25), dec!(98), dec!(104), dec!(100.1),
    ];

    let mut runs = Vec::new();
    for _ in 0..2 {
        let strategy = build_strategy_with(&spec, &mut || -> Box<dyn ChanceRoller> {
            Box::new(RngRoller::seeded(42))
        })
        .unwrap();
        let reporter = MemoryReporter::default();
        let mut engine = TradingEngine::new(
            settings(Some(prices.len() as u64)),
            strategy,
            Box::new(ReplayMarket::new(prices.clone())),
            Box::new(PaperGateway::new(dec!(0.01))),
            Box::new(reporter.clone()),
        );
        let (_tx, rx) = watch::channel(false);
        let summary = engine.run(rx).await.unwrap();
        assert_eq!(summary.iterations, prices.len() as u64);
        runs.push((without_time(&reporter.rows()), summary.realized_pnl));
    }

    assert_eq!(runs[0].0.len(), prices.len());
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn csv_report_has_one_row_per_reported_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let reporter = CsvReporter::create(dir.path(), SYMBOL).unwrap();
    let path = reporter.path().to_path_buf();
    let mut engine = TradingEngine::new(
        settings(Some(3)),
        Box::new(IterationStrategy::new(2)),
        Box::new(ScriptedMarket::new([Some(dec!(100)), None, Some(dec!(110))])),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter),
    );

    let (_tx, rx) = watch::channel(false);
    let summary = engine.run(rx).await.unwrap();
    assert_eq!(summary.realized_pnl, dec!(10));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][3], "long");
    assert_eq!(&rows[0][8], "buy");
    assert_eq!(&rows[1][2], "110.00");
    assert_eq!(&rows[1][3], "");
    assert_eq!(&rows[1][7], "10.00");
    assert_eq!(&rows[1][8], "sell");
}

#[tokio::test]
async fn sub_tick_quotes_still_fill_in_dry_mode() {
    let reporter = MemoryReporter::default();
    let mut coarse = settings(Some(3));
    coarse.step_size = dec!(1);
    let mut engine = TradingEngine::new(
        coarse,
        Box::new(IterationStrategy::new(2)),
        Box::new(ScriptedMarket::new([Some(dec!(0.0042)), Some(dec!(0.0043)), Some(dec!(0.0044))])),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter.clone()),
    );

    let (_tx, rx) = watch::channel(false);
    let summary = engine.run(rx).await.unwrap();

    let rows = reporter.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].signal, Some(Action::Buy));
    assert_eq!(rows[0].position_entry_price, dec!(0.0042));
    assert_eq!(rows[1].signal, Some(Action::Sell));
    // 100 / 0.0042 floored to whole units
    assert_eq!(summary.realized_pnl, dec!(0.0001) * dec!(23809));
}

#[tokio::test]
async fn reporter_failures_do_not_stop_trading() {
    let reporter = FailingReporter::default();
    let mut engine = TradingEngine::new(
        settings(Some(3)),
        Box::new(IterationStrategy::new(2)),
        Box::new(ScriptedMarket::new([Some(dec!(100)), Some(dec!(110)), Some(dec!(120))])),
        Box::new(PaperGateway::new(dec!(0.01))),
        Box::new(reporter.clone()),
    );

    engine.step().await.unwrap();
    assert_eq!(engine.tracker().position().side(), PositionSide::Long);

    let (_tx, rx) = watch::channel(false);
    let summary = engine.run(rx).await.unwrap();

    assert_eq!(summary.iterations, 3);
    assert_eq!(reporter.attempts(), 3);
    assert!(engine.tracker().position().is_flat());
    assert_eq!(summary.realized_pnl, dec!(10));
}

#[tokio::test]
async fn overflowing_order_size_is_held() {
    let reporter = MemoryReporter::default();
    let mut huge = settings(None);
    huge.order_size = Decimal::MAX;
    let mut engine = TradingEngine::new(
        huge,
        Box::new(IterationStrategy::new(2)),
        Box::new(constant(dec!(0.0000000001), 1)),
        Box::new(PaperGateway::new(Decimal::ZERO)),
        Box::new(reporter.clone()),
    );

    assert!(matches!(engine.step().await.unwrap(), StepOutcome::Held(_)));
    assert!(engine.tracker().position().is_flat());
    assert_eq!(reporter.rows().len(), 1);
}

#[tokio::test]
async fn notifies_start_open_close_and_stop() {
    let notifier = RecordingNotifier::default();
    let (engine, _reporter) = engine_with(
        Some(3),
        Box::new(IterationStrategy::new(2)),
        ScriptedMarket::new([Some(dec!(100)), Some(dec!(110)), Some(dec!(110))]),
    );
    let mut engine = engine.with_notifier(Box::new(notifier.clone()));

    let (_tx, rx) = watch::channel(false);
    engine.run(rx).await.unwrap();

    let messages = notifier.messages();
    assert_eq!(messages.len(), 4);
    assert!(messages[0].starts_with("Trader started for BTC-USDT"));
    assert_eq!(messages[1], "Opened long 1 BTC-USDT @ 100");
    assert_eq!(messages[2], "Closed long 1 BTC-USDT @ 110, PnL 10.00");
    assert!(messages[3].starts_with("Trader stopped for BTC-USDT after 3 iterations"));
}

#[tokio::test]
async fn notification_failures_do_not_stop_trading() {
    let notifier = RecordingNotifier::failing();
    let (engine, reporter) = engine_with(
        Some(3),
        Box::new(IterationStrategy::new(2)),
        constant(dec!(100), 3),
    );
    let mut engine = engine.with_notifier(Box::new(notifier.clone()));

    let (_tx, rx) = watch::channel(false);
    let summary = engine.run(rx).await.unwrap();

    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.trades_closed, 1);
    assert_eq!(reporter.rows().len(), 3);
    assert_eq!(notifier.messages().len(), 4);
}
