//! Synthetic Market State Engine Simulation.
//!
//! Walks the read API through a scripted market lifecycle: deployment,
//! trade estimation, volume impact and decay, funding migration, the
//! circuit breaker, and a liquidation under a price crash.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use synth_state::*;

fn main() {
    println!("Synthetic Market State Engine Simulation");
    println!("Single Market, Pure Read-Side Projections\n");

    scenario_1_fresh_market();
    scenario_2_trade_estimation();
    scenario_3_volume_impact_and_decay();
    scenario_4_funding_migration();
    scenario_5_circuit_breaker();
    scenario_6_price_crash_liquidation();

    println!("\nAll simulations completed successfully.");
}

fn feed() -> MockFeed {
    MockFeed::new(Price::new_unchecked(dec!(1)), dec!(2_000_000))
}

/// Freshly deployed market: zero state, static spread only. Deployment is
/// stamped off the wall clock; every later projection is relative to it.
fn scenario_1_fresh_market() {
    println!("Scenario 1: Fresh Market\n");

    let deployed_at = Timestamp::now();
    let params = RiskParams::default();
    let market = MarketRiskState::new(deployed_at);
    let data = feed().latest(deployed_at);
    let view = StateView::new(&market, &params, &data, deployed_at);

    let mut registry = MarketRegistry::new();
    registry.register(FeedId(1), MarketId(1));
    println!("  Market {:?} registered against feed {:?}, deployed at {}", registry.market_for_feed(FeedId(1)).unwrap(), FeedId(1), deployed_at);

    let (bid, ask, mid) = view.prices().unwrap();
    println!("  Resting quotes: bid {} / mid {} / ask {}", bid, mid, ask);

    let (long, short) = view.ois();
    println!("  Open interest: {} long, {} short", long, short);
    println!("  OI cap: {}, breaker level: {}\n", view.cap_oi(), view.circuit_breaker_level().unwrap());
}

/// What-if preview of a 3x long build.
fn scenario_2_trade_estimation() {
    println!("Scenario 2: Trade Estimation\n");

    let params = RiskParams::default();
    let market = MarketRiskState::new(Timestamp::from_secs(0));
    let data = feed().latest(Timestamp::from_secs(0));
    let view = StateView::new(&market, &params, &data, Timestamp::from_secs(0));

    let collateral = dec!(20);
    let leverage = dec!(3);
    let pos = view.position_estimate(collateral, leverage, true).unwrap();

    println!("  Build preview: {} collateral at {}x long", collateral, leverage);
    println!("  Notional: {}, debt: {}, cost: {}", pos.notional_initial, pos.debt, view.cost_estimate(collateral));
    println!("  OI: {}, entry: {}", pos.oi_shares, pos.entry_price().unwrap());
    println!("  Maintenance margin: {}", view.maintenance_margin_estimate(collateral, leverage));
    println!("  Liquidation price: {}\n", view.liquidation_price_estimate(collateral, leverage, true).unwrap());
}

/// Recorded volume widens the ask, then decays out over the micro window.
fn scenario_3_volume_impact_and_decay() {
    println!("Scenario 3: Volume Impact and Decay\n");

    let params = RiskParams::default();
    let mut market = MarketRiskState::new(Timestamp::from_secs(0));
    let oracle = feed();

    let data = oracle.latest(Timestamp::from_secs(0));
    let view = StateView::new(&market, &params, &data, Timestamp::from_secs(0));
    println!("  Resting ask: {}", view.ask(dec!(0)).unwrap());

    // a buy worth a quarter of the cap lands
    market
        .record_volume_ask(Timestamp::from_secs(0), Decimal::from(data.micro_window), dec!(0.25))
        .unwrap();

    for secs in [0i64, 150, 300, 600] {
        let now = Timestamp::from_secs(secs);
        let data = oracle.latest(now);
        let view = StateView::new(&market, &params, &data, now);
        let (_, volume_ask) = view.volumes().unwrap();
        println!("  t={}s: ask volume {}, ask {}", secs, volume_ask, view.ask(dec!(0)).unwrap());
    }
    println!();
}

/// Imbalanced open interest migrates toward balance through funding.
fn scenario_4_funding_migration() {
    println!("Scenario 4: Funding Migration\n");

    let params = RiskParams::default();
    let mut market = MarketRiskState::new(Timestamp::from_secs(0));
    market.oi_long = dec!(20);
    market.oi_short = dec!(10);

    let oracle = feed();
    for secs in [0i64, 600, 86_400, 2_592_000] {
        let now = Timestamp::from_secs(secs);
        let data = oracle.latest(now);
        let view = StateView::new(&market, &params, &data, now);
        let (long, short) = view.ois();
        println!(
            "  t={}s: long {:.6}, short {:.6}, rate {:.10}",
            secs,
            long,
            short,
            view.funding_rate()
        );
    }
    println!();
}

/// Minted supply moves the breaker level linearly to zero at the target;
/// the writer composes it with the bounds-adjusted cap when gating builds.
fn scenario_5_circuit_breaker() {
    println!("Scenario 5: Circuit Breaker\n");

    let params = RiskParams::default();
    let oracle = feed();
    let target = params.circuit_breaker_mint_target;

    for fraction in [dec!(0), dec!(0.25), dec!(0.5), dec!(1)] {
        let mut market = MarketRiskState::new(Timestamp::from_secs(0));
        market
            .record_mint(Timestamp::from_secs(0), params.circuit_breaker_window, target * fraction)
            .unwrap();

        let data = oracle.latest(Timestamp::from_secs(0));
        let view = StateView::new(&market, &params, &data, Timestamp::from_secs(0));
        let gated = cap_oi_adjusted_for_circuit_breaker(
            view.cap_oi(),
            view.minted().unwrap(),
            target,
        );
        println!(
            "  minted {} of target: breaker {}, cap OI {}, gated cap {}",
            fraction,
            view.circuit_breaker_level().unwrap(),
            view.cap_oi(),
            gated
        );
    }
    println!();
}

/// A 3x long survives a dip and gets liquidatable in a crash.
fn scenario_6_price_crash_liquidation() {
    println!("Scenario 6: Price Crash Liquidation\n");

    let params = RiskParams::default();
    let mut market = MarketRiskState::new(Timestamp::from_secs(0));
    let mut oracle = feed();
    let market_id = MarketId(1);
    let alice = AccountId(1);

    let data = oracle.latest(Timestamp::from_secs(0));
    let view = StateView::new(&market, &params, &data, Timestamp::from_secs(0));
    let pos = view.position_estimate(dec!(20), dec!(3), true).unwrap();

    let mut ledger = InMemoryLedger::new();
    let id = ledger.insert(market_id, alice, pos);
    market.oi_long = pos.oi_shares;
    market.settle_funding(Timestamp::from_secs(0), params.k);

    println!("  Alice opens 3x long: 20 collateral, entry {}", pos.entry_price().unwrap());

    for (price, label) in [(dec!(0.95), "dip to 0.95"), (dec!(0.80), "drop to 0.80"), (dec!(0.70), "crash to 0.70")] {
        oracle.set_price(Price::new_unchecked(price));
        let data = oracle.latest(Timestamp::from_secs(0));
        let view = StateView::new(&market, &params, &data, Timestamp::from_secs(0));
        let stored = *ledger.position_of(market_id, alice, id).unwrap();

        let value = view.value(&stored, &ledger, market_id).unwrap();
        let excess = view.margin_excess_before_liquidation(&stored, &ledger, market_id).unwrap();
        let liq = view.liquidatable(&stored, &ledger, market_id).unwrap();
        println!("  {}: value {:.4}, margin excess {:.4}, liquidatable: {}", label, value, excess, liq);
    }
}
