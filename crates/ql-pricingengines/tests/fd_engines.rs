//! Finite-difference engines against the closed form and against each
//! other.

use std::sync::Arc;

use ql_instruments::{
    CashDividend, CashOrNothingPayoff, Exercise, OptionType, PricingEngine, VanillaOption,
};
use ql_pricingengines::{
    black_scholes_merton, BlackScholesInputs, FdAmericanEngine, FdBermudanEngine,
    FdDividendAmericanEngine, FdDividendEuropeanEngine, FdEngineSettings, FdEuropeanEngine,
};
use statrs::distribution::{ContinuousCDF, Normal};

fn market() -> BlackScholesInputs {
    BlackScholesInputs::new(100.0, 0.06, 0.0, 0.25)
}

fn settings(points: usize, steps: usize) -> FdEngineSettings {
    FdEngineSettings::default()
        .with_grid_points(points)
        .with_time_steps(steps)
}

fn npv(engine: &dyn PricingEngine<ql_instruments::OneAssetOptionArguments>, option: &VanillaOption) -> f64 {
    option.price(engine).unwrap().npv
}

#[test]
fn european_converges_to_black_scholes() {
    let option = VanillaOption::european(OptionType::Call, 100.0, 1.0);
    let exact = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.06, 0.0, 0.25, 1.0);

    let coarse = npv(&FdEuropeanEngine::new(market(), settings(51, 50)), &option);
    let fine = npv(&FdEuropeanEngine::new(market(), settings(401, 400)), &option);
    let (coarse_err, fine_err) = ((coarse - exact.price).abs(), (fine - exact.price).abs());
    assert!(fine_err < 5e-3, "fine {fine} vs exact {}", exact.price);
    assert!(fine_err < coarse_err, "{fine_err} !< {coarse_err}");
}

#[test]
fn european_greeks_match_black_scholes() {
    let option = VanillaOption::european(OptionType::Put, 100.0, 0.5);
    let exact = black_scholes_merton(OptionType::Put, 100.0, 100.0, 0.06, 0.0, 0.25, 0.5);
    let r = option
        .price(&FdEuropeanEngine::new(market(), settings(301, 300)))
        .unwrap();
    assert!((r.result("delta").unwrap() - exact.delta).abs() < 5e-3);
    assert!((r.result("gamma").unwrap() - exact.gamma).abs() < 2e-3);
}

#[test]
fn repeated_runs_are_bitwise_identical() {
    let engine = FdAmericanEngine::new(market(), settings(101, 100));
    let option = VanillaOption::american(OptionType::Put, 95.0, 1.0);
    let a = option.price(&engine).unwrap();
    let b = option.price(&engine).unwrap();
    assert_eq!(a.npv.to_bits(), b.npv.to_bits());
    assert_eq!(
        a.result("delta").unwrap().to_bits(),
        b.result("delta").unwrap().to_bits()
    );
    assert_eq!(
        a.result("gamma").unwrap().to_bits(),
        b.result("gamma").unwrap().to_bits()
    );
}

#[test]
fn exercise_rights_are_ordered() {
    let s = settings(201, 200);
    let european = npv(
        &FdEuropeanEngine::new(market(), s),
        &VanillaOption::european(OptionType::Put, 100.0, 1.0),
    );
    let bermudan = npv(
        &FdBermudanEngine::new(market(), s),
        &VanillaOption::bermudan(OptionType::Put, 100.0, vec![0.25, 0.5, 0.75, 1.0]),
    );
    let american = npv(
        &FdAmericanEngine::new(market(), s),
        &VanillaOption::american(OptionType::Put, 100.0, 1.0),
    );
    assert!(european < bermudan, "european {european} bermudan {bermudan}");
    assert!(bermudan < american + 1e-3, "bermudan {bermudan} american {american}");
    assert!(american > european + 0.1);
}

#[test]
fn single_date_bermudan_is_european() {
    let s = settings(101, 100);
    let european = npv(
        &FdEuropeanEngine::new(market(), s),
        &VanillaOption::european(OptionType::Put, 100.0, 1.0),
    );
    let bermudan = npv(
        &FdBermudanEngine::new(market(), s),
        &VanillaOption::bermudan(OptionType::Put, 100.0, vec![1.0]),
    );
    assert!((european - bermudan).abs() < 1e-2, "{european} vs {bermudan}");
}

#[test]
fn dividend_lowers_the_call_and_raises_the_put() {
    let s = settings(201, 200);
    let dividends = vec![CashDividend::new(0.5, 3.0)];

    let call = VanillaOption::european(OptionType::Call, 100.0, 1.0);
    let plain = npv(&FdDividendEuropeanEngine::new(market(), s), &call);
    let paying = npv(
        &FdDividendEuropeanEngine::new(market(), s),
        &call.clone().with_dividends(dividends.clone()),
    );
    assert!(paying < plain - 1.0, "with dividend {paying}, without {plain}");

    let put = VanillaOption::american(OptionType::Put, 100.0, 1.0);
    let plain_put = npv(&FdDividendAmericanEngine::new(market(), s), &put);
    let paying_put = npv(
        &FdDividendAmericanEngine::new(market(), s),
        &put.clone().with_dividends(dividends),
    );
    assert!(paying_put > plain_put, "with dividend {paying_put}, without {plain_put}");
}

#[test]
fn dividend_engine_without_dividends_matches_the_plain_engine() {
    let s = settings(101, 100);
    let call = VanillaOption::european(OptionType::Call, 110.0, 0.75);
    let plain = npv(&FdEuropeanEngine::new(market(), s), &call);
    let dividend = npv(&FdDividendEuropeanEngine::new(market(), s), &call);
    assert_eq!(plain.to_bits(), dividend.to_bits());
}

#[test]
fn american_call_on_a_dividend_payer_beats_the_european() {
    let s = settings(201, 200);
    let dividends = vec![CashDividend::new(0.9, 8.0)];
    let european = npv(
        &FdDividendEuropeanEngine::new(market(), s),
        &VanillaOption::european(OptionType::Call, 90.0, 1.0).with_dividends(dividends.clone()),
    );
    let american = npv(
        &FdDividendAmericanEngine::new(market(), s),
        &VanillaOption::american(OptionType::Call, 90.0, 1.0).with_dividends(dividends),
    );
    assert!(american > european, "american {american} european {european}");
}

#[test]
fn dividends_paid_just_after_expiry_count_as_paid_at_expiry() {
    let s = settings(101, 100);
    let call = VanillaOption::european(OptionType::Call, 100.0, 1.0);
    let plain = npv(&FdEuropeanEngine::new(market(), s), &call);
    let late = vec![CashDividend::new(1.0 + 5e-7, 1.0), CashDividend::new(1.0 + 5e-7, 1.0)];
    let paying = call
        .clone()
        .with_dividends(late)
        .price(&FdDividendEuropeanEngine::new(market(), s))
        .unwrap()
        .npv;
    assert!(paying.is_finite());
    assert!(paying < plain, "with dividends {paying}, without {plain}");
}

#[test]
fn cash_or_nothing_call_matches_the_closed_form() {
    let (strike, cash, t): (f64, f64, f64) = (105.0, 10.0, 1.0);
    let (spot, r, vol): (f64, f64, f64) = (100.0, 0.06, 0.25);
    let d2 = ((spot / strike).ln() + (r - 0.5 * vol * vol) * t) / (vol * t.sqrt());
    let exact = cash * (-r * t).exp() * Normal::standard().cdf(d2);

    let payoff = Arc::new(CashOrNothingPayoff::new(OptionType::Call, strike, cash));
    let european = VanillaOption::new(payoff.clone(), Exercise::european(t));
    let fd = npv(&FdEuropeanEngine::new(market(), settings(401, 400)), &european);
    assert!((fd - exact).abs() < 0.1, "fd {fd} vs exact {exact}");

    // early exercise pays the cash as soon as the spot crosses the strike
    let american = VanillaOption::new(payoff, Exercise::american(t));
    let early = npv(&FdAmericanEngine::new(market(), settings(401, 400)), &american);
    assert!(early > fd, "american {early} european {fd}");
    assert!(early <= cash + 1e-9);
}
