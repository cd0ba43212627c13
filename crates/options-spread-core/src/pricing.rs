use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ScreenerError;
use crate::stats::{exp_decimal, ln_decimal, norm_cdf, norm_pdf, sqrt_decimal};
use crate::types::*;
use crate::ScreenerResult;

const DAYS_PER_YEAR: Decimal = dec!(365);
const PCT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

/// Market parameters shared by every leg of an evaluation run.
///
/// Volatility and the risk-free rate are quoted in percent (40 = 40%), days
/// to expiration as a whole-day count; conversion to year fraction and
/// decimal rates happens inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInput {
    pub stock_price: Money,
    pub days_to_expiry: u32,
    pub implied_vol_pct: Rate,
    pub risk_free_rate_pct: Rate,
}

impl MarketInput {
    /// Reject out-of-range parameters before any pricing math runs. The
    /// formula divides by sigma*sqrt(T) and takes ln(S/K), so zero or
    /// negative values must never reach it.
    pub fn validate(&self) -> ScreenerResult<()> {
        if self.stock_price <= Decimal::ZERO {
            return Err(ScreenerError::InvalidInput {
                field: "stock_price".into(),
                reason: "must be positive".into(),
            });
        }
        if self.days_to_expiry < 1 {
            return Err(ScreenerError::InvalidInput {
                field: "days_to_expiry".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.implied_vol_pct <= Decimal::ZERO {
            return Err(ScreenerError::InvalidInput {
                field: "implied_vol_pct".into(),
                reason: "must be positive".into(),
            });
        }
        if self.risk_free_rate_pct < Decimal::ZERO {
            return Err(ScreenerError::InvalidInput {
                field: "risk_free_rate_pct".into(),
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn year_fraction(&self) -> Decimal {
        Decimal::from(self.days_to_expiry) / DAYS_PER_YEAR
    }

    pub(crate) fn vol(&self) -> Rate {
        self.implied_vol_pct / PCT
    }

    pub(crate) fn rate(&self) -> Rate {
        self.risk_free_rate_pct / PCT
    }

    /// sigma * sqrt(T), the volatility over the holding period.
    pub(crate) fn period_vol(&self) -> Decimal {
        self.vol() * sqrt_decimal(self.year_fraction())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: Decimal,
    pub gamma: Decimal,
    /// Per calendar day.
    pub theta: Decimal,
    /// Per one percentage point of volatility.
    pub vega: Decimal,
    /// Per one percentage point of rate.
    pub rho: Decimal,
}

/// A priced option leg. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub strike: Money,
    pub option_type: OptionType,
    pub theoretical_value: Money,
    pub greeks: Greeks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub market: MarketInput,
    pub strike: Money,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteOutput {
    pub leg: OptionLeg,
    pub intrinsic_value: Money,
    pub time_value: Money,
    pub breakeven: Money,
    pub moneyness: String,
}

// ---------------------------------------------------------------------------
// Black-Scholes internals
// ---------------------------------------------------------------------------

struct BsParams {
    d1: Decimal,
    d2: Decimal,
    sqrt_t: Decimal,
    exp_neg_rt: Decimal,
}

fn compute_bs_params(s: Decimal, k: Decimal, t: Decimal, r: Decimal, sigma: Decimal) -> BsParams {
    let sqrt_t = sqrt_decimal(t);
    let sigma_sqrt_t = sigma * sqrt_t;
    let d1 = (ln_decimal(s / k) + (r + sigma * sigma / dec!(2)) * t) / sigma_sqrt_t;
    BsParams {
        d1,
        d2: d1 - sigma_sqrt_t,
        sqrt_t,
        exp_neg_rt: exp_decimal(-r * t),
    }
}

fn bs_value(s: Decimal, k: Decimal, params: &BsParams, option_type: OptionType) -> Decimal {
    match option_type {
        OptionType::Call => {
            s * norm_cdf(params.d1) - k * params.exp_neg_rt * norm_cdf(params.d2)
        }
        OptionType::Put => {
            k * params.exp_neg_rt * norm_cdf(-params.d2) - s * norm_cdf(-params.d1)
        }
    }
}

fn compute_greeks(
    s: Decimal,
    k: Decimal,
    r: Decimal,
    t: Decimal,
    params: &BsParams,
    option_type: OptionType,
) -> Greeks {
    let nd1 = norm_pdf(params.d1);
    let sigma_sqrt_t = params.d1 - params.d2;

    let delta = match option_type {
        OptionType::Call => norm_cdf(params.d1),
        OptionType::Put => -norm_cdf(-params.d1),
    };

    // Same for call and put
    let gamma = nd1 / (s * sigma_sqrt_t);
    let vega = s * params.sqrt_t * nd1 / PCT;

    let decay = -s * nd1 * sigma_sqrt_t / (dec!(2) * t);
    let carry = r * k * params.exp_neg_rt;
    let theta_annual = match option_type {
        OptionType::Call => decay - carry * norm_cdf(params.d2),
        OptionType::Put => decay + carry * norm_cdf(-params.d2),
    };
    let theta = theta_annual / DAYS_PER_YEAR;

    let rho_base = t * k * params.exp_neg_rt / PCT;
    let rho = match option_type {
        OptionType::Call => rho_base * norm_cdf(params.d2),
        OptionType::Put => -rho_base * norm_cdf(-params.d2),
    };

    Greeks {
        delta,
        gamma,
        theta,
        vega,
        rho,
    }
}

// ---------------------------------------------------------------------------
// Moneyness and breakeven helpers
// ---------------------------------------------------------------------------

fn classify_moneyness(s: Decimal, k: Decimal, option_type: OptionType) -> String {
    // ATM band: within 1% of strike
    let ratio = s / k;
    let itm = match option_type {
        OptionType::Call => ratio > dec!(1.01),
        OptionType::Put => ratio < dec!(0.99),
    };
    let otm = match option_type {
        OptionType::Call => ratio < dec!(0.99),
        OptionType::Put => ratio > dec!(1.01),
    };
    if itm {
        "ITM".into()
    } else if otm {
        "OTM".into()
    } else {
        "ATM".into()
    }
}

fn intrinsic_value(s: Decimal, k: Decimal, option_type: OptionType) -> Decimal {
    match option_type {
        OptionType::Call => (s - k).max(Decimal::ZERO),
        OptionType::Put => (k - s).max(Decimal::ZERO),
    }
}

fn single_leg_breakeven(k: Decimal, premium: Decimal, option_type: OptionType) -> Decimal {
    match option_type {
        OptionType::Call => k + premium,
        OptionType::Put => k - premium,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price one leg from shared market data. This is the raw form the spread
/// evaluator loops over; `price_option` wraps it with the output envelope.
pub fn price_leg(
    market: &MarketInput,
    strike: Money,
    option_type: OptionType,
) -> ScreenerResult<OptionLeg> {
    market.validate()?;
    if strike <= Decimal::ZERO {
        return Err(ScreenerError::InvalidInput {
            field: "strike".into(),
            reason: "must be positive".into(),
        });
    }

    let s = market.stock_price;
    let t = market.year_fraction();
    let r = market.rate();
    let sigma = market.vol();

    let params = compute_bs_params(s, strike, t, r, sigma);
    Ok(OptionLeg {
        strike,
        option_type,
        theoretical_value: bs_value(s, strike, &params, option_type),
        greeks: compute_greeks(s, strike, r, t, &params, option_type),
    })
}

pub fn price_option(input: &QuoteInput) -> ScreenerResult<ComputationOutput<QuoteOutput>> {
    let start = Instant::now();

    let leg = price_leg(&input.market, input.strike, input.option_type)?;
    let s = input.market.stock_price;
    let iv = intrinsic_value(s, input.strike, input.option_type);

    let output = QuoteOutput {
        intrinsic_value: iv,
        time_value: leg.theoretical_value - iv,
        breakeven: single_leg_breakeven(input.strike, leg.theoretical_value, input.option_type),
        moneyness: classify_moneyness(s, input.strike, input.option_type),
        leg,
    };

    let assumptions = serde_json::json!({
        "model": "Black-Scholes (closed-form, non-dividend)",
        "stock_price": s.to_string(),
        "strike": input.strike.to_string(),
        "days_to_expiry": input.market.days_to_expiry,
        "implied_vol_pct": input.market.implied_vol_pct.to_string(),
        "risk_free_rate_pct": input.market.risk_free_rate_pct.to_string(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Black-Scholes (closed-form)",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    fn market_40() -> MarketInput {
        MarketInput {
            stock_price: dec!(40),
            days_to_expiry: 30,
            implied_vol_pct: dec!(40),
            risk_free_rate_pct: dec!(2.5136),
        }
    }

    #[test]
    fn test_itm_call_value_and_delta() {
        // S=65, K=60, DTE=30, IV=35, r=2.493
        let market = MarketInput {
            stock_price: dec!(65),
            days_to_expiry: 30,
            implied_vol_pct: dec!(35),
            risk_free_rate_pct: dec!(2.493),
        };
        let leg = price_leg(&market, dec!(60), OptionType::Call).unwrap();
        // worth more than intrinsic, less than the stock
        assert!(leg.theoretical_value > dec!(5));
        assert!(leg.theoretical_value < dec!(7));
        assert!(leg.greeks.delta > Decimal::ZERO && leg.greeks.delta < Decimal::ONE);
    }

    #[test]
    fn test_put_call_parity() {
        // C - P = S - K * e^(-rT)
        let market = MarketInput {
            stock_price: dec!(100),
            days_to_expiry: 365,
            implied_vol_pct: dec!(20),
            risk_free_rate_pct: dec!(5),
        };
        let call = price_leg(&market, dec!(100), OptionType::Call).unwrap();
        let put = price_leg(&market, dec!(100), OptionType::Put).unwrap();

        let lhs = call.theoretical_value - put.theoretical_value;
        let rhs = dec!(100) - dec!(100) * exp_decimal(dec!(-0.05));
        assert!(
            approx_eq(lhs, rhs, dec!(0.0001)),
            "parity violated: C-P={lhs}, S-K*e^(-rT)={rhs}"
        );
    }

    #[test]
    fn test_atm_both_sides_strictly_positive() {
        let market = market_40();
        let call = price_leg(&market, dec!(40), OptionType::Call).unwrap();
        let put = price_leg(&market, dec!(40), OptionType::Put).unwrap();
        assert!(call.theoretical_value > Decimal::ZERO);
        assert!(put.theoretical_value > Decimal::ZERO);
    }

    #[test]
    fn test_one_day_to_expiry_stays_finite() {
        let market = MarketInput {
            days_to_expiry: 1,
            ..market_40()
        };
        let call = price_leg(&market, dec!(40), OptionType::Call).unwrap();
        let put = price_leg(&market, dec!(40), OptionType::Put).unwrap();
        assert!(call.theoretical_value > Decimal::ZERO);
        assert!(call.theoretical_value < dec!(1));
        assert!(put.theoretical_value > Decimal::ZERO);
    }

    #[test]
    fn test_tiny_vol_stays_finite() {
        let market = MarketInput {
            implied_vol_pct: dec!(0.5),
            ..market_40()
        };
        let call = price_leg(&market, dec!(40), OptionType::Call).unwrap();
        assert!(call.theoretical_value >= Decimal::ZERO);
        assert!(call.theoretical_value < dec!(1));
    }

    #[test]
    fn test_zero_vol_rejected() {
        let market = MarketInput {
            implied_vol_pct: dec!(0),
            ..market_40()
        };
        let err = price_leg(&market, dec!(40), OptionType::Call).unwrap_err();
        match err {
            ScreenerError::InvalidInput { field, .. } => assert_eq!(field, "implied_vol_pct"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_dte_rejected() {
        let market = MarketInput {
            days_to_expiry: 0,
            ..market_40()
        };
        let err = price_leg(&market, dec!(40), OptionType::Put).unwrap_err();
        match err {
            ScreenerError::InvalidInput { field, .. } => assert_eq!(field, "days_to_expiry"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_nonpositive_stock_and_strike_rejected() {
        let market = MarketInput {
            stock_price: dec!(0),
            ..market_40()
        };
        assert!(matches!(
            price_leg(&market, dec!(40), OptionType::Call),
            Err(ScreenerError::InvalidInput { field, .. }) if field == "stock_price"
        ));

        assert!(matches!(
            price_leg(&market_40(), dec!(0), OptionType::Call),
            Err(ScreenerError::InvalidInput { field, .. }) if field == "strike"
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let market = MarketInput {
            risk_free_rate_pct: dec!(-1),
            ..market_40()
        };
        assert!(matches!(
            price_leg(&market, dec!(40), OptionType::Call),
            Err(ScreenerError::InvalidInput { field, .. }) if field == "risk_free_rate_pct"
        ));
    }

    #[test]
    fn test_greek_signs() {
        let market = market_40();
        let call = price_leg(&market, dec!(40), OptionType::Call).unwrap();
        let put = price_leg(&market, dec!(40), OptionType::Put).unwrap();

        assert!(call.greeks.delta > Decimal::ZERO && call.greeks.delta < Decimal::ONE);
        assert!(put.greeks.delta < Decimal::ZERO && put.greeks.delta > -Decimal::ONE);
        assert!(call.greeks.gamma > Decimal::ZERO);
        assert!(put.greeks.gamma > Decimal::ZERO);
        assert!(call.greeks.vega > Decimal::ZERO);
        assert!(call.greeks.theta < Decimal::ZERO);
        assert!(put.greeks.theta < Decimal::ZERO);
        assert!(call.greeks.rho > Decimal::ZERO);
        assert!(put.greeks.rho < Decimal::ZERO);
    }

    #[test]
    fn test_theta_and_vega_output_units() {
        // theta per calendar day, vega per vol point: both well under 1.0
        // for a 30-day ATM option on a 40 stock
        let leg = price_leg(&market_40(), dec!(40), OptionType::Call).unwrap();
        assert!(leg.greeks.theta > dec!(-0.1) && leg.greeks.theta < Decimal::ZERO);
        assert!(leg.greeks.vega > dec!(0.01) && leg.greeks.vega < dec!(0.1));
    }

    #[test]
    fn test_deep_itm_call_above_discounted_intrinsic() {
        let market = MarketInput {
            stock_price: dec!(80),
            ..market_40()
        };
        let leg = price_leg(&market, dec!(40), OptionType::Call).unwrap();
        let lower_bound = dec!(80) - dec!(40) * exp_decimal(-market.rate() * market.year_fraction());
        assert!(leg.theoretical_value >= lower_bound - dec!(0.01));
        assert!(leg.greeks.delta > dec!(0.99));
    }

    #[test]
    fn test_deep_otm_call_near_zero() {
        let market = market_40();
        let leg = price_leg(&market, dec!(80), OptionType::Call).unwrap();
        // worthless to within approximation noise
        assert!(leg.theoretical_value.abs() < dec!(0.01));
    }

    #[test]
    fn test_price_option_envelope() {
        let input = QuoteInput {
            market: market_40(),
            strike: dec!(38),
            option_type: OptionType::Call,
        };
        let out = price_option(&input).unwrap();
        assert_eq!(out.result.moneyness, "ITM");
        assert_eq!(out.result.intrinsic_value, dec!(2));
        assert!(out.result.time_value > Decimal::ZERO);
        assert_eq!(
            out.result.breakeven,
            dec!(38) + out.result.leg.theoretical_value
        );
        assert!(!out.methodology.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_put_breakeven_below_strike() {
        let input = QuoteInput {
            market: market_40(),
            strike: dec!(42),
            option_type: OptionType::Put,
        };
        let out = price_option(&input).unwrap();
        assert_eq!(out.result.moneyness, "ITM");
        assert_eq!(
            out.result.breakeven,
            dec!(42) - out.result.leg.theoretical_value
        );
    }
}
