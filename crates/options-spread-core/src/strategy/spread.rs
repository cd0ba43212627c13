use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::error::ScreenerError;
use crate::pricing::{price_leg, MarketInput, OptionType};
use crate::stats::{ln_decimal, norm_cdf};
use crate::strategy::grid::{strike_pairs, StrikeGridConfig};
use crate::strategy::payoff::{payoff_curve, PayoffCurve};
use crate::types::*;
use crate::ScreenerResult;

/// Legs quoted below this are treated as untradeable and filtered out.
pub const DEFAULT_MIN_LEG_VALUE: Decimal = dec!(0.08);

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// The two supported verticals. Both are bullish; they differ in which leg
/// is bought vs sold, not in the pricing math: a bull put spread sells the
/// higher-strike put against a long lower-strike put (credit), a bull call
/// spread buys the lower-strike call against a short higher-strike call
/// (debit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadStrategy {
    BullPutSpread,
    BullCallSpread,
}

impl SpreadStrategy {
    pub fn leg_type(&self) -> OptionType {
        match self {
            SpreadStrategy::BullPutSpread => OptionType::Put,
            SpreadStrategy::BullCallSpread => OptionType::Call,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            SpreadStrategy::BullPutSpread => "bull_put_spread",
            SpreadStrategy::BullCallSpread => "bull_call_spread",
        }
    }
}

impl FromStr for SpreadStrategy {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bull_put_spread" => Ok(SpreadStrategy::BullPutSpread),
            "bull_call_spread" => Ok(SpreadStrategy::BullCallSpread),
            other => Err(ScreenerError::UnsupportedStrategy(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenInput {
    pub market: MarketInput,
    pub strategy: SpreadStrategy,
    #[serde(default)]
    pub grid: Option<StrikeGridConfig>,
    #[serde(default)]
    pub min_leg_value: Option<Money>,
    #[serde(default)]
    pub min_expected_result: Option<Money>,
    #[serde(default)]
    pub include_chart_data: bool,
}

/// One evaluated strike pair. Immutable once computed; max_gain and
/// max_loss are positive magnitudes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadTrade {
    pub lower_strike: Money,
    pub lower_leg_value: Money,
    pub higher_strike: Money,
    pub higher_leg_value: Money,
    pub breakeven: Money,
    pub probability_of_gain: Rate,
    pub probability_of_loss: Rate,
    pub max_gain: Money,
    pub max_loss: Money,
    pub expected_result: Money,
}

impl SpreadTrade {
    /// Positional ten-field view for consumers that index rather than name:
    /// [lower_strike, lower_leg_value, higher_strike, higher_leg_value,
    /// breakeven, probability_of_gain, probability_of_loss, max_gain,
    /// max_loss, expected_result].
    pub fn as_row(&self) -> [Decimal; 10] {
        [
            self.lower_strike,
            self.lower_leg_value,
            self.higher_strike,
            self.higher_leg_value,
            self.breakeven,
            self.probability_of_gain,
            self.probability_of_loss,
            self.max_gain,
            self.max_loss,
            self.expected_result,
        ]
    }

    fn width(&self) -> Decimal {
        self.higher_strike - self.lower_strike
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenOutput {
    pub strategy: SpreadStrategy,
    /// Sorted descending by expected_result; every entry is positive.
    pub trades: Vec<SpreadTrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<PayoffCurve>,
}

// ---------------------------------------------------------------------------
// Per-pair evaluation
// ---------------------------------------------------------------------------

/// P(terminal price > level) under the screener's lognormal model: the log
/// return over the holding period is centred at zero with deviation
/// sigma*sqrt(T); the risk-free rate shapes the premiums (and therefore the
/// breakeven), not the terminal distribution.
fn probability_above(market: &MarketInput, level: Money) -> Rate {
    if level <= Decimal::ZERO {
        return Decimal::ONE;
    }
    let z = ln_decimal(level / market.stock_price) / market.period_vol();
    norm_cdf(-z)
}

fn evaluate_pair(
    market: &MarketInput,
    strategy: SpreadStrategy,
    lower: Money,
    higher: Money,
) -> ScreenerResult<SpreadTrade> {
    let lower_leg = price_leg(market, lower, strategy.leg_type())?;
    let higher_leg = price_leg(market, higher, strategy.leg_type())?;
    let lower_value = lower_leg.theoretical_value;
    let higher_value = higher_leg.theoretical_value;
    let width = higher - lower;

    let (breakeven, max_gain, max_loss) = match strategy {
        // short the higher put: credit received, loss capped at width - credit
        SpreadStrategy::BullPutSpread => {
            let credit = higher_value - lower_value;
            (higher - credit, credit, width - credit)
        }
        // long the lower call: debit paid, gain capped at width - debit
        SpreadStrategy::BullCallSpread => {
            let debit = lower_value - higher_value;
            (lower + debit, width - debit, debit)
        }
    };

    // both verticals profit above the breakeven
    let probability_of_gain = probability_above(market, breakeven);
    let probability_of_loss = Decimal::ONE - probability_of_gain;
    let expected_result = probability_of_gain * max_gain - probability_of_loss * max_loss;

    Ok(SpreadTrade {
        lower_strike: lower,
        lower_leg_value: lower_value,
        higher_strike: higher,
        higher_leg_value: higher_value,
        breakeven,
        probability_of_gain,
        probability_of_loss,
        max_gain,
        max_loss,
        expected_result,
    })
}

// ---------------------------------------------------------------------------
// Main function
// ---------------------------------------------------------------------------

pub fn screen_spreads(input: &ScreenInput) -> ScreenerResult<ComputationOutput<ScreenOutput>> {
    let start = Instant::now();

    input.market.validate()?;
    let grid = input.grid.clone().unwrap_or_default();
    let min_leg_value = input.min_leg_value.unwrap_or(DEFAULT_MIN_LEG_VALUE);
    let min_expected_result = input
        .min_expected_result
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);

    let mut pairs_evaluated = 0u32;
    let mut trades = Vec::new();
    for (lower, higher) in strike_pairs(input.market.stock_price, &grid)? {
        pairs_evaluated += 1;
        let trade = evaluate_pair(&input.market, input.strategy, lower, higher)?;
        if trade.lower_leg_value > min_leg_value
            && trade.higher_leg_value > min_leg_value
            && trade.expected_result > min_expected_result
        {
            trades.push(trade);
        }
    }

    if trades.is_empty() {
        return Err(ScreenerError::NoTradeFound);
    }

    // Descending by expected result; equal ERs order by narrower width,
    // then by breakeven closest to spot, then by lower strike.
    let spot = input.market.stock_price;
    trades.sort_by(|a, b| {
        b.expected_result
            .cmp(&a.expected_result)
            .then_with(|| a.width().cmp(&b.width()))
            .then_with(|| {
                (a.breakeven - spot)
                    .abs()
                    .cmp(&(b.breakeven - spot).abs())
            })
            .then_with(|| a.lower_strike.cmp(&b.lower_strike))
    });

    let chart_data = if input.include_chart_data {
        Some(payoff_curve(&trades[0], input.strategy, &grid))
    } else {
        None
    };

    let output = ScreenOutput {
        strategy: input.strategy,
        trades,
        chart_data,
    };

    let assumptions = serde_json::json!({
        "strategy": input.strategy.as_tag(),
        "stock_price": input.market.stock_price.to_string(),
        "days_to_expiry": input.market.days_to_expiry,
        "implied_vol_pct": input.market.implied_vol_pct.to_string(),
        "risk_free_rate_pct": input.market.risk_free_rate_pct.to_string(),
        "strike_band": grid.band.to_string(),
        "strike_step": grid.step.to_string(),
        "min_leg_value": min_leg_value.to_string(),
        "pairs_evaluated": pairs_evaluated,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Black-Scholes legs, lognormal expected-result ranking",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
