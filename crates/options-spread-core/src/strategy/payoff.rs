use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::strategy::grid::StrikeGridConfig;
use crate::strategy::spread::{SpreadStrategy, SpreadTrade};
use crate::types::Money;

/// Standard 100-share equity option contract.
pub const CONTRACT_MULTIPLIER: Decimal = dec!(100);

const PRICE_STEP: Decimal = dec!(0.5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub stock_price: Money,
    pub profit_loss: Money,
}

/// Expiration profit/loss curve handed to the chart adapter. The adapter
/// consumes it for display only; nothing flows back into the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffCurve {
    pub points: Vec<PayoffPoint>,
}

/// Per-contract P/L at expiration across terminal prices from
/// `stock_range` below the lower strike to `stock_range` above the higher.
pub fn payoff_curve(
    trade: &SpreadTrade,
    strategy: SpreadStrategy,
    config: &StrikeGridConfig,
) -> PayoffCurve {
    let low = (trade.lower_strike - config.stock_range).max(Decimal::ZERO);
    let high = trade.higher_strike + config.stock_range;

    let mut points = Vec::new();
    let mut price = low;
    while price <= high {
        points.push(PayoffPoint {
            stock_price: price,
            profit_loss: result_at_expiration(trade, strategy, price) * CONTRACT_MULTIPLIER,
        });
        price += PRICE_STEP;
    }
    PayoffCurve { points }
}

/// Per-share result at expiration: flat at the capped loss below both
/// strikes, linear through the breakeven between them, flat at the capped
/// gain above both.
fn result_at_expiration(trade: &SpreadTrade, strategy: SpreadStrategy, price: Money) -> Money {
    let net_premium = trade.higher_leg_value - trade.lower_leg_value;
    match strategy {
        SpreadStrategy::BullPutSpread => {
            if price <= trade.lower_strike {
                trade.lower_strike - trade.breakeven
            } else if price < trade.higher_strike {
                price - trade.breakeven
            } else {
                // full credit kept
                net_premium
            }
        }
        SpreadStrategy::BullCallSpread => {
            if price <= trade.lower_strike {
                // net debit lost
                net_premium
            } else if price < trade.higher_strike {
                price - trade.breakeven
            } else {
                trade.higher_strike - trade.breakeven
            }
        }
    }
}
