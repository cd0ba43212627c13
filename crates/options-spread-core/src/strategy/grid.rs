use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ScreenerError;
use crate::types::Money;
use crate::ScreenerResult;

/// Default half-width of the strike band around the stock price.
pub const DEFAULT_STRIKE_BAND: Decimal = dec!(5);
/// Default increment between adjacent strikes.
pub const DEFAULT_STRIKE_STEP: Decimal = dec!(0.5);
/// Default distance past the outer strikes covered by the payoff curve.
pub const DEFAULT_STOCK_RANGE: Decimal = dec!(15);

/// Strike-grid policy. The defaults match the half-point option chains the
/// screener was built around; both band and step are tunable per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeGridConfig {
    #[serde(default = "default_band")]
    pub band: Money,
    #[serde(default = "default_step")]
    pub step: Money,
    #[serde(default = "default_stock_range")]
    pub stock_range: Money,
}

fn default_band() -> Money {
    DEFAULT_STRIKE_BAND
}

fn default_step() -> Money {
    DEFAULT_STRIKE_STEP
}

fn default_stock_range() -> Money {
    DEFAULT_STOCK_RANGE
}

impl Default for StrikeGridConfig {
    fn default() -> Self {
        StrikeGridConfig {
            band: DEFAULT_STRIKE_BAND,
            step: DEFAULT_STRIKE_STEP,
            stock_range: DEFAULT_STOCK_RANGE,
        }
    }
}

/// All (lower, higher) strike combinations with lower < higher, spanning
/// whole-number-truncated bounds around the stock price.
///
/// The iterator is lazy and `Clone`; calling [`strike_pairs`] again restarts
/// from the beginning.
#[derive(Debug, Clone)]
pub struct StrikePairs {
    k_max: Decimal,
    step: Decimal,
    lower: Decimal,
    higher: Decimal,
}

impl Iterator for StrikePairs {
    type Item = (Money, Money);

    fn next(&mut self) -> Option<Self::Item> {
        if self.higher > self.k_max {
            return None;
        }
        let pair = (self.lower, self.higher);
        self.higher += self.step;
        if self.higher > self.k_max {
            self.lower += self.step;
            self.higher = self.lower + self.step;
        }
        Some(pair)
    }
}

pub fn strike_pairs(stock_price: Money, config: &StrikeGridConfig) -> ScreenerResult<StrikePairs> {
    if config.step <= Decimal::ZERO {
        return Err(ScreenerError::InvalidInput {
            field: "step".into(),
            reason: "must be positive".into(),
        });
    }
    if config.band <= Decimal::ZERO {
        return Err(ScreenerError::InvalidInput {
            field: "band".into(),
            reason: "must be positive".into(),
        });
    }
    if config.band >= stock_price {
        return Err(ScreenerError::InvalidInput {
            field: "band".into(),
            reason: "must be below the stock price".into(),
        });
    }

    let mut k_min = (stock_price - config.band).trunc();
    // strikes must stay positive
    if k_min <= Decimal::ZERO {
        k_min = config.step;
    }
    let k_max = (stock_price + config.band).trunc();

    Ok(StrikePairs {
        k_max,
        step: config.step,
        lower: k_min,
        higher: k_min + config.step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_grid_pair_count() {
        // S=40, band 5, step 0.5: strikes 35.0..=45.0 -> 21 strikes,
        // 21*20/2 = 210 ordered pairs
        let pairs: Vec<_> = strike_pairs(dec!(40), &StrikeGridConfig::default())
            .unwrap()
            .collect();
        assert_eq!(pairs.len(), 210);
        assert_eq!(pairs[0], (dec!(35), dec!(35.5)));
        assert_eq!(pairs[pairs.len() - 1], (dec!(44.5), dec!(45)));
    }

    #[test]
    fn test_all_pairs_ordered_and_in_band() {
        for (lower, higher) in strike_pairs(dec!(40), &StrikeGridConfig::default()).unwrap() {
            assert!(lower < higher, "pair ({lower}, {higher}) not ordered");
            assert!(lower >= dec!(35) && higher <= dec!(45));
        }
    }

    #[test]
    fn test_restartable() {
        let first: Vec<_> = strike_pairs(dec!(60), &StrikeGridConfig::default())
            .unwrap()
            .collect();
        let second: Vec<_> = strike_pairs(dec!(60), &StrikeGridConfig::default())
            .unwrap()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fractional_stock_price_truncates_bounds() {
        // S=40.7: bounds trunc(35.7)=35 and trunc(45.7)=45, same grid as S=40
        let pairs: Vec<_> = strike_pairs(dec!(40.7), &StrikeGridConfig::default())
            .unwrap()
            .collect();
        assert_eq!(pairs[0], (dec!(35), dec!(35.5)));
        assert_eq!(pairs.len(), 210);
    }

    #[test]
    fn test_band_at_or_above_stock_price_rejected() {
        let err = strike_pairs(dec!(4), &StrikeGridConfig::default()).unwrap_err();
        match err {
            ScreenerError::InvalidInput { field, .. } => assert_eq!(field, "band"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_nonpositive_step_rejected() {
        let config = StrikeGridConfig {
            step: dec!(0),
            ..StrikeGridConfig::default()
        };
        assert!(matches!(
            strike_pairs(dec!(40), &config),
            Err(ScreenerError::InvalidInput { field, .. }) if field == "step"
        ));
    }

    #[test]
    fn test_low_stock_price_keeps_strikes_positive() {
        // trunc(5.2 - 5) = 0 would put a zero strike in the grid
        let pairs: Vec<_> = strike_pairs(dec!(5.2), &StrikeGridConfig::default())
            .unwrap()
            .collect();
        assert!(pairs.iter().all(|(lower, _)| *lower > Decimal::ZERO));
        assert_eq!(pairs[0].0, dec!(0.5));
    }

    #[test]
    fn test_custom_band_and_step() {
        let config = StrikeGridConfig {
            band: dec!(2),
            step: dec!(1),
            ..StrikeGridConfig::default()
        };
        let pairs: Vec<_> = strike_pairs(dec!(100), &config).unwrap().collect();
        // strikes 98..=102 -> 5 strikes, 10 pairs
        assert_eq!(pairs.len(), 10);
        assert!(pairs.contains(&(dec!(98), dec!(102))));
    }
}
