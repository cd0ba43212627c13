use colored::Colorize;
use rust_decimal::prelude::ToPrimitive;

use options_spread_core::pricing::MarketInput;
use options_spread_core::strategy::payoff::PayoffCurve;

const BAR_WIDTH: f64 = 50.0;
const MAX_ROWS: usize = 40;

/// Print an ASCII profit/loss diagram for the selected trade. Display only;
/// nothing is returned to the caller.
pub fn render(curve: &PayoffCurve, market: &MarketInput, strategy: &str) {
    if curve.points.is_empty() {
        return;
    }

    println!();
    println!("Profit / Loss Profile");
    println!(
        "Strategy: {}   S={}  DTE={}d  IV={}%  r={}%",
        strategy,
        market.stock_price,
        market.days_to_expiry,
        market.implied_vol_pct,
        market.risk_free_rate_pct
    );
    println!();

    let values: Vec<f64> = curve
        .points
        .iter()
        .map(|p| p.profit_loss.to_f64().unwrap_or(0.0))
        .collect();
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let span = (max - min).max(1.0);

    // zero axis position within the bar
    let zero_col = ((0.0 - min) / span * BAR_WIDTH).round() as i64;

    let step = curve.points.len().div_ceil(MAX_ROWS).max(1);
    println!("{:>10}  {:>10}", "Price", "P/L");
    for (i, point) in curve.points.iter().enumerate().step_by(step) {
        let col = ((values[i] - min) / span * BAR_WIDTH).round() as i64;
        let bar = if col >= zero_col {
            " ".repeat(zero_col as usize) + &"#".repeat((col - zero_col) as usize)
        } else {
            " ".repeat(col as usize) + &"#".repeat((zero_col - col) as usize)
        };
        let styled = if values[i] >= 0.0 {
            bar.as_str().green()
        } else {
            bar.as_str().red()
        };
        println!(
            "{:>10}  {:>10}  |{}",
            point.stock_price.round_dp(2),
            point.profit_loss.round_dp(2),
            styled
        );
    }
    println!();
}
