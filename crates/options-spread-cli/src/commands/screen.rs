use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use options_spread_core::pricing::MarketInput;
use options_spread_core::strategy::spread::{self, ScreenInput, SpreadStrategy};

use crate::input;
use crate::output::chart;

/// Arguments for spread screening
#[derive(Args)]
pub struct ScreenArgs {
    /// Path to a JSON input file (ScreenInput shape); overrides inline args
    #[arg(long)]
    pub input: Option<String>,

    /// Stock price (suggested 20-200)
    #[arg(long)]
    pub stock_price: Option<Decimal>,

    /// Days to expiration (suggested 1-360)
    #[arg(long)]
    pub dte: Option<u32>,

    /// Implied volatility in percent (suggested 10-150)
    #[arg(long)]
    pub iv: Option<Decimal>,

    /// Risk-free rate in percent (suggested 1-4)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Strategy: bull_put_spread or bull_call_spread
    #[arg(long)]
    pub strategy: Option<String>,

    /// Half-width of the strike band around the stock price
    #[arg(long)]
    pub strike_band: Option<Decimal>,

    /// Increment between adjacent strikes
    #[arg(long)]
    pub strike_step: Option<Decimal>,

    /// Lowest leg value still considered tradeable
    #[arg(long)]
    pub min_leg_value: Option<Decimal>,

    /// Render the payoff diagram of the best trade
    #[arg(long)]
    pub chart: bool,
}

pub fn run_screen(args: ScreenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut screen_input: ScreenInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_screen_input(&args)?
    };

    // flag overrides apply on top of whichever source supplied the input
    if args.strike_band.is_some() || args.strike_step.is_some() {
        let mut grid = screen_input.grid.clone().unwrap_or_default();
        if let Some(band) = args.strike_band {
            grid.band = band;
        }
        if let Some(step) = args.strike_step {
            grid.step = step;
        }
        screen_input.grid = Some(grid);
    }
    if args.min_leg_value.is_some() {
        screen_input.min_leg_value = args.min_leg_value;
    }
    if args.chart {
        screen_input.include_chart_data = true;
    }

    let result = spread::screen_spreads(&screen_input)?;

    if args.chart {
        if let Some(curve) = &result.result.chart_data {
            chart::render(curve, &screen_input.market, screen_input.strategy.as_tag());
        }
    }

    Ok(serde_json::to_value(result)?)
}

fn build_screen_input(args: &ScreenArgs) -> Result<ScreenInput, Box<dyn std::error::Error>> {
    let strategy: SpreadStrategy = args
        .strategy
        .as_deref()
        .ok_or("--strategy <bull_put_spread|bull_call_spread> required (or use --input/stdin)")?
        .parse()?;

    Ok(ScreenInput {
        market: MarketInput {
            stock_price: args.stock_price.ok_or("--stock-price required")?,
            days_to_expiry: args.dte.ok_or("--dte required")?,
            implied_vol_pct: args.iv.ok_or("--iv required")?,
            risk_free_rate_pct: args.rate.ok_or("--rate required")?,
        },
        strategy,
        grid: None,
        min_leg_value: None,
        min_expected_result: None,
        include_chart_data: false,
    })
}
