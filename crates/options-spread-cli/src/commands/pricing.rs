use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use options_spread_core::pricing::{self, MarketInput, OptionType, QuoteInput};

use crate::input;

/// Arguments for option pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Path to a JSON input file (QuoteInput shape); overrides inline args
    #[arg(long)]
    pub input: Option<String>,

    /// Stock price (suggested 20-200)
    #[arg(long)]
    pub stock_price: Option<Decimal>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Days to expiration (suggested 1-360)
    #[arg(long)]
    pub dte: Option<u32>,

    /// Implied volatility in percent (suggested 10-150)
    #[arg(long)]
    pub iv: Option<Decimal>,

    /// Risk-free rate in percent (suggested 1-4)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Option type: call or put
    #[arg(long)]
    pub option_type: Option<String>,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: QuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_quote_input(&args)?
    };

    let result = pricing::price_option(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_quote_input(args: &PriceArgs) -> Result<QuoteInput, Box<dyn std::error::Error>> {
    let option_type = match args.option_type.as_deref() {
        Some("call") => OptionType::Call,
        Some("put") => OptionType::Put,
        Some(other) => return Err(format!("unknown option type '{other}', expected call or put").into()),
        None => return Err("--option-type <call|put> required (or use --input/stdin)".into()),
    };

    Ok(QuoteInput {
        market: MarketInput {
            stock_price: args.stock_price.ok_or("--stock-price required")?,
            days_to_expiry: args.dte.ok_or("--dte required")?,
            implied_vol_pct: args.iv.ok_or("--iv required")?,
            risk_free_rate_pct: args.rate.ok_or("--rate required")?,
        },
        strike: args.strike.ok_or("--strike required")?,
        option_type,
    })
}
