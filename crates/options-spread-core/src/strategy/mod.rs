pub mod grid;
pub mod payoff;
pub mod spread;

pub use grid::StrikeGridConfig;
pub use payoff::{PayoffCurve, PayoffPoint};
pub use spread::{screen_spreads, ScreenInput, ScreenOutput, SpreadStrategy, SpreadTrade};
