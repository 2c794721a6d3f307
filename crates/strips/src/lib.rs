//! Seasonal strip pricing over forward curves.
//!
//! Pure date and price logic: no I/O, no clock. The batch runner in
//! `engine` feeds one published curve per trade date through
//! [`evaluate_day`].

pub mod aggregate;
pub mod calendar;
pub mod evaluate;
pub mod prompt;
pub mod quote;
pub mod season;

pub use aggregate::{aggregate_strip, round_price, StripAggregate};
pub use calendar::{add_business_days, business_dates, is_business_day, parse_date, BusinessDates};
pub use evaluate::{evaluate_day, DayStrips};
pub use prompt::{prompt_contract, PromptQuote};
pub use quote::{quotes, Quote};
pub use season::{active_strips, Season, Strip};
