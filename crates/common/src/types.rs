use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A monthly forward contract, identified by its calendar year and month.
///
/// The datafeed labels contracts `YYYY-MM-01`; only the year and month carry
/// meaning. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractMonth {
    pub year: i32,
    /// 1 = January .. 12 = December.
    pub month: u32,
}

impl ContractMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidDate(format!("month {month} out of range")));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidDate(format!("year {year} out of range")));
        }
        Ok(Self { year, month })
    }

    /// Parse a `YYYY-MM-DD` (or `YYYY-MM`) contract label. The day is ignored.
    pub fn parse(label: &str) -> Result<Self> {
        let mut parts = label.trim().splitn(3, '-');
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(|| Error::InvalidDate(format!("bad contract year in '{label}'")))?;
        let month = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(|| Error::InvalidDate(format!("bad contract month in '{label}'")))?;
        Self::new(year, month)
    }

    /// First calendar day of the delivery month.
    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`; only a hand-built value can land here.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MAX)
    }

    /// True when delivery starts strictly after `date`.
    pub fn is_after(&self, date: NaiveDate) -> bool {
        self.first_day() > date
    }
}

impl std::fmt::Display for ContractMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-01", self.year, self.month)
    }
}

/// Which of the two quotations in a forward curve to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Outright price.
    #[default]
    Fixed,
    /// Differential against the benchmark.
    Basis,
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceType::Fixed => write!(f, "fixed"),
            PriceType::Basis => write!(f, "basis"),
        }
    }
}

impl FromStr for PriceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(PriceType::Fixed),
            "basis" => Ok(PriceType::Basis),
            other => Err(Error::InvalidRequest(format!(
                "price_type must be 'fixed' or 'basis', got '{other}'"
            ))),
        }
    }
}

/// One published forward curve for a location: contract labels plus two
/// parallel price arrays. `None` marks a contract with no quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardCurve {
    pub issue_date: NaiveDate,
    pub location: String,
    pub contracts: Vec<String>,
    #[serde(default)]
    pub fixed_prices: Vec<Option<f64>>,
    #[serde(default)]
    pub basis_prices: Vec<Option<f64>>,
}

impl ForwardCurve {
    pub fn prices(&self, price_type: PriceType) -> &[Option<f64>] {
        match price_type {
            PriceType::Fixed => &self.fixed_prices,
            PriceType::Basis => &self.basis_prices,
        }
    }

    /// Check that the curve has contracts and that the selected price array
    /// lines up with them.
    pub fn validate(&self, price_type: PriceType) -> Result<()> {
        if self.contracts.is_empty() {
            return Err(Error::NoCurveData(format!(
                "{} has no contracts on {}",
                self.location, self.issue_date
            )));
        }
        let prices = self.prices(price_type);
        if prices.len() != self.contracts.len() {
            return Err(Error::NoCurveData(format!(
                "{} on {}: {} contracts but {} {price_type} prices",
                self.location,
                self.issue_date,
                self.contracts.len(),
                prices.len()
            )));
        }
        Ok(())
    }
}

/// A single contract and the price it contributed to a strip average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractPrice {
    pub contract: String,
    pub price: f64,
}

/// Strip prices for one trade date, as shown in the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripPriceRow {
    pub trade_date: NaiveDate,
    pub prompt_contract: Option<String>,
    pub prompt_price: Option<f64>,
    /// Strip name -> average price. Strips with no contributing contract are absent.
    pub strips: BTreeMap<String, f64>,
}

/// The contracts behind each strip average for one trade date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripDetailRow {
    pub trade_date: NaiveDate,
    pub prompt_contract: Option<String>,
    pub prompt_price: Option<f64>,
    pub strip_details: BTreeMap<String, Vec<ContractPrice>>,
}

/// Parameters of one strip calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_type: PriceType,
    pub num_strips: usize,
}

/// Output of a strip calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripReport {
    pub run_id: Uuid,
    pub location: String,
    pub price_type: PriceType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_strips: usize,
    pub dates_processed: usize,
    pub dates_skipped: usize,
    /// Every strip name seen in `data`, in first-seen order.
    pub strip_names: Vec<String>,
    pub data: Vec<StripPriceRow>,
    pub detailed_data: Vec<StripDetailRow>,
}

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Cancelled | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Completed => write!(f, "completed"),
            RunState::Cancelled => write!(f, "cancelled"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of a run's progress, updated once per trade date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunProgress {
    pub run_id: Option<Uuid>,
    pub state: RunState,
    /// Trade dates visited so far, successful or not.
    pub current: usize,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Set when the run ends in `Failed`.
    pub error: Option<String>,
}
