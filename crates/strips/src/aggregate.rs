use chrono::NaiveDate;

use common::ContractPrice;

use crate::{Quote, Strip};

/// Average price of one strip on one curve, with the contracts behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct StripAggregate {
    pub strip: Strip,
    /// Mean of `details`, rounded to 3 decimals.
    pub price: f64,
    pub details: Vec<ContractPrice>,
}

/// Round a price to 3 decimals ($/MMBtu to a tenth of a cent). Halves go
/// up, so negative basis prices round towards zero: -0.0625 becomes -0.062.
pub fn round_price(price: f64) -> f64 {
    (price * 1000.0 + 0.5).floor() / 1000.0
}

/// Average the priced contracts of `strip` that deliver after `as_of`.
///
/// Contracts already in delivery and contracts without a price are left
/// out. Returns `None` when nothing is left, which is the normal outcome
/// for a balance-of strip late in its season.
pub fn aggregate_strip(quotes: &[Quote<'_>], strip: Strip, as_of: NaiveDate) -> Option<StripAggregate> {
    let details: Vec<ContractPrice> = quotes
        .iter()
        .filter(|q| q.month.is_after(as_of) && strip.contains(q.month))
        .filter_map(|q| {
            q.price.map(|price| ContractPrice {
                contract: q.label.to_string(),
                price,
            })
        })
        .collect();

    if details.is_empty() {
        return None;
    }

    let mean = details.iter().map(|d| d.price).sum::<f64>() / details.len() as f64;
    Some(StripAggregate {
        strip,
        price: round_price(mean),
        details,
    })
}
