use chrono::NaiveDate;

use crate::Quote;

/// The nearest contract delivering after the cutoff date.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptQuote {
    pub contract: String,
    /// `None` when the contract is listed without a price.
    pub price: Option<f64>,
}

/// Pick the earliest contract whose delivery month starts after `as_of`.
///
/// The cutoff is the curve's issue date, not the trade date it is reported
/// under. Returns `None` when the curve has no forward contract.
pub fn prompt_contract(quotes: &[Quote<'_>], as_of: NaiveDate) -> Option<PromptQuote> {
    quotes
        .iter()
        .filter(|q| q.month.is_after(as_of))
        .min_by_key(|q| q.month)
        .map(|q| PromptQuote {
            contract: q.label.to_string(),
            price: q.price,
        })
}
