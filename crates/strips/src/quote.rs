use tracing::debug;

use common::ContractMonth;

/// One contract of a forward curve with its selected price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote<'a> {
    /// Contract label as published, e.g. `2025-11-01`.
    pub label: &'a str,
    pub month: ContractMonth,
    pub price: Option<f64>,
}

/// Pair contract labels with their prices, dropping labels that do not parse.
pub fn quotes<'a>(contracts: &'a [String], prices: &[Option<f64>]) -> Vec<Quote<'a>> {
    contracts
        .iter()
        .zip(prices.iter().copied())
        .filter_map(|(label, price)| match ContractMonth::parse(label) {
            Ok(month) => Some(Quote {
                label: label.as_str(),
                month,
                price,
            }),
            Err(e) => {
                debug!(contract = %label, error = %e, "Skipping unparseable contract");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_labels_are_dropped() {
        let contracts = vec!["2025-11-01".to_string(), "BAL-MO".to_string(), "2026-01-01".to_string()];
        let prices = vec![Some(3.0), Some(9.9), None];
        let q = quotes(&contracts, &prices);
        assert_eq!(q.len(), 2);
        assert_eq!(q[0].label, "2025-11-01");
        assert_eq!(q[1].month, ContractMonth { year: 2026, month: 1 });
        assert_eq!(q[1].price, None);
    }
}
