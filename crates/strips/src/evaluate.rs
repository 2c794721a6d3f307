use std::collections::BTreeMap;

use chrono::NaiveDate;

use common::{Error, ForwardCurve, PriceType, Result, StripDetailRow, StripPriceRow};

use crate::{active_strips, aggregate_strip, prompt_contract, quotes, round_price};

/// Everything one trade date contributes to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct DayStrips {
    /// Names of the strips that got a price, in chronological order.
    pub strip_names: Vec<String>,
    pub row: StripPriceRow,
    pub detail: StripDetailRow,
}

/// Price the prompt contract and the first `num_strips` strips of a curve.
///
/// Eligibility and the strip set are taken from the curve's issue date;
/// the result is labelled with `trade_date`. Fails with `NoCurveData` when
/// the curve is empty or misaligned, or when neither a prompt price nor any
/// strip price comes out of it.
pub fn evaluate_day(
    curve: &ForwardCurve,
    price_type: PriceType,
    trade_date: NaiveDate,
    num_strips: usize,
) -> Result<DayStrips> {
    curve.validate(price_type)?;

    let as_of = curve.issue_date;
    let quotes = quotes(&curve.contracts, curve.prices(price_type));

    let prompt = prompt_contract(&quotes, as_of);
    let prompt_price = prompt.as_ref().and_then(|p| p.price).map(round_price);
    let prompt_contract = prompt.map(|p| p.contract);

    let mut strip_names = Vec::new();
    let mut strips = BTreeMap::new();
    let mut strip_details = BTreeMap::new();
    for strip in active_strips(as_of, num_strips) {
        if let Some(agg) = aggregate_strip(&quotes, strip, as_of) {
            let name = strip.name();
            strips.insert(name.clone(), agg.price);
            strip_details.insert(name.clone(), agg.details);
            strip_names.push(name);
        }
    }

    if strips.is_empty() && prompt_price.is_none() {
        return Err(Error::NoCurveData(format!(
            "{} on {}: no prompt or strip prices",
            curve.location, curve.issue_date
        )));
    }

    Ok(DayStrips {
        strip_names,
        row: StripPriceRow {
            trade_date,
            prompt_contract: prompt_contract.clone(),
            prompt_price,
            strips,
        },
        detail: StripDetailRow {
            trade_date,
            prompt_contract,
            prompt_price,
            strip_details,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_date;

    fn curve(issue: &str, contracts: &[&str], fixed: &[Option<f64>]) -> ForwardCurve {
        ForwardCurve {
            issue_date: parse_date(issue).unwrap(),
            location: "Henry Hub".into(),
            contracts: contracts.iter().map(|c| c.to_string()).collect(),
            fixed_prices: fixed.to_vec(),
            basis_prices: fixed.iter().map(|p| p.map(|v| v - 3.0)).collect(),
        }
    }

    #[test]
    fn end_of_october_scenario() {
        let c = curve(
            "2025-10-31",
            &["2025-11-01", "2025-12-01", "2026-01-01"],
            &[Some(3.0), Some(3.5), Some(4.0)],
        );
        let day = evaluate_day(&c, PriceType::Fixed, parse_date("2025-10-30").unwrap(), 5).unwrap();

        assert_eq!(day.row.trade_date.to_string(), "2025-10-30");
        assert_eq!(day.row.prompt_contract.as_deref(), Some("2025-11-01"));
        assert_eq!(day.row.prompt_price, Some(3.0));
        // Summer 2025 has nothing left to deliver; only the winter prices.
        assert_eq!(day.strip_names, vec!["Winter 2025/2026".to_string()]);
        assert_eq!(day.row.strips["Winter 2025/2026"], 3.5);
        assert_eq!(day.detail.strip_details["Winter 2025/2026"].len(), 3);
    }

    #[test]
    fn basis_prices_are_selected() {
        let c = curve("2025-10-31", &["2025-11-01", "2025-12-01"], &[Some(3.0), Some(3.5)]);
        let day = evaluate_day(&c, PriceType::Basis, parse_date("2025-10-30").unwrap(), 5).unwrap();
        assert_eq!(day.row.prompt_price, Some(0.0));
        assert_eq!(day.row.strips["Winter 2025/2026"], 0.25);
    }

    #[test]
    fn strip_names_follow_chronology() {
        let c = curve(
            "2025-06-03",
            &["2025-07-01", "2025-11-01", "2026-04-01", "2026-11-01"],
            &[Some(3.0), Some(4.0), Some(3.2), Some(4.4)],
        );
        let day = evaluate_day(&c, PriceType::Fixed, parse_date("2025-06-02").unwrap(), 5).unwrap();
        assert_eq!(
            day.strip_names,
            vec!["Summer 2025", "Winter 2025/2026", "Summer 2026", "Winter 2026/2027"]
        );
    }

    #[test]
    fn num_strips_limits_output() {
        let c = curve(
            "2025-06-03",
            &["2025-07-01", "2025-11-01", "2026-04-01"],
            &[Some(3.0), Some(4.0), Some(3.2)],
        );
        let day = evaluate_day(&c, PriceType::Fixed, parse_date("2025-06-02").unwrap(), 2).unwrap();
        assert_eq!(day.row.strips.len(), 2);
        assert!(!day.row.strips.contains_key("Summer 2026"));
    }

    #[test]
    fn curve_with_only_past_months_is_no_data() {
        let c = curve("2025-10-31", &["2025-09-01", "2025-10-01"], &[Some(2.8), Some(2.9)]);
        let err = evaluate_day(&c, PriceType::Fixed, parse_date("2025-10-30").unwrap(), 5).unwrap_err();
        assert!(matches!(err, Error::NoCurveData(_)));
    }

    #[test]
    fn empty_curve_is_no_data() {
        let c = curve("2025-10-31", &[], &[]);
        assert!(matches!(
            evaluate_day(&c, PriceType::Fixed, parse_date("2025-10-30").unwrap(), 5),
            Err(Error::NoCurveData(_))
        ));
    }

    #[test]
    fn unpriced_prompt_still_reports_contract() {
        let c = curve("2025-10-31", &["2025-11-01", "2025-12-01"], &[None, Some(3.5)]);
        let day = evaluate_day(&c, PriceType::Fixed, parse_date("2025-10-30").unwrap(), 5).unwrap();
        assert_eq!(day.row.prompt_contract.as_deref(), Some("2025-11-01"));
        assert_eq!(day.row.prompt_price, None);
        assert_eq!(day.row.strips["Winter 2025/2026"], 3.5);
    }
}
