//! Tabular renderings of a finished report: a tab-separated table for
//! pasting into a spreadsheet, and CSV sheets mirroring the workbook export
//! (one summary sheet plus one sheet per strip).

use std::collections::{BTreeMap, BTreeSet};

use common::{Error, Result, StripReport};
use strips::round_price;

/// Longest sheet name spreadsheet applications accept.
const MAX_SHEET_NAME: usize = 31;

/// `Trade Date`, `Prompt`, then one column per strip; prices to 3 decimals,
/// blanks where a value is absent.
pub fn clipboard_table(report: &StripReport) -> String {
    let mut out = String::new();

    let header: Vec<&str> = ["Trade Date", "Prompt"]
        .into_iter()
        .chain(report.strip_names.iter().map(String::as_str))
        .collect();
    out.push_str(&header.join("\t"));
    out.push('\n');

    for row in &report.data {
        let mut cells = vec![row.trade_date.to_string(), fmt_price(row.prompt_price)];
        cells.extend(
            report
                .strip_names
                .iter()
                .map(|name| fmt_price(row.strips.get(name).copied())),
        );
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Sheet name for a strip: at most 31 characters, `/` replaced by `-`.
pub fn sheet_name(strip_name: &str) -> String {
    strip_name
        .chars()
        .take(MAX_SHEET_NAME)
        .map(|c| if c == '/' { '-' } else { c })
        .collect()
}

/// Run parameters followed by one row per trade date. Strip columns are
/// recomputed from the retained contract details.
pub fn summary_csv(report: &StripReport) -> Result<String> {
    let mut w = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());

    w.write_record(["Location:", report.location.as_str()])?;
    w.write_record(["Price Type:", report.price_type.to_string().as_str()])?;
    w.write_record(["Start Date:", report.start_date.to_string().as_str()])?;
    w.write_record(["End Date:", report.end_date.to_string().as_str()])?;

    let mut header = vec![
        "Trade Date".to_string(),
        "Prompt Contract".to_string(),
        "Prompt Price".to_string(),
    ];
    header.extend(report.strip_names.iter().cloned());
    w.write_record(&header)?;

    for entry in &report.detailed_data {
        let mut record = vec![
            entry.trade_date.to_string(),
            entry.prompt_contract.clone().unwrap_or_default(),
            fmt_number(entry.prompt_price),
        ];
        for name in &report.strip_names {
            let avg = entry
                .strip_details
                .get(name)
                .filter(|d| !d.is_empty())
                .map(|d| round_price(d.iter().map(|c| c.price).sum::<f64>() / d.len() as f64));
            record.push(fmt_number(avg));
        }
        w.write_record(&record)?;
    }

    finish(w)
}

/// One strip's contracts side by side: `Trade Date`, each contract seen in
/// the run (sorted), `Average`.
pub fn strip_sheet_csv(report: &StripReport, strip_name: &str) -> Result<String> {
    if !report.strip_names.iter().any(|n| n == strip_name) {
        return Err(Error::InvalidRequest(format!(
            "strip '{strip_name}' is not part of this report"
        )));
    }

    let contracts: BTreeSet<&str> = report
        .detailed_data
        .iter()
        .filter_map(|e| e.strip_details.get(strip_name))
        .flatten()
        .map(|d| d.contract.as_str())
        .collect();

    let mut w = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Trade Date"];
    header.extend(contracts.iter().copied());
    header.push("Average");
    w.write_record(&header)?;

    for entry in &report.detailed_data {
        let by_contract: BTreeMap<&str, f64> = entry
            .strip_details
            .get(strip_name)
            .into_iter()
            .flatten()
            .map(|d| (d.contract.as_str(), d.price))
            .collect();

        let mut record = vec![entry.trade_date.to_string()];
        record.extend(
            contracts
                .iter()
                .map(|c| fmt_number(by_contract.get(c).copied().map(round_price))),
        );
        let avg = (!by_contract.is_empty()).then(|| {
            round_price(by_contract.values().sum::<f64>() / by_contract.len() as f64)
        });
        record.push(fmt_number(avg));
        w.write_record(&record)?;
    }

    finish(w)
}

fn finish(w: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = w
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

fn fmt_price(price: Option<f64>) -> String {
    price.map(|p| format!("{p:.3}")).unwrap_or_default()
}

fn fmt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
