use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{ForwardCurve, Result};

/// Source of published forward curves.
///
/// `NgiClient` implements this against the live datafeed.
/// `ReplayProvider` implements this from recorded snapshots.
///
/// Implementations report a date with no published curve (weekend, holiday)
/// as `Error::NoCurveData` and transport or decoding failures as
/// `Error::ProviderUnavailable`. The batch runner treats both as a skipped
/// day. No timeout is applied by callers; wrap the provider if one is needed.
#[async_trait]
pub trait ForwardCurveProvider: Send + Sync {
    /// Fetch the curve issued on `issue_date` for the named location.
    async fn forward_curve(&self, issue_date: NaiveDate, location: &str) -> Result<ForwardCurve>;
}
