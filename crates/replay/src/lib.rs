use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{Error, ForwardCurve, ForwardCurveProvider, Result};

type CurveKey = (NaiveDate, String);

/// Forward curve provider backed by recorded snapshots.
///
/// Curves are keyed by issue date and location name. Anything not recorded
/// answers `NoCurveData`, the same way the live feed answers for a weekend
/// or a location it does not publish. Nothing is ever fetched over the
/// network.
#[derive(Clone, Default)]
pub struct ReplayProvider {
    curves: Arc<RwLock<HashMap<CurveKey, ForwardCurve>>>,
}

impl ReplayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON array of curves:
    /// `[{"issue_date", "location", "contracts", "fixed_prices", "basis_prices"}]`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let curves: Vec<ForwardCurve> = serde_json::from_str(json)?;
        let map = curves
            .into_iter()
            .map(|c| ((c.issue_date, c.location.clone()), c))
            .collect::<HashMap<_, _>>();
        info!(curves = map.len(), "ReplayProvider initialized");
        Ok(Self {
            curves: Arc::new(RwLock::new(map)),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading recorded forward curves");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Record a curve, replacing any earlier one for the same issue date and
    /// location.
    pub async fn insert(&self, curve: ForwardCurve) {
        self.curves
            .write()
            .await
            .insert((curve.issue_date, curve.location.clone()), curve);
    }

    pub async fn len(&self) -> usize {
        self.curves.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.curves.read().await.is_empty()
    }
}

#[async_trait]
impl ForwardCurveProvider for ReplayProvider {
    async fn forward_curve(&self, issue_date: NaiveDate, location: &str) -> Result<ForwardCurve> {
        self.curves
            .read()
            .await
            .get(&(issue_date, location.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::NoCurveData(format!("no recorded curve for {location} on {issue_date}"))
            })
    }
}
