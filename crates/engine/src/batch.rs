use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::{
    CalculationRequest, Error, ForwardCurveProvider, Result, RunProgress, RunState,
    StripDetailRow, StripPriceRow, StripReport,
};
use strips::{add_business_days, business_dates, evaluate_day, DayStrips};

/// Cloneable handle for watching and cancelling a run from other tasks
/// (the API, a signal handler).
#[derive(Clone, Default)]
pub struct RunHandle {
    progress: Arc<RwLock<RunProgress>>,
    cancelled: Arc<AtomicBool>,
}

impl RunHandle {
    /// Ask the run to stop. Checked once per trade date; a fetch already in
    /// flight is allowed to finish.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub async fn progress(&self) -> RunProgress {
        self.progress.read().await.clone()
    }

    pub async fn state(&self) -> RunState {
        self.progress.read().await.state
    }
}

/// Runs one strip calculation: one provider fetch per business day,
/// strictly in date order, one at a time.
pub struct BatchRunner {
    run_id: Uuid,
    request: CalculationRequest,
    provider: Arc<dyn ForwardCurveProvider>,
    handle: RunHandle,
}

impl BatchRunner {
    pub fn new(
        provider: Arc<dyn ForwardCurveProvider>,
        request: CalculationRequest,
    ) -> (Self, RunHandle) {
        let run_id = Uuid::new_v4();
        let handle = RunHandle::default();
        let runner = BatchRunner {
            run_id,
            request,
            provider,
            handle: handle.clone(),
        };
        (runner, handle)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run to completion, cancellation or failure.
    ///
    /// Any day that fails to fetch or evaluate is skipped and counted.
    /// Fails with `InvalidDate`/`InvalidRequest` before any fetch, with
    /// `NoData` when no day produced a row, and with `Cancelled` (carrying
    /// the rows gathered so far) when the handle was cancelled.
    pub async fn run(self) -> Result<StripReport> {
        let handle = self.handle.clone();
        {
            let mut p = handle.progress.write().await;
            *p = RunProgress {
                run_id: Some(self.run_id),
                state: RunState::Running,
                ..RunProgress::default()
            };
        }

        let result = self.execute().await;

        let mut p = handle.progress.write().await;
        match &result {
            Ok(report) => {
                p.state = RunState::Completed;
                info!(
                    processed = report.dates_processed,
                    skipped = report.dates_skipped,
                    "Strip calculation completed"
                );
            }
            Err(Error::Cancelled { partial }) => {
                p.state = RunState::Cancelled;
                warn!(processed = partial.dates_processed, "Strip calculation cancelled");
            }
            Err(e) => {
                p.state = RunState::Failed;
                p.error = Some(e.to_string());
                warn!(error = %e, "Strip calculation failed");
            }
        }
        result
    }

    async fn execute(&self) -> Result<StripReport> {
        let req = &self.request;
        if req.num_strips == 0 {
            return Err(Error::InvalidRequest("num_strips must be at least 1".into()));
        }
        if req.start_date > req.end_date {
            return Err(Error::InvalidDate(format!(
                "start date {} is after end date {}",
                req.start_date, req.end_date
            )));
        }

        let trade_dates: Vec<NaiveDate> = business_dates(req.start_date, req.end_date).collect();
        let total = trade_dates.len();
        self.handle.progress.write().await.total = total;

        info!(
            run_id = %self.run_id,
            location = %req.location,
            price_type = %req.price_type,
            strips = req.num_strips,
            "Starting strip calculation"
        );
        info!(
            "Trade date range: {} to {}; issue date range: {} to {}; {} business days",
            req.start_date,
            req.end_date,
            add_business_days(req.start_date, 1)?,
            add_business_days(req.end_date, 1)?,
            total
        );

        let mut report = ReportBuilder::new(self.run_id, req);

        for (i, &trade_date) in trade_dates.iter().enumerate() {
            if self.handle.is_cancelled() {
                warn!("Calculation cancelled by user");
                return Err(Error::Cancelled {
                    partial: Box::new(report.finish()),
                });
            }

            let step = i + 1;
            let issue_date = add_business_days(trade_date, 1)?;
            info!("[{step}/{total}] Fetching issue date {issue_date} (trade {trade_date})");

            let outcome = self
                .provider
                .forward_curve(issue_date, &req.location)
                .await
                .and_then(|curve| evaluate_day(&curve, req.price_type, trade_date, req.num_strips));

            match outcome {
                Ok(day) => {
                    info!(
                        "[{step}/{total}] {trade_date} - {} strips calculated",
                        day.row.strips.len()
                    );
                    report.push(day);
                }
                // A failed day never stops the run; only the log level differs.
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("[{step}/{total}] {issue_date} - skipped: {e}");
                    } else {
                        error!("[{step}/{total}] {issue_date} - skipped after unexpected error: {e}");
                    }
                    report.skip();
                }
            }

            let mut p = self.handle.progress.write().await;
            p.current = step;
            p.processed = report.rows.len();
            p.skipped = report.skipped;
        }

        if report.rows.is_empty() {
            return Err(Error::NoData);
        }
        Ok(report.finish())
    }
}

/// Append-only accumulator for one run.
struct ReportBuilder<'a> {
    run_id: Uuid,
    request: &'a CalculationRequest,
    strip_names: Vec<String>,
    rows: Vec<StripPriceRow>,
    details: Vec<StripDetailRow>,
    skipped: usize,
}

impl<'a> ReportBuilder<'a> {
    fn new(run_id: Uuid, request: &'a CalculationRequest) -> Self {
        Self {
            run_id,
            request,
            strip_names: Vec::new(),
            rows: Vec::new(),
            details: Vec::new(),
            skipped: 0,
        }
    }

    fn push(&mut self, day: DayStrips) {
        for name in day.strip_names {
            if !self.strip_names.contains(&name) {
                self.strip_names.push(name);
            }
        }
        self.rows.push(day.row);
        self.details.push(day.detail);
    }

    fn skip(&mut self) {
        self.skipped += 1;
    }

    fn finish(&self) -> StripReport {
        StripReport {
            run_id: self.run_id,
            location: self.request.location.clone(),
            price_type: self.request.price_type,
            start_date: self.request.start_date,
            end_date: self.request.end_date,
            num_strips: self.request.num_strips,
            dates_processed: self.rows.len(),
            dates_skipped: self.skipped,
            strip_names: self.strip_names.clone(),
            data: self.rows.clone(),
            detailed_data: self.details.clone(),
        }
    }
}
