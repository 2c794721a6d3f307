use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use common::{
    CalculationRequest, Error, ForwardCurve, ForwardCurveProvider, PriceType, Result, RunState,
};
use engine::{BatchRunner, RunHandle};
use replay::ReplayProvider;
use strips::parse_date;

fn d(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn curve(issue: &str, contracts: &[&str], fixed: &[f64]) -> ForwardCurve {
    ForwardCurve {
        issue_date: d(issue),
        location: "Henry Hub".into(),
        contracts: contracts.iter().map(|c| c.to_string()).collect(),
        fixed_prices: fixed.iter().copied().map(Some).collect(),
        basis_prices: fixed.iter().map(|p| Some(p - 3.0)).collect(),
    }
}

fn winter_curve(issue: &str) -> ForwardCurve {
    curve(
        issue,
        &["2025-11-01", "2025-12-01", "2026-01-01", "2026-02-01", "2026-03-01", "2026-04-01"],
        &[3.0, 3.5, 4.0, 3.9, 3.6, 3.2],
    )
}

fn request(start: &str, end: &str) -> CalculationRequest {
    CalculationRequest {
        location: "Henry Hub".into(),
        start_date: d(start),
        end_date: d(end),
        price_type: PriceType::Fixed,
        num_strips: 5,
    }
}

/// Answers every fetch with the same error.
struct FailingProvider(fn() -> Error);

#[async_trait]
impl ForwardCurveProvider for FailingProvider {
    async fn forward_curve(&self, _issue_date: NaiveDate, _location: &str) -> Result<ForwardCurve> {
        Err((self.0)())
    }
}

/// Serves every day except one, which fails with an I/O error.
struct FlakyIoProvider {
    failing_issue: NaiveDate,
}

#[async_trait]
impl ForwardCurveProvider for FlakyIoProvider {
    async fn forward_curve(&self, issue_date: NaiveDate, _location: &str) -> Result<ForwardCurve> {
        if issue_date == self.failing_issue {
            return Err(Error::Io(std::io::Error::other("read timed out")));
        }
        Ok(winter_curve(&issue_date.to_string()))
    }
}

/// Serves curves and cancels the run once `cancel_after` fetches completed.
struct CancellingProvider {
    calls: AtomicUsize,
    cancel_after: usize,
    handle: Mutex<Option<RunHandle>>,
}

#[async_trait]
impl ForwardCurveProvider for CancellingProvider {
    async fn forward_curve(&self, issue_date: NaiveDate, _location: &str) -> Result<ForwardCurve> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.cancel_after {
            if let Some(handle) = self.handle.lock().unwrap().as_ref() {
                handle.cancel();
            }
        }
        Ok(winter_curve(&issue_date.to_string()))
    }
}

#[tokio::test]
async fn end_of_october_trade_date() {
    let replay = ReplayProvider::new();
    replay
        .insert(curve(
            "2025-10-31",
            &["2025-11-01", "2025-12-01", "2026-01-01"],
            &[3.0, 3.5, 4.0],
        ))
        .await;

    let (runner, _handle) = BatchRunner::new(Arc::new(replay), request("2025-10-30", "2025-10-30"));
    let report = runner.run().await.unwrap();

    assert_eq!(report.data.len(), 1);
    let row = &report.data[0];
    assert_eq!(row.trade_date, d("2025-10-30"));
    assert_eq!(row.prompt_contract.as_deref(), Some("2025-11-01"));
    assert_eq!(row.prompt_price, Some(3.0));
    assert_eq!(row.strips["Winter 2025/2026"], 3.5);
    assert_eq!(report.strip_names, vec!["Winter 2025/2026".to_string()]);
}

#[tokio::test]
async fn missing_days_are_skipped_and_counted() {
    // Trade dates Mon 27 .. Fri 31 Oct map to issue dates 28, 29, 30, 31 Oct
    // and Mon 3 Nov. Only three of them were published.
    let replay = ReplayProvider::new();
    for issue in ["2025-10-28", "2025-10-30", "2025-11-03"] {
        replay.insert(winter_curve(issue)).await;
    }

    let (runner, handle) = BatchRunner::new(Arc::new(replay), request("2025-10-27", "2025-10-31"));
    let report = runner.run().await.unwrap();

    assert_eq!(report.dates_processed, 3);
    assert_eq!(report.dates_skipped, 2);
    let trade_dates: Vec<_> = report.data.iter().map(|r| r.trade_date).collect();
    assert_eq!(trade_dates, vec![d("2025-10-27"), d("2025-10-29"), d("2025-10-31")]);
    assert_eq!(report.detailed_data.len(), 3);

    // On issue date 3 Nov the November contract is no longer eligible.
    let last = &report.data[2];
    assert_eq!(last.prompt_contract.as_deref(), Some("2025-12-01"));
    assert_eq!(last.strips["Winter 2025/2026"], 3.75);
    assert_eq!(last.strips["Summer 2026"], 3.2);

    let progress = handle.progress().await;
    assert_eq!(progress.state, RunState::Completed);
    assert_eq!((progress.current, progress.total), (5, 5));
    assert_eq!((progress.processed, progress.skipped), (3, 2));
}

#[tokio::test]
async fn strip_names_are_collected_in_first_seen_order() {
    let replay = ReplayProvider::new();
    replay.insert(winter_curve("2025-10-28")).await;
    replay.insert(winter_curve("2025-11-03")).await;

    let (runner, _) = BatchRunner::new(Arc::new(replay), request("2025-10-27", "2025-10-31"));
    let report = runner.run().await.unwrap();

    assert_eq!(report.strip_names, vec!["Winter 2025/2026", "Summer 2026"]);
}

#[tokio::test]
async fn basis_run_selects_basis_prices() {
    let replay = ReplayProvider::new();
    replay.insert(winter_curve("2025-10-31")).await;

    let mut req = request("2025-10-30", "2025-10-30");
    req.price_type = PriceType::Basis;
    let (runner, _) = BatchRunner::new(Arc::new(replay), req);
    let report = runner.run().await.unwrap();

    assert_eq!(report.price_type, PriceType::Basis);
    assert_eq!(report.data[0].prompt_price, Some(0.0));
}

#[tokio::test]
async fn every_day_failing_is_no_data() {
    let provider = FailingProvider(|| Error::ProviderUnavailable("HTTP 503".into()));
    let (runner, handle) = BatchRunner::new(Arc::new(provider), request("2025-10-27", "2025-10-31"));

    assert!(matches!(runner.run().await, Err(Error::NoData)));
    let progress = handle.progress().await;
    assert_eq!(progress.state, RunState::Failed);
    assert_eq!(progress.skipped, 5);
    assert!(progress.error.is_some());
}

#[tokio::test]
async fn weekend_only_range_is_no_data() {
    let (runner, _) = BatchRunner::new(Arc::new(ReplayProvider::new()), request("2025-11-01", "2025-11-02"));
    assert!(matches!(runner.run().await, Err(Error::NoData)));
}

#[tokio::test]
async fn io_error_on_one_day_is_skipped() {
    let provider = FlakyIoProvider {
        failing_issue: d("2025-10-29"),
    };
    let (runner, handle) = BatchRunner::new(Arc::new(provider), request("2025-10-27", "2025-10-31"));

    let report = runner.run().await.unwrap();
    assert_eq!(report.dates_processed, 4);
    assert_eq!(report.dates_skipped, 1);
    assert!(report.data.iter().all(|r| r.trade_date != d("2025-10-28")));
    assert_eq!(handle.state().await, RunState::Completed);
}

#[tokio::test]
async fn io_errors_on_every_day_are_no_data() {
    let provider = FailingProvider(|| Error::Io(std::io::Error::other("disk gone")));
    let (runner, handle) = BatchRunner::new(Arc::new(provider), request("2025-10-27", "2025-10-31"));

    assert!(matches!(runner.run().await, Err(Error::NoData)));
    assert_eq!(handle.progress().await.skipped, 5);
}

#[tokio::test]
async fn invalid_requests_fail_before_fetching() {
    let provider = Arc::new(ReplayProvider::new());

    let (runner, handle) = BatchRunner::new(provider.clone(), request("2025-11-05", "2025-11-01"));
    assert!(matches!(runner.run().await, Err(Error::InvalidDate(_))));
    assert_eq!(handle.progress().await.total, 0);

    let mut req = request("2025-10-27", "2025-10-31");
    req.num_strips = 0;
    let (runner, _) = BatchRunner::new(provider, req);
    assert!(matches!(runner.run().await, Err(Error::InvalidRequest(_))));
}

#[tokio::test]
async fn cancellation_keeps_partial_results() {
    let provider = Arc::new(CancellingProvider {
        calls: AtomicUsize::new(0),
        cancel_after: 2,
        handle: Mutex::new(None),
    });
    let (runner, handle) = BatchRunner::new(provider.clone(), request("2025-10-27", "2025-10-31"));
    *provider.handle.lock().unwrap() = Some(handle.clone());

    let partial = match runner.run().await {
        Err(Error::Cancelled { partial }) => partial,
        other => panic!("expected cancellation, got {other:?}"),
    };
    // The fetch in flight when cancel was requested still counts.
    assert_eq!(partial.data.len(), 2);
    assert_eq!(partial.dates_processed, 2);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(handle.state().await, RunState::Cancelled);
}

#[tokio::test]
async fn cancelled_before_start_returns_empty_partial() {
    let (runner, handle) = BatchRunner::new(Arc::new(ReplayProvider::new()), request("2025-10-27", "2025-10-31"));
    handle.cancel();
    assert!(handle.is_cancelled());

    match runner.run().await {
        Err(Error::Cancelled { partial }) => assert!(partial.data.is_empty()),
        other => panic!("expected cancellation, got {other:?}"),
    }
}
