//! CPU sampling protocol: timing and cancellation.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use hostmetrics::{Bindings, Error, ErrorKind, Metric};
use hostmetrics_core::RawCpuTimes;

use crate::common::{linked_metrics, metrics_with, native_bindings};

unsafe extern "C" fn failing_cpu(_: *mut RawCpuTimes) -> bool {
    false
}

static HALF_BUSY_START: OnceLock<Instant> = OnceLock::new();

/// One tick per millisecond since the first sample. The core is busy for
/// the first 500 ticks and idle afterwards.
unsafe extern "C" fn half_busy_cpu(out: *mut RawCpuTimes) -> bool {
    let start = *HALF_BUSY_START.get_or_init(Instant::now);
    let total = start.elapsed().as_millis() as u64;
    *out = RawCpuTimes {
        busy: total.min(500),
        total,
    };
    true
}

#[tokio::test]
async fn test_waits_for_full_interval() {
    let metrics = linked_metrics();
    let interval = Duration::from_millis(150);

    let start = Instant::now();
    let cpu = metrics
        .cpu_percent(interval, std::future::pending())
        .await
        .unwrap();

    assert!(start.elapsed() >= interval);
    assert!((0.0..=100.0).contains(&cpu));
}

#[tokio::test]
async fn test_cancel_before_interval() {
    let metrics = linked_metrics();
    let interval = Duration::from_secs(5);

    let start = Instant::now();
    let err = metrics
        .cpu_percent(interval, tokio::time::sleep(Duration::from_millis(20)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Cancelled {
            metric: Metric::CpuPercent
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Cancellation);
    assert!(start.elapsed() < interval);
}

#[tokio::test]
async fn test_already_cancelled() {
    let metrics = linked_metrics();
    let err = metrics
        .cpu_percent(Duration::from_millis(200), std::future::ready(()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancellation);
}

#[tokio::test]
async fn test_cancel_with_oneshot() {
    let metrics = linked_metrics();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = tx.send(());
    });

    let cancel = async move {
        let _ = rx.await;
    };
    let result = metrics.cpu_percent(Duration::from_secs(5), cancel).await;
    assert!(matches!(result, Err(Error::Cancelled { .. })));
}

#[tokio::test]
async fn test_failed_sample_is_call_failure() {
    let metrics = metrics_with(Bindings {
        cpu_times: failing_cpu,
        ..native_bindings()
    });
    let err = metrics
        .cpu_percent(Duration::from_millis(10), std::future::pending())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallFailure);
    assert_eq!(err.metric(), Some(Metric::CpuPercent));
}

#[tokio::test]
async fn test_second_caller_does_not_shorten_window() {
    let metrics = metrics_with(Bindings {
        cpu_times: half_busy_cpu,
        ..native_bindings()
    });

    // A spans the busy half and the idle half; B samples only idle time
    // while A is still waiting.
    let long = metrics.cpu_percent(Duration::from_millis(1000), std::future::pending());
    let short = async {
        tokio::time::sleep(Duration::from_millis(600)).await;
        metrics
            .cpu_percent(Duration::ZERO, std::future::pending())
            .await
    };
    let (long, short) = tokio::join!(long, short);

    let long = long.unwrap();
    assert!((40.0..=50.0).contains(&long), "window reading was {long}");
    assert_eq!(short.unwrap(), 0.0);
}

#[tokio::test]
async fn test_snapshot() {
    let metrics = linked_metrics();
    let info = metrics
        .snapshot(Duration::from_millis(50), std::future::pending())
        .await
        .unwrap();

    assert!(info.timestamp > 0);
    assert!(info.cpu_average.is_some());
    assert!(info.memory.total > 0);

    let json = serde_json::to_value(&info).unwrap();
    assert!(json["memory"]["used_percent"].is_number());
}

#[tokio::test]
async fn test_cancelled_snapshot() {
    let metrics = linked_metrics();
    let err = metrics
        .snapshot(Duration::from_secs(5), std::future::ready(()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancellation);
}
