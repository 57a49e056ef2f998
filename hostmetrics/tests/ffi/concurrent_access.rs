//! Concurrent access tests for the facade
//!
//! Each call allocates its own destination, so one facade shared across
//! threads must behave exactly like one facade per thread.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::common::{find_native_library, linked_metrics};
use hostmetrics::HostMetrics;

fn hammer(metrics: Arc<HostMetrics>, threads: usize, rounds: usize) {
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let metrics = Arc::clone(&metrics);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..rounds {
                    let memory = metrics.memory_info().unwrap();
                    assert!(memory.used <= memory.total);

                    let disks = metrics.disk_usage_by_partition().unwrap();
                    assert!(disks.iter().all(|(mount, d)| &d.path == mount));

                    metrics.temperatures().unwrap();
                    metrics.network_info().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }
}

#[test]
fn test_concurrent_calls_linked() {
    hammer(Arc::new(linked_metrics()), 8, 10);
}

#[test]
fn test_concurrent_calls_loaded() {
    let Some(path) = find_native_library() else {
        eprintln!("skipping: hostmetrics_native cdylib not built");
        return;
    };
    hammer(Arc::new(HostMetrics::open(path).unwrap()), 8, 10);
}

#[cfg(target_os = "linux")]
#[test]
fn test_concurrent_descriptor_use() {
    // Different container shapes in flight at the same time
    let metrics = Arc::new(linked_metrics());
    let a = {
        let metrics = Arc::clone(&metrics);
        thread::spawn(move || {
            for _ in 0..20 {
                metrics.disk_io_by_partition().unwrap();
            }
        })
    };
    let b = {
        let metrics = Arc::clone(&metrics);
        thread::spawn(move || {
            for _ in 0..20 {
                metrics.temperatures().unwrap();
            }
        })
    };
    a.join().expect("Thread should not panic");
    b.join().expect("Thread should not panic");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cpu_sampling() {
    let metrics = Arc::new(linked_metrics());

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                metrics
                    .cpu_percent(Duration::from_millis(50), std::future::pending())
                    .await
            })
        })
        .collect();

    for task in tasks {
        let cpu = task.await.unwrap().unwrap();
        assert!((0.0..=100.0).contains(&cpu));
    }
}
