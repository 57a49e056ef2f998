//! Metric invariants on the real host, through the linked native exports.

use hostmetrics_native::disk_io::is_physical_disk;

use crate::common::linked_metrics;

#[test]
fn test_memory_invariants() {
    let memory = linked_metrics().memory_info().unwrap();

    assert!(memory.total > 0);
    assert!(memory.used <= memory.total);
    assert!(memory.available <= memory.total);
    assert!(memory.free <= memory.total);
    assert!((0.0..=100.0).contains(&memory.used_percent));
}

#[test]
fn test_partition_usage_within_total() {
    let disks = linked_metrics().disk_usage_by_partition().unwrap();

    for (mount, disk) in &disks {
        assert_eq!(&disk.path, mount);
        assert!(disk.used <= disk.total, "{mount}: used > total");
        assert!(disk.free <= disk.total, "{mount}: free > total");
    }
}

#[test]
fn test_partition_keys_are_stable() {
    let metrics = linked_metrics();
    let first = metrics.disk_usage_by_partition().unwrap();
    let second = metrics.disk_usage_by_partition().unwrap();

    assert!(first.keys().eq(second.keys()));
}

#[cfg(unix)]
#[test]
fn test_disk_usage_of_root() {
    let disk = linked_metrics().disk_usage("/").unwrap();

    assert_eq!(disk.path, "/");
    assert!(disk.total > 0);
    assert!(disk.used <= disk.total);
    assert!(disk.device.is_empty());
}

#[test]
fn test_disk_usage_of_missing_path_fails() {
    let err = linked_metrics()
        .disk_usage("/nonexistent/hostmetrics/mount")
        .unwrap_err();
    assert_eq!(err.kind(), hostmetrics::ErrorKind::CallFailure);
}

#[cfg(target_os = "linux")]
#[test]
fn test_disk_io_only_physical_devices() {
    let io = linked_metrics().disk_io_by_partition().unwrap();

    for (name, counters) in &io {
        assert!(is_physical_disk(name), "unexpected device {name}");
        assert_eq!(&counters.name, name);
        assert_eq!(counters.iops, 0);
    }
}

#[test]
fn test_network_counters() {
    let net = linked_metrics().network_info().unwrap();
    // Speeds are only derived by a NetRates tracker
    assert_eq!(net.upload_speed, 0.0);
    assert_eq!(net.download_speed, 0.0);
}

#[test]
fn test_sensor_keys_are_formatted() {
    let sensors = linked_metrics().temperatures().unwrap();

    for sensor in &sensors {
        assert!(!sensor.sensor_key.is_empty());
        assert!(!sensor.sensor_key.contains(' '));
        assert_eq!(sensor.sensor_key, sensor.sensor_key.to_lowercase());
    }
}

#[test]
fn test_native_version_reported() {
    assert!(!linked_metrics().native_version().is_empty());
}
