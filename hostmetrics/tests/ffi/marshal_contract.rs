//! Container marshaling through the facade, driven by fake exports.

use hostmetrics::{Bindings, Error, ErrorKind, Metric};
use hostmetrics_core::{EntrySink, FfiStr, RawDiskUsageStat, RawMemory};

use crate::common::{
    emit_partition, emit_sensor, metrics_with, native_bindings, partition_sink, sensor_sink,
};

const GIB: u64 = 1024 * 1024 * 1024;

unsafe extern "C" fn duplicate_mounts(sink: *const EntrySink) -> bool {
    let Some(sink) = partition_sink(sink) else {
        return false;
    };
    emit_partition(sink, "/", 100, 10);
    emit_partition(sink, "/boot", 100, 50);
    emit_partition(sink, "/", 100, 70);
    true
}

unsafe extern "C" fn partial_then_fail(sink: *const EntrySink) -> bool {
    let Some(sink) = partition_sink(sink) else {
        return false;
    };
    emit_partition(sink, "/", 100, 10);
    emit_partition(sink, "/home", 100, 20);
    false
}

unsafe extern "C" fn null_value(sink: *const EntrySink) -> bool {
    let Some(sink) = partition_sink(sink) else {
        return false;
    };
    emit_partition(sink, "/", 100, 10);
    let key = FfiStr::from_str("/broken");
    (sink.insert)(sink.target, &key, std::ptr::null());
    true
}

unsafe extern "C" fn no_partitions(sink: *const EntrySink) -> bool {
    partition_sink(sink).is_some()
}

unsafe extern "C" fn transient_text(sink: *const EntrySink) -> bool {
    let Some(sink) = partition_sink(sink) else {
        return false;
    };
    // Text lives only for the duration of each emit
    for i in 0..16 {
        let mount = format!("/mnt/volume{i}");
        emit_partition(sink, &mount, 1000, i);
    }
    true
}

const BLOCK: u64 = 4096;
const RESERVED_BLOCKS: u64 = 20;

/// One ext4 root whose reserved blocks are counted in neither used nor free.
unsafe extern "C" fn single_partition(sink: *const EntrySink) -> bool {
    let Some(sink) = partition_sink(sink) else {
        return false;
    };
    let total = 1000 * BLOCK;
    let used = 600 * BLOCK;
    let free = total - used - RESERVED_BLOCKS * BLOCK;
    let key = FfiStr::from_str("/");
    let record = RawDiskUsageStat {
        device: FfiStr::from_str("/dev/sda1"),
        path: key,
        fstype: FfiStr::from_str("ext4"),
        total,
        free,
        used,
        used_percent: hostmetrics_core::usage_percent(used, free),
    };
    sink.emit(Some(&key), &record);
    true
}

unsafe extern "C" fn two_sensors(sink: *const EntrySink) -> bool {
    let Some(sink) = sensor_sink(sink) else {
        return false;
    };
    emit_sensor(sink, "coretemp_package_id_0", 45.0);
    emit_sensor(sink, "nvme_composite", 38.5);
    true
}

unsafe extern "C" fn half_memory(out: *mut RawMemory) -> bool {
    let total = 16 * GIB;
    let used = 8 * GIB;
    *out = RawMemory {
        total,
        available: total - used,
        used,
        used_percent: hostmetrics_native::memory::memory_percent(used, total),
        free: total - used,
    };
    true
}

unsafe extern "C" fn failing_disk_usage(_: *const FfiStr, _: *mut RawDiskUsageStat) -> bool {
    false
}

fn with_partitions(f: hostmetrics_core::symbols::EntriesFn) -> Bindings {
    Bindings {
        disk_usage_by_partition: f,
        ..native_bindings()
    }
}

#[test]
fn test_duplicate_keys_last_write_wins() {
    let metrics = metrics_with(with_partitions(duplicate_mounts));
    let disks = metrics.disk_usage_by_partition().unwrap();

    assert_eq!(disks.len(), 2);
    assert_eq!(disks["/"].used, 70);
    assert_eq!(disks["/boot"].used, 50);
}

#[test]
fn test_failed_call_surfaces_no_partial_entries() {
    let metrics = metrics_with(with_partitions(partial_then_fail));
    let err = metrics.disk_usage_by_partition().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CallFailure);
    assert_eq!(err.metric(), Some(Metric::DiskUsageByPartition));
}

#[test]
fn test_rejected_entry_fails_call() {
    let metrics = metrics_with(with_partitions(null_value));
    assert!(matches!(
        metrics.disk_usage_by_partition(),
        Err(Error::CallFailed {
            metric: Metric::DiskUsageByPartition,
            ..
        })
    ));
}

#[test]
fn test_zero_entries_is_success() {
    let metrics = metrics_with(with_partitions(no_partitions));
    assert!(metrics.disk_usage_by_partition().unwrap().is_empty());
}

#[test]
fn test_single_partition_host() {
    let metrics = metrics_with(with_partitions(single_partition));
    let disks = metrics.disk_usage_by_partition().unwrap();

    assert_eq!(disks.len(), 1);
    let root = &disks["/"];
    assert_eq!(root.device, "/dev/sda1");
    assert!(root.used + root.free <= root.total);
    assert!(root.total - (root.used + root.free) <= RESERVED_BLOCKS * BLOCK);
    assert!((root.used_percent - 61.22).abs() < 0.01);
}

#[test]
fn test_text_is_copied_before_native_side_drops_it() {
    let metrics = metrics_with(with_partitions(transient_text));
    let disks = metrics.disk_usage_by_partition().unwrap();

    assert_eq!(disks.len(), 16);
    for (mount, disk) in &disks {
        assert!(mount.starts_with("/mnt/volume"));
        assert_eq!(&disk.path, mount);
        assert_eq!(disk.device, "/dev/fake0");
        assert_eq!(disk.fs, "ext4");
    }
    assert_eq!(disks["/mnt/volume7"].used, 7);
}

#[test]
fn test_two_sensors_yield_two_entries() {
    let metrics = metrics_with(Bindings {
        temperatures: two_sensors,
        ..native_bindings()
    });
    let sensors = metrics.temperatures().unwrap();

    assert_eq!(sensors.len(), 2);
    assert!(sensors.iter().all(|s| !s.sensor_key.is_empty()));
    assert_eq!(sensors[1].sensor_key, "nvme_composite");
    assert_eq!(sensors[0].high, 55.0);
}

#[test]
fn test_memory_used_percent() {
    let metrics = metrics_with(Bindings {
        memory: half_memory,
        ..native_bindings()
    });
    let memory = metrics.memory_info().unwrap();

    assert_eq!(memory.total, 16 * GIB);
    assert!((memory.used_percent - 50.0).abs() < 0.01);
}

#[test]
fn test_disk_usage_failure_names_path() {
    let metrics = metrics_with(Bindings {
        disk_usage: failing_disk_usage,
        ..native_bindings()
    });
    let err = metrics.disk_usage("/srv/data").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CallFailure);
    assert_eq!(err.to_string(), "failed to get disk usage for /srv/data");
}

#[test]
fn test_other_metrics_unaffected_by_one_failure() {
    let metrics = metrics_with(with_partitions(partial_then_fail));
    assert!(metrics.disk_usage_by_partition().is_err());
    assert!(metrics.memory_info().is_ok());
}
