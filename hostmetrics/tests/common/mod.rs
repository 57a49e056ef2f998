//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use hostmetrics::config::LIBRARY_ENV;
use hostmetrics::{Bindings, HostMetrics};
use hostmetrics_core::{EntrySink, FfiStr, KeyKind, RawDiskUsageStat, RawTemperatureStat};

/// The native exports linked into this test binary.
pub fn native_bindings() -> Bindings {
    use hostmetrics_native::*;

    Bindings {
        abi_version: hostmetrics_abi_version,
        native_version: hostmetrics_native_version,
        cpu_times: hostmetrics_cpu_times,
        memory: hostmetrics_memory,
        disk_usage: hostmetrics_disk_usage,
        disk_usage_by_partition: hostmetrics_disk_usage_by_partition,
        disk_io_by_partition: hostmetrics_disk_io_counters_by_partition,
        net_io_counters: hostmetrics_net_io_counters,
        temperatures: hostmetrics_temperatures,
    }
}

/// A facade over the linked exports.
pub fn linked_metrics() -> HostMetrics {
    unsafe { HostMetrics::from_bindings(native_bindings()) }.expect("linked exports match ABI")
}

/// A facade over the linked exports with some entries replaced.
pub fn metrics_with(bindings: Bindings) -> HostMetrics {
    unsafe { HostMetrics::from_bindings(bindings) }.expect("fake exports match ABI")
}

/// The built cdylib, if one can be found.
///
/// Checks `HOSTMETRICS_LIB`, then the target directory this test binary was
/// built into.
pub fn find_native_library() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(LIBRARY_ENV).map(PathBuf::from) {
        return path.is_file().then_some(path);
    }

    let exe = std::env::current_exe().ok()?;
    // target/<profile>/deps/ffi_tests-<hash>
    let profile_dir = exe.parent()?.parent()?;
    let file_name = libloading::library_filename("hostmetrics_native");
    [profile_dir.join(&file_name), profile_dir.join("deps").join(&file_name)]
        .into_iter()
        .find(|p| p.is_file())
}

/// Emits one partition entry keyed by `mount`.
///
/// # Safety
/// `sink` must have passed `EntrySink::checked` for `RawDiskUsageStat`.
pub unsafe fn emit_partition(sink: &EntrySink, mount: &str, total: u64, used: u64) {
    let key = FfiStr::from_str(mount);
    let record = RawDiskUsageStat {
        device: FfiStr::from_str("/dev/fake0"),
        path: key,
        fstype: FfiStr::from_str("ext4"),
        total,
        used,
        free: total - used,
        used_percent: hostmetrics_core::usage_percent(used, total - used),
    };
    sink.emit(Some(&key), &record);
}

/// Emits one sensor entry.
///
/// # Safety
/// `sink` must have passed `EntrySink::checked` for `RawTemperatureStat`.
pub unsafe fn emit_sensor(sink: &EntrySink, name: &str, temperature: f32) {
    let record = RawTemperatureStat {
        sensor_key: FfiStr::from_str(name),
        temperature,
        high: temperature + 10.0,
        critical: 100.0,
    };
    sink.emit(None, &record);
}

/// Validates a keyed partition sink the way the native library does.
pub unsafe fn partition_sink<'a>(sink: *const EntrySink) -> Option<&'a EntrySink> {
    EntrySink::checked::<RawDiskUsageStat>(sink, KeyKind::Text).ok()
}

/// Validates a sensor sequence sink the way the native library does.
pub unsafe fn sensor_sink<'a>(sink: *const EntrySink) -> Option<&'a EntrySink> {
    EntrySink::checked::<RawTemperatureStat>(sink, KeyKind::None).ok()
}
