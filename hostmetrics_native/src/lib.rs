//! hostmetrics native library
//!
//! Point-in-time host metrics exported over a C ABI. Every metric export
//! returns `true` only after all out-parameters were fully written; on
//! `false` nothing was written. Multi-entry exports emit their entries
//! through the caller's [`EntrySink`] and never keep a pointer into caller
//! memory after returning.
//!
//! The library never installs a logger; diagnostics go through the `log`
//! facade and show up only if the host process wires one up.

pub mod cpu;
pub mod disk;
pub mod disk_io;
pub mod memory;
pub mod network;
pub mod sensors;

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};

use hostmetrics_core::symbols::{
    AbiVersionFn, CpuTimesFn, DiskUsageFn, EntriesFn, MemoryFn, NativeVersionFn,
    NetIoCountersFn,
};
use hostmetrics_core::{
    EntrySink, FfiStr, KeyKind, RawCpuTimes, RawDiskIOCountersStat, RawDiskUsageStat,
    RawMemory, RawNetIOCountersStat, RawTemperatureStat, ABI_VERSION,
};

include!(concat!(env!("OUT_DIR"), "/version.rs"));

// Exports must keep the signatures the caller resolves them with.
const _: AbiVersionFn = hostmetrics_abi_version;
const _: NativeVersionFn = hostmetrics_native_version;
const _: CpuTimesFn = hostmetrics_cpu_times;
const _: MemoryFn = hostmetrics_memory;
const _: DiskUsageFn = hostmetrics_disk_usage;
const _: EntriesFn = hostmetrics_disk_usage_by_partition;
const _: EntriesFn = hostmetrics_disk_io_counters_by_partition;
const _: NetIoCountersFn = hostmetrics_net_io_counters;
const _: EntriesFn = hostmetrics_temperatures;

/// Runs `f`, turning a panic into a failed call.
fn guarded(metric: &str, f: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(ok) => ok,
        Err(_) => {
            log::error!("{}: collector panicked", metric);
            false
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn hostmetrics_abi_version() -> u32 {
    ABI_VERSION
}

/// # Safety
/// The returned pointer is static and NUL-terminated. Do not free it.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_native_version() -> *const c_char {
    VERSION_CSTR.as_ptr() as *const c_char
}

/// Cumulative busy and total CPU ticks. Two calls an interval apart give
/// the utilization over that interval.
///
/// # Safety
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_cpu_times(out: *mut RawCpuTimes) -> bool {
    if out.is_null() {
        return false;
    }
    guarded("cpu_times", || match cpu::read_cpu_times() {
        Ok(times) => {
            *out = times;
            true
        }
        Err(e) => {
            log::warn!("cpu_times: {}", e);
            false
        }
    })
}

/// # Safety
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_memory(out: *mut RawMemory) -> bool {
    if out.is_null() {
        return false;
    }
    guarded("memory", || match memory::get_memory_stats() {
        Some(stats) => {
            *out = stats;
            true
        }
        None => false,
    })
}

/// Usage of the filesystem holding `path`.
///
/// `device` and `fstype` are left empty: this is a single-record call and
/// text written into `out` may only borrow from the caller's input.
///
/// # Safety
/// `path` must be null or point at a live view; `out` must be null or valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_disk_usage(
    path: *const FfiStr,
    out: *mut RawDiskUsageStat,
) -> bool {
    let Some(path) = path.as_ref() else {
        return false;
    };
    if out.is_null() || path.is_empty() {
        return false;
    }

    guarded("disk_usage", || {
        #[cfg(unix)]
        let fs_path = std::path::Path::new(path.as_os_str());
        #[cfg(not(unix))]
        let owned = path.to_owned_string();
        #[cfg(not(unix))]
        let fs_path = std::path::Path::new(&owned);

        match disk::fs_usage(fs_path) {
            Ok(usage) => {
                *out = RawDiskUsageStat {
                    device: FfiStr::empty(),
                    path: *path,
                    fstype: FfiStr::empty(),
                    total: usage.total,
                    free: usage.free,
                    used: usage.used,
                    used_percent: usage.used_percent,
                };
                true
            }
            Err(e) => {
                log::debug!("disk_usage: {}: {}", fs_path.display(), e);
                false
            }
        }
    })
}

/// Emits one entry per mounted partition, keyed by mount point.
///
/// # Safety
/// `sink` must be null or a live [`EntrySink`] for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_disk_usage_by_partition(sink: *const EntrySink) -> bool {
    let sink = match EntrySink::checked::<RawDiskUsageStat>(sink, KeyKind::Text) {
        Ok(sink) => sink,
        Err(e) => {
            log::warn!("disk_usage_by_partition: {}", e);
            return false;
        }
    };

    guarded("disk_usage_by_partition", || {
        for partition in disk::partitions() {
            let key = FfiStr::from_str(&partition.mount_point);
            let record = RawDiskUsageStat {
                device: FfiStr::from_str(&partition.device),
                path: key,
                fstype: FfiStr::from_str(&partition.fstype),
                total: partition.usage.total,
                free: partition.usage.free,
                used: partition.usage.used,
                used_percent: partition.usage.used_percent,
            };
            sink.emit(Some(&key), &record);
        }
        true
    })
}

/// Emits cumulative counters per physical device, keyed by device name.
///
/// # Safety
/// `sink` must be null or a live [`EntrySink`] for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_disk_io_counters_by_partition(
    sink: *const EntrySink,
) -> bool {
    let sink = match EntrySink::checked::<RawDiskIOCountersStat>(sink, KeyKind::Text) {
        Ok(sink) => sink,
        Err(e) => {
            log::warn!("disk_io_counters_by_partition: {}", e);
            return false;
        }
    };

    guarded("disk_io_counters_by_partition", || {
        let counters = match disk_io::counters_by_partition() {
            Ok(counters) => counters,
            Err(e) => {
                log::warn!("disk_io_counters_by_partition: {}", e);
                return false;
            }
        };
        for io in &counters {
            let key = FfiStr::from_str(&io.name);
            let record = RawDiskIOCountersStat {
                name: key,
                read_bytes: io.read_bytes,
                write_bytes: io.write_bytes,
                read_count: io.read_count,
                write_count: io.write_count,
                iops: 0,
                read_speed: 0.0,
                write_speed: 0.0,
            };
            sink.emit(Some(&key), &record);
        }
        true
    })
}

/// # Safety
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_net_io_counters(out: *mut RawNetIOCountersStat) -> bool {
    if out.is_null() {
        return false;
    }
    guarded("net_io_counters", || {
        *out = network::get_net_io_counters();
        true
    })
}

/// Emits one unkeyed entry per thermal sensor with a current reading.
///
/// # Safety
/// `sink` must be null or a live [`EntrySink`] for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn hostmetrics_temperatures(sink: *const EntrySink) -> bool {
    let sink = match EntrySink::checked::<RawTemperatureStat>(sink, KeyKind::None) {
        Ok(sink) => sink,
        Err(e) => {
            log::warn!("temperatures: {}", e);
            return false;
        }
    };

    guarded("temperatures", || {
        for reading in sensors::temperatures() {
            let record = RawTemperatureStat {
                sensor_key: FfiStr::from_str(&reading.key),
                temperature: reading.temperature,
                high: reading.high,
                critical: reading.critical,
            };
            sink.emit(None, &record);
        }
        true
    })
}
