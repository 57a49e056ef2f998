//! Raw metric records as they cross the boundary.
//!
//! All records use `#[repr(C)]` so both sides agree on field order and
//! padding. Byte counts are `u64`, percentages and rates `f32`. Text fields
//! are borrowed [`FfiStr`] views; see the module docs of [`crate::string`]
//! for how long they stay valid.

use crate::abi_record;
use crate::string::FfiStr;

/// Cumulative CPU time over all cores since boot, in clock ticks.
///
/// A single sample says nothing about utilization; the caller takes two and
/// compares them with [`RawCpuTimes::busy_percent_since`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCpuTimes {
    pub busy: u64,
    pub total: u64,
}

impl RawCpuTimes {
    /// Share of the ticks elapsed since `earlier` that were spent busy.
    ///
    /// Returns `0.0` when no ticks elapsed, and never leaves `0.0..=100.0`
    /// even if a counter went backwards.
    pub fn busy_percent_since(&self, earlier: &RawCpuTimes) -> f32 {
        let total = self.total.saturating_sub(earlier.total);
        if total == 0 {
            return 0.0;
        }
        let busy = self.busy.saturating_sub(earlier.busy).min(total);
        ((busy as f64 / total as f64) * 100.0) as f32
    }
}

/// Virtual memory totals.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f32,
    pub free: u64,
}

/// Usage of one mounted filesystem.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDiskUsageStat {
    pub device: FfiStr,
    pub path: FfiStr,
    pub fstype: FfiStr,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f32,
}

/// Cumulative I/O counters of one block device or partition.
///
/// `iops`, `read_speed` and `write_speed` are derived by the caller from two
/// snapshots; the native side always leaves them at zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDiskIOCountersStat {
    pub name: FfiStr,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
    pub iops: u64,
    pub read_speed: f32,
    pub write_speed: f32,
}

/// Cumulative network counters summed over all interfaces.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawNetIOCountersStat {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub upload_speed: f32,
    pub download_speed: f32,
}

/// One thermal sensor reading, in degrees Celsius.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTemperatureStat {
    pub sensor_key: FfiStr,
    pub temperature: f32,
    pub high: f32,
    pub critical: f32,
}

abi_record!(RawCpuTimes {
    busy: u64,
    total: u64,
});

abi_record!(RawMemory {
    total: u64,
    available: u64,
    used: u64,
    used_percent: f32,
    free: u64,
});

abi_record!(RawDiskUsageStat {
    device: FfiStr,
    path: FfiStr,
    fstype: FfiStr,
    total: u64,
    free: u64,
    used: u64,
    used_percent: f32,
});

abi_record!(RawDiskIOCountersStat {
    name: FfiStr,
    read_bytes: u64,
    write_bytes: u64,
    read_count: u64,
    write_count: u64,
    iops: u64,
    read_speed: f32,
    write_speed: f32,
});

abi_record!(RawNetIOCountersStat {
    bytes_sent: u64,
    bytes_recv: u64,
    upload_speed: f32,
    download_speed: f32,
});

abi_record!(RawTemperatureStat {
    sensor_key: FfiStr,
    temperature: f32,
    high: f32,
    critical: f32,
});

/// Percentage of `used` in `used + free`, the way `df` reports it.
pub fn usage_percent(used: u64, free: u64) -> f32 {
    let denominator = used.saturating_add(free);
    if denominator == 0 {
        return 0.0;
    }
    ((used as f64 / denominator as f64) * 100.0) as f32
}
