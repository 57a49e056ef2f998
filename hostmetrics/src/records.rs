//! Owned metric records.
//!
//! These are what callers see: plain values with owned text, serializable
//! to the same JSON shape the reporting CLI prints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use hostmetrics_core::{
    RawDiskIOCountersStat, RawDiskUsageStat, RawMemory, RawNetIOCountersStat, RawTemperatureStat,
};

use crate::marshal::FromRaw;

/// Entries keyed by mount point or device name.
pub type KeyedCollection<V> = BTreeMap<String, V>;

/// Thermal sensor readings in the order the native side reported them.
pub type Sensors = Vec<TemperatureStat>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f32,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsageStat {
    pub device: String,
    pub path: String,
    #[serde(rename = "fstype")]
    pub fs: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f32,
}

/// Cumulative disk I/O counters.
///
/// `iops`, `read_speed` and `write_speed` are zero until filled in by a
/// [`DiskIoRates`](crate::DiskIoRates) tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskIOCountersStat {
    pub name: String,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
    pub iops: u64,
    pub read_speed: f32,
    pub write_speed: f32,
}

/// Network counters summed over all interfaces.
///
/// Speeds are bytes per second, filled in by a [`NetRates`](crate::NetRates)
/// tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetIOCountersStat {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub upload_speed: f32,
    pub download_speed: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStat {
    #[serde(rename = "name")]
    pub sensor_key: String,
    pub temperature: f32,
    pub high: f32,
    pub critical: f32,
}

/// Everything one snapshot of the host produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Unix seconds at which the snapshot was taken.
    pub timestamp: i64,
    pub cpu_average: Option<f32>,
    pub memory: Memory,
    pub disks: KeyedCollection<DiskUsageStat>,
    pub disks_io: KeyedCollection<DiskIOCountersStat>,
    pub network: NetIOCountersStat,
    pub sensors: Sensors,
}

impl FromRaw for Memory {
    type Raw = RawMemory;

    unsafe fn from_raw(raw: &RawMemory) -> Self {
        Self {
            total: raw.total,
            available: raw.available,
            used: raw.used,
            used_percent: raw.used_percent,
            free: raw.free,
        }
    }
}

impl FromRaw for DiskUsageStat {
    type Raw = RawDiskUsageStat;

    unsafe fn from_raw(raw: &RawDiskUsageStat) -> Self {
        Self {
            device: raw.device.to_owned_string(),
            path: raw.path.to_owned_string(),
            fs: raw.fstype.to_owned_string(),
            total: raw.total,
            free: raw.free,
            used: raw.used,
            used_percent: raw.used_percent,
        }
    }
}

impl FromRaw for DiskIOCountersStat {
    type Raw = RawDiskIOCountersStat;

    unsafe fn from_raw(raw: &RawDiskIOCountersStat) -> Self {
        Self {
            name: raw.name.to_owned_string(),
            read_bytes: raw.read_bytes,
            write_bytes: raw.write_bytes,
            read_count: raw.read_count,
            write_count: raw.write_count,
            iops: raw.iops,
            read_speed: raw.read_speed,
            write_speed: raw.write_speed,
        }
    }
}

impl FromRaw for NetIOCountersStat {
    type Raw = RawNetIOCountersStat;

    unsafe fn from_raw(raw: &RawNetIOCountersStat) -> Self {
        Self {
            bytes_sent: raw.bytes_sent,
            bytes_recv: raw.bytes_recv,
            upload_speed: raw.upload_speed,
            download_speed: raw.download_speed,
        }
    }
}

impl FromRaw for TemperatureStat {
    type Raw = RawTemperatureStat;

    unsafe fn from_raw(raw: &RawTemperatureStat) -> Self {
        Self {
            sensor_key: raw.sensor_key.to_owned_string(),
            temperature: raw.temperature,
            high: raw.high,
            critical: raw.critical,
        }
    }
}
