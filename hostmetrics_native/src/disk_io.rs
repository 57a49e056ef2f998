//! Disk I/O Counters
//!
//! Per-device cumulative counters read from `/proc/diskstats`.

use std::io;

/// Bytes per sector as reported by the kernel, regardless of device.
const SECTOR_SIZE: u64 = 512;

/// Cumulative counters of one block device or partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub name: String,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
}

/// Whether `name` is a physical disk (or a partition of one) worth reporting.
///
/// Accepts SCSI/SATA (`sd*`), IDE (`hd*`), virtio (`vd*`), Xen (`xvd*`),
/// NVMe (`nvme*`) and SD/MMC (`mmcblk*`) devices. Loop, ram, device-mapper
/// and similar virtual devices are excluded.
pub fn is_physical_disk(name: &str) -> bool {
    if name.len() < 3 {
        return false;
    }
    if name.starts_with("nvme") || name.starts_with("mmcblk") || name.starts_with("xvd") {
        return true;
    }
    let bytes = name.as_bytes();
    matches!(bytes[0], b's' | b'h' | b'v') && bytes[1] == b'd'
}

/// Parses one `/proc/diskstats` line.
///
/// Columns: major, minor, name, reads completed, reads merged, sectors
/// read, ms reading, writes completed, writes merged, sectors written, ...
pub fn parse_diskstats_line(line: &str) -> Option<DiskIoCounters> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 {
        return None;
    }
    let number = |idx: usize| fields[idx].parse::<u64>().ok();

    Some(DiskIoCounters {
        name: fields[2].to_string(),
        read_count: number(3)?,
        read_bytes: number(5)?.saturating_mul(SECTOR_SIZE),
        write_count: number(7)?,
        write_bytes: number(9)?.saturating_mul(SECTOR_SIZE),
    })
}

/// Parses a whole diskstats table, keeping only physical devices.
pub fn parse_diskstats(content: &str) -> Vec<DiskIoCounters> {
    content
        .lines()
        .filter_map(parse_diskstats_line)
        .filter(|counters| is_physical_disk(&counters.name))
        .collect()
}

#[cfg(target_os = "linux")]
pub fn counters_by_partition() -> io::Result<Vec<DiskIoCounters>> {
    let content = std::fs::read_to_string("/proc/diskstats")?;
    Ok(parse_diskstats(&content))
}

#[cfg(not(target_os = "linux"))]
pub fn counters_by_partition() -> io::Result<Vec<DiskIoCounters>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "per-partition disk counters are only available on Linux",
    ))
}
