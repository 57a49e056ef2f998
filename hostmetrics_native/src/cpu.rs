//! CPU Times
//!
//! Cumulative busy and total ticks over all cores, read from `/proc/stat`.
//! Nothing is kept between calls; utilization is the caller's comparison of
//! two samples.

use std::io;

use hostmetrics_core::RawCpuTimes;

/// Parses the aggregate `cpu` row of `/proc/stat`.
///
/// Columns: user, nice, system, idle, iowait, irq, softirq, steal, guest,
/// guest_nice. Guest time is already counted in user and nice, so only the
/// first eight columns are summed. Idle time includes iowait.
pub fn parse_proc_stat(content: &str) -> Option<RawCpuTimes> {
    let line = content.lines().find(|line| line.starts_with("cpu "))?;
    let ticks: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|field| field.parse::<u64>().ok())
        .collect::<Option<_>>()?;
    if ticks.len() < 4 {
        return None;
    }

    let total = ticks.iter().fold(0u64, |sum, t| sum.saturating_add(*t));
    let idle = ticks[3].saturating_add(ticks.get(4).copied().unwrap_or(0));
    Some(RawCpuTimes {
        busy: total.saturating_sub(idle),
        total,
    })
}

#[cfg(target_os = "linux")]
pub fn read_cpu_times() -> io::Result<RawCpuTimes> {
    let content = std::fs::read_to_string("/proc/stat")?;
    parse_proc_stat(&content)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no aggregate cpu row"))
}

#[cfg(not(target_os = "linux"))]
pub fn read_cpu_times() -> io::Result<RawCpuTimes> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "cumulative cpu times are only available on Linux",
    ))
}
