//! Memory Analysis
//!
//! Virtual memory totals from sysinfo.

use hostmetrics_core::RawMemory;
use sysinfo::System;

/// Percentage of `used` in `total`.
pub fn memory_percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((used as f64 / total as f64) * 100.0) as f32
}

/// Get system memory statistics
pub fn get_memory_stats() -> Option<RawMemory> {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    if total == 0 {
        log::warn!("memory: total memory reported as zero");
        return None;
    }

    let used = sys.used_memory().min(total);
    Some(RawMemory {
        total,
        available: sys.available_memory().min(total),
        used,
        used_percent: memory_percent(used, total),
        free: sys.free_memory().min(total),
    })
}
