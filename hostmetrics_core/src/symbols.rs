//! Exported symbol names and their calling conventions.
//!
//! Every metric export returns `true` only after all of its out-parameters
//! were fully written. On `false` the caller treats them as unwritten.

use std::ffi::c_char;

use crate::abi::EntrySink;
use crate::records::{RawCpuTimes, RawDiskUsageStat, RawMemory, RawNetIOCountersStat};
use crate::string::FfiStr;

/// NUL-terminated symbol names, ready for a dynamic symbol lookup.
pub mod names {
    pub const ABI_VERSION: &[u8] = b"hostmetrics_abi_version\0";
    pub const NATIVE_VERSION: &[u8] = b"hostmetrics_native_version\0";
    pub const CPU_TIMES: &[u8] = b"hostmetrics_cpu_times\0";
    pub const MEMORY: &[u8] = b"hostmetrics_memory\0";
    pub const DISK_USAGE: &[u8] = b"hostmetrics_disk_usage\0";
    pub const DISK_USAGE_BY_PARTITION: &[u8] = b"hostmetrics_disk_usage_by_partition\0";
    pub const DISK_IO_BY_PARTITION: &[u8] = b"hostmetrics_disk_io_counters_by_partition\0";
    pub const NET_IO_COUNTERS: &[u8] = b"hostmetrics_net_io_counters\0";
    pub const TEMPERATURES: &[u8] = b"hostmetrics_temperatures\0";
}

pub type AbiVersionFn = unsafe extern "C" fn() -> u32;
pub type NativeVersionFn = unsafe extern "C" fn() -> *const c_char;
pub type CpuTimesFn = unsafe extern "C" fn(out: *mut RawCpuTimes) -> bool;
pub type MemoryFn = unsafe extern "C" fn(out: *mut RawMemory) -> bool;
pub type DiskUsageFn = unsafe extern "C" fn(path: *const FfiStr, out: *mut RawDiskUsageStat) -> bool;
pub type NetIoCountersFn = unsafe extern "C" fn(out: *mut RawNetIOCountersStat) -> bool;

/// Multi-entry export: emits zero or more entries through the sink.
pub type EntriesFn = unsafe extern "C" fn(sink: *const EntrySink) -> bool;

/// Renders a symbol name without its trailing NUL.
pub fn display_name(symbol: &[u8]) -> &str {
    let trimmed = symbol.strip_suffix(b"\0").unwrap_or(symbol);
    std::str::from_utf8(trimmed).unwrap_or("<non-utf8 symbol>")
}
