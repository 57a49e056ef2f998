//! Resolved exports and the call adapter.
//!
//! [`Bindings`] is the immutable table of function addresses resolved once
//! from a [`NativeLibrary`]. Its methods are the call adapter: each one
//! allocates the out-parameters, makes exactly one foreign call, and turns a
//! `false` return into a [`CallFailed`](crate::Error::CallFailed) error for
//! that metric.

use std::ffi::CStr;

use hostmetrics_core::symbols::{
    names, AbiVersionFn, CpuTimesFn, DiskUsageFn, EntriesFn, MemoryFn, NativeVersionFn,
    NetIoCountersFn,
};
use hostmetrics_core::{BorrowedStr, RawCpuTimes};

use crate::loader::NativeLibrary;
use crate::marshal::{collect_entries, read_record};
use crate::records::{
    DiskIOCountersStat, DiskUsageStat, KeyedCollection, Memory, NetIOCountersStat, Sensors,
};
use crate::{Error, Metric, Result};

/// Function addresses of every export, resolved up front.
///
/// Copying the table is free; it holds no ownership of the library.
#[derive(Debug, Clone, Copy)]
pub struct Bindings {
    pub abi_version: AbiVersionFn,
    pub native_version: NativeVersionFn,
    pub cpu_times: CpuTimesFn,
    pub memory: MemoryFn,
    pub disk_usage: DiskUsageFn,
    pub disk_usage_by_partition: EntriesFn,
    pub disk_io_by_partition: EntriesFn,
    pub net_io_counters: NetIoCountersFn,
    pub temperatures: EntriesFn,
}

impl Bindings {
    /// Resolves every export. The first missing symbol fails the whole table.
    ///
    /// # Safety
    /// The library must export these symbols with the signatures declared in
    /// [`hostmetrics_core::symbols`]. The table must not be used after the
    /// library is closed.
    pub unsafe fn resolve(library: &NativeLibrary) -> Result<Self> {
        Ok(Self {
            abi_version: library.resolve(names::ABI_VERSION)?,
            native_version: library.resolve(names::NATIVE_VERSION)?,
            cpu_times: library.resolve(names::CPU_TIMES)?,
            memory: library.resolve(names::MEMORY)?,
            disk_usage: library.resolve(names::DISK_USAGE)?,
            disk_usage_by_partition: library.resolve(names::DISK_USAGE_BY_PARTITION)?,
            disk_io_by_partition: library.resolve(names::DISK_IO_BY_PARTITION)?,
            net_io_counters: library.resolve(names::NET_IO_COUNTERS)?,
            temperatures: library.resolve(names::TEMPERATURES)?,
        })
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn abi_version(&self) -> u32 {
        (self.abi_version)()
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn native_version(&self) -> String {
        let ptr = (self.native_version)();
        if ptr.is_null() {
            return String::from("unknown");
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }

    /// One raw CPU sample: cumulative ticks, meaningful only as a delta.
    ///
    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn cpu_times(&self) -> Result<RawCpuTimes> {
        let mut out = RawCpuTimes::default();
        if !(self.cpu_times)(&mut out) {
            return Err(Error::call_failed(Metric::CpuPercent));
        }
        Ok(out)
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn memory(&self) -> Result<Memory> {
        read_record::<Memory>(Metric::Memory, |out| (self.memory)(out))
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn disk_usage(&self, path: &str) -> Result<DiskUsageStat> {
        let view = BorrowedStr::new(path);
        // `view` outlives the copy made by read_record
        read_record::<DiskUsageStat>(Metric::DiskUsage, |out| {
            (self.disk_usage)(view.as_ptr(), out)
        })
        .map_err(|_| Error::CallFailed {
            metric: Metric::DiskUsage,
            context: Some(path.to_string()),
        })
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn disk_usage_by_partition(&self) -> Result<KeyedCollection<DiskUsageStat>> {
        collect_entries(Metric::DiskUsageByPartition, self.disk_usage_by_partition)
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn disk_io_by_partition(&self) -> Result<KeyedCollection<DiskIOCountersStat>> {
        collect_entries(Metric::DiskIoByPartition, self.disk_io_by_partition)
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn net_io_counters(&self) -> Result<NetIOCountersStat> {
        read_record::<NetIOCountersStat>(Metric::Network, |out| (self.net_io_counters)(out))
    }

    /// # Safety
    /// Every address in the table must still be valid.
    pub unsafe fn temperatures(&self) -> Result<Sensors> {
        collect_entries(Metric::Temperatures, self.temperatures)
    }
}
