//! Metrics facade
//!
//! [`HostMetrics`] owns the loaded library and its resolved [`Bindings`].
//! Every getter is one synchronous foreign call that allocates its own
//! destination, so a shared `&HostMetrics` can be used from any number of
//! threads or tasks at once. Nothing is cached between calls.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use hostmetrics_core::ABI_VERSION;

use crate::bindings::Bindings;
use crate::config::LocatorConfig;
use crate::loader::NativeLibrary;
use crate::records::{
    DiskIOCountersStat, DiskUsageStat, KeyedCollection, Memory, NetIOCountersStat, Sensors,
    SystemInfo,
};
use crate::{Error, Metric, Result};

/// Host metrics read through a native library.
#[derive(Debug)]
pub struct HostMetrics {
    bindings: Bindings,
    native_version: String,
    // None when the exports are linked into this process
    library: Option<NativeLibrary>,
}

impl HostMetrics {
    /// Opens the library at `path`, resolves every export and checks the
    /// ABI version. Any failure here is an initialization error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let library = NativeLibrary::open(path)?;
        // SAFETY: symbol names and signatures come from the shared contract
        // crate; the table is stored next to the library that backs it.
        let bindings = unsafe { Bindings::resolve(&library)? };
        let mut metrics = unsafe { Self::from_bindings(bindings)? };

        tracing::info!(
            "Loaded {} (native version {})",
            library.path().display(),
            metrics.native_version
        );
        metrics.library = Some(library);
        Ok(metrics)
    }

    /// Opens the library chosen by `config`.
    pub fn locate(config: &LocatorConfig) -> Result<Self> {
        Self::open(config.resolve()?)
    }

    /// Builds a facade over an existing table, for exports linked into this
    /// process or provided by the caller.
    ///
    /// # Safety
    /// Every address in `bindings` must honour the signature and contract of
    /// its export for as long as the facade is used.
    pub unsafe fn from_bindings(bindings: Bindings) -> Result<Self> {
        let found = bindings.abi_version();
        if found != ABI_VERSION {
            return Err(Error::AbiMismatch {
                expected: ABI_VERSION,
                found,
            });
        }
        Ok(Self {
            native_version: bindings.native_version(),
            bindings,
            library: None,
        })
    }

    /// Build version reported by the native library.
    pub fn native_version(&self) -> &str {
        &self.native_version
    }

    /// Where the library was loaded from, if it was loaded dynamically.
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_ref().map(NativeLibrary::path)
    }

    /// CPU usage over `interval`, in percent.
    ///
    /// Takes one sample of cumulative CPU ticks, waits for `interval`, takes
    /// a second and returns the busy share of the ticks in between. Both
    /// samples belong to this call, so other callers sampling meanwhile do
    /// not shorten its window. If `cancel` completes first the wait is
    /// abandoned and `Cancelled` is returned instead of a reading over a
    /// shorter window.
    pub async fn cpu_percent<F>(&self, interval: Duration, cancel: F) -> Result<f32>
    where
        F: Future<Output = ()>,
    {
        tracing::debug!("Sampling CPU over {:?}", interval);
        let first = unsafe { self.bindings.cpu_times()? };

        tokio::select! {
            biased;
            _ = cancel => {
                tracing::debug!("CPU sampling cancelled");
                return Err(Error::Cancelled { metric: Metric::CpuPercent });
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let second = unsafe { self.bindings.cpu_times()? };
        Ok(second.busy_percent_since(&first))
    }

    pub fn memory_info(&self) -> Result<Memory> {
        tracing::debug!("Reading {}", Metric::Memory);
        unsafe { self.bindings.memory() }
    }

    /// Usage of the filesystem holding `path`. Only `path` and the byte
    /// counts are reported; `device` and `fs` stay empty.
    pub fn disk_usage(&self, path: &str) -> Result<DiskUsageStat> {
        tracing::debug!("Reading {} for {}", Metric::DiskUsage, path);
        unsafe { self.bindings.disk_usage(path) }
    }

    /// Usage of every mounted partition, keyed by mount point.
    pub fn disk_usage_by_partition(&self) -> Result<KeyedCollection<DiskUsageStat>> {
        tracing::debug!("Reading {}", Metric::DiskUsageByPartition);
        unsafe { self.bindings.disk_usage_by_partition() }
    }

    /// Cumulative I/O counters keyed by device name.
    pub fn disk_io_by_partition(&self) -> Result<KeyedCollection<DiskIOCountersStat>> {
        tracing::debug!("Reading {}", Metric::DiskIoByPartition);
        unsafe { self.bindings.disk_io_by_partition() }
    }

    pub fn network_info(&self) -> Result<NetIOCountersStat> {
        tracing::debug!("Reading {}", Metric::Network);
        unsafe { self.bindings.net_io_counters() }
    }

    pub fn temperatures(&self) -> Result<Sensors> {
        tracing::debug!("Reading {}", Metric::Temperatures);
        unsafe { self.bindings.temperatures() }
    }

    /// Every metric in one record. The first failing metric aborts the
    /// snapshot with its own error.
    pub async fn snapshot<F>(&self, interval: Duration, cancel: F) -> Result<SystemInfo>
    where
        F: Future<Output = ()>,
    {
        let cpu_average = self.cpu_percent(interval, cancel).await?;
        Ok(SystemInfo {
            timestamp: chrono::Utc::now().timestamp(),
            cpu_average: Some(cpu_average),
            memory: self.memory_info()?,
            disks: self.disk_usage_by_partition()?,
            disks_io: self.disk_io_by_partition()?,
            network: self.network_info()?,
            sensors: self.temperatures()?,
        })
    }

    /// Consumes the facade and asks the loader to release the library.
    ///
    /// Advisory only: the image may stay mapped until the process exits.
    pub fn close(self) {
        if let Some(library) = self.library {
            library.close();
        }
    }
}
