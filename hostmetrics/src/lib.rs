//! # hostmetrics
//!
//! Point-in-time host metrics (CPU, memory, disks, network, thermal sensors)
//! read from a native library that is loaded at run time.
//!
//! The library is opened once, its exports resolved once, and every metric
//! call is a synchronous foreign call. Multi-entry results are pushed by the
//! native side, entry by entry, straight into a fresh Rust container through
//! an insertion callback; nothing is serialized in between.
//!
//! ```no_run
//! # async fn demo() -> hostmetrics::Result<()> {
//! use hostmetrics::{HostMetrics, LocatorConfig};
//! use std::time::Duration;
//!
//! let metrics = HostMetrics::locate(&LocatorConfig::default())?;
//! let memory = metrics.memory_info()?;
//! let cpu = metrics.cpu_percent(Duration::from_millis(500), std::future::pending()).await?;
//! println!("{cpu:.1}% cpu, {} bytes used", memory.used);
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod config;
pub mod descriptor;
pub mod loader;
pub mod marshal;
pub mod metrics;
pub mod rates;
pub mod records;
pub mod report;

use std::fmt;
use std::path::PathBuf;

pub use bindings::Bindings;
pub use config::LocatorConfig;
pub use loader::NativeLibrary;
pub use metrics::HostMetrics;
pub use rates::{DiskIoRates, NetRates};
pub use records::{
    DiskIOCountersStat, DiskUsageStat, KeyedCollection, Memory, NetIOCountersStat, Sensors,
    SystemInfo, TemperatureStat,
};

/// Result type for metric operations
pub type Result<T> = std::result::Result<T, Error>;

/// The metric an operation was reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    CpuPercent,
    Memory,
    DiskUsage,
    DiskUsageByPartition,
    DiskIoByPartition,
    Network,
    Temperatures,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::CpuPercent => "CPU percent",
            Metric::Memory => "memory info",
            Metric::DiskUsage => "disk usage",
            Metric::DiskUsageByPartition => "disk usage by partition",
            Metric::DiskIoByPartition => "disk IO by partition",
            Metric::Network => "network info",
            Metric::Temperatures => "temperatures",
        };
        f.write_str(name)
    }
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal, surfaced once while setting up the library.
    Initialization,
    /// The native side failed one metric call. Callers may retry or ignore.
    CallFailure,
    /// The CPU sampling interval was interrupted.
    Cancellation,
}

/// Error types for metric operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("native library not found at {}: {hint}", path.display())]
    LibraryNotFound { path: PathBuf, hint: String },

    #[error("failed to load native library {}: {source}", path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol {symbol} not found: {source}")]
    SymbolNotFound {
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("ABI version mismatch: expected {expected}, library reports {found}")]
    AbiMismatch { expected: u32, found: u32 },

    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),

    #[error("failed to get {metric}{}", .context.as_deref().map(|c| format!(" for {c}")).unwrap_or_default())]
    CallFailed {
        metric: Metric,
        context: Option<String>,
    },

    #[error("{metric} cancelled before the sampling interval elapsed")]
    Cancelled { metric: Metric },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn call_failed(metric: Metric) -> Self {
        Error::CallFailed {
            metric,
            context: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CallFailed { .. } => ErrorKind::CallFailure,
            Error::Cancelled { .. } => ErrorKind::Cancellation,
            Error::LibraryNotFound { .. }
            | Error::LibraryLoad { .. }
            | Error::SymbolNotFound { .. }
            | Error::AbiMismatch { .. }
            | Error::UnsupportedArch(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Serialization(_) => ErrorKind::Initialization,
        }
    }

    /// The metric this error belongs to, if it came from a metric call.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Error::CallFailed { metric, .. } | Error::Cancelled { metric } => Some(*metric),
            _ => None,
        }
    }
}
