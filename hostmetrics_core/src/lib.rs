//! hostmetrics core - boundary contract
//!
//! Shared by the native metrics library and its callers: the `#[repr(C)]`
//! records, borrowed text views, ABI descriptors, the entry sink used to
//! populate caller-owned containers, and the exported symbol table.

pub mod abi;
pub mod records;
pub mod string;
pub mod symbols;

pub use abi::{AbiRecord, EntryDescriptor, EntrySink, InsertFn, KeyKind, SinkError, TypeLayout};
pub use records::{
    usage_percent, RawCpuTimes, RawDiskIOCountersStat, RawDiskUsageStat, RawMemory,
    RawNetIOCountersStat, RawTemperatureStat,
};
pub use string::{BorrowedStr, FfiStr};

/// Bumped whenever a record, descriptor or export signature changes shape.
pub const ABI_VERSION: u32 = 2;
