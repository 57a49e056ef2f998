//! Disk Usage
//!
//! Filesystem capacity via `statvfs`, and the list of mounted partitions
//! via sysinfo.

use hostmetrics_core::usage_percent;
use std::io;
use std::path::Path;
use sysinfo::Disks;

/// Byte counts of one filesystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsUsage {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f32,
}

/// One mounted partition together with its usage.
#[derive(Debug, Clone)]
pub struct PartitionUsage {
    pub device: String,
    pub mount_point: String,
    pub fstype: String,
    pub usage: FsUsage,
}

/// Usage of the filesystem holding `path`.
///
/// `free` counts blocks available to unprivileged users, so
/// `used + free` may fall short of `total` by the reserved blocks.
#[cfg(unix)]
pub fn fs_usage(path: &Path) -> io::Result<FsUsage> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut raw = MaybeUninit::<libc::statvfs>::zeroed();
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), raw.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let raw = unsafe { raw.assume_init() };

    let frsize = raw.f_frsize as u64;
    let total = raw.f_blocks as u64 * frsize;
    let free = raw.f_bavail as u64 * frsize;
    let used = (raw.f_blocks as u64).saturating_sub(raw.f_bfree as u64) * frsize;

    Ok(FsUsage {
        total,
        free,
        used,
        used_percent: usage_percent(used, free),
    })
}

#[cfg(not(unix))]
pub fn fs_usage(_path: &Path) -> io::Result<FsUsage> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "statvfs is only available on unix targets",
    ))
}

/// Usage of every mounted partition sysinfo reports.
///
/// Partitions whose filesystem cannot be queried are skipped. An empty
/// result is still a success.
pub fn partitions() -> Vec<PartitionUsage> {
    let disks = Disks::new_with_refreshed_list();
    let mut out = Vec::with_capacity(disks.list().len());

    for disk in disks.list() {
        let mount_point = disk.mount_point();
        match fs_usage(mount_point) {
            Ok(usage) => out.push(PartitionUsage {
                device: disk.name().to_string_lossy().into_owned(),
                mount_point: mount_point.to_string_lossy().into_owned(),
                fstype: disk.file_system().to_string_lossy().into_owned(),
                usage,
            }),
            Err(e) => {
                log::debug!("disk usage: skipping {}: {}", mount_point.display(), e);
            }
        }
    }

    out
}
