//! Human-readable rendering of a [`SystemInfo`] snapshot.

use std::fmt::Write;

use crate::records::SystemInfo;

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn render(info: &SystemInfo) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Timestamp: {}", info.timestamp);
    match info.cpu_average {
        Some(cpu) => {
            let _ = writeln!(out, "CPU: {:.1}%", cpu);
        }
        None => {
            let _ = writeln!(out, "CPU: n/a");
        }
    }

    let mem = &info.memory;
    let _ = writeln!(
        out,
        "Memory: {} / {} ({:.1}%), {} available",
        format_bytes(mem.used),
        format_bytes(mem.total),
        mem.used_percent,
        format_bytes(mem.available)
    );

    let _ = writeln!(out, "\nDisks:");
    for (mount, disk) in &info.disks {
        let _ = writeln!(
            out,
            "  {:<24} {:<16} {:<8} {:>10} / {:>10} ({:.1}%)",
            mount,
            disk.device,
            disk.fs,
            format_bytes(disk.used),
            format_bytes(disk.total),
            disk.used_percent
        );
    }

    let _ = writeln!(out, "\nDisk IO:");
    for (name, io) in &info.disks_io {
        let _ = writeln!(
            out,
            "  {:<12} read {:>10} ({} ops)  write {:>10} ({} ops)",
            name,
            format_bytes(io.read_bytes),
            io.read_count,
            format_bytes(io.write_bytes),
            io.write_count
        );
    }

    let _ = writeln!(
        out,
        "\nNetwork: sent {}, received {}",
        format_bytes(info.network.bytes_sent),
        format_bytes(info.network.bytes_recv)
    );

    if !info.sensors.is_empty() {
        let _ = writeln!(out, "\nSensors:");
        for sensor in &info.sensors {
            let _ = writeln!(
                out,
                "  {:<32} {:>6.1}°C (high {:.1}, critical {:.1})",
                sensor.sensor_key, sensor.temperature, sensor.high, sensor.critical
            );
        }
    }

    out
}
