//! Rate derivation from consecutive snapshots.
//!
//! Native calls only report cumulative counters. These trackers are owned by
//! the caller and fill in the derived speed fields by comparing each snapshot
//! with the one passed to the previous `update`. The first update of a
//! tracker leaves the rates at zero.

use std::collections::HashMap;
use std::time::Instant;

use crate::records::{DiskIOCountersStat, KeyedCollection, NetIOCountersStat};

fn per_second(delta: u64, secs: f64) -> f64 {
    delta as f64 / secs
}

#[derive(Debug, Clone, Copy)]
struct DiskSample {
    read_bytes: u64,
    write_bytes: u64,
    read_count: u64,
    write_count: u64,
}

/// Derives `iops`, `read_speed` and `write_speed` per device.
#[derive(Debug, Default)]
pub struct DiskIoRates {
    last: HashMap<String, DiskSample>,
    last_at: Option<Instant>,
}

impl DiskIoRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, disks: &mut KeyedCollection<DiskIOCountersStat>) {
        self.update_at(disks, Instant::now());
    }

    pub fn update_at(&mut self, disks: &mut KeyedCollection<DiskIOCountersStat>, now: Instant) {
        let secs = self
            .last_at
            .map(|at| now.saturating_duration_since(at).as_secs_f64())
            .unwrap_or(0.0);

        if secs > 0.0 {
            for (name, io) in disks.iter_mut() {
                let Some(prev) = self.last.get(name) else {
                    continue;
                };
                // Counters can reset when a device is re-attached
                let ops = io.read_count.saturating_sub(prev.read_count)
                    + io.write_count.saturating_sub(prev.write_count);
                io.iops = per_second(ops, secs) as u64;
                io.read_speed =
                    per_second(io.read_bytes.saturating_sub(prev.read_bytes), secs) as f32;
                io.write_speed =
                    per_second(io.write_bytes.saturating_sub(prev.write_bytes), secs) as f32;
            }
        }

        self.last = disks
            .iter()
            .map(|(name, io)| {
                (
                    name.clone(),
                    DiskSample {
                        read_bytes: io.read_bytes,
                        write_bytes: io.write_bytes,
                        read_count: io.read_count,
                        write_count: io.write_count,
                    },
                )
            })
            .collect();
        self.last_at = Some(now);
    }
}

/// Derives `upload_speed` and `download_speed`.
#[derive(Debug, Default)]
pub struct NetRates {
    last: Option<(u64, u64, Instant)>,
}

impl NetRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, net: &mut NetIOCountersStat) {
        self.update_at(net, Instant::now());
    }

    pub fn update_at(&mut self, net: &mut NetIOCountersStat, now: Instant) {
        if let Some((sent, recv, at)) = self.last {
            let secs = now.saturating_duration_since(at).as_secs_f64();
            if secs > 0.0 {
                net.upload_speed = per_second(net.bytes_sent.saturating_sub(sent), secs) as f32;
                net.download_speed = per_second(net.bytes_recv.saturating_sub(recv), secs) as f32;
            }
        }
        self.last = Some((net.bytes_sent, net.bytes_recv, now));
    }
}
