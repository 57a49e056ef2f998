//! Network Counters
//!
//! Cumulative bytes sent and received, summed over every interface.

use hostmetrics_core::RawNetIOCountersStat;
use sysinfo::Networks;

pub fn get_net_io_counters() -> RawNetIOCountersStat {
    let networks = Networks::new_with_refreshed_list();

    let (bytes_sent, bytes_recv) = networks
        .iter()
        .fold((0u64, 0u64), |(sent, recv), (_name, data)| {
            (
                sent.saturating_add(data.total_transmitted()),
                recv.saturating_add(data.total_received()),
            )
        });

    RawNetIOCountersStat {
        bytes_sent,
        bytes_recv,
        upload_speed: 0.0,
        download_speed: 0.0,
    }
}
