//! Machine telemetry collection for `moni sample`.
//!
//! Gauges (load, CPU, memory, disk usage) are read at sampling time. Disk and
//! network counters are deltas since the previous sample, or since the
//! sampler was created.

use chrono::Utc;
use monibot_core::MachineSample;
use sysinfo::{Disks, Networks, System};
use tracing::debug;

pub struct Sampler {
    system: System,
    disks: Disks,
    networks: Networks,
}

impl Sampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        system.refresh_processes();
        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    pub fn sample(&mut self) -> MachineSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.system.refresh_processes();
        self.disks.refresh();
        self.networks.refresh();

        let load = System::load_average();

        let (disk_read, disk_write) = self
            .system
            .processes()
            .values()
            .map(|process| process.disk_usage())
            .fold((0u64, 0u64), |(read, written), usage| {
                (read + usage.read_bytes, written + usage.written_bytes)
            });

        let (net_recv, net_send) = (&self.networks)
            .into_iter()
            .fold((0u64, 0u64), |(recv, send), (_name, data)| {
                (recv + data.received(), send + data.transmitted())
            });

        let (disk_total, disk_available) = self
            .disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (total + disk.total_space(), available + disk.available_space())
            });

        let sample = MachineSample {
            tstamp: Utc::now().timestamp_millis(),
            load1: load.one,
            load5: load.five,
            load15: load.fifteen,
            cpu_percent: clamp_percent(f64::from(self.system.global_cpu_info().cpu_usage())),
            mem_percent: percent(self.system.used_memory(), self.system.total_memory()),
            disk_percent: percent(disk_total.saturating_sub(disk_available), disk_total),
            disk_read: saturating_i64(disk_read),
            disk_write: saturating_i64(disk_write),
            net_recv: saturating_i64(net_recv),
            net_send: saturating_i64(net_send),
        };
        debug!(?sample, "collected machine sample");
        sample
    }
}

/// `part` as a whole percentage of `whole`; 0 when `whole` is 0.
fn percent(part: u64, whole: u64) -> i32 {
    if whole == 0 {
        return 0;
    }
    clamp_percent(part as f64 * 100.0 / whole as f64)
}

fn clamp_percent(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as i32
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
