//! Host metrics snapshotting for the status surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::{Disks, Networks, System};

/// Usage of one mounted disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSnapshot {
    /// Mount point path.
    pub mount_point: String,
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Bytes still available.
    pub available_bytes: u64,
}

/// Cumulative traffic of one network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    /// Interface name.
    pub interface: String,
    /// Total bytes received since boot.
    pub received_bytes: u64,
    /// Total bytes transmitted since boot.
    pub transmitted_bytes: u64,
}

/// One point-in-time view of the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    /// Global CPU usage, 0–100.
    pub cpu_usage_percent: f32,
    /// Total physical memory in bytes.
    pub memory_total_bytes: u64,
    /// Used physical memory in bytes.
    pub memory_used_bytes: u64,
    /// Total swap in bytes.
    pub swap_total_bytes: u64,
    /// Used swap in bytes.
    pub swap_used_bytes: u64,
    /// Per-disk usage.
    pub disks: Vec<DiskSnapshot>,
    /// Per-interface traffic totals.
    pub networks: Vec<NetworkSnapshot>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

/// Collector wrapping the sysinfo handles it refreshes on demand.
pub struct HostMetrics {
    system: System,
    disks: Disks,
    networks: Networks,
}

impl HostMetrics {
    /// Create a collector with fully refreshed initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// Refresh and capture a snapshot.
    ///
    /// CPU usage needs two samples a short interval apart; the sleep is
    /// bounded by sysinfo's minimum update interval.
    pub fn snapshot(&mut self) -> HostSnapshot {
        self.system.refresh_memory();
        self.system.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu();
        self.disks.refresh();
        self.networks.refresh();

        let disks = self
            .disks
            .iter()
            .map(|disk| DiskSnapshot {
                mount_point: disk.mount_point().display().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect();
        let networks = self
            .networks
            .iter()
            .map(|(name, data)| NetworkSnapshot {
                interface: name.clone(),
                received_bytes: data.total_received(),
                transmitted_bytes: data.total_transmitted(),
            })
            .collect();

        HostSnapshot {
            cpu_usage_percent: self.system.global_cpu_info().cpu_usage(),
            memory_total_bytes: self.system.total_memory(),
            memory_used_bytes: self.system.used_memory(),
            swap_total_bytes: self.system.total_swap(),
            swap_used_bytes: self.system.used_swap(),
            disks,
            networks,
            taken_at: Utc::now(),
        }
    }
}

impl Default for HostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::HostMetrics;

    #[test]
    fn snapshot_reports_plausible_memory_numbers() {
        let mut metrics = HostMetrics::new();
        let snapshot = metrics.snapshot();
        assert!(snapshot.memory_total_bytes > 0);
        assert!(snapshot.memory_used_bytes <= snapshot.memory_total_bytes);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut metrics = HostMetrics::new();
        let json = serde_json::to_value(metrics.snapshot()).expect("serialize snapshot");
        assert!(json.get("memoryTotalBytes").is_some());
        assert!(json.get("cpuUsagePercent").is_some());
    }
}
