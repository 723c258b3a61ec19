use crate::core::{NetworkSummary, NodeHeadSnapshot};

/// Derive network-wide health from one head snapshot.
///
/// Pure: no history is kept, an empty snapshot is simply an empty network.
pub fn aggregate(snapshots: &[NodeHeadSnapshot]) -> NetworkSummary {
    NetworkSummary {
        total_clients: snapshots.len(),
        healthy_clients: snapshots.iter().filter(|s| s.is_healthy).count(),
    }
}
