use serde::Serialize;

/// Point-in-time counters over both partitions, for the host's debug
/// overlay or state dumps. Gathering walks the occupied cells once; this is
/// a diagnostics path, not a per-tick one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStatsSnapshot {
    pub registered_maps: usize,
    pub dirty_maps: usize,
    pub static_collision_entries: usize,
    pub static_render_entries: usize,
    pub dynamic_entries: usize,
    pub dynamic_render_entries: usize,
    pub occupied_cells: usize,
    pub pooled_lists: usize,
    pub dynamic_rebuild_count: u64,
    pub last_dynamic_population: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snapshot_serializes_with_stable_field_names() {
        let snapshot = PartitionStatsSnapshot {
            registered_maps: 2,
            dirty_maps: 1,
            static_collision_entries: 300,
            static_render_entries: 280,
            dynamic_entries: 12,
            dynamic_render_entries: 12,
            occupied_cells: 590,
            pooled_lists: 4,
            dynamic_rebuild_count: 77,
            last_dynamic_population: 12,
        };
        let value = serde_json::to_value(snapshot).expect("serialize");
        assert_eq!(
            value,
            json!({
                "registered_maps": 2,
                "dirty_maps": 1,
                "static_collision_entries": 300,
                "static_render_entries": 280,
                "dynamic_entries": 12,
                "dynamic_render_entries": 12,
                "occupied_cells": 590,
                "pooled_lists": 4,
                "dynamic_rebuild_count": 77,
                "last_dynamic_population": 12,
            })
        );
    }
}
