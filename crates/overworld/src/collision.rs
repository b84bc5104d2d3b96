use crate::grid::{Cell, Direction, EntityHandle};
use crate::partition::PartitionManager;

/// Reference to a trigger-bearing entry handed to the external behavior
/// evaluator for a final allow/deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRef {
    pub entity: EntityHandle,
    pub cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    Blocked,
    Clear,
    /// Tentatively not blocked; the external evaluator may still veto entry.
    DeferToTrigger(TriggerRef),
}

/// External evaluator for tiles with scripted entry behavior.
///
/// Contract: `allows_entry` is consulted synchronously during collision
/// resolution and must not mutate the partitions within the same simulation
/// tick; the dynamic partition it is being asked about was rebuilt at the
/// start of that tick.
pub trait TriggerEvaluator {
    fn allows_entry(&self, entity: EntityHandle, cell: Cell) -> bool;
}

/// Directional blocked/unblocked queries over the combined partitions.
///
/// A move is blocked when the destination holds a solid entry on the moving
/// entity's elevation layer, or when an entry on either endpoint refuses the
/// movement direction. The endpoint check is what makes one-way ledges work:
/// a ledge masked `{North}` can be crossed southward but never climbed back
/// northward, whether approached from outside or stood on. Entries on other
/// elevation layers never block; distinct floors coexist at the same (x, y).
pub struct CollisionResolver<'a> {
    partitions: &'a PartitionManager,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(partitions: &'a PartitionManager) -> Self {
        Self { partitions }
    }

    pub fn check_move(
        &self,
        from: Cell,
        to: Cell,
        direction: Direction,
        elevation_layer: u8,
    ) -> MoveDecision {
        let mut deferred = None;
        for entry in self.partitions.combined_collision_at(to).iter() {
            if entry.elevation_layer != elevation_layer {
                continue;
            }
            if entry.solid {
                return MoveDecision::Blocked;
            }
            if entry.blocked_directions.contains(direction) {
                return MoveDecision::Blocked;
            }
            if entry.has_trigger_behavior && deferred.is_none() {
                deferred = Some(TriggerRef {
                    entity: entry.entity,
                    cell: to,
                });
            }
        }
        for entry in self.partitions.combined_collision_at(from).iter() {
            if entry.elevation_layer != elevation_layer {
                continue;
            }
            if entry.blocked_directions.contains(direction) {
                return MoveDecision::Blocked;
            }
        }
        match deferred {
            Some(trigger) => MoveDecision::DeferToTrigger(trigger),
            None => MoveDecision::Clear,
        }
    }

    /// Convenience wrapper that consults the evaluator for deferred trigger
    /// entries and collapses the decision to a plain blocked/unblocked.
    pub fn is_blocked(
        &self,
        from: Cell,
        to: Cell,
        direction: Direction,
        elevation_layer: u8,
        evaluator: &dyn TriggerEvaluator,
    ) -> bool {
        match self.check_move(from, to, direction, elevation_layer) {
            MoveDecision::Blocked => true,
            MoveDecision::Clear => false,
            MoveDecision::DeferToTrigger(trigger) => {
                !evaluator.allows_entry(trigger.entity, trigger.cell)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellRect, DirectionMask, MapId};
    use crate::partition::{DynamicCollider, DynamicSeed, StaticTileSeed, TileCollider};

    const MAP: MapId = MapId(0);

    struct AllowAll;

    impl TriggerEvaluator for AllowAll {
        fn allows_entry(&self, _entity: EntityHandle, _cell: Cell) -> bool {
            true
        }
    }

    struct DenyAll;

    impl TriggerEvaluator for DenyAll {
        fn allows_entry(&self, _entity: EntityHandle, _cell: Cell) -> bool {
            false
        }
    }

    fn cell(x: i32, y: i32) -> Cell {
        Cell::new(MAP, x, y)
    }

    fn seed(
        entity: u64,
        x: i32,
        y: i32,
        elevation_layer: u8,
        solid: bool,
        blocked_directions: DirectionMask,
        has_trigger_behavior: bool,
    ) -> StaticTileSeed {
        StaticTileSeed {
            entity: EntityHandle(entity),
            x,
            y,
            elevation_layer,
            collider: Some(TileCollider {
                solid,
                blocked_directions,
                has_trigger_behavior,
            }),
            sprite: None,
        }
    }

    fn partitions_with(seeds: Vec<StaticTileSeed>) -> PartitionManager {
        let mut partitions = PartitionManager::new();
        partitions.register_map(CellRect::new(MAP, 0, 0, 19, 14).expect("bounds"));
        partitions.rebuild_static_if_dirty(MAP, || seeds);
        partitions.rebuild_dynamic(Vec::new());
        partitions
    }

    #[test]
    fn solid_entry_on_matching_layer_blocks_entry() {
        let partitions = partitions_with(vec![seed(1, 5, 5, 0, true, DirectionMask::NONE, false)]);
        let resolver = CollisionResolver::new(&partitions);
        assert_eq!(
            resolver.check_move(cell(5, 4), cell(5, 5), Direction::South, 0),
            MoveDecision::Blocked
        );
        assert_eq!(
            resolver.check_move(cell(5, 4), cell(5, 3), Direction::North, 0),
            MoveDecision::Clear
        );
    }

    #[test]
    fn entries_on_other_elevation_layers_never_block() {
        let partitions = partitions_with(vec![seed(1, 5, 5, 2, true, DirectionMask::ALL, false)]);
        let resolver = CollisionResolver::new(&partitions);
        for direction in Direction::ALL {
            let from = cell(5, 5).stepped(direction.opposite());
            assert_eq!(
                resolver.check_move(from, cell(5, 5), direction, 0),
                MoveDecision::Clear,
                "layer-2 tile blocked a layer-0 move heading {direction:?}"
            );
        }
        assert_eq!(
            resolver.check_move(cell(5, 4), cell(5, 5), Direction::South, 2),
            MoveDecision::Blocked
        );
    }

    #[test]
    fn solid_dynamic_entity_blocks_like_static_geometry() {
        let mut partitions = partitions_with(Vec::new());
        partitions.rebuild_dynamic(vec![DynamicSeed {
            entity: EntityHandle(42),
            cell: cell(3, 3),
            elevation_layer: 0,
            collider: Some(DynamicCollider { solid: true }),
            sprite: None,
        }]);
        let resolver = CollisionResolver::new(&partitions);
        assert_eq!(
            resolver.check_move(cell(2, 3), cell(3, 3), Direction::East, 0),
            MoveDecision::Blocked
        );
    }

    #[test]
    fn ledge_mask_refuses_its_direction_from_either_endpoint() {
        // Ledge at (5,9) that can only be crossed southward.
        let partitions = partitions_with(vec![seed(1, 5, 9, 0, false, DirectionMask::NORTH, false)]);
        let resolver = CollisionResolver::new(&partitions);

        // Entering the ledge cell, all four directions.
        assert_eq!(
            resolver.check_move(cell(5, 8), cell(5, 9), Direction::South, 0),
            MoveDecision::Clear
        );
        assert_eq!(
            resolver.check_move(cell(5, 10), cell(5, 9), Direction::North, 0),
            MoveDecision::Blocked
        );
        assert_eq!(
            resolver.check_move(cell(4, 9), cell(5, 9), Direction::East, 0),
            MoveDecision::Clear
        );
        assert_eq!(
            resolver.check_move(cell(6, 9), cell(5, 9), Direction::West, 0),
            MoveDecision::Clear
        );

        // Leaving the ledge cell, all four directions.
        assert_eq!(
            resolver.check_move(cell(5, 9), cell(5, 8), Direction::North, 0),
            MoveDecision::Blocked
        );
        assert_eq!(
            resolver.check_move(cell(5, 9), cell(5, 10), Direction::South, 0),
            MoveDecision::Clear
        );
        assert_eq!(
            resolver.check_move(cell(5, 9), cell(6, 9), Direction::East, 0),
            MoveDecision::Clear
        );
        assert_eq!(
            resolver.check_move(cell(5, 9), cell(4, 9), Direction::West, 0),
            MoveDecision::Clear
        );
    }

    #[test]
    fn trigger_entries_defer_and_the_evaluator_decides() {
        let partitions = partitions_with(vec![seed(7, 5, 5, 0, false, DirectionMask::NONE, true)]);
        let resolver = CollisionResolver::new(&partitions);

        let decision = resolver.check_move(cell(5, 4), cell(5, 5), Direction::South, 0);
        assert_eq!(
            decision,
            MoveDecision::DeferToTrigger(TriggerRef {
                entity: EntityHandle(7),
                cell: cell(5, 5),
            })
        );
        assert!(!resolver.is_blocked(cell(5, 4), cell(5, 5), Direction::South, 0, &AllowAll));
        assert!(resolver.is_blocked(cell(5, 4), cell(5, 5), Direction::South, 0, &DenyAll));
    }

    #[test]
    fn solid_wins_over_trigger_on_the_same_cell() {
        let partitions = partitions_with(vec![
            seed(7, 5, 5, 0, false, DirectionMask::NONE, true),
            seed(8, 5, 5, 0, true, DirectionMask::NONE, false),
        ]);
        let resolver = CollisionResolver::new(&partitions);
        assert_eq!(
            resolver.check_move(cell(5, 4), cell(5, 5), Direction::South, 0),
            MoveDecision::Blocked
        );
    }

    #[test]
    fn moves_into_unknown_cells_and_maps_are_clear() {
        let partitions = partitions_with(Vec::new());
        let resolver = CollisionResolver::new(&partitions);
        assert_eq!(
            resolver.check_move(cell(0, 0), cell(0, -1), Direction::North, 0),
            MoveDecision::Clear
        );
        let off_map = Cell::new(MapId(99), 1_000_000, 1_000_000);
        assert_eq!(
            resolver.check_move(off_map, off_map.stepped(Direction::East), Direction::East, 0),
            MoveDecision::Clear
        );
    }
}
