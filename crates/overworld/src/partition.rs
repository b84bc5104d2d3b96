use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::debug;

use crate::diagnostics::PartitionStatsSnapshot;
use crate::grid::{
    Cell, CellRect, CollisionEntry, DepthBand, DirectionMask, DynamicEntry, EntityHandle, MapId,
    SpatialGrid, SpriteRegion, TileRenderEntry, TilesetId,
};

/// Inline capacity of the merged combined-query buffer; cells rarely hold
/// more than this many entries, denser cells spill to the heap.
pub const MERGE_INLINE_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaticRebuildState {
    Clean,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCollider {
    pub solid: bool,
    pub blocked_directions: DirectionMask,
    pub has_trigger_behavior: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSprite {
    pub tileset: TilesetId,
    pub source: SpriteRegion,
    pub depth_band: DepthBand,
    pub flip: u8,
    pub pixel_offset_x: i16,
    pub pixel_offset_y: i16,
    pub animated: bool,
}

/// One immovable tile as supplied by the map-ingestion side during a static
/// rebuild. Coordinates are relative to the map being rebuilt.
#[derive(Debug, Clone, Copy)]
pub struct StaticTileSeed {
    pub entity: EntityHandle,
    pub x: i32,
    pub y: i32,
    pub elevation_layer: u8,
    pub collider: Option<TileCollider>,
    pub sprite: Option<TileSprite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicCollider {
    pub solid: bool,
}

/// One movable entity as supplied per tick; anything carrying a position
/// plus a collider and/or a renderable qualifies.
#[derive(Debug, Clone, Copy)]
pub struct DynamicSeed {
    pub entity: EntityHandle,
    pub cell: Cell,
    pub elevation_layer: u8,
    pub collider: Option<DynamicCollider>,
    pub sprite: Option<TileSprite>,
}

/// Combined static+dynamic collision entries at one cell. The common cases
/// borrow straight from one partition with zero copying; only a cell that is
/// populated in both partitions materializes a merged buffer.
#[derive(Debug)]
pub enum CombinedCollision<'a> {
    Empty,
    StaticOnly(&'a [CollisionEntry]),
    DynamicOnly(&'a [DynamicEntry]),
    Merged(SmallVec<[CollisionEntry; MERGE_INLINE_CAPACITY]>),
}

impl CombinedCollision<'_> {
    pub fn iter(&self) -> CombinedCollisionIter<'_> {
        match self {
            Self::Empty => CombinedCollisionIter {
                static_entries: &[],
                dynamic_entries: &[],
            },
            Self::StaticOnly(entries) => CombinedCollisionIter {
                static_entries: entries,
                dynamic_entries: &[],
            },
            Self::DynamicOnly(entries) => CombinedCollisionIter {
                static_entries: &[],
                dynamic_entries: entries,
            },
            Self::Merged(buffer) => CombinedCollisionIter {
                static_entries: buffer.as_slice(),
                dynamic_entries: &[],
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Yields collision entries by value, converting dynamic records on the fly.
/// Dynamic records without collision are skipped.
pub struct CombinedCollisionIter<'a> {
    static_entries: &'a [CollisionEntry],
    dynamic_entries: &'a [DynamicEntry],
}

impl Iterator for CombinedCollisionIter<'_> {
    type Item = CollisionEntry;

    fn next(&mut self) -> Option<CollisionEntry> {
        if let Some((first, rest)) = self.static_entries.split_first() {
            self.static_entries = rest;
            return Some(*first);
        }
        while let Some((first, rest)) = self.dynamic_entries.split_first() {
            self.dynamic_entries = rest;
            if first.has_collision {
                return Some(first.to_collision_entry());
            }
        }
        None
    }
}

/// Owns the static and dynamic partitions for every loaded map, plus the
/// per-map bounds the renderer uses to exclude out-of-map border cells.
///
/// Per-tick ordering is strict: static rebuild (only if dirty), then dynamic
/// rebuild, then collision resolution and rendering. Query results borrow
/// pooled storage and are invalidated by the next mutating call.
#[derive(Debug, Default)]
pub struct PartitionManager {
    static_collision: SpatialGrid<CollisionEntry>,
    static_render: SpatialGrid<TileRenderEntry>,
    dynamic_entries: SpatialGrid<DynamicEntry>,
    dynamic_render: SpatialGrid<TileRenderEntry>,
    bounds_by_map: HashMap<MapId, CellRect>,
    static_state_by_map: HashMap<MapId, StaticRebuildState>,
    dynamic_rebuild_count: u64,
    last_dynamic_population: usize,
}

impl PartitionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loaded map and its cell-range bounds. A freshly
    /// registered map starts dirty so its first static rebuild runs.
    pub fn register_map(&mut self, bounds: CellRect) {
        debug!(map = bounds.map().0, "registered map bounds");
        self.bounds_by_map.insert(bounds.map(), bounds);
        self.static_state_by_map
            .insert(bounds.map(), StaticRebuildState::Dirty);
    }

    pub fn bounds_of(&self, map: MapId) -> Option<CellRect> {
        self.bounds_by_map.get(&map).copied()
    }

    /// Structural tile edit: flags the map for a static rebuild.
    pub fn mark_static_dirty(&mut self, map: MapId) {
        self.static_state_by_map
            .insert(map, StaticRebuildState::Dirty);
    }

    pub fn is_static_dirty(&self, map: MapId) -> bool {
        matches!(
            self.static_state_by_map.get(&map),
            Some(StaticRebuildState::Dirty)
        )
    }

    /// Rebuilds the map's static partition if and only if it is dirty,
    /// walking the seeds the supply closure yields exactly once. Returns
    /// whether a rebuild ran.
    pub fn rebuild_static_if_dirty<I, F>(&mut self, map: MapId, supply: F) -> bool
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = StaticTileSeed>,
    {
        if !self.is_static_dirty(map) {
            return false;
        }
        self.static_collision.release_all_for_map(map);
        self.static_render.release_all_for_map(map);

        let mut tiles = 0usize;
        for seed in supply() {
            let cell = Cell::new(map, seed.x, seed.y);
            if let Some(collider) = seed.collider {
                self.static_collision.insert(
                    cell,
                    CollisionEntry {
                        entity: seed.entity,
                        elevation_layer: seed.elevation_layer,
                        solid: collider.solid,
                        has_trigger_behavior: collider.has_trigger_behavior,
                        blocked_directions: collider.blocked_directions,
                    },
                );
            }
            if let Some(sprite) = seed.sprite {
                self.static_render
                    .insert(cell, tile_render_entry(seed.entity, seed.elevation_layer, sprite));
            }
            tiles = tiles.saturating_add(1);
        }
        self.static_state_by_map
            .insert(map, StaticRebuildState::Clean);
        debug!(map = map.0, tiles, "static partition rebuilt");
        true
    }

    /// Clears and fully repopulates the dynamic partition; called exactly
    /// once per tick, before any movement or rendering query reads it.
    pub fn rebuild_dynamic<I>(&mut self, seeds: I)
    where
        I: IntoIterator<Item = DynamicSeed>,
    {
        self.dynamic_entries.release_all();
        self.dynamic_render.release_all();

        let mut population = 0usize;
        for seed in seeds {
            self.dynamic_entries.insert(
                seed.cell,
                DynamicEntry {
                    entity: seed.entity,
                    elevation_layer: seed.elevation_layer,
                    has_collision: seed.collider.is_some(),
                    solid: seed.collider.map_or(false, |collider| collider.solid),
                },
            );
            if let Some(sprite) = seed.sprite {
                self.dynamic_render.insert(
                    seed.cell,
                    tile_render_entry(seed.entity, seed.elevation_layer, sprite),
                );
            }
            population = population.saturating_add(1);
        }
        self.dynamic_rebuild_count = self.dynamic_rebuild_count.saturating_add(1);
        self.last_dynamic_population = population;
    }

    /// Force-removes an entity from both partitions at a cell, for entities
    /// destroyed (or stripped of their qualifying components) mid-tick.
    pub fn evict_entity(&mut self, entity: EntityHandle, cell: Cell) -> bool {
        let static_collision = self.static_collision.remove_entity(cell, entity);
        let static_render = self.static_render.remove_entity(cell, entity);
        let dynamic_entry = self.dynamic_entries.remove_entity(cell, entity);
        let dynamic_render = self.dynamic_render.remove_entity(cell, entity);
        static_collision || static_render || dynamic_entry || dynamic_render
    }

    /// Releases every grid cell and the bounds of one map, returning backing
    /// lists to the shared pools. Idempotent; must run before the map's
    /// owning entities are destroyed and before a newly loaded map starts
    /// reusing the pools.
    pub fn release_map(&mut self, map: MapId) {
        self.static_collision.release_all_for_map(map);
        self.static_render.release_all_for_map(map);
        self.dynamic_entries.release_all_for_map(map);
        self.dynamic_render.release_all_for_map(map);
        self.bounds_by_map.remove(&map);
        self.static_state_by_map.remove(&map);
        debug!(map = map.0, "released map partitions");
    }

    pub fn combined_collision_at(&self, cell: Cell) -> CombinedCollision<'_> {
        let static_entries = self.static_collision.get_at(cell);
        let dynamic_entries = self.dynamic_entries.get_at(cell);
        match (static_entries.is_empty(), dynamic_entries.is_empty()) {
            (true, true) => CombinedCollision::Empty,
            (false, true) => CombinedCollision::StaticOnly(static_entries),
            (true, false) => CombinedCollision::DynamicOnly(dynamic_entries),
            (false, false) => {
                let mut merged = SmallVec::new();
                merged.extend_from_slice(static_entries);
                merged.extend(
                    dynamic_entries
                        .iter()
                        .filter(|entry| entry.has_collision)
                        .map(|entry| entry.to_collision_entry()),
                );
                CombinedCollision::Merged(merged)
            }
        }
    }

    pub fn dynamic_entries_at(&self, cell: Cell) -> &[DynamicEntry] {
        self.dynamic_entries.get_at(cell)
    }

    pub fn static_collision_at(&self, cell: Cell) -> &[CollisionEntry] {
        self.static_collision.get_at(cell)
    }

    /// Static then dynamic tile-render entries for a viewport rectangle,
    /// into a caller buffer that is cleared, not reallocated.
    pub fn render_in_bounds(&self, rect: &CellRect, out: &mut Vec<TileRenderEntry>) {
        self.static_render.get_in_bounds(rect, out);
        self.dynamic_render
            .for_each_in_bounds(rect, |_, entry| out.push(*entry));
    }

    pub fn for_each_render_tile_in_bounds(
        &self,
        rect: &CellRect,
        mut visit: impl FnMut(Cell, &TileRenderEntry),
    ) {
        self.static_render.for_each_in_bounds(rect, &mut visit);
        self.dynamic_render.for_each_in_bounds(rect, &mut visit);
    }

    pub fn diagnostics_snapshot(&self) -> PartitionStatsSnapshot {
        PartitionStatsSnapshot {
            registered_maps: self.bounds_by_map.len(),
            dirty_maps: self
                .static_state_by_map
                .values()
                .filter(|state| matches!(state, StaticRebuildState::Dirty))
                .count(),
            static_collision_entries: self.static_collision.entry_count(),
            static_render_entries: self.static_render.entry_count(),
            dynamic_entries: self.dynamic_entries.entry_count(),
            dynamic_render_entries: self.dynamic_render.entry_count(),
            occupied_cells: self.static_collision.occupied_cell_count()
                + self.static_render.occupied_cell_count()
                + self.dynamic_entries.occupied_cell_count()
                + self.dynamic_render.occupied_cell_count(),
            pooled_lists: self.static_collision.pooled_list_count()
                + self.static_render.pooled_list_count()
                + self.dynamic_entries.pooled_list_count()
                + self.dynamic_render.pooled_list_count(),
            dynamic_rebuild_count: self.dynamic_rebuild_count,
            last_dynamic_population: self.last_dynamic_population,
        }
    }
}

fn tile_render_entry(entity: EntityHandle, elevation_layer: u8, sprite: TileSprite) -> TileRenderEntry {
    TileRenderEntry {
        entity,
        tileset: sprite.tileset,
        source: sprite.source,
        elevation_layer,
        depth_band: sprite.depth_band,
        flip: sprite.flip,
        pixel_offset_x: sprite.pixel_offset_x,
        pixel_offset_y: sprite.pixel_offset_y,
        animated: sprite.animated,
    }
}
