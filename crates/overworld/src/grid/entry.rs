use super::cell::DirectionMask;

/// Opaque reference into component stores owned by the host; the grid only
/// ever compares handles, it never dereferences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilesetId(pub u16);

/// Tiles are 16x16 px metatiles.
pub const TILE_SIZE_PX: i32 = 16;

pub const FLIP_HORIZONTAL: u8 = 0x01;
pub const FLIP_VERTICAL: u8 = 0x02;

/// Source rectangle within a tileset or sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Which of the three depth planes a tile draws in: `Ground` is always
/// farthest back, `RowOrder` interleaves with entities by row, `Overhead`
/// (canopy, roofs) always draws over entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBand {
    Ground,
    RowOrder,
    Overhead,
}

/// Immutable collision record for one entity at one cell; replaced wholesale
/// when the entity moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEntry {
    pub entity: EntityHandle,
    pub elevation_layer: u8,
    pub solid: bool,
    pub has_trigger_behavior: bool,
    pub blocked_directions: DirectionMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRenderEntry {
    pub entity: EntityHandle,
    pub tileset: TilesetId,
    pub source: SpriteRegion,
    pub elevation_layer: u8,
    pub depth_band: DepthBand,
    pub flip: u8,
    pub pixel_offset_x: i16,
    pub pixel_offset_y: i16,
    pub animated: bool,
}

/// Lighter per-tick record for movable entities; rebuilt every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicEntry {
    pub entity: EntityHandle,
    pub elevation_layer: u8,
    pub has_collision: bool,
    pub solid: bool,
}

impl DynamicEntry {
    pub fn to_collision_entry(self) -> CollisionEntry {
        CollisionEntry {
            entity: self.entity,
            elevation_layer: self.elevation_layer,
            solid: self.solid,
            has_trigger_behavior: false,
            blocked_directions: DirectionMask::NONE,
        }
    }
}

/// Anything a `SpatialGrid` stores; the grid needs the owning entity to
/// enforce remove-then-reinsert and to detect duplicate inserts.
pub trait GridEntry: Copy {
    fn entity(&self) -> EntityHandle;
}

impl GridEntry for CollisionEntry {
    fn entity(&self) -> EntityHandle {
        self.entity
    }
}

impl GridEntry for TileRenderEntry {
    fn entity(&self) -> EntityHandle {
        self.entity
    }
}

impl GridEntry for DynamicEntry {
    fn entity(&self) -> EntityHandle {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_entry_converts_to_plain_collision_entry() {
        let dynamic = DynamicEntry {
            entity: EntityHandle(9),
            elevation_layer: 3,
            has_collision: true,
            solid: true,
        };
        let collision = dynamic.to_collision_entry();
        assert_eq!(collision.entity, EntityHandle(9));
        assert_eq!(collision.elevation_layer, 3);
        assert!(collision.solid);
        assert!(!collision.has_trigger_behavior);
        assert!(collision.blocked_directions.is_empty());
    }
}
