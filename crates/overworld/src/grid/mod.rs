mod cell;
mod entry;
mod pool;
mod spatial;

pub use cell::{Cell, CellRect, Direction, DirectionMask, GridError, MapId};
pub use entry::{
    CollisionEntry, DepthBand, DynamicEntry, EntityHandle, GridEntry, SpriteRegion,
    TileRenderEntry, TilesetId, FLIP_HORIZONTAL, FLIP_VERTICAL, TILE_SIZE_PX,
};
pub use spatial::SpatialGrid;
