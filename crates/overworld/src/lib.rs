//! Grid-based spatial index for a tile overworld simulation: collision
//! partitions, directional movement resolution, and depth-ordered draw
//! batching for a downstream submission layer.

pub mod collision;
pub mod diagnostics;
pub mod grid;
pub mod partition;
pub mod render;


pub use collision::{CollisionResolver, MoveDecision, TriggerEvaluator, TriggerRef};
pub use diagnostics::PartitionStatsSnapshot;
pub use grid::{
    Cell, CellRect, CollisionEntry, DepthBand, Direction, DirectionMask, DynamicEntry,
    EntityHandle, GridEntry, GridError, MapId, SpatialGrid, SpriteRegion, TileRenderEntry,
    TilesetId, FLIP_HORIZONTAL, FLIP_VERTICAL, TILE_SIZE_PX,
};
pub use partition::{
    CombinedCollision, DynamicCollider, DynamicSeed, PartitionManager, StaticTileSeed,
    TileCollider, TileSprite, MERGE_INLINE_CAPACITY,
};
pub use render::{
    DepthKey, DepthOrderedRenderer, DrawEntry, SpriteInstance, Viewport, VIEWPORT_MARGIN_CELLS,
};
