mod depth;

pub use depth::DepthKey;

use crate::grid::{Cell, CellRect, EntityHandle, SpriteRegion, TilesetId, TILE_SIZE_PX};
use crate::partition::PartitionManager;

/// Extra ring of cells gathered around the viewport so tiles sliding into
/// view are already in the batch.
pub const VIEWPORT_MARGIN_CELLS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    rect: CellRect,
}

impl Viewport {
    pub fn new(rect: CellRect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> CellRect {
        self.rect
    }
}

/// One entity sprite for the current tick, as supplied by the movement and
/// animation subsystem. `pixel_x`/`pixel_y` is the interpolated on-screen
/// position; `destination` is set while the entity is mid-transition
/// between cells and names the cell the move commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteInstance {
    pub entity: EntityHandle,
    pub current: Cell,
    pub destination: Option<Cell>,
    pub elevation_layer: u8,
    pub tileset: TilesetId,
    pub source: SpriteRegion,
    pub flip: u8,
    pub pixel_x: i32,
    pub pixel_y: i32,
}

/// One record of the ordered draw batch handed to the submission layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawEntry {
    pub tileset: TilesetId,
    pub source: SpriteRegion,
    pub dest_x_px: i32,
    pub dest_y_px: i32,
    pub depth: DepthKey,
    pub flip: u8,
}

/// Builds a single back-to-front draw batch for a viewport rectangle; no
/// per-layer passes downstream.
///
/// The depth key for a stationary sprite derives from its current row; for
/// a sprite mid-transition it derives from the destination row for every
/// tick of the transition, never from the interpolated pixel row. Sorting
/// by the interpolated position passes through the depth of intervening
/// geometry and makes the sprite flicker behind scenery it is crossing;
/// keying on the destination holds the depth constant for the whole move.
#[derive(Debug, Default)]
pub struct DepthOrderedRenderer {
    staging: Vec<(EntityHandle, DrawEntry)>,
    batch: Vec<DrawEntry>,
}

impl DepthOrderedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the ordered batch for one frame. The returned slice borrows
    /// renderer-owned storage and is valid until the next call.
    pub fn build_batch(
        &mut self,
        partitions: &PartitionManager,
        viewport: Viewport,
        sprites: &[SpriteInstance],
    ) -> &[DrawEntry] {
        self.staging.clear();

        let expanded = viewport.rect().expanded(VIEWPORT_MARGIN_CELLS);
        // Clip against the registered map bounds up front; border cells
        // outside the map are skipped without per-tile scans, and a map
        // with no registered bounds contributes no tiles.
        let visible = partitions
            .bounds_of(expanded.map())
            .and_then(|bounds| expanded.intersect(bounds));
        if let Some(visible) = visible {
            let staging = &mut self.staging;
            partitions.for_each_render_tile_in_bounds(&visible, |cell, entry| {
                staging.push((
                    entry.entity,
                    DrawEntry {
                        tileset: entry.tileset,
                        source: entry.source,
                        dest_x_px: cell.x * TILE_SIZE_PX + entry.pixel_offset_x as i32,
                        dest_y_px: cell.y * TILE_SIZE_PX + entry.pixel_offset_y as i32,
                        depth: DepthKey::for_band(entry.depth_band, entry.elevation_layer, cell.y),
                        flip: entry.flip,
                    },
                ));
            });
        }

        for sprite in sprites {
            if sprite.current.map != expanded.map() {
                continue;
            }
            // A destination on another map (a warp mid-commit) cannot anchor
            // depth or culling to this map's rows.
            let anchor = match sprite.destination {
                Some(destination) if destination.map == expanded.map() => destination,
                _ => sprite.current,
            };
            let in_view = expanded.contains(sprite.current.x, sprite.current.y)
                || expanded.contains(anchor.x, anchor.y);
            if !in_view {
                continue;
            }
            self.staging.push((
                sprite.entity,
                DrawEntry {
                    tileset: sprite.tileset,
                    source: sprite.source,
                    dest_x_px: sprite.pixel_x,
                    dest_y_px: sprite.pixel_y,
                    depth: DepthKey::row_order(sprite.elevation_layer, anchor.y),
                    flip: sprite.flip,
                },
            ));
        }

        self.staging.sort_by(|left, right| {
            left.1
                .depth
                .cmp(&right.1.depth)
                .then_with(|| left.0.cmp(&right.0))
        });
        self.batch.clear();
        self.batch
            .extend(self.staging.iter().map(|(_, entry)| *entry));
        &self.batch
    }
}
