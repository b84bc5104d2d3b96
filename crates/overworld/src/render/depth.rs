use crate::grid::DepthBand;

const PLANE_GROUND: i64 = 0;
const PLANE_ROW_ORDER: i64 = 1;
const PLANE_OVERHEAD: i64 = 2;

const PLANE_SHIFT: u32 = 40;
const LAYER_SHIFT: u32 = 32;

/// Scalar draw-order key, smaller is farther back. Packed so keys order by
/// depth plane first (ground < row content < overhead), then elevation
/// layer, then row: canopy and roof tiles draw over entities of every
/// layer, and within a layer larger rows (farther south, nearer the
/// viewer) draw later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepthKey(i64);

impl DepthKey {
    pub fn ground(elevation_layer: u8, row: i32) -> Self {
        Self::pack(PLANE_GROUND, elevation_layer, row)
    }

    pub fn row_order(elevation_layer: u8, row: i32) -> Self {
        Self::pack(PLANE_ROW_ORDER, elevation_layer, row)
    }

    pub fn overhead(elevation_layer: u8, row: i32) -> Self {
        Self::pack(PLANE_OVERHEAD, elevation_layer, row)
    }

    pub fn for_band(band: DepthBand, elevation_layer: u8, row: i32) -> Self {
        match band {
            DepthBand::Ground => Self::ground(elevation_layer, row),
            DepthBand::RowOrder => Self::row_order(elevation_layer, row),
            DepthBand::Overhead => Self::overhead(elevation_layer, row),
        }
    }

    pub fn value(self) -> i64 {
        self.0
    }

    fn pack(plane: i64, elevation_layer: u8, row: i32) -> Self {
        // Bias the row into unsigned space so negative rows still order
        // below positive ones after packing.
        let row_biased = row as i64 - i32::MIN as i64;
        Self((plane << PLANE_SHIFT) | ((elevation_layer as i64) << LAYER_SHIFT) | row_biased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_order_ground_then_rows_then_overhead() {
        let ground = DepthKey::ground(255, i32::MAX);
        let row = DepthKey::row_order(0, i32::MIN);
        let overhead = DepthKey::overhead(0, i32::MIN);
        assert!(ground < row);
        assert!(row < overhead);
    }

    #[test]
    fn depth_is_strictly_monotonic_in_row_within_a_layer() {
        let mut previous = DepthKey::row_order(3, -5);
        for row in -4..=5 {
            let current = DepthKey::row_order(3, row);
            assert!(previous < current, "row {row} did not sort after row {}", row - 1);
            previous = current;
        }
    }

    #[test]
    fn higher_elevation_layer_draws_over_any_row_of_a_lower_layer() {
        assert!(DepthKey::row_order(0, i32::MAX) < DepthKey::row_order(1, i32::MIN));
    }

    #[test]
    fn negative_rows_sort_before_positive_rows() {
        assert!(DepthKey::row_order(0, -1) < DepthKey::row_order(0, 0));
        assert!(DepthKey::row_order(0, i32::MIN) < DepthKey::row_order(0, i32::MAX));
    }
}
