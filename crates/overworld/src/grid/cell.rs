use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    fn mask_bit(self) -> u8 {
        match self {
            Self::North => DirectionMask::NORTH.0,
            Self::East => DirectionMask::EAST.0,
            Self::South => DirectionMask::SOUTH.0,
            Self::West => DirectionMask::WEST.0,
        }
    }
}

/// Set of movement directions a tile refuses to participate in, one bit per
/// cardinal direction. A one-way ledge that can only be crossed southward
/// carries `DirectionMask::NORTH`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionMask(u8);

impl DirectionMask {
    pub const NONE: DirectionMask = DirectionMask(0);
    pub const NORTH: DirectionMask = DirectionMask(1 << 0);
    pub const EAST: DirectionMask = DirectionMask(1 << 1);
    pub const SOUTH: DirectionMask = DirectionMask(1 << 2);
    pub const WEST: DirectionMask = DirectionMask(1 << 3);
    pub const ALL: DirectionMask = DirectionMask(0b1111);

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.mask_bit() != 0
    }

    pub fn with(self, direction: Direction) -> DirectionMask {
        DirectionMask(self.0 | direction.mask_bit())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Grid addressing convention:
/// - `y` grows southward (screen-down), matching row order in the map data.
/// - `North` is `y - 1`, `South` is `y + 1`, `East` is `x + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub map: MapId,
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(map: MapId, x: i32, y: i32) -> Self {
        Self { map, x, y }
    }

    pub fn stepped(self, direction: Direction) -> Cell {
        let (dx, dy) = match direction {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        };
        Cell {
            map: self.map,
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("inverted bounds rectangle: min ({min_x}, {min_y}) exceeds max ({max_x}, {max_y})")]
    InvertedBounds {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },
}

/// Inclusive cell-range rectangle on a single map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    map: MapId,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl CellRect {
    pub fn new(map: MapId, min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Result<Self, GridError> {
        if min_x > max_x || min_y > max_y {
            return Err(GridError::InvertedBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            map,
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn map(&self) -> MapId {
        self.map
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn cell_count(&self) -> u64 {
        let width = (self.max_x as i64 - self.min_x as i64 + 1) as u64;
        let height = (self.max_y as i64 - self.min_y as i64 + 1) as u64;
        width.saturating_mul(height)
    }

    pub fn expanded(self, margin: i32) -> CellRect {
        let margin = margin.max(0);
        CellRect {
            map: self.map,
            min_x: self.min_x.saturating_sub(margin),
            min_y: self.min_y.saturating_sub(margin),
            max_x: self.max_x.saturating_add(margin),
            max_y: self.max_y.saturating_add(margin),
        }
    }

    pub fn intersect(self, other: CellRect) -> Option<CellRect> {
        if self.map != other.map {
            return None;
        }
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some(CellRect {
            map: self.map,
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Row-major iteration over every `(x, y)` the rectangle covers.
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}
