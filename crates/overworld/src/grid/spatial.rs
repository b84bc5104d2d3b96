use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::cell::{Cell, CellRect, MapId};
use super::entry::{EntityHandle, GridEntry};
use super::pool::ListPool;

/// Cell-addressed index over pooled entry lists. Sparse: only occupied cells
/// hold storage, and lookups on maps or cells never seen before degrade to
/// empty results, because entities legitimately sit outside any loaded map
/// during transitions.
#[derive(Debug)]
pub struct SpatialGrid<T> {
    maps: HashMap<MapId, HashMap<(i32, i32), Vec<T>>>,
    pool: ListPool<T>,
}

impl<T> Default for SpatialGrid<T> {
    fn default() -> Self {
        Self {
            maps: HashMap::new(),
            pool: ListPool::default(),
        }
    }
}

impl<T: GridEntry> SpatialGrid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: Cell, entry: T) {
        let Self { maps, pool } = self;
        let cells = maps.entry(cell.map).or_default();
        let list = match cells.entry((cell.x, cell.y)) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(pool.acquire()),
        };
        #[cfg(debug_assertions)]
        if list.iter().any(|existing| existing.entity() == entry.entity()) {
            tracing::warn!(
                map = cell.map.0,
                x = cell.x,
                y = cell.y,
                entity = entry.entity().0,
                "duplicate entity inserted into cell; caller skipped remove-before-reinsert"
            );
        }
        list.push(entry);
    }

    pub fn remove_entity(&mut self, cell: Cell, entity: EntityHandle) -> bool {
        let Self { maps, pool } = self;
        let Some(cells) = maps.get_mut(&cell.map) else {
            return false;
        };
        let Some(list) = cells.get_mut(&(cell.x, cell.y)) else {
            return false;
        };
        let Some(index) = list.iter().position(|entry| entry.entity() == entity) else {
            return false;
        };
        list.swap_remove(index);
        if list.is_empty() {
            if let Some(empty) = cells.remove(&(cell.x, cell.y)) {
                pool.release(empty);
            }
        }
        true
    }

    /// Read-only view of one cell's entries; empty for cells and maps the
    /// grid has never seen.
    pub fn get_at(&self, cell: Cell) -> &[T] {
        self.maps
            .get(&cell.map)
            .and_then(|cells| cells.get(&(cell.x, cell.y)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Accumulates every entry of every cell the rectangle covers into a
    /// caller-supplied buffer, cleared not reallocated. Intended for
    /// viewport-sized rectangles, never a whole map.
    pub fn get_in_bounds(&self, rect: &CellRect, out: &mut Vec<T>) {
        out.clear();
        self.for_each_in_bounds(rect, |_, entry| out.push(*entry));
    }

    pub fn for_each_in_bounds(&self, rect: &CellRect, mut visit: impl FnMut(Cell, &T)) {
        let Some(cells) = self.maps.get(&rect.map()) else {
            return;
        };
        for (x, y) in rect.cells() {
            if let Some(list) = cells.get(&(x, y)) {
                for entry in list {
                    visit(Cell::new(rect.map(), x, y), entry);
                }
            }
        }
    }

    /// Clears every cell of one map and returns the backing lists to the
    /// pool; idempotent.
    pub fn release_all_for_map(&mut self, map: MapId) {
        let Self { maps, pool } = self;
        let Some(cells) = maps.remove(&map) else {
            return;
        };
        for (_, list) in cells {
            pool.release(list);
        }
    }

    /// Clears every cell of every map, keeping the per-map tables warm.
    /// This is the once-per-tick reset path for the dynamic partition.
    pub fn release_all(&mut self) {
        let Self { maps, pool } = self;
        for cells in maps.values_mut() {
            for (_, list) in cells.drain() {
                pool.release(list);
            }
        }
    }

    pub fn entry_count_for_map(&self, map: MapId) -> usize {
        self.maps
            .get(&map)
            .map(|cells| cells.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn entry_count(&self) -> usize {
        self.maps
            .values()
            .map(|cells| cells.values().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    pub fn pooled_list_count(&self) -> usize {
        self.pool.free_count()
    }
}
