//! Spatial partition boundary
//!
//! The body calls into a [`Partition`] whenever its position changes. A body
//! caches the cells it was placed in (at most [`MAX_LOCATED_PARTITIONS`]) and
//! the box used for that placement, so the partition can skip bodies whose
//! cell membership didn't change.
//!
//! [`UniformGrid`] is a fixed grid over the arena. Its cell size must be at
//! least the diameter of the largest body's coarse radius box; otherwise a
//! body could straddle more than four cells.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use super::geometry::Aabb;
use super::shape::Shape;
use crate::math::{Fixed, Vec2d};

/// An AABB no larger than one grid cell overlaps at most 2x2 cells
pub const MAX_LOCATED_PARTITIONS: usize = 4;

/// Receives position-change notifications from bodies
pub trait Partition {
    /// Place (or re-place) `body`. Must be safe to call repeatedly.
    fn partition_object(&mut self, body: &mut Body);

    /// Drop `body` from wherever it was placed, before it is re-initialized
    fn forget_object(&mut self, _body: &Body) {}
}

/// Partition that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPartition;

impl Partition for NullPartition {
    fn partition_object(&mut self, _body: &mut Body) {}
}

/// Cells a body currently occupies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedPartitions {
    slots: [Option<u32>; MAX_LOCATED_PARTITIONS],
}

impl LocatedPartitions {
    pub fn clear(&mut self) {
        self.slots = [None; MAX_LOCATED_PARTITIONS];
    }

    /// Store `cell` in the first free slot. Returns false when full.
    pub fn push(&mut self, cell: u32) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(cell);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn contains(&self, cell: u32) -> bool {
        self.slots.contains(&Some(cell))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Raw slots with validity
    pub fn slots(&self) -> &[Option<u32>; MAX_LOCATED_PARTITIONS] {
        &self.slots
    }
}

/// Grid layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Side length of a square cell
    pub cell_size: Fixed,
    pub columns: u32,
    pub rows: u32,
    /// World position of the grid's minimum corner
    pub origin: Vec2d,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: Fixed::from_int(16),
            columns: 64,
            rows: 64,
            origin: Vec2d::from_int(-512, -512),
        }
    }
}

/// Inclusive cell coordinate range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    col_min: u32,
    col_max: u32,
    row_min: u32,
    row_max: u32,
}

/// Fixed uniform grid of body lists. Bodies outside the grid are clamped to
/// the border cells.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    config: GridConfig,
    cells: Vec<Vec<BodyId>>,
}

impl UniformGrid {
    pub fn new(config: GridConfig) -> Self {
        let columns = config.columns.max(1);
        let rows = config.rows.max(1);
        Self {
            config: GridConfig {
                columns,
                rows,
                ..config
            },
            cells: vec![Vec::new(); (columns * rows) as usize],
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn cell_index(&self, col: u32, row: u32) -> u32 {
        row * self.config.columns + col
    }

    /// Bodies in one cell, sorted by id
    pub fn cell_bodies(&self, index: u32) -> &[BodyId] {
        match self.cells.get(index as usize) {
            Some(cell) => cell.as_slice(),
            None => &[],
        }
    }

    /// Candidate bodies whose cells touch `area`, sorted and deduplicated
    pub fn query(&self, area: &Aabb) -> Vec<BodyId> {
        let range = self.range_of(area);
        let mut found = Vec::new();
        for row in range.row_min..=range.row_max {
            for col in range.col_min..=range.col_max {
                found.extend_from_slice(self.cell_bodies(self.cell_index(col, row)));
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn coord(&self, value: Fixed, origin: Fixed, count: u32) -> u32 {
        let cell = (value - origin).div(self.config.cell_size).floor_to_int();
        cell.clamp(0, count as i64 - 1) as u32
    }

    fn range_of(&self, area: &Aabb) -> CellRange {
        let origin = self.config.origin;
        CellRange {
            col_min: self.coord(area.x_min, origin.x, self.config.columns),
            col_max: self.coord(area.x_max, origin.x, self.config.columns),
            row_min: self.coord(area.y_min, origin.y, self.config.rows),
            row_max: self.coord(area.y_max, origin.y, self.config.rows),
        }
    }

    fn cells_for(&self, id: BodyId, mut range: CellRange) -> LocatedPartitions {
        if range.col_max > range.col_min + 1 || range.row_max > range.row_min + 1 {
            log::warn!(
                "Body {:?} spans more than 2x2 cells; cell size {} too small",
                id,
                self.config.cell_size.raw()
            );
            range.col_max = range.col_max.min(range.col_min + 1);
            range.row_max = range.row_max.min(range.row_min + 1);
        }
        let mut cells = LocatedPartitions::default();
        for row in range.row_min..=range.row_max {
            for col in range.col_min..=range.col_max {
                cells.push(self.cell_index(col, row));
            }
        }
        cells
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl Partition for UniformGrid {
    fn partition_object(&mut self, body: &mut Body) {
        if *body.shape() == Shape::None {
            return;
        }
        let id = body.id();
        // The coarse radius box is valid before this tick's bounds rebuild
        let area = Aabb::around(body.position(), body.radius(), body.radius());
        let range = self.range_of(&area);
        let placed = !body.located_partitions().is_empty();
        if placed && self.range_of(&body.bounds().past_grid) == range {
            return;
        }

        self.forget_object(body);
        let cells = self.cells_for(id, range);
        for index in cells.iter() {
            let cell = &mut self.cells[index as usize];
            if let Err(pos) = cell.binary_search(&id) {
                cell.insert(pos, id);
            }
        }
        body.record_partition(cells, area);
    }

    fn forget_object(&mut self, body: &Body) {
        let id = body.id();
        for old in body.located_partitions().iter() {
            if let Some(cell) = self.cells.get_mut(old as usize) {
                cell.retain(|&other| other != id);
            }
        }
    }
}
