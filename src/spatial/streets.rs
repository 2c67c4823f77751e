//! Street map: an occupancy grid answering the spatial oracle queries
//!
//! Obstacle cells are buildings; everything else is street. Nearest-cell
//! lookups are precomputed with a multi-source BFS whenever the layout
//! changes, so per-round queries stay cheap.

use std::collections::VecDeque;
use std::path::Path;

use crate::core::config::MapConfig;
use crate::core::error::{GroupWalkError, Result};
use crate::core::types::{Vec2, WorldBounds};
use crate::spatial::grid::{Cell, Grid};
use crate::spatial::oracle::SpatialOracle;
use crate::spatial::pathfinding::{find_path, line_of_sight, CellKind};

#[derive(Debug, Clone)]
pub struct StreetMap {
    bounds: WorldBounds,
    cells: Grid<CellKind>,
    nearest_street: Grid<Option<Cell>>,
    nearest_obstacle: Grid<Option<Cell>>,
}

impl StreetMap {
    /// A map where every cell is street
    pub fn open(bounds: WorldBounds, cell_size: f64) -> Self {
        let width = (bounds.hi_x / cell_size).ceil().max(1.0) as usize;
        let height = (bounds.hi_y / cell_size).ceil().max(1.0) as usize;
        Self::from_grid(bounds, Grid::new(width, height, cell_size, Vec2::ZERO))
    }

    /// Square building blocks separated by streets, starting with a street
    /// along both axes
    pub fn city_blocks(bounds: WorldBounds, layout: &MapConfig) -> Self {
        let mut map = Self::open(bounds, layout.cell_size);
        if layout.block_cells == 0 {
            return map;
        }

        let pitch = layout.block_cells + layout.street_cells;
        for y in 0..map.cells.height {
            for x in 0..map.cells.width {
                if x % pitch >= layout.street_cells && y % pitch >= layout.street_cells {
                    map.cells.set(x, y, CellKind::Obstacle);
                }
            }
        }
        map.rebuild_index();
        map
    }

    /// Parse an ASCII layout: `#` is an obstacle, any other character is
    /// street. Row 0 is `y = 0`; short rows are padded with street.
    pub fn from_ascii(text: &str, cell_size: f64) -> Result<Self> {
        let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(GroupWalkError::MapParse("map has no rows".into()));
        }
        if !(cell_size > 0.0) {
            return Err(GroupWalkError::MapParse(format!(
                "cell size {} must be positive",
                cell_size
            )));
        }

        let bounds = WorldBounds::new(width as f64 * cell_size, rows.len() as f64 * cell_size);
        let mut cells = Grid::new(width, rows.len(), cell_size, Vec2::ZERO);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    cells.set(x, y, CellKind::Obstacle);
                }
            }
        }
        Ok(Self::from_grid(bounds, cells))
    }

    pub fn load(path: &Path, cell_size: f64) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ascii(&text, cell_size)
    }

    fn from_grid(bounds: WorldBounds, cells: Grid<CellKind>) -> Self {
        let (w, h, size) = (cells.width, cells.height, cells.cell_size);
        let mut map = Self {
            bounds,
            cells,
            nearest_street: Grid::new(w, h, size, Vec2::ZERO),
            nearest_obstacle: Grid::new(w, h, size, Vec2::ZERO),
        };
        map.rebuild_index();
        map
    }

    /// Mark every cell overlapping the rectangle `min..max` as obstacle
    pub fn block_rect(&mut self, min: Vec2, max: Vec2) {
        let (x0, y0) = self.cells.world_to_cell(min);
        let (x1, y1) = self.cells.world_to_cell(max);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells.set(x, y, CellKind::Obstacle);
            }
        }
        self.rebuild_index();
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn is_walkable(&self, position: Vec2) -> bool {
        self.bounds.contains(position)
            && self
                .cells
                .sample(position)
                .map(CellKind::is_walkable)
                .unwrap_or(false)
    }

    pub fn street_cell_count(&self) -> usize {
        self.cells.cells().filter(|(_, k)| k.is_walkable()).count()
    }

    fn rebuild_index(&mut self) {
        self.nearest_street = nearest_of_kind(&self.cells, CellKind::Street);
        self.nearest_obstacle = nearest_of_kind(&self.cells, CellKind::Obstacle);
    }

    fn center(&self, (x, y): Cell) -> Vec2 {
        self.bounds.clamp(self.cells.cell_center(x, y))
    }
}

/// Multi-source BFS: for every cell, the nearest cell of `kind`
fn nearest_of_kind(cells: &Grid<CellKind>, kind: CellKind) -> Grid<Option<Cell>> {
    let mut nearest: Grid<Option<Cell>> =
        Grid::new(cells.width, cells.height, cells.cell_size, cells.origin);
    let mut queue = VecDeque::new();

    for (cell, k) in cells.cells() {
        if *k == kind {
            nearest.set(cell.0, cell.1, Some(cell));
            queue.push_back(cell);
        }
    }

    while let Some(cell) = queue.pop_front() {
        let source = nearest.get(cell.0, cell.1).copied().flatten();
        for n in cells.neighbors(cell) {
            if nearest.get(n.0, n.1).copied().flatten().is_none() {
                nearest.set(n.0, n.1, source);
                queue.push_back(n);
            }
        }
    }

    nearest
}

impl SpatialOracle for StreetMap {
    fn closest_space(&self, position: Vec2) -> Vec2 {
        if position.is_nan() {
            return Vec2::NAN;
        }
        let clamped = self.bounds.clamp(position);
        let cell = self.cells.world_to_cell(clamped);
        if self.cells.get(cell.0, cell.1).map(CellKind::is_walkable).unwrap_or(false) {
            return clamped;
        }
        match self.nearest_street.get(cell.0, cell.1).copied().flatten() {
            Some(street) => self.center(street),
            None => Vec2::NAN,
        }
    }

    fn closest_obstacle(&self, position: Vec2) -> Vec2 {
        if position.is_nan() {
            return Vec2::NAN;
        }
        let cell = self.cells.world_to_cell(self.bounds.clamp(position));
        match self.nearest_obstacle.get(cell.0, cell.1).copied().flatten() {
            Some(obstacle) => self.center(obstacle),
            None => Vec2::NAN,
        }
    }

    fn path_to(&self, from: Vec2, to: Vec2) -> Vec2 {
        if from.is_nan() || to.is_nan() {
            return Vec2::NAN;
        }
        let from = self.bounds.clamp(from);
        let to = self.bounds.clamp(to);

        if line_of_sight(&self.cells, from, to) {
            return to;
        }

        let start = self.cells.world_to_cell(from);
        let goal = self.cells.world_to_cell(to);
        let Some(path) = find_path(&self.cells, start, goal) else {
            return Vec2::NAN;
        };

        // Furthest cell along the path still reachable in a straight line
        let mut waypoint = path.get(1).map(|&c| self.center(c)).unwrap_or(to);
        for &cell in path.iter().skip(2) {
            let candidate = self.center(cell);
            if !line_of_sight(&self.cells, from, candidate) {
                break;
            }
            waypoint = candidate;
        }
        waypoint
    }
}
