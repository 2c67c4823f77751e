//! Generic grid for spatial data

use crate::core::types::Vec2;

/// Cell coordinates `(column, row)`
pub type Cell = (usize, usize);

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f64,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f64, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Convert world position to cell coordinates, clamped to the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> Cell {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor() as i64;
        let y = ((pos.y - self.origin.y) / self.cell_size).floor() as i64;
        (
            x.max(0).min(self.width as i64 - 1) as usize,
            y.max(0).min(self.height as i64 - 1) as usize,
        )
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: Vec2) -> Option<&T> {
        let (x, y) = self.world_to_cell(pos);
        self.get(x, y)
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + (x as f64 + 0.5) * self.cell_size,
            self.origin.y + (y as f64 + 0.5) * self.cell_size,
        )
    }

    /// In-grid 8-neighbourhood of a cell
    pub fn neighbors(&self, (x, y): Cell) -> impl Iterator<Item = Cell> + '_ {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                Some((nx as usize, ny as usize))
            } else {
                None
            }
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = (Cell, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, value)| ((i % self.width, i / self.width), value))
    }
}
