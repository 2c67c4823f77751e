//! A* pathfinding over street cells
//!
//! 8-connected, diagonal steps cost sqrt(2) and may not cut obstacle corners.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::Vec2;
use crate::spatial::grid::{Cell, Grid};

/// Occupancy of one map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellKind {
    #[default]
    Street,
    Obstacle,
}

impl CellKind {
    pub fn is_walkable(&self) -> bool {
        matches!(self, CellKind::Street)
    }
}

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    cell: Cell,
    f_cost: OrderedFloat<f64>, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn walkable(grid: &Grid<CellKind>, (x, y): Cell) -> bool {
    grid.get(x, y).map(CellKind::is_walkable).unwrap_or(false)
}

fn heuristic(a: Cell, b: Cell) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Find path using A* algorithm
///
/// Returns None if no path exists or either endpoint is an obstacle.
pub fn find_path(grid: &Grid<CellKind>, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    if !walkable(grid, start) || !walkable(grid, goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
    let mut g_scores: AHashMap<Cell, f64> = AHashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        cell: start,
        f_cost: OrderedFloat(heuristic(start, goal)),
    });

    while let Some(current) = open_set.pop() {
        if current.cell == goal {
            return Some(reconstruct_path(&came_from, current.cell));
        }

        let current_g = *g_scores.get(&current.cell).unwrap_or(&f64::INFINITY);

        for neighbor in grid.neighbors(current.cell) {
            if !walkable(grid, neighbor) {
                continue;
            }

            let diagonal = neighbor.0 != current.cell.0 && neighbor.1 != current.cell.1;
            if diagonal
                && !(walkable(grid, (neighbor.0, current.cell.1))
                    && walkable(grid, (current.cell.0, neighbor.1)))
            {
                continue;
            }

            let step = if diagonal { std::f64::consts::SQRT_2 } else { 1.0 };
            let tentative_g = current_g + step;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f64::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: OrderedFloat(tentative_g + heuristic(neighbor, goal)),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// True when the straight segment `a -> b` only crosses street cells
pub fn line_of_sight(grid: &Grid<CellKind>, a: Vec2, b: Vec2) -> bool {
    let length = a.distance(&b);
    let samples = (length / (grid.cell_size * 0.25)).ceil().max(1.0) as usize;
    (0..=samples).all(|i| {
        let t = i as f64 / samples as f64;
        let p = a + (b - a) * t;
        grid.sample(p).map(CellKind::is_walkable).unwrap_or(false)
    })
}
