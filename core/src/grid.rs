//! Bounded multi-occupancy grid.
//!
//! RULE: The grid only indexes agent ids by cell. It never stores an
//! agent's own position; `Habitat` keeps both in agreement.
//! Edges do not wrap.

use serde::{Deserialize, Serialize};

use crate::{
    error::{SimError, SimResult},
    types::{AgentId, Pos},
};

/// Neighbor adjacency used by queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// 8-connected.
    Moore,
    /// 4-connected.
    VonNeumann,
}

impl Connectivity {
    fn includes(self, dx: isize, dy: isize) -> bool {
        match self {
            Self::Moore => true,
            Self::VonNeumann => dx == 0 || dy == 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpaceGrid {
    width: usize,
    height: usize,
    /// Row-major: cells[y * width + x] holds the occupants of (x, y).
    cells: Vec<Vec<AgentId>>,
}

impl SpaceGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> SimResult<usize> {
        if !self.in_bounds(pos) {
            return Err(SimError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(pos.y * self.width + pos.x)
    }

    /// Add `id` to the occupants of `pos`.
    pub fn place(&mut self, id: AgentId, pos: Pos) -> SimResult<()> {
        let idx = self.index(pos)?;
        self.cells[idx].push(id);
        Ok(())
    }

    /// Drop `id` from the occupants of `pos`. Absent ids are ignored.
    pub fn remove(&mut self, id: AgentId, pos: Pos) -> SimResult<()> {
        let idx = self.index(pos)?;
        self.cells[idx].retain(|&other| other != id);
        Ok(())
    }

    /// Move `id` from `from` to `to`. The destination is checked before
    /// anything changes, so a failed move leaves the grid untouched.
    pub fn relocate(&mut self, id: AgentId, from: Pos, to: Pos) -> SimResult<()> {
        let dest = self.index(to)?;
        let src = self.index(from)?;
        self.cells[src].retain(|&other| other != id);
        self.cells[dest].push(id);
        Ok(())
    }

    /// Occupants of a single cell, in insertion order. Empty when out of bounds.
    pub fn contents(&self, pos: Pos) -> &[AgentId] {
        match self.index(pos) {
            Ok(idx) => &self.cells[idx],
            Err(_) => &[],
        }
    }

    /// In-bounds cells adjacent to `pos`, row by row from the lowest row.
    pub fn neighborhood(
        &self,
        pos: Pos,
        connectivity: Connectivity,
        include_center: bool,
    ) -> Vec<Pos> {
        let mut out = Vec::with_capacity(9);
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    if include_center && self.in_bounds(pos) {
                        out.push(pos);
                    }
                    continue;
                }
                if !connectivity.includes(dx, dy) {
                    continue;
                }
                let (Some(x), Some(y)) = (
                    pos.x.checked_add_signed(dx),
                    pos.y.checked_add_signed(dy),
                ) else {
                    continue;
                };
                let candidate = Pos::new(x, y);
                if self.in_bounds(candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Occupants of the neighborhood of `pos`, cell by cell in
    /// `neighborhood` order.
    pub fn neighbors(
        &self,
        pos: Pos,
        connectivity: Connectivity,
        include_center: bool,
    ) -> Vec<AgentId> {
        self.neighborhood(pos, connectivity, include_center)
            .into_iter()
            .flat_map(|cell| self.contents(cell).iter().copied())
            .collect()
    }

    /// Every cell with its occupants, row-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Pos, &[AgentId])> + '_ {
        self.cells.iter().enumerate().map(move |(idx, occupants)| {
            (Pos::new(idx % self.width, idx / self.width), occupants.as_slice())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_out_of_bounds_is_rejected() {
        let mut grid = SpaceGrid::new(4, 3);
        let err = grid.place(0, Pos::new(4, 0)).unwrap_err();
        assert!(matches!(err, SimError::OutOfBounds { x: 4, y: 0, .. }));
        assert!(grid.place(0, Pos::new(0, 3)).is_err());
        assert!(grid.iter_cells().all(|(_, occ)| occ.is_empty()));
    }

    #[test]
    fn cells_hold_many_occupants() {
        let mut grid = SpaceGrid::new(3, 3);
        let cell = Pos::new(1, 1);
        grid.place(0, cell).unwrap();
        grid.place(1, cell).unwrap();
        grid.place(2, cell).unwrap();
        assert_eq!(grid.contents(cell), &[0, 1, 2]);
    }

    #[test]
    fn failed_relocate_leaves_agent_in_place() {
        let mut grid = SpaceGrid::new(3, 3);
        grid.place(7, Pos::new(2, 2)).unwrap();
        assert!(grid.relocate(7, Pos::new(2, 2), Pos::new(3, 2)).is_err());
        assert_eq!(grid.contents(Pos::new(2, 2)), &[7]);
    }

    #[test]
    fn relocate_moves_between_cells() {
        let mut grid = SpaceGrid::new(3, 3);
        grid.place(7, Pos::new(0, 0)).unwrap();
        grid.relocate(7, Pos::new(0, 0), Pos::new(1, 1)).unwrap();
        assert!(grid.contents(Pos::new(0, 0)).is_empty());
        assert_eq!(grid.contents(Pos::new(1, 1)), &[7]);
    }

    #[test]
    fn corner_neighborhood_is_clipped() {
        let grid = SpaceGrid::new(5, 5);
        let moore = grid.neighborhood(Pos::new(0, 0), Connectivity::Moore, false);
        assert_eq!(moore, vec![Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)]);

        let with_center = grid.neighborhood(Pos::new(0, 0), Connectivity::Moore, true);
        assert_eq!(with_center.len(), 4);
        assert!(with_center.contains(&Pos::new(0, 0)));

        let far_corner = grid.neighborhood(Pos::new(4, 4), Connectivity::Moore, false);
        assert_eq!(far_corner.len(), 3);
    }

    #[test]
    fn von_neumann_skips_diagonals() {
        let grid = SpaceGrid::new(5, 5);
        let cells = grid.neighborhood(Pos::new(2, 2), Connectivity::VonNeumann, false);
        assert_eq!(
            cells,
            vec![Pos::new(2, 1), Pos::new(1, 2), Pos::new(3, 2), Pos::new(2, 3)]
        );
        let interior = grid.neighborhood(Pos::new(2, 2), Connectivity::Moore, true);
        assert_eq!(interior.len(), 9);
    }

    #[test]
    fn neighbors_collects_occupants() {
        let mut grid = SpaceGrid::new(5, 5);
        grid.place(1, Pos::new(2, 2)).unwrap();
        grid.place(2, Pos::new(1, 1)).unwrap();
        grid.place(3, Pos::new(4, 4)).unwrap();
        assert_eq!(grid.neighbors(Pos::new(2, 2), Connectivity::Moore, false), vec![2]);
        assert_eq!(grid.neighbors(Pos::new(2, 2), Connectivity::Moore, true), vec![2, 1]);
    }
}
