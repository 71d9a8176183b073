//! Trail field: a fading, hue-tagged scent map written by organisms.

use crate::genetics::Hue;
use serde::{Deserialize, Serialize};

/// One grid cell of the trail field
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailCell {
    pub hue: Hue,
    /// 0.0 (no scent) to 1.0 (freshly written)
    pub intensity: f64,
}

/// A trail cell picked as a steering target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailTarget {
    /// World coordinates of the cell centre
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

/// Dense grid covering the world, `cell_size` world units per cell
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrailField {
    cols: usize,
    rows: usize,
    cell_size: f64,
    /// cells[row][col]
    cells: Vec<Vec<TrailCell>>,
}

impl TrailField {
    /// Create an empty field of `cols x rows` cells
    pub fn new(cols: usize, rows: usize, cell_size: f64) -> Self {
        Self {
            cols,
            rows,
            cell_size,
            cells: vec![vec![TrailCell::default(); cols]; rows],
        }
    }

    /// Create a field covering a `width x height` world
    pub fn for_world(width: f64, height: f64, cell_size: f64) -> Self {
        let cols = (width / cell_size).floor().max(0.0) as usize;
        let rows = (height / cell_size).floor().max(0.0) as usize;
        Self::new(cols, rows, cell_size)
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Grid cell under a world position, if inside the grid
    #[inline]
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    /// Get the cell at grid coordinates
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<&TrailCell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Intensity under a world position (0 outside the grid)
    pub fn intensity_at(&self, x: f64, y: f64) -> f64 {
        self.cell_of(x, y)
            .and_then(|(c, r)| self.get(c, r))
            .map_or(0.0, |cell| cell.intensity)
    }

    /// Stamp a fresh scent at a world position. Returns false outside the grid.
    pub fn mark(&mut self, x: f64, y: f64, hue: Hue) -> bool {
        match self.cell_of(x, y) {
            Some((col, row)) => {
                self.cells[row][col] = TrailCell {
                    hue,
                    intensity: 1.0,
                };
                true
            }
            None => false,
        }
    }

    /// Fade every cell by `factor`, snapping faint cells to exactly zero
    pub fn decay(&mut self, factor: f64, snap_threshold: f64) {
        for row in &mut self.cells {
            for cell in row {
                if cell.intensity > 0.0 {
                    cell.intensity *= factor;
                    if cell.intensity < snap_threshold {
                        cell.intensity = 0.0;
                    }
                }
            }
        }
    }

    /// Wipe all scent
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(TrailCell::default());
        }
    }

    /// Strongest compatible cell within `radius` world units of `(x, y)`.
    ///
    /// The cell under `(x, y)` itself is skipped, as are cells at or below
    /// `min_intensity`. Ties keep the first cell scanned.
    pub fn strongest_near(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        hue: Hue,
        hue_tolerance: f64,
        min_intensity: f64,
    ) -> Option<TrailTarget> {
        let (center_col, center_row) = self.cell_of(x, y)?;
        let reach = (radius / self.cell_size).floor().max(1.0) as usize;

        let col_min = center_col.saturating_sub(reach);
        let col_max = (center_col + reach).min(self.cols - 1);
        let row_min = center_row.saturating_sub(reach);
        let row_max = (center_row + reach).min(self.rows - 1);

        let mut best: Option<(usize, usize, f64)> = None;
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if col == center_col && row == center_row {
                    continue;
                }
                let cell = &self.cells[row][col];
                if cell.intensity <= min_intensity || !cell.hue.is_within(hue, hue_tolerance) {
                    continue;
                }
                if best.map_or(true, |(_, _, strength)| cell.intensity > strength) {
                    best = Some((col, row, cell.intensity));
                }
            }
        }

        best.map(|(col, row, intensity)| TrailTarget {
            x: (col as f64 + 0.5) * self.cell_size,
            y: (row as f64 + 0.5) * self.cell_size,
            intensity,
        })
    }

    /// Iterate `(col, row, cell)` over cells with any scent, for renderers
    pub fn active_cells(&self) -> impl Iterator<Item = (usize, usize, &TrailCell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.intensity > 0.0)
                .map(move |(col, cell)| (col, row, cell))
        })
    }

    /// Sum of intensities across the grid
    pub fn total_intensity(&self) -> f64 {
        self.cells.iter().flatten().map(|c| c.intensity).sum()
    }
}
