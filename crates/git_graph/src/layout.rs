//! Pixel layout for git graph visualization
//!
//! Maps lanes and rows onto the grid, making room for an expanded detail panel.

use crate::settings::GridSettings;

/// A detail panel inserted below a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expansion {
    /// Row the panel is inserted beneath
    pub row_index: usize,
    /// Measured panel height, or `None` for the grid's default
    pub height: Option<f32>,
}

/// Grid geometry for one render pass
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    grid: GridSettings,
    row_count: usize,
    /// Clamped expansion row and its height
    expansion: Option<(usize, f32)>,
}

impl GridLayout {
    /// Create a layout for `row_count` rows with an optional expanded row
    pub fn new(grid: GridSettings, row_count: usize, expansion: Option<Expansion>) -> Self {
        let expansion = expansion.and_then(|expansion| {
            let last_row = row_count.checked_sub(1)?;
            if expansion.row_index > last_row {
                log::debug!(
                    "clamping expanded row {} to last row {last_row}",
                    expansion.row_index
                );
            }
            let height = expansion.height.unwrap_or(grid.expansion_height).max(0.);
            Some((expansion.row_index.min(last_row), height))
        });

        Self {
            grid,
            row_count,
            expansion,
        }
    }

    /// The row the panel is inserted beneath, after clamping
    pub fn expanded_row(&self) -> Option<usize> {
        self.expansion.map(|(row, _)| row)
    }

    /// Calculate X position for a lane
    pub fn lane_x(&self, lane: usize) -> f32 {
        lane as f32 * self.grid.lane_spacing + self.grid.offset_x
    }

    /// Calculate Y position for a row
    pub fn row_y(&self, row: usize) -> f32 {
        let y = row as f32 * self.grid.row_spacing + self.grid.offset_y;
        match self.expansion {
            Some((expanded_row, height)) if row > expanded_row => y + height,
            _ => y,
        }
    }

    pub fn row_spacing(&self) -> f32 {
        self.grid.row_spacing
    }

    /// Get total width needed for `lane_count` lanes
    pub fn graph_width(&self, lane_count: usize) -> f32 {
        self.grid.offset_x * 2. + lane_count.saturating_sub(1) as f32 * self.grid.lane_spacing
    }

    /// Get total height of all rows, including the expansion
    pub fn graph_height(&self) -> f32 {
        let expansion = self.expansion.map_or(0., |(_, height)| height);
        self.row_count as f32 * self.grid.row_spacing + expansion
    }
}

/// Horizontal extent of the graph on each row, used to align reference labels.
pub fn widths_at_vertices(row_extents: &[usize], lane_spacing: f32) -> Vec<f32> {
    row_extents
        .iter()
        .map(|max_lane| (max_lane + 1) as f32 * lane_spacing)
        .collect()
}
