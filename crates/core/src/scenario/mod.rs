//! The hot-bath tub layout
//!
//! Walls on the left, right and bottom replicate their inward neighbor; the
//! top row is a wall that toggles into a faucet; every interior cell is water
//! that toggles into a fixed-temperature "body".

use crate::cell::{Cell, SourceInflow, Variant};
use crate::config::TubConfig;
use crate::core_types::{Corner, Side, Vec2};
use crate::error::{KernelError, Result};
use crate::grid::Grid;
use tracing::info;

/// Builds a linked [`Grid`] in the tub layout from a [`TubConfig`]
#[derive(Debug, Clone, Default)]
pub struct TubBuilder {
    config: TubConfig,
}

impl TubBuilder {
    pub fn new(config: TubConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TubConfig {
        &self.config
    }

    /// Variant list of the cell at `(row, col)`; the first entry starts active
    fn variants(&self, row: usize, col: usize) -> Vec<Variant> {
        let config = &self.config;
        let last_row = config.rows - 1;
        let last_col = config.cols - 1;
        match (row, col) {
            (0, 0) => vec![Variant::Corner(Corner::TopLeft)],
            (0, c) if c == last_col => vec![Variant::Corner(Corner::TopRight)],
            (r, 0) if r == last_row => vec![Variant::Corner(Corner::BottomLeft)],
            (r, c) if r == last_row && c == last_col => vec![Variant::Corner(Corner::BottomRight)],
            (0, _) => {
                let inflow = SourceInflow::new(*config.source_temp, config.source_direction)
                    .with_speed(config.source_flow_speed);
                vec![Variant::Edge(Side::Top), Variant::Source(inflow)]
            }
            (r, _) if r == last_row => vec![Variant::Edge(Side::Bottom)],
            (_, 0) => vec![Variant::Edge(Side::Left)],
            (_, c) if c == last_col => vec![Variant::Edge(Side::Right)],
            _ => vec![
                Variant::Interior {
                    water_density: config.water_density,
                },
                Variant::dirichlet(*config.body_temp),
            ],
        }
    }

    /// Fill, link and seed a grid
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidDimensions`] when the tub has fewer than three
    /// rows or columns, and any error raised while placing or linking cells.
    pub fn build(&self) -> Result<Grid> {
        let config = &self.config;
        if config.rows < 3 || config.cols < 3 {
            return Err(KernelError::InvalidDimensions {
                rows: config.rows,
                cols: config.cols,
            });
        }
        let mut grid = Grid::new(config.rows, config.cols, config.kernel)?;

        for row in 0..config.rows {
            for col in 0..config.cols {
                let cell = Cell::new(
                    row,
                    col,
                    *config.tub_temp,
                    Vec2::zeros(),
                    self.variants(row, col),
                )?;
                grid.add_cell(cell, row, col)?;
            }
        }
        grid.link_cells()?;
        grid.apply_parameters(&config.initial_parameters());

        info!(
            "Built {}x{} tub at {} (source {} at speed {:.2}, body {})",
            config.rows,
            config.cols,
            config.tub_temp,
            config.source_temp,
            config.source_flow_speed,
            config.body_temp,
        );
        Ok(grid)
    }
}
