use crate::cell::{Cell, Link, Neighborhood, PassContext, SweepTier};
use crate::config::KernelConfig;
use crate::core_types::{CellCoords, Direction, Placement};
use crate::error::{KernelError, Result};
use crate::params::{ChannelRegistry, ParameterChannel, ParameterSnapshot};
use tracing::{debug, info};

/// Cell storage before and after neighbor wiring
#[derive(Debug, Clone)]
pub(super) enum Storage {
    /// Slots being filled by `add_cell`
    Building(Vec<Option<Cell>>),
    /// Every slot filled and linked; passes may run
    Linked(Vec<Cell>),
}

/// Rectangular grid of cells in row-major order
///
/// Built in two phases: fill every slot with [`Grid::add_cell`], then wire
/// neighbors once with [`Grid::link_cells`]. Passes refuse to run before the
/// grid is linked.
#[derive(Debug, Clone)]
pub struct Grid {
    pub(super) rows: usize,
    pub(super) cols: usize,
    pub(super) config: KernelConfig,
    pub(super) storage: Storage,
    pub(super) registry: ChannelRegistry,
}

impl Grid {
    /// Allocate `rows * cols` empty slots
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidDimensions`] when either dimension is below 2;
    /// bilinear sampling needs two lattice points per axis.
    pub fn new(rows: usize, cols: usize, config: KernelConfig) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(KernelError::InvalidDimensions { rows, cols });
        }
        debug!("Allocating {}x{} grid", rows, cols);
        Ok(Self {
            rows,
            cols,
            config,
            storage: Storage::Building(vec![None; rows * cols]),
            registry: ChannelRegistry::default(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.storage, Storage::Linked(_))
    }

    /// Values currently applied to the parameter channels
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub(super) fn pass_context(&self) -> PassContext {
        PassContext {
            grid_spacing: self.config.grid_spacing,
            diffusion: self.config.diffusion,
        }
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(KernelError::OutOfBounds {
                at: CellCoords::new(row, col),
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Place a constructed cell into its slot
    ///
    /// # Errors
    ///
    /// - [`KernelError::OutOfBounds`] for a slot outside the grid
    /// - [`KernelError::CoordinateMismatch`] when the cell was built for another slot
    /// - [`KernelError::SlotOccupied`] when the slot already holds a cell
    /// - [`KernelError::AlreadyLinked`] after [`Grid::link_cells`]
    pub fn add_cell(&mut self, cell: Cell, row: usize, col: usize) -> Result<()> {
        let index = self.index(row, col)?;
        let slot_coords = CellCoords::new(row, col);
        if cell.coords() != slot_coords {
            return Err(KernelError::CoordinateMismatch {
                cell: cell.coords(),
                slot: slot_coords,
            });
        }
        let Storage::Building(slots) = &mut self.storage else {
            return Err(KernelError::AlreadyLinked);
        };
        let slot = &mut slots[index];
        if slot.is_some() {
            return Err(KernelError::SlotOccupied { at: slot_coords });
        }
        *slot = Some(cell);
        Ok(())
    }

    /// Wire every cell to its four torus neighbors and record its placement
    ///
    /// # Errors
    ///
    /// - [`KernelError::AlreadyLinked`] on a second call
    /// - [`KernelError::EmptySlot`] when any slot was never filled
    pub fn link_cells(&mut self) -> Result<()> {
        let Storage::Building(slots) = &mut self.storage else {
            return Err(KernelError::AlreadyLinked);
        };
        if let Some(index) = slots.iter().position(Option::is_none) {
            return Err(KernelError::EmptySlot {
                at: CellCoords::new(index / self.cols, index % self.cols),
            });
        }

        let mut cells: Vec<Cell> = slots.drain(..).flatten().collect();
        for cell in &mut cells {
            let coords = cell.coords();
            let links = Direction::ALL.map(|direction| Link {
                index: neighbor_index(coords, direction, self.rows, self.cols),
                wraps: Placement::wraps(coords, self.rows, self.cols, direction),
            });
            cell.set_links(links, Placement::classify(coords, self.rows, self.cols));
        }

        info!(
            "Linked {}x{} grid ({} cells)",
            self.rows,
            self.cols,
            cells.len()
        );
        self.storage = Storage::Linked(cells);
        Ok(())
    }

    /// Bounds-checked lookup
    ///
    /// # Errors
    ///
    /// [`KernelError::OutOfBounds`] outside the grid, [`KernelError::EmptySlot`]
    /// for a slot not filled yet.
    pub fn get_cell(&self, row: usize, col: usize) -> Result<&Cell> {
        let index = self.index(row, col)?;
        let cell = match &self.storage {
            Storage::Building(slots) => slots[index].as_ref(),
            Storage::Linked(cells) => cells.get(index),
        };
        cell.ok_or(KernelError::EmptySlot {
            at: CellCoords::new(row, col),
        })
    }

    /// Bounds-checked mutable lookup
    ///
    /// # Errors
    ///
    /// Same as [`Grid::get_cell`].
    pub fn get_cell_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell> {
        let index = self.index(row, col)?;
        let cell = match &mut self.storage {
            Storage::Building(slots) => slots[index].as_mut(),
            Storage::Linked(cells) => cells.get_mut(index),
        };
        cell.ok_or(KernelError::EmptySlot {
            at: CellCoords::new(row, col),
        })
    }

    /// Every placed cell in row-major order
    pub fn cells(&self) -> Box<dyn Iterator<Item = &Cell> + '_> {
        match &self.storage {
            Storage::Building(slots) => Box::new(slots.iter().flatten()),
            Storage::Linked(cells) => Box::new(cells.iter()),
        }
    }

    fn cells_mut(&mut self) -> Box<dyn Iterator<Item = &mut Cell> + '_> {
        match &mut self.storage {
            Storage::Building(slots) => Box::new(slots.iter_mut().flatten()),
            Storage::Linked(cells) => Box::new(cells.iter_mut()),
        }
    }

    pub(super) fn linked_cells_mut(&mut self) -> Result<&mut [Cell]> {
        match &mut self.storage {
            Storage::Linked(cells) => Ok(cells),
            Storage::Building(_) => Err(KernelError::NotLinked),
        }
    }

    /// Cycle the active variant of one cell
    ///
    /// # Errors
    ///
    /// Same as [`Grid::get_cell`].
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<()> {
        self.get_cell_mut(row, col)?.toggle();
        Ok(())
    }

    /// Population mean of the committed temperature, `0` for an empty grid
    pub fn average_temperature(&self) -> f32 {
        let (sum, count) = self
            .cells()
            .fold((0.0_f64, 0_usize), |(sum, count), cell| {
                (sum + f64::from(cell.temperature()), count + 1)
            });
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    }

    /// Population standard deviation of the committed temperature around `mean`
    pub fn std_dev_temperature(&self, mean: f32) -> f32 {
        let mean = f64::from(mean);
        let (sum_sq, count) = self
            .cells()
            .fold((0.0_f64, 0_usize), |(sum_sq, count), cell| {
                let delta = f64::from(cell.temperature()) - mean;
                (sum_sq + delta * delta, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64).sqrt() as f32
        }
    }

    /// Merge a parameter snapshot and broadcast the channels that changed
    ///
    /// Every variant that declared interest receives the value, active or
    /// not. `TubTemp` moves each cell's recorded initial temperature.
    pub fn apply_parameters(&mut self, snapshot: &ParameterSnapshot) -> Vec<(ParameterChannel, f32)> {
        let changed = self.registry.merge(snapshot);
        for &(channel, value) in &changed {
            debug!("Broadcasting {} = {}", channel, value);
            for cell in self.cells_mut() {
                cell.apply_parameter(channel, value);
            }
        }
        changed
    }

    /// Restore every cell to its recorded initial values
    pub fn reset(&mut self) {
        for cell in self.cells_mut() {
            cell.reset();
        }
        info!("Grid reset to initial state");
    }
}

/// Index of the torus neighbor of `coords` in `direction`
pub(super) fn neighbor_index(
    coords: CellCoords,
    direction: Direction,
    rows: usize,
    cols: usize,
) -> usize {
    let CellCoords { row, col } = coords;
    let (row, col) = match direction {
        Direction::North => ((row + rows - 1) % rows, col),
        Direction::South => ((row + 1) % rows, col),
        Direction::East => (row, (col + 1) % cols),
        Direction::West => (row, (col + cols - 1) % cols),
    };
    row * cols + col
}

/// Copies of the in-domain neighbors of `cells[index]`
pub(super) fn neighborhood(cells: &[Cell], index: usize) -> Neighborhood {
    let cell = &cells[index];
    Neighborhood::new(Direction::ALL.map(|direction| {
        cell.link(direction)
            .filter(|link| !link.wraps)
            .map(|link| *cells[link.index].state())
    }))
}

/// One in-place sweep over all cells, tier by tier, row-major within a tier
pub(super) fn sweep(cells: &mut [Cell], mut op: impl FnMut(&mut Cell, &Neighborhood)) {
    for tier in SweepTier::ALL {
        for index in 0..cells.len() {
            if cells[index].sweep_tier() != tier {
                continue;
            }
            let hood = neighborhood(cells, index);
            op(&mut cells[index], &hood);
        }
    }
}
