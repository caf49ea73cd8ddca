//! Tick driver
//!
//! [`HotBath`] owns a linked grid and the parameter mailbox. Parameter posts
//! land in the mailbox at any time and are applied only at the start of the
//! next tick, so a relaxation sweep never sees coefficients change under it.

use crate::config::TubConfig;
use crate::error::{KernelError, Result};
use crate::grid::Grid;
use crate::params::{ParameterChannel, ParameterMailbox};
use crate::profiler::{FrameTimer, ProfilerScope};
use crate::scenario::TubBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Receives the `clear` and `render` steps of every tick
///
/// The kernel draws nothing itself; a renderer implements this to paint the
/// committed grid.
pub trait FrameObserver {
    fn clear(&mut self, _grid: &Grid) {}

    fn render(&mut self, _grid: &Grid) {}
}

/// Observer that ignores every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl FrameObserver for NullObserver {}

/// Aggregate temperature statistics after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    pub tick: u64,
    pub average_temp: f32,
    pub std_dev_temp: f32,
}

impl TickStats {
    fn measure(grid: &Grid, tick: u64) -> Self {
        let average_temp = grid.average_temperature();
        Self {
            tick,
            average_temp,
            std_dev_temp: grid.std_dev_temperature(average_temp),
        }
    }
}

/// Hot-bath simulation: grid, parameter mailbox and tick bookkeeping
#[derive(Debug)]
pub struct HotBath {
    grid: Grid,
    mailbox: ParameterMailbox,
    tick: u64,
    stats: TickStats,
    timer: FrameTimer,
}

impl HotBath {
    /// Wrap an already linked grid
    ///
    /// # Errors
    ///
    /// [`KernelError::NotLinked`] when `grid` has not been linked.
    pub fn new(grid: Grid) -> Result<Self> {
        if !grid.is_linked() {
            return Err(KernelError::NotLinked);
        }
        let stats = TickStats::measure(&grid, 0);
        Ok(Self {
            grid,
            mailbox: ParameterMailbox::new(),
            tick: 0,
            stats,
            timer: FrameTimer::new(),
        })
    }

    /// Build the tub layout described by `config`
    ///
    /// # Errors
    ///
    /// Any error from [`TubBuilder::build`].
    pub fn from_config(config: TubConfig) -> Result<Self> {
        let grid = TubBuilder::new(config).build()?;
        Self::new(grid)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Statistics of the last completed tick (or of the initial state)
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Queue a parameter value for the next tick; a later post replaces it
    ///
    /// # Errors
    ///
    /// [`KernelError::InvalidParameter`] for a value the channel rejects.
    pub fn post_parameter(&mut self, channel: ParameterChannel, value: f32) -> Result<()> {
        self.mailbox.post(channel, value)
    }

    /// Apply pending parameters, run the full pipeline and refresh statistics
    ///
    /// # Errors
    ///
    /// The first error raised by any pass; the tick is abandoned at that point
    /// and the grid should be considered unstable.
    pub fn tick(&mut self, observer: &mut dyn FrameObserver) -> Result<TickStats> {
        let scope = ProfilerScope::new("tick");

        let snapshot = self.mailbox.take();
        if !snapshot.is_empty() {
            let changed = self.grid.apply_parameters(&snapshot);
            debug!("Tick {} applied {} parameter change(s)", self.tick + 1, changed.len());
        }

        if let Err(err) = self.grid.run_pipeline(observer) {
            error!("Tick {} aborted: {}", self.tick + 1, err);
            return Err(err);
        }

        self.tick += 1;
        self.stats = TickStats::measure(&self.grid, self.tick);
        self.timer.record(scope.elapsed_ms());
        debug!(
            "Tick {}: avg {:.2}°F, std dev {:.2}°F ({:.2} ms)",
            self.stats.tick,
            self.stats.average_temp,
            self.stats.std_dev_temp,
            self.timer.last_frame_time_ms()
        );
        Ok(self.stats)
    }

    /// Restore every cell, commit the restored values and redraw
    ///
    /// # Errors
    ///
    /// A non-finite value surfacing from the commits.
    pub fn reset(&mut self, observer: &mut dyn FrameObserver) -> Result<()> {
        self.grid.reset();
        self.grid.commit_flow()?;
        self.grid.commit()?;
        self.grid.render(observer);
        self.stats = TickStats::measure(&self.grid, self.tick);
        info!("Simulation reset at tick {}", self.tick);
        Ok(())
    }

    /// Cycle the active variant of one cell
    ///
    /// # Errors
    ///
    /// [`KernelError::OutOfBounds`] outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.toggle(row, col)
    }
}
