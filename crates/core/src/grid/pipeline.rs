//! The per-tick pass pipeline
//!
//! Each pass completes over the whole grid before the next one starts. Within
//! a relaxation pass every sweep runs in place, so later cells read values
//! that earlier cells of the same sweep already wrote.

use super::advection::{backtrace, sample};
use super::bath_grid::{sweep, Grid};
use crate::cell::Cell;
use crate::error::Result;
use crate::profiler::ProfilerScope;
use crate::simulation::FrameObserver;

/// One step of the tick pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Clear,
    DiffuseFlow,
    Project,
    CommitFlow,
    AdvectFlow,
    Update,
    Diffuse,
    Commit,
    Advect,
    Render,
}

impl Pass {
    /// Authoritative per-tick order
    pub const PIPELINE: [Pass; 13] = [
        Pass::Clear,
        Pass::DiffuseFlow,
        Pass::Project,
        Pass::CommitFlow,
        Pass::AdvectFlow,
        Pass::Project,
        Pass::CommitFlow,
        Pass::Update,
        Pass::Diffuse,
        Pass::Commit,
        Pass::Advect,
        Pass::Commit,
        Pass::Render,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Pass::Clear => "clear",
            Pass::DiffuseFlow => "diffuseFlow",
            Pass::Project => "project",
            Pass::CommitFlow => "commitFlow",
            Pass::AdvectFlow => "advectFlow",
            Pass::Update => "update",
            Pass::Diffuse => "diffuse",
            Pass::Commit => "commit",
            Pass::Advect => "advect",
            Pass::Render => "render",
        }
    }
}

impl Grid {
    /// Run the full 13-step pipeline once, stopping at the first error
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking, otherwise the first
    /// numerical error raised by a pass.
    pub fn run_pipeline(&mut self, observer: &mut dyn FrameObserver) -> Result<()> {
        for pass in Pass::PIPELINE {
            self.run_pass(pass, observer)?;
        }
        Ok(())
    }

    /// Run a single pass, timed
    ///
    /// # Errors
    ///
    /// See [`Grid::run_pipeline`].
    pub fn run_pass(&mut self, pass: Pass, observer: &mut dyn FrameObserver) -> Result<()> {
        let _scope = ProfilerScope::new(pass.name());
        match pass {
            Pass::Clear => {
                self.clear(observer);
                Ok(())
            }
            Pass::DiffuseFlow => self.diffuse_flow(),
            Pass::Project => self.project(),
            Pass::CommitFlow => self.commit_flow(),
            Pass::AdvectFlow => self.advect_flow(),
            Pass::Update => self.update(),
            Pass::Diffuse => self.diffuse(),
            Pass::Commit => self.commit(),
            Pass::Advect => self.advect(),
            Pass::Render => {
                self.render(observer);
                Ok(())
            }
        }
    }

    /// Hand the frame start to the renderer; the kernel itself keeps nothing to clear
    pub fn clear(&self, observer: &mut dyn FrameObserver) {
        observer.clear(self);
    }

    /// Hand the committed grid to the renderer
    pub fn render(&self, observer: &mut dyn FrameObserver) {
        observer.render(self);
    }

    /// Implicit viscous diffusion of the pending flow
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking.
    pub fn diffuse_flow(&mut self) -> Result<()> {
        let ctx = self.pass_context();
        let sweeps = self.config.diffusion_sweeps;
        let cells = self.linked_cells_mut()?;
        for _ in 0..sweeps {
            sweep(cells, |cell, hood| {
                cell.diffuse_flow(hood, &ctx);
                cell.set_flow_boundary(hood);
            });
        }
        Ok(())
    }

    /// Remove the divergent part of the pending flow
    ///
    /// Divergence, then `pressure_sweeps` Poisson sweeps, then the gradient
    /// correction.
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking.
    pub fn project(&mut self) -> Result<()> {
        let ctx = self.pass_context();
        let sweeps = self.config.pressure_sweeps;
        let cells = self.linked_cells_mut()?;

        sweep(cells, |cell, hood| cell.calculate_div(hood, &ctx));
        for _ in 0..sweeps {
            sweep(cells, |cell, hood| cell.calculate_p(hood));
        }
        sweep(cells, |cell, hood| cell.correct_flow(hood, &ctx));
        Ok(())
    }

    /// `V := V'` for every cell
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NonFiniteFlow`] for the first cell whose pending
    /// flow is not finite, or [`crate::KernelError::NotLinked`].
    pub fn commit_flow(&mut self) -> Result<()> {
        self.linked_cells_mut()?
            .iter_mut()
            .try_for_each(Cell::commit_flow)
    }

    /// Move the flow field along itself
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking.
    pub fn advect_flow(&mut self) -> Result<()> {
        let (rows, cols) = (self.rows, self.cols);
        let cells = self.linked_cells_mut()?;
        let committed: Vec<_> = cells.iter().map(Cell::flow).collect();
        sweep(cells, |cell, hood| {
            if cell.should_advect_flow() {
                let (x, y) = backtrace(cell.coords(), cell.flow(), rows, cols);
                cell.set_advected_flow(sample(&committed, rows, cols, x, y));
            } else {
                cell.set_flow_boundary(hood);
            }
        });
        Ok(())
    }

    /// Let every active variant impose its pending values
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NonFiniteSourceVector`] from a source cell, or
    /// [`crate::KernelError::NotLinked`].
    pub fn update(&mut self) -> Result<()> {
        self.linked_cells_mut()?.iter_mut().try_for_each(Cell::update)
    }

    /// Implicit heat diffusion of the pending temperature
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking.
    pub fn diffuse(&mut self) -> Result<()> {
        let ctx = self.pass_context();
        let sweeps = self.config.diffusion_sweeps;
        let cells = self.linked_cells_mut()?;
        for _ in 0..sweeps {
            sweep(cells, |cell, hood| {
                cell.diffuse(hood, &ctx);
                cell.set_boundary(hood);
            });
        }
        Ok(())
    }

    /// `T := T'` for every cell
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NonFiniteTemperature`] for the first cell whose
    /// pending temperature is not finite, or [`crate::KernelError::NotLinked`].
    pub fn commit(&mut self) -> Result<()> {
        self.linked_cells_mut()?.iter_mut().try_for_each(Cell::commit)
    }

    /// Move the temperature field along the committed flow
    ///
    /// # Errors
    ///
    /// [`crate::KernelError::NotLinked`] before linking.
    pub fn advect(&mut self) -> Result<()> {
        let (rows, cols) = (self.rows, self.cols);
        let cells = self.linked_cells_mut()?;
        let committed: Vec<f32> = cells.iter().map(Cell::temperature).collect();
        sweep(cells, |cell, hood| {
            if cell.should_advect() {
                let (x, y) = backtrace(cell.coords(), cell.flow(), rows, cols);
                cell.set_advected_temperature(sample(&committed, rows, cols, x, y));
            } else {
                cell.set_boundary(hood);
            }
        });
        Ok(())
    }
}
