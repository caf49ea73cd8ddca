//! Grid cells
//!
//! A [`Cell`] owns one grid point's double-buffered state and a fixed list of
//! behavior [`Variant`]s, exactly one of which is active. Every pass method is
//! a thin delegation to the active variant; the cell itself only handles the
//! buffer operations (`commit`, `commit_flow`), toggling and reset.

mod state;
mod variant;

pub use state::{CellState, Neighborhood};
pub use variant::{rescale, PassContext, SourceInflow, SweepTier, Variant, RANDOM_TEMPERATURE_RANGE};

use crate::core_types::{CellCoords, Direction, Placement, Vec2};
use crate::error::{KernelError, Result};
use crate::params::ParameterChannel;
use tracing::trace;

/// A variant together with its entry/exit bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    variant: Variant,
    owner: Option<CellCoords>,
    entries: u32,
    exits: u32,
}

impl Behavior {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            owner: None,
            entries: 0,
            exits: 0,
        }
    }

    fn on_entry(&mut self, owner: CellCoords) {
        self.owner = Some(owner);
        self.entries += 1;
    }

    fn on_exit(&mut self) {
        self.owner = None;
        self.exits += 1;
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Cell this behavior is currently active on
    pub fn owner(&self) -> Option<CellCoords> {
        self.owner
    }

    /// Number of times `on_entry` fired
    pub fn entries(&self) -> u32 {
        self.entries
    }

    /// Number of times `on_exit` fired
    pub fn exits(&self) -> u32 {
        self.exits
    }
}

/// One resolved neighbor link
///
/// `wraps` marks a link that crosses the domain edge; it is kept for indexing
/// but never read by physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub index: usize,
    pub wraps: bool,
}

/// One grid point
#[derive(Debug, Clone)]
pub struct Cell {
    coords: CellCoords,
    state: CellState,
    initial_temperature: f32,
    initial_flow: Vec2,
    placement: Placement,
    links: Option<[Link; 4]>,
    behaviors: Vec<Behavior>,
    active: usize,
}

impl Cell {
    /// Create a cell with both buffers at the initial values
    ///
    /// The first variant becomes active and receives `on_entry`.
    ///
    /// # Errors
    ///
    /// [`KernelError::NoVariants`] when `variants` is empty.
    pub fn new(
        row: usize,
        col: usize,
        temperature: f32,
        flow: Vec2,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Result<Self> {
        let coords = CellCoords::new(row, col);
        let mut behaviors: Vec<Behavior> = variants.into_iter().map(Behavior::new).collect();
        let Some(first) = behaviors.first_mut() else {
            return Err(KernelError::NoVariants { at: coords });
        };
        first.on_entry(coords);

        Ok(Self {
            coords,
            state: CellState::settled(temperature, flow),
            initial_temperature: temperature,
            initial_flow: flow,
            placement: Placement::Interior,
            links: None,
            behaviors,
            active: 0,
        })
    }

    pub fn coords(&self) -> CellCoords {
        self.coords
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    /// Committed temperature `T`
    pub fn temperature(&self) -> f32 {
        self.state.temperature
    }

    /// Pending temperature `T'`
    pub fn pending_temperature(&self) -> f32 {
        self.state.pending_temperature
    }

    /// Committed flow `V`
    pub fn flow(&self) -> Vec2 {
        self.state.flow
    }

    /// Pending flow `V'`
    pub fn pending_flow(&self) -> Vec2 {
        self.state.pending_flow
    }

    pub fn divergence(&self) -> f32 {
        self.state.divergence
    }

    pub fn pressure(&self) -> f32 {
        self.state.pressure
    }

    pub fn initial_temperature(&self) -> f32 {
        self.initial_temperature
    }

    pub fn initial_flow(&self) -> Vec2 {
        self.initial_flow
    }

    /// Record a new starting temperature; takes effect on the next [`Cell::reset`]
    pub fn set_initial_temperature(&mut self, temperature: f32) {
        self.initial_temperature = temperature;
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Neighbor link in `direction`, `None` before the grid is linked
    pub fn link(&self, direction: Direction) -> Option<Link> {
        self.links.map(|links| links[direction.index()])
    }

    pub(crate) fn set_links(&mut self, links: [Link; 4], placement: Placement) {
        self.links = Some(links);
        self.placement = placement;
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn variant(&self) -> &Variant {
        &self.behaviors[self.active].variant
    }

    /// Advance to the next variant, wrapping after the last
    ///
    /// The outgoing behavior sees `on_exit`, the incoming one `on_entry`. A
    /// cell with a single variant exits and re-enters it.
    pub fn toggle(&mut self) {
        self.behaviors[self.active].on_exit();
        self.active = (self.active + 1) % self.behaviors.len();
        self.behaviors[self.active].on_entry(self.coords);
        trace!(
            "Cell {} toggled to {} ({}/{})",
            self.coords,
            self.variant().name(),
            self.active + 1,
            self.behaviors.len()
        );
    }

    /// Forward a parameter to every variant of this cell that listens to it
    pub fn apply_parameter(&mut self, channel: ParameterChannel, value: f32) {
        if channel == ParameterChannel::TubTemp {
            self.set_initial_temperature(value);
            return;
        }
        for behavior in &mut self.behaviors {
            if behavior.variant.interests().contains(&channel) {
                behavior.variant.apply_parameter(channel, value);
            }
        }
    }

    pub fn sweep_tier(&self) -> SweepTier {
        self.variant().sweep_tier()
    }

    pub fn should_advect(&self) -> bool {
        self.variant().should_advect()
    }

    pub fn should_advect_flow(&self) -> bool {
        self.variant().should_advect_flow()
    }

    /// # Errors
    ///
    /// Propagates [`KernelError::NonFiniteSourceVector`] from a source variant.
    pub fn update(&mut self) -> Result<()> {
        let variant = self.behaviors[self.active].variant;
        variant.update(self.coords, &mut self.state)
    }

    pub fn diffuse(&mut self, hood: &Neighborhood, ctx: &PassContext) {
        let variant = self.behaviors[self.active].variant;
        variant.diffuse(&mut self.state, hood, ctx);
    }

    pub fn diffuse_flow(&mut self, hood: &Neighborhood, ctx: &PassContext) {
        let variant = self.behaviors[self.active].variant;
        variant.diffuse_flow(&mut self.state, hood, ctx);
    }

    pub fn set_boundary(&mut self, hood: &Neighborhood) {
        let variant = self.behaviors[self.active].variant;
        variant.set_boundary(&mut self.state, hood);
    }

    pub fn set_flow_boundary(&mut self, hood: &Neighborhood) {
        let variant = self.behaviors[self.active].variant;
        variant.set_flow_boundary(&mut self.state, hood);
    }

    pub fn calculate_div(&mut self, hood: &Neighborhood, ctx: &PassContext) {
        let variant = self.behaviors[self.active].variant;
        variant.calculate_div(&mut self.state, hood, ctx);
    }

    pub fn calculate_p(&mut self, hood: &Neighborhood) {
        let variant = self.behaviors[self.active].variant;
        variant.calculate_p(&mut self.state, hood);
    }

    pub fn correct_flow(&mut self, hood: &Neighborhood, ctx: &PassContext) {
        let variant = self.behaviors[self.active].variant;
        variant.correct_flow(&mut self.state, hood, ctx);
    }

    /// Write an advected temperature into the pending buffer
    pub fn set_advected_temperature(&mut self, temperature: f32) {
        self.state.pending_temperature = temperature;
    }

    /// Write an advected flow vector into the pending buffer
    pub fn set_advected_flow(&mut self, flow: Vec2) {
        self.state.pending_flow = flow;
    }

    /// `T := T'`
    ///
    /// # Errors
    ///
    /// [`KernelError::NonFiniteTemperature`] when `T'` is NaN or infinite; `T`
    /// is left untouched.
    pub fn commit(&mut self) -> Result<()> {
        let value = self.state.pending_temperature;
        if !value.is_finite() {
            return Err(KernelError::NonFiniteTemperature {
                at: self.coords,
                value,
            });
        }
        self.state.temperature = value;
        Ok(())
    }

    /// `V := V'`
    ///
    /// # Errors
    ///
    /// [`KernelError::NonFiniteFlow`] when either component of `V'` is NaN or
    /// infinite; `V` is left untouched.
    pub fn commit_flow(&mut self) -> Result<()> {
        let flow = self.state.pending_flow;
        if !(flow.x.is_finite() && flow.y.is_finite()) {
            return Err(KernelError::NonFiniteFlow {
                at: self.coords,
                vx: flow.x,
                vy: flow.y,
            });
        }
        self.state.flow = flow;
        Ok(())
    }

    /// Restore both buffers to the recorded initial values, then let the
    /// active variant re-impose its own pending values
    pub fn reset(&mut self) {
        self.state = CellState::settled(self.initial_temperature, self.initial_flow);
        let variant = self.behaviors[self.active].variant;
        variant.reset(&mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Side;

    fn interior_cell(temperature: f32) -> Cell {
        Cell::new(1, 1, temperature, Vec2::zeros(), [Variant::interior()]).unwrap()
    }

    #[test]
    fn test_new_cell_is_settled() {
        let cell = Cell::new(2, 3, 80.0, Vec2::new(0.5, -0.5), [Variant::interior()]).unwrap();
        assert_eq!(cell.coords(), CellCoords::new(2, 3));
        assert_eq!(cell.pending_temperature(), 80.0);
        assert_eq!(cell.pending_flow(), Vec2::new(0.5, -0.5));
        assert_eq!(cell.behaviors()[0].owner(), Some(CellCoords::new(2, 3)));
        assert_eq!(cell.behaviors()[0].entries(), 1);
    }

    #[test]
    fn test_new_cell_without_variants_fails() {
        let err = Cell::new(0, 0, 80.0, Vec2::zeros(), Vec::new()).unwrap_err();
        assert_eq!(
            err,
            KernelError::NoVariants {
                at: CellCoords::new(0, 0)
            }
        );
    }

    #[test]
    fn test_commit_copies_pending() {
        let mut cell = interior_cell(80.0);
        cell.set_advected_temperature(90.0);
        assert_eq!(cell.temperature(), 80.0);
        cell.commit().unwrap();
        assert_eq!(cell.temperature(), 90.0);
    }

    #[test]
    fn test_commit_flow_rejects_non_finite() {
        let mut cell = interior_cell(80.0);
        cell.set_advected_flow(Vec2::new(f32::INFINITY, 0.0));
        let err = cell.commit_flow().unwrap_err();
        assert!(matches!(err, KernelError::NonFiniteFlow { .. }));
        assert_eq!(cell.flow(), Vec2::zeros());
    }

    #[test]
    fn test_commit_rejects_nan() {
        let mut cell = interior_cell(80.0);
        cell.set_advected_temperature(f32::NAN);
        assert!(matches!(
            cell.commit(),
            Err(KernelError::NonFiniteTemperature { .. })
        ));
        assert_eq!(cell.temperature(), 80.0);
    }

    #[test]
    fn test_toggle_cycles_and_fires_hooks() {
        let mut cell = Cell::new(
            1,
            1,
            80.0,
            Vec2::zeros(),
            [Variant::interior(), Variant::dirichlet(98.6)],
        )
        .unwrap();

        cell.toggle();
        assert_eq!(cell.active_index(), 1);
        assert_eq!(cell.behaviors()[0].owner(), None);
        assert_eq!(cell.behaviors()[1].owner(), Some(CellCoords::new(1, 1)));

        cell.toggle();
        assert_eq!(cell.active_index(), 0);
        for behavior in cell.behaviors() {
            assert_eq!(behavior.exits(), 1);
        }
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut cell = interior_cell(80.0);
        cell.set_advected_temperature(10.0);
        cell.set_advected_flow(Vec2::new(1.0, 2.0));
        cell.commit().unwrap();
        cell.commit_flow().unwrap();

        cell.reset();
        assert_eq!(*cell.state(), CellState::settled(80.0, Vec2::zeros()));
    }

    #[test]
    fn test_reset_lets_dirichlet_re_fix_constant() {
        let mut cell = Cell::new(
            1,
            1,
            80.0,
            Vec2::zeros(),
            [Variant::dirichlet(98.6)],
        )
        .unwrap();
        cell.reset();
        assert_eq!(cell.temperature(), 80.0);
        assert_eq!(cell.pending_temperature(), 98.6);
    }

    #[test]
    fn test_tub_temp_moves_initial_temperature() {
        let mut cell = interior_cell(80.0);
        cell.apply_parameter(ParameterChannel::TubTemp, 70.0);
        assert_eq!(cell.temperature(), 80.0);
        cell.reset();
        assert_eq!(cell.temperature(), 70.0);
    }

    #[test]
    fn test_parameters_reach_inactive_variants() {
        let mut cell = Cell::new(
            1,
            1,
            80.0,
            Vec2::zeros(),
            [Variant::interior(), Variant::dirichlet(98.6)],
        )
        .unwrap();
        cell.apply_parameter(ParameterChannel::BodyTemp, 101.0);
        assert_eq!(cell.behaviors()[1].variant(), &Variant::dirichlet(101.0));

        cell.apply_parameter(ParameterChannel::SourceTemp, 5.0);
        assert_eq!(cell.behaviors()[0].variant(), &Variant::interior());
    }

    #[test]
    fn test_edge_cell_delegates_boundary() {
        let mut cell = Cell::new(0, 1, 0.0, Vec2::zeros(), [Variant::Edge(Side::Top)]).unwrap();
        let mut below = CellState::settled(0.0, Vec2::zeros());
        below.pending_temperature = 33.0;
        cell.set_boundary(&Neighborhood::new([None, Some(below), None, None]));
        assert_eq!(cell.pending_temperature(), 33.0);
    }
}
