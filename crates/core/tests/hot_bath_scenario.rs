//! End-to-end runs of the tub layout through the driver

use ctor::ctor;
use hot_bath_core::{
    Cell, FrameObserver, Grid, HotBath, KernelError, NullObserver, ParameterChannel, TubConfig, Vec2,
};
use tracing_subscriber::EnvFilter;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tub(rows: usize, cols: usize) -> HotBath {
    HotBath::from_config(TubConfig {
        rows,
        cols,
        ..TubConfig::default()
    })
    .unwrap()
}

/// Records the hottest committed temperature seen at every render
#[derive(Default)]
struct PeakObserver {
    peaks: Vec<f32>,
}

impl FrameObserver for PeakObserver {
    fn render(&mut self, grid: &Grid) {
        let peak = grid
            .cells()
            .map(Cell::temperature)
            .fold(f32::NEG_INFINITY, f32::max);
        self.peaks.push(peak);
    }
}

#[test]
fn idle_tub_stays_at_rest() {
    let mut bath = tub(12, 20);
    for _ in 0..5 {
        let stats = bath.tick(&mut NullObserver).unwrap();
        assert!((stats.average_temp - 80.0).abs() < 1e-3);
        assert!(stats.std_dev_temp < 1e-3);
    }
    assert!(bath
        .grid()
        .cells()
        .all(|cell| cell.flow().norm() < 1e-6));
}

#[test]
fn faucet_warms_the_bath_within_bounds() {
    let mut bath = tub(16, 24);
    for col in 10..14 {
        bath.toggle(0, col).unwrap();
    }

    let mut observer = PeakObserver::default();
    for _ in 0..10 {
        bath.tick(&mut observer).unwrap();
    }

    let stats = bath.stats();
    assert_eq!(stats.tick, 10);
    assert!(stats.average_temp > 80.0, "average {}", stats.average_temp);
    assert!(stats.std_dev_temp > 0.0);
    assert_eq!(observer.peaks.len(), 10);
    for cell in bath.grid().cells() {
        let t = cell.temperature();
        assert!((80.0 - 1e-3..=100.0 + 1e-3).contains(&t), "{t} at {}", cell.coords());
        assert!(cell.flow().x.is_finite() && cell.flow().y.is_finite());
    }

    let below_faucet = bath.grid().get_cell(1, 11).unwrap();
    assert!(below_faucet.flow().y > 0.0, "flow {:?}", below_faucet.flow());
}

#[test]
fn body_temperature_follows_channel_and_reset() {
    let mut bath = tub(8, 8);
    bath.toggle(4, 4).unwrap();
    bath.post_parameter(ParameterChannel::BodyTemp, 90.0).unwrap();
    bath.tick(&mut NullObserver).unwrap();
    assert_eq!(bath.grid().get_cell(4, 4).unwrap().temperature(), 90.0);

    bath.post_parameter(ParameterChannel::TubTemp, 70.0).unwrap();
    bath.tick(&mut NullObserver).unwrap();
    bath.reset(&mut NullObserver).unwrap();

    let grid = bath.grid();
    // The body re-fixes its constant; every other cell restarts at the new tub temperature
    assert_eq!(grid.get_cell(4, 4).unwrap().temperature(), 90.0);
    assert_eq!(grid.get_cell(2, 2).unwrap().temperature(), 70.0);
    assert!(grid.cells().all(|cell| cell.flow() == Vec2::zeros()));
}

#[test]
fn broken_source_vector_aborts_tick() {
    let mut bath = HotBath::from_config(TubConfig {
        rows: 6,
        cols: 6,
        source_direction: Vec2::new(f32::NAN, 1.0),
        ..TubConfig::default()
    })
    .unwrap();
    bath.toggle(0, 2).unwrap();

    let err = bath.tick(&mut NullObserver).unwrap_err();
    assert!(
        matches!(
            err,
            KernelError::NonFiniteFlow { .. } | KernelError::NonFiniteSourceVector { .. }
        ),
        "unexpected {err:?}"
    );
    assert_eq!(bath.stats().tick, 0);
}

#[test]
fn toggle_outside_tub_fails() {
    let mut bath = tub(5, 5);
    assert!(matches!(
        bath.toggle(5, 0),
        Err(KernelError::OutOfBounds { .. })
    ));
}
