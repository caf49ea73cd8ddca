//! Grid-level invariants of the pass pipeline

use approx::assert_relative_eq;
use ctor::ctor;
use hot_bath_core::cell::Behavior;
use hot_bath_core::{
    Cell, CellCoords, Corner, DiffusionModel, Direction, Grid, KernelConfig, KernelError,
    Placement, Variant, Vec2,
};
use tracing_subscriber::EnvFilter;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Variant matching a cell's position in a bounded box
fn boundary_variant(row: usize, col: usize, rows: usize, cols: usize) -> Variant {
    match Placement::classify(CellCoords::new(row, col), rows, cols) {
        Placement::Interior => Variant::interior(),
        Placement::Edge(side) => Variant::Edge(side),
        Placement::Corner(corner) => Variant::Corner(corner),
    }
}

/// Box with deterministic, non-uniform temperature and flow
fn boxed_grid(rows: usize, cols: usize, flow: impl Fn(usize, usize) -> Vec2) -> Grid {
    boxed_grid_with(rows, cols, flow, |row, col| boundary_variant(row, col, rows, cols))
}

fn boxed_grid_with(
    rows: usize,
    cols: usize,
    flow: impl Fn(usize, usize) -> Vec2,
    variant: impl Fn(usize, usize) -> Variant,
) -> Grid {
    let config = KernelConfig {
        diffusion: DiffusionModel::Constant {
            heat: 0.25,
            flow: 0.1,
        },
        ..KernelConfig::default()
    };
    let mut grid = Grid::new(rows, cols, config).unwrap();
    for row in 0..rows {
        for col in 0..cols {
            let temperature = ((row * 13 + col * 7) % 17) as f32 * 5.0;
            let cell = Cell::new(
                row,
                col,
                temperature,
                flow(row, col),
                [variant(row, col)],
            )
            .unwrap();
            grid.add_cell(cell, row, col).unwrap();
        }
    }
    grid.link_cells().unwrap();
    grid
}

fn swirl(row: usize, col: usize) -> Vec2 {
    Vec2::new((row as f32 * 0.7).sin(), (col as f32 * 0.4).cos())
}

fn neighbor<'a>(grid: &'a Grid, row: usize, col: usize, direction: Direction) -> &'a Cell {
    let (row, col) = match direction {
        Direction::North => (row - 1, col),
        Direction::South => (row + 1, col),
        Direction::East => (row, col + 1),
        Direction::West => (row, col - 1),
    };
    grid.get_cell(row, col).unwrap()
}

#[test]
fn corners_average_their_two_neighbors_exactly() {
    let (rows, cols) = (5, 6);
    let mut grid = boxed_grid(rows, cols, swirl);
    grid.diffuse().unwrap();
    grid.project().unwrap();

    let corners = [
        (0, 0, Corner::TopLeft),
        (0, cols - 1, Corner::TopRight),
        (rows - 1, 0, Corner::BottomLeft),
        (rows - 1, cols - 1, Corner::BottomRight),
    ];
    for (row, col, corner) in corners {
        let cell = grid.get_cell(row, col).unwrap();
        let [first, second] = corner.inward();
        let a = neighbor(&grid, row, col, first);
        let b = neighbor(&grid, row, col, second);

        assert_eq!(
            cell.pending_temperature(),
            (a.pending_temperature() + b.pending_temperature()) * 0.5,
            "T' at {corner:?}"
        );
        assert_eq!(
            cell.divergence(),
            (a.divergence() + b.divergence()) * 0.5,
            "d at {corner:?}"
        );
        assert_eq!(
            cell.pressure(),
            (a.pressure() + b.pressure()) * 0.5,
            "p at {corner:?}"
        );
    }
}

#[test]
fn edges_replicate_their_inward_neighbor() {
    let mut grid = boxed_grid(5, 6, swirl);
    grid.diffuse().unwrap();
    let edge = grid.get_cell(0, 2).unwrap();
    let inward = grid.get_cell(1, 2).unwrap();
    assert_eq!(edge.pending_temperature(), inward.pending_temperature());

    grid.diffuse_flow().unwrap();
    let edge = grid.get_cell(2, 5).unwrap();
    let inward = grid.get_cell(2, 4).unwrap();
    assert_eq!(edge.pending_flow(), Vec2::new(0.0, inward.pending_flow().y));
}

#[test]
fn toggle_cycle_returns_to_first_variant() {
    let variants = [
        Variant::interior(),
        Variant::dirichlet(98.6),
        Variant::source(100.0, Vec2::new(0.0, 1.0)),
    ];
    let mut cell = Cell::new(1, 1, 80.0, Vec2::zeros(), variants).unwrap();
    let n = cell.behaviors().len();
    for _ in 0..n {
        cell.toggle();
    }
    assert_eq!(cell.active_index(), 0);

    let exits: u32 = cell.behaviors().iter().map(Behavior::exits).sum();
    let entries: u32 = cell.behaviors().iter().map(Behavior::entries).sum();
    assert_eq!(exits as usize, n);
    // Construction enters the first variant once more
    assert_eq!(entries as usize, n + 1);
    assert_eq!(cell.behaviors()[0].owner(), Some(CellCoords::new(1, 1)));
    assert!(cell.behaviors()[1..].iter().all(|b| b.owner().is_none()));
}

#[test]
fn zero_flow_advection_is_identity() {
    let mut grid = boxed_grid(6, 7, |_, _| Vec2::zeros());
    grid.advect().unwrap();
    for cell in grid.cells().filter(|cell| cell.should_advect()) {
        assert_eq!(cell.pending_temperature(), cell.temperature(), "at {}", cell.coords());
    }

    grid.advect_flow().unwrap();
    assert!(grid.cells().all(|cell| cell.pending_flow() == Vec2::zeros()));
}

#[test]
fn projection_keeps_zero_field_zero() {
    let mut grid = boxed_grid(6, 7, |_, _| Vec2::zeros());
    grid.project().unwrap();
    for cell in grid.cells() {
        assert_eq!(cell.pending_flow(), Vec2::zeros(), "at {}", cell.coords());
    }
}

#[test]
fn projection_reduces_divergence() {
    let (rows, cols) = (8, 8);
    let source = |row: usize, col: usize| {
        // Outward burst from the middle
        let x = col as f32 - 3.5;
        let y = row as f32 - 3.5;
        Vec2::new(x, y) * 0.1
    };
    let divergence_norm = |grid: &Grid| -> f32 {
        let mut total = 0.0;
        for row in 1..rows - 1 {
            for col in 1..cols - 1 {
                let east = grid.get_cell(row, col + 1).unwrap().pending_flow().x;
                let west = grid.get_cell(row, col - 1).unwrap().pending_flow().x;
                let south = grid.get_cell(row + 1, col).unwrap().pending_flow().y;
                let north = grid.get_cell(row - 1, col).unwrap().pending_flow().y;
                total += ((east - west) + (south - north)).abs();
            }
        }
        total
    };

    let mut grid = boxed_grid(rows, cols, source);
    let before = divergence_norm(&grid);
    grid.project().unwrap();
    let after = divergence_norm(&grid);
    assert!(after < before, "divergence {before} -> {after}");
}

#[test]
fn projection_treats_a_body_as_a_still_wall() {
    let (rows, cols) = (7, 7);
    let body = (3, 3);
    let mut grid = boxed_grid_with(rows, cols, swirl, |row, col| {
        if (row, col) == body {
            Variant::dirichlet(98.6)
        } else {
            boundary_variant(row, col, rows, cols)
        }
    });
    assert_ne!(grid.get_cell(body.0, body.1).unwrap().flow(), Vec2::zeros());

    grid.project().unwrap();

    let cell = grid.get_cell(body.0, body.1).unwrap();
    assert_eq!(cell.pending_flow(), Vec2::zeros());
    let mean = Direction::ALL
        .iter()
        .map(|&dir| neighbor(&grid, body.0, body.1, dir).pressure())
        .sum::<f32>()
        / 4.0;
    assert_relative_eq!(cell.pressure(), mean, epsilon = 1e-6);
}

#[test]
fn reset_restores_recorded_initial_values() {
    let mut grid = boxed_grid(5, 5, swirl);
    let initial: Vec<_> = grid
        .cells()
        .map(|cell| (cell.initial_temperature(), cell.initial_flow()))
        .collect();

    for _ in 0..3 {
        grid.update().unwrap();
        grid.diffuse().unwrap();
        grid.commit().unwrap();
        grid.diffuse_flow().unwrap();
        grid.commit_flow().unwrap();
    }
    grid.reset();

    for (cell, &(temperature, flow)) in grid.cells().zip(&initial) {
        assert_eq!(cell.temperature(), temperature);
        assert_eq!(cell.pending_temperature(), temperature);
        assert_eq!(cell.flow(), flow);
        assert_eq!(cell.pending_flow(), flow);
    }
}

#[test]
fn non_finite_flow_aborts_commit() {
    let mut grid = Grid::new(3, 3, KernelConfig::default()).unwrap();
    for row in 0..3 {
        for col in 0..3 {
            let flow = if (row, col) == (1, 2) {
                Vec2::new(f32::NAN, 0.0)
            } else {
                Vec2::zeros()
            };
            let cell = Cell::new(row, col, 80.0, flow, [Variant::interior()]).unwrap();
            grid.add_cell(cell, row, col).unwrap();
        }
    }
    grid.link_cells().unwrap();

    match grid.commit_flow() {
        Err(KernelError::NonFiniteFlow { at, vx, .. }) => {
            assert_eq!(at, CellCoords::new(1, 2));
            assert!(vx.is_nan());
        }
        other => panic!("expected NonFiniteFlow, got {other:?}"),
    }
}

#[test]
fn get_cell_rejects_out_of_range() {
    let grid = boxed_grid(3, 4, |_, _| Vec2::zeros());
    assert!(grid.get_cell(2, 3).is_ok());
    assert!(matches!(
        grid.get_cell(3, 0),
        Err(KernelError::OutOfBounds { .. })
    ));
    assert!(matches!(
        grid.get_cell(0, 4),
        Err(KernelError::OutOfBounds { .. })
    ));
}
