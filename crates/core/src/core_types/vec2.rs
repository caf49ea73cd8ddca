//! Vector type alias for 2D flow vectors.

use nalgebra::Vector2;

/// 2D vector type for flow velocities and source directions.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`. The `x` component runs
/// along columns (east positive) and the `y` component along rows (south positive).
pub type Vec2 = Vector2<f32>;
