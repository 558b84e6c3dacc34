//! # grid_astar_stepper
//!
//! A grid-based [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) search that advances one
//! node expansion at a time. After every [step](PathFinder::step) the open set, closed set,
//! per-node costs, the current node and (once the goal is reached) the reconstructed path can be
//! inspected, which makes the search suitable for driving visualisations, traces and tests.
//!
//! Movement is 8-connected with integer octile costs: [C] for a straight step and [D] for a
//! diagonal one. The same [distance] function serves as edge cost and heuristic, so the heuristic
//! is consistent and closed nodes never have to be re-opened.
//!
//! ```
//! use grid_astar_stepper::{build_grid, PathFinder, SearchState};
//!
//! let template: Vec<Vec<u8>> = vec![vec![2, 0, 0], vec![0, 1, 0], vec![0, 0, 3]];
//! let grid = build_grid(&template).unwrap();
//! let mut finder = PathFinder::new(grid);
//! assert_eq!(finder.run_to_completion(), SearchState::Found);
//! assert_eq!(finder.path().len(), 4);
//! ```
pub mod error;
pub mod grid;
pub mod path_finder;

pub use error::{ConfigurationError, Result};
pub use grid::{build_grid, neighbors, Grid, Node, SHOWCASE_MAX_ITERATIONS};
pub use path_finder::{CellClass, PathFinder, SearchState};

use grid_util::point::Point;

/// Cost of a straight (cardinal) step.
pub const C: i32 = 10;
/// Cost of a diagonal step, approximately `C * sqrt(2)`.
pub const D: i32 = 14;
/// Helper constant for the closed-form octile distance.
pub const E: i32 = 2 * C - D;

/// Octile distance between two cells. Used both as the cost of moving between adjacent cells and
/// as the heuristic towards the goal.
pub fn distance(a: &Point, b: &Point) -> i32 {
    let delta_x = (a.x - b.x).abs();
    let delta_y = (a.y - b.y).abs();
    // Formula from https://github.com/riscy/a_star_on_grids
    // to efficiently compute the cost of a path taking the maximal amount
    // of diagonal steps before going straight
    (E * (delta_x - delta_y).abs() + D * (delta_x + delta_y)) / 2
}

/// Converts the integer cost to an approximate floating point equivalent where cardinal directions have cost 1.0.
pub fn convert_cost_to_unit_cost_float(cost: i32) -> f64 {
    (cost as f64) / (C as f64)
}
