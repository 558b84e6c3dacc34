use grid_astar_stepper::{convert_cost_to_unit_cost_float, Grid, PathFinder, SearchState};
use std::env;
use std::fs;

// Solves an ASCII map given as a file path on the command line, for example
//  S..#....
//  .#.#.##.
//  .#...#E.
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
// Without an argument the map above is used.

const DEFAULT_MAP: &str = "
S..#....
.#.#.##.
.#...#E.
";

fn main() {
    env_logger::init();
    let map = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Could not read {}: {}", path, e);
            std::process::exit(1);
        }),
        None => DEFAULT_MAP.to_owned(),
    };
    let grid: Grid = match map.parse() {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Invalid map: {}", e);
            std::process::exit(1);
        }
    };
    if !grid.end_reachable() {
        println!("End is unreachable, the search would exhaust the start's component");
    }
    let mut finder = PathFinder::new(grid);
    match finder.run_to_completion() {
        SearchState::Found => {
            let cost = finder.path_cost().unwrap_or_default();
            println!(
                "Path of {} cells with length {:.1} after {} expansions:",
                finder.path().len(),
                convert_cost_to_unit_cost_float(cost),
                finder.iteration_count()
            );
            print!("{}", finder);
        }
        SearchState::Exhausted => {
            println!(
                "No path, {} cells expanded",
                finder.iteration_count()
            );
            print!("{}", finder);
        }
        SearchState::Running => unreachable!("run_to_completion always terminates"),
    }
}
