use grid_astar_stepper::{Grid, PathFinder, SearchState, SHOWCASE_MAX_ITERATIONS};

// Steps through the demonstration scene and prints a snapshot after every expansion:
// - @ marks the node that was just expanded
// - o marks open nodes, x closed nodes
// - * marks the final path
// The scene is driven for at most SHOWCASE_MAX_ITERATIONS expansions, one per frame.
// Set RUST_LOG=debug to also see the search log.

fn main() {
    env_logger::init();
    let grid = Grid::showcase().expect("showcase template is valid");
    println!("{}", grid);
    let mut finder = PathFinder::new(grid);
    while finder.iteration_count() < SHOWCASE_MAX_ITERATIONS
        && finder.step() == SearchState::Running
    {
        if let Some(current) = finder.current_node() {
            println!(
                "Step {}: {:?} g={:?} h={:?} f={:?}",
                finder.iteration_count(),
                current.point(),
                current.g_cost(),
                current.h_cost(),
                current.f_cost()
            );
        }
        println!("{}", finder);
    }
    match finder.state() {
        SearchState::Found => {
            println!("{}", finder);
            println!(
                "Path found after {} steps, cost {:?}:",
                finder.iteration_count(),
                finder.path_cost()
            );
            for p in finder.path_points() {
                println!("{:?}", p);
            }
        }
        SearchState::Exhausted => println!("End is unreachable"),
        SearchState::Running => println!(
            "Stopped after {} frames, {} nodes still open",
            SHOWCASE_MAX_ITERATIONS,
            finder.open_len()
        ),
    }
}
