use crate::distance;
use crate::grid::{neighbors, Grid, Node};
use core::fmt;
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, info, trace, warn};

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Where a [PathFinder] is in its search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchState {
    /// Nodes are left to expand.
    Running,
    /// The end node has been expanded and the path reconstructed.
    Found,
    /// The open set ran empty without reaching the end. Not an error: the end is unreachable.
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        self != SearchState::Running
    }
}

/// How a renderer should present a cell. Variants are listed in order of precedence, so the start
/// cell is shown as [CellClass::Path] once the path has been found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellClass {
    Current,
    Path,
    Blocked,
    Start,
    End,
    Open,
    Closed,
    Unvisited,
}

impl CellClass {
    /// Single character used by the [Display](fmt::Display) implementation of [PathFinder].
    pub fn glyph(self) -> char {
        match self {
            CellClass::Current => '@',
            CellClass::Path => '*',
            CellClass::Blocked => '#',
            CellClass::Start => 'S',
            CellClass::End => 'E',
            CellClass::Open => 'o',
            CellClass::Closed => 'x',
            CellClass::Unvisited => '.',
        }
    }
}

/// Incremental A* over a [Grid]. Every call to [step](Self::step) expands exactly one node, after
/// which the open and closed sets, the current node and the per-node costs can be inspected.
///
/// Both sets keep insertion order. The open set is scanned for the lowest f-cost and ties go to
/// the node that was opened first, so the sequence of expanded nodes is fully deterministic.
#[derive(Clone, Debug)]
pub struct PathFinder {
    grid: Grid,
    open: FxIndexSet<usize>,
    closed: FxIndexSet<usize>,
    current: Option<usize>,
    state: SearchState,
    iteration_count: usize,
    path: Vec<usize>,
}

impl PathFinder {
    /// Takes ownership of the grid, clears any bookkeeping left by an earlier search and opens
    /// the start node.
    pub fn new(mut grid: Grid) -> PathFinder {
        grid.reset();
        let start = grid.start();
        let h_cost = distance(&grid.point_of(start), &grid.point_of(grid.end()));
        grid.node_mut(start).set_costs(0, h_cost);
        let mut open = FxIndexSet::default();
        open.insert(start);
        PathFinder {
            grid,
            open,
            closed: FxIndexSet::default(),
            current: None,
            state: SearchState::Running,
            iteration_count: 0,
            path: Vec::new(),
        }
    }

    /// Expands one node and returns the resulting state. On a terminal state this is a no-op.
    pub fn step(&mut self) -> SearchState {
        if self.state.is_terminal() {
            return self.state;
        }
        let grid = &self.grid;
        let next = self
            .open
            .iter()
            .position_min_by_key(|&&ix| grid.node(ix).f_cost.unwrap_or(i32::MAX))
            .and_then(|position| self.open.shift_remove_index(position));
        let Some(current) = next else {
            info!(
                "Open set ran empty after {} expansions, {:?} is unreachable",
                self.iteration_count,
                self.grid.point_of(self.grid.end())
            );
            self.state = SearchState::Exhausted;
            return self.state;
        };
        self.closed.insert(current);
        self.current = Some(current);
        self.iteration_count += 1;

        let current_point = self.grid.point_of(current);
        let current_g = self.grid.node(current).g_cost.unwrap_or(0);
        debug!(
            "Iteration {}: expanding {:?} (g = {}, f = {:?}), {} open",
            self.iteration_count,
            current_point,
            current_g,
            self.grid.node(current).f_cost,
            self.open.len()
        );

        if current == self.grid.end() {
            self.reconstruct_path(current);
            info!(
                "Reached {:?} after {} expansions, path of {} nodes with cost {}",
                current_point,
                self.iteration_count,
                self.path.len(),
                current_g
            );
            self.state = SearchState::Found;
            return self.state;
        }

        let end_point = self.grid.point_of(self.grid.end());
        for neighbour in neighbors(&self.grid, current) {
            let node = self.grid.node(neighbour);
            if node.blocked || self.closed.contains(&neighbour) {
                continue;
            }
            let neighbour_point = node.point;
            let tentative_g = current_g + distance(&current_point, &neighbour_point);
            let in_open = self.open.contains(&neighbour);
            if !in_open || node.g_cost.map_or(true, |g| tentative_g < g) {
                trace!(
                    "{:?}: g {:?} -> {} via {:?}",
                    neighbour_point,
                    node.g_cost,
                    tentative_g,
                    current_point
                );
                let node = self.grid.node_mut(neighbour);
                node.set_costs(tentative_g, distance(&neighbour_point, &end_point));
                node.parent = Some(current);
                if !in_open {
                    self.open.insert(neighbour);
                }
            }
        }
        self.state
    }

    /// Walks the parent links back from `end`, marking every node on the way as part of the path.
    fn reconstruct_path(&mut self, end: usize) {
        let grid = &self.grid;
        let mut path = std::iter::successors(Some(end), |&ix| grid.node(ix).parent)
            .collect::<Vec<usize>>();
        path.reverse();
        for &ix in &path {
            self.grid.node_mut(ix).in_path = true;
        }
        self.path = path;
    }

    /// Steps until a terminal state is reached or `max_iterations` steps have been taken. The
    /// returned state is still [SearchState::Running] if the cap was hit.
    pub fn run(&mut self, max_iterations: usize) -> SearchState {
        for _ in 0..max_iterations {
            if self.step().is_terminal() {
                return self.state;
            }
        }
        if self.state == SearchState::Running {
            warn!(
                "Stopped after {} iterations without reaching a terminal state",
                max_iterations
            );
        }
        self.state
    }

    /// Runs the search to a terminal state. Every expansion closes a node, so `len + 1` steps
    /// always suffice.
    pub fn run_to_completion(&mut self) -> SearchState {
        self.run(self.grid.len() + 1)
    }

    pub fn state(&self) -> SearchState {
        self.state
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    /// Gives the grid back, including the costs and path flags of this search.
    pub fn into_grid(self) -> Grid {
        self.grid
    }
    /// Index of the most recently expanded node, [None] before the first expansion.
    pub fn current(&self) -> Option<usize> {
        self.current
    }
    pub fn current_node(&self) -> Option<&Node> {
        self.current.map(|ix| self.grid.node(ix))
    }
    /// Discovered but not yet expanded nodes, in the order they were opened.
    pub fn open_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.open.iter().map(|&ix| self.grid.node(ix))
    }
    /// Expanded nodes, in expansion order.
    pub fn closed_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.closed.iter().map(|&ix| self.grid.node(ix))
    }
    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains(&index)
    }
    pub fn is_closed(&self, index: usize) -> bool {
        self.closed.contains(&index)
    }
    pub fn open_len(&self) -> usize {
        self.open.len()
    }
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }
    /// Number of node expansions so far.
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }
    /// Grid indices of the path from start to end. Empty unless the state is [SearchState::Found].
    pub fn path(&self) -> &[usize] {
        &self.path
    }
    pub fn path_points(&self) -> Vec<Point> {
        self.path.iter().map(|&ix| self.grid.point_of(ix)).collect()
    }
    /// Cost of the found path, i.e. the g-cost of the end node.
    pub fn path_cost(&self) -> Option<i32> {
        match self.state {
            SearchState::Found => self.grid.node(self.grid.end()).g_cost,
            _ => None,
        }
    }

    /// Classifies a cell for display. Precedence: current, path, blocked, start/end, open,
    /// closed, unvisited.
    pub fn classify(&self, index: usize) -> CellClass {
        let node = self.grid.node(index);
        if self.current == Some(index) {
            CellClass::Current
        } else if node.in_path {
            CellClass::Path
        } else if node.blocked {
            CellClass::Blocked
        } else if node.is_start {
            CellClass::Start
        } else if node.is_end {
            CellClass::End
        } else if self.open.contains(&index) {
            CellClass::Open
        } else if self.closed.contains(&index) {
            CellClass::Closed
        } else {
            CellClass::Unvisited
        }
    }
}

impl fmt::Display for PathFinder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.grid.width();
        for y in 0..self.grid.height() {
            let line = (0..width)
                .map(|x| self.classify(y * width + x).glyph())
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
