use crate::error::{ConfigurationError, Result};
use core::fmt;
use grid_util::point::Point;
use itertools::Itertools;
use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use std::str::FromStr;

/// Neighbour offsets in enumeration order: N, S, NW, W, SW, NE, E, SE.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Number of expansions the demonstration scene is driven for, one per rendered frame.
pub const SHOWCASE_MAX_ITERATIONS: usize = 30;

/// The 17x9 scene used by the demos, start at (2, 7) and end at (13, 1).
const SHOWCASE_TEMPLATE: [[u8; 17]; 9] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Free,
    Blocked,
    Start,
    End,
}

impl Marker {
    fn from_code(code: u8) -> Option<Marker> {
        match code {
            0 => Some(Marker::Free),
            1 => Some(Marker::Blocked),
            2 => Some(Marker::Start),
            3 => Some(Marker::End),
            _ => None,
        }
    }
    fn from_glyph(glyph: char) -> Option<Marker> {
        match glyph {
            '.' | '0' => Some(Marker::Free),
            '#' | '1' => Some(Marker::Blocked),
            'S' | '2' => Some(Marker::Start),
            'E' | '3' => Some(Marker::End),
            _ => None,
        }
    }
}

/// A single cell of the [Grid] together with the bookkeeping the search attaches to it.
///
/// The cost fields are all-or-nothing: an undiscovered node has none of them, a discovered node
/// has all three. Only the [PathFinder](crate::PathFinder) mutates them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) point: Point,
    pub(crate) blocked: bool,
    pub(crate) is_start: bool,
    pub(crate) is_end: bool,
    pub(crate) g_cost: Option<i32>,
    pub(crate) h_cost: Option<i32>,
    pub(crate) f_cost: Option<i32>,
    pub(crate) parent: Option<usize>,
    pub(crate) in_path: bool,
}

impl Node {
    fn new(point: Point, marker: Marker) -> Node {
        Node {
            point,
            blocked: marker == Marker::Blocked,
            is_start: marker == Marker::Start,
            is_end: marker == Marker::End,
            g_cost: None,
            h_cost: None,
            f_cost: None,
            parent: None,
            in_path: false,
        }
    }
    pub fn point(&self) -> Point {
        self.point
    }
    pub fn blocked(&self) -> bool {
        self.blocked
    }
    pub fn is_start(&self) -> bool {
        self.is_start
    }
    pub fn is_end(&self) -> bool {
        self.is_end
    }
    /// Cost of the cheapest known path from the start to this node.
    pub fn g_cost(&self) -> Option<i32> {
        self.g_cost
    }
    /// Heuristic estimate of the remaining cost to the end.
    pub fn h_cost(&self) -> Option<i32> {
        self.h_cost
    }
    pub fn f_cost(&self) -> Option<i32> {
        self.f_cost
    }
    /// Grid index of the node this one was reached from. [None] for the start and for
    /// undiscovered nodes.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
    /// Whether the node lies on the reconstructed shortest path.
    pub fn in_path(&self) -> bool {
        self.in_path
    }
    pub fn discovered(&self) -> bool {
        self.g_cost.is_some()
    }
    pub(crate) fn set_costs(&mut self, g_cost: i32, h_cost: i32) {
        self.g_cost = Some(g_cost);
        self.h_cost = Some(h_cost);
        self.f_cost = Some(g_cost + h_cost);
    }
    fn clear(&mut self) {
        self.g_cost = None;
        self.h_cost = None;
        self.f_cost = None;
        self.parent = None;
        self.in_path = false;
    }
}

/// A rectangular grid of [Node]s stored row-major (`index = y * width + x`), with exactly one
/// start and one end. The topology (blocked cells, start, end) is fixed at construction.
///
/// Connected components of the free cells are computed upfront with a [UnionFind] so that
/// reachability can be answered without running a search.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    nodes: Vec<Node>,
    start: usize,
    end: usize,
    components: UnionFind<usize>,
}

/// Builds a [Grid] from rows of cell codes: 0 is free, 1 blocked, 2 start and 3 end.
pub fn build_grid<R: AsRef<[u8]>>(template: &[R]) -> Result<Grid> {
    Grid::from_template(template)
}

impl Grid {
    /// See [build_grid].
    pub fn from_template<R: AsRef<[u8]>>(template: &[R]) -> Result<Grid> {
        let mut rows = Vec::with_capacity(template.len());
        for (y, row) in template.iter().enumerate() {
            let markers = row
                .as_ref()
                .iter()
                .enumerate()
                .map(|(x, &code)| {
                    Marker::from_code(code).ok_or_else(|| ConfigurationError::InvalidMarker {
                        marker: code.to_string(),
                        x,
                        y,
                    })
                })
                .collect::<Result<Vec<Marker>>>()?;
            rows.push(markers);
        }
        Grid::from_markers(rows)
    }

    /// The demonstration scene: a 17x9 grid with two short walls between start and end.
    pub fn showcase() -> Result<Grid> {
        Grid::from_template(&SHOWCASE_TEMPLATE)
    }

    fn from_markers(rows: Vec<Vec<Marker>>) -> Result<Grid> {
        if rows.iter().all(Vec::is_empty) {
            return Err(ConfigurationError::EmptyTemplate);
        }
        let width = rows[0].len();
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(ConfigurationError::NotRectangular {
                row,
                expected: width,
                found,
            });
        }
        let height = rows.len();
        let nodes = rows
            .into_iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.into_iter()
                    .enumerate()
                    .map(move |(x, marker)| Node::new(Point::new(x as i32, y as i32), marker))
            })
            .collect::<Vec<Node>>();

        let starts = nodes.iter().positions(|n| n.is_start).collect::<Vec<usize>>();
        let start = match starts.as_slice() {
            [] => return Err(ConfigurationError::MissingStart),
            [start] => *start,
            _ => return Err(ConfigurationError::MultipleStarts(starts.len())),
        };
        let ends = nodes.iter().positions(|n| n.is_end).collect::<Vec<usize>>();
        let end = match ends.as_slice() {
            [] => return Err(ConfigurationError::MissingEnd),
            [end] => *end,
            _ => return Err(ConfigurationError::MultipleEnds(ends.len())),
        };

        let mut grid = Grid {
            width,
            height,
            components: UnionFind::new(nodes.len()),
            nodes,
            start,
            end,
        };
        grid.generate_components();
        info!(
            "Built {}x{} grid, start {:?}, end {:?}",
            width, height, grid.nodes[start].point, grid.nodes[end].point
        );
        Ok(grid)
    }

    /// Links every free cell to its free 8-neighbours. Only the forward half of the neighbourhood
    /// is visited since union is symmetric.
    fn generate_components(&mut self) {
        self.components = UnionFind::new(self.nodes.len());
        for ix in 0..self.nodes.len() {
            if self.nodes[ix].blocked {
                continue;
            }
            let point = self.nodes[ix].point;
            let linked = [
                Point::new(point.x, point.y + 1),
                Point::new(point.x + 1, point.y - 1),
                Point::new(point.x + 1, point.y),
                Point::new(point.x + 1, point.y + 1),
            ]
            .into_iter()
            .filter_map(|p| self.index_of(&p))
            .filter(|&n| !self.nodes[n].blocked)
            .collect::<SmallVec<[usize; 4]>>();
            for n in linked {
                self.components.union(ix, n);
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    /// Number of cells, `width * height`.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
    pub fn index_of(&self, point: &Point) -> Option<usize> {
        if self.in_bounds(point.x, point.y) {
            Some(point.y as usize * self.width + point.x as usize)
        } else {
            None
        }
    }
    pub fn point_of(&self, index: usize) -> Point {
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }
    pub fn node_at(&self, point: &Point) -> Option<&Node> {
        self.index_of(point).map(|ix| &self.nodes[ix])
    }
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    /// Index of the start node.
    pub fn start(&self) -> usize {
        self.start
    }
    /// Index of the end node.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Checks if both points are free cells on the same connected component.
    pub fn reachable(&self, a: &Point, b: &Point) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a_ix), Some(b_ix)) => {
                !self.nodes[a_ix].blocked
                    && !self.nodes[b_ix].blocked
                    && self.components.equiv(a_ix, b_ix)
            }
            _ => false,
        }
    }
    /// Checks if the end can be reached from the start at all.
    pub fn end_reachable(&self) -> bool {
        self.components.equiv(self.start, self.end)
    }

    /// Clears all search bookkeeping so the grid can be handed to a new search.
    pub fn reset(&mut self) {
        self.nodes.iter_mut().for_each(Node::clear);
    }
}

/// Grid indices of the in-bounds cells around `index`, in the order N, S, NW, W, SW, NE, E, SE.
/// Blocked cells are included; the search filters them.
pub fn neighbors(grid: &Grid, index: usize) -> SmallVec<[usize; 8]> {
    let p = grid.point_of(index);
    NEIGHBOUR_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| grid.index_of(&Point::new(p.x + dx, p.y + dy)))
        .collect()
}

/// Parses an ASCII map with one row per line: `.` free, `#` blocked, `S` start, `E` end. The
/// digits 0-3 are accepted as well. Blank lines and surrounding whitespace are ignored.
impl FromStr for Grid {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Grid> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .map(|(x, glyph)| {
                        Marker::from_glyph(glyph).ok_or_else(|| {
                            ConfigurationError::InvalidMarker {
                                marker: glyph.to_string(),
                                x,
                                y,
                            }
                        })
                    })
                    .collect::<Result<Vec<Marker>>>()
            })
            .collect::<Result<Vec<Vec<Marker>>>>()?;
        Grid::from_markers(rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.nodes.chunks(self.width) {
            let line = row
                .iter()
                .map(|node| {
                    if node.is_start {
                        'S'
                    } else if node.is_end {
                        'E'
                    } else if node.blocked {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_maps_rows_to_y() {
        let template: Vec<Vec<u8>> = vec![vec![2, 0, 1], vec![0, 0, 3]];
        let grid = build_grid(&template).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.node(grid.start()).point(), Point::new(0, 0));
        assert_eq!(grid.node(grid.end()).point(), Point::new(2, 1));
        assert!(grid.node_at(&Point::new(2, 0)).unwrap().blocked());
        assert_eq!(grid.index_of(&Point::new(1, 1)), Some(4));
        assert_eq!(grid.point_of(4), Point::new(1, 1));
        assert!(grid.nodes().iter().all(|n| !n.discovered()));
    }

    #[test]
    fn rejects_malformed_templates() {
        let empty: Vec<Vec<u8>> = vec![];
        assert_eq!(
            build_grid(&empty).unwrap_err(),
            ConfigurationError::EmptyTemplate
        );
        let empty_row: Vec<Vec<u8>> = vec![vec![]];
        assert_eq!(
            build_grid(&empty_row).unwrap_err(),
            ConfigurationError::EmptyTemplate
        );
        let empty_rows: Vec<Vec<u8>> = vec![vec![], vec![]];
        assert_eq!(
            build_grid(&empty_rows).unwrap_err(),
            ConfigurationError::EmptyTemplate
        );
        // A leading empty row is a shape error, not an empty template.
        let empty_first: Vec<Vec<u8>> = vec![vec![], vec![2, 3]];
        assert_eq!(
            build_grid(&empty_first).unwrap_err(),
            ConfigurationError::NotRectangular {
                row: 1,
                expected: 0,
                found: 2
            }
        );
        let ragged: Vec<Vec<u8>> = vec![vec![2, 0, 0], vec![0, 3]];
        assert_eq!(
            build_grid(&ragged).unwrap_err(),
            ConfigurationError::NotRectangular {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        let no_start: Vec<Vec<u8>> = vec![vec![0, 0, 3]];
        assert_eq!(
            build_grid(&no_start).unwrap_err(),
            ConfigurationError::MissingStart
        );
        let two_starts: Vec<Vec<u8>> = vec![vec![2, 2, 3]];
        assert_eq!(
            build_grid(&two_starts).unwrap_err(),
            ConfigurationError::MultipleStarts(2)
        );
        let no_end: Vec<Vec<u8>> = vec![vec![2, 0, 0]];
        assert_eq!(
            build_grid(&no_end).unwrap_err(),
            ConfigurationError::MissingEnd
        );
        let three_ends: Vec<Vec<u8>> = vec![vec![2, 3, 3], vec![3, 0, 0]];
        assert_eq!(
            build_grid(&three_ends).unwrap_err(),
            ConfigurationError::MultipleEnds(3)
        );
        let unknown: Vec<Vec<u8>> = vec![vec![2, 0], vec![5, 3]];
        assert_eq!(
            build_grid(&unknown).unwrap_err(),
            ConfigurationError::InvalidMarker {
                marker: "5".to_owned(),
                x: 0,
                y: 1
            }
        );
    }

    #[test]
    fn parses_ascii_maps() {
        let grid: Grid = "
            S.#
            .#.
            ..E
        "
        .parse()
        .unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert!(grid.node_at(&Point::new(2, 0)).unwrap().blocked());
        assert!(grid.node_at(&Point::new(1, 1)).unwrap().blocked());
        assert_eq!(grid.to_string(), "S.#\n.#.\n..E\n");

        let err = "S.x\n..E".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidMarker {
                marker: "x".to_owned(),
                x: 2,
                y: 0
            }
        );
    }

    #[test]
    fn showcase_is_valid() {
        let grid = Grid::showcase().unwrap();
        assert_eq!((grid.width(), grid.height()), (17, 9));
        assert_eq!(grid.node(grid.start()).point(), Point::new(2, 7));
        assert_eq!(grid.node(grid.end()).point(), Point::new(13, 1));
        assert!(grid.end_reachable());
    }

    #[test]
    fn neighbors_in_canonical_order() {
        let grid: Grid = "S..\n...\n..E".parse().unwrap();
        let points = |ix| {
            neighbors(&grid, ix)
                .into_iter()
                .map(|n| grid.point_of(n))
                .collect::<Vec<Point>>()
        };
        assert_eq!(
            points(4),
            vec![
                Point::new(1, 0),
                Point::new(1, 2),
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(0, 2),
                Point::new(2, 0),
                Point::new(2, 1),
                Point::new(2, 2),
            ]
        );
        // Corner cells only see the three in-bounds cells.
        assert_eq!(
            points(0),
            vec![Point::new(0, 1), Point::new(1, 0), Point::new(1, 1)]
        );
    }

    #[test]
    fn neighbors_include_blocked_cells() {
        let grid: Grid = "S#E".parse().unwrap();
        assert_eq!(neighbors(&grid, 0).as_slice(), &[1]);
        assert_eq!(neighbors(&grid, 1).as_slice(), &[0, 2]);
    }

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // |S#.|
        // |.#E|
        let grid: Grid = "S#.\n.#E".parse().unwrap();
        assert!(!grid.end_reachable());
        assert!(grid.reachable(&Point::new(0, 0), &Point::new(0, 1)));
        assert!(grid.reachable(&Point::new(2, 0), &Point::new(2, 1)));
        assert!(!grid.reachable(&Point::new(0, 0), &Point::new(1, 0)));
        assert!(!grid.reachable(&Point::new(0, 0), &Point::new(5, 5)));
    }

    /// Diagonal moves squeeze between two blocked corners, so the components do too.
    #[test]
    fn reachable_with_diagonals() {
        //  ___
        // |S#|
        // |#E|
        //  __
        let grid: Grid = "S#\n#E".parse().unwrap();
        assert!(grid.end_reachable());
    }
}
