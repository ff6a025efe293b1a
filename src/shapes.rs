//! Shape / orientation data model (spec §3) and ASCII-art shape
//! parsing, supplemented from `original_source/shapes.py` (dropped by
//! the distillation, not excluded by any Non-goal).

use lazy_static::lazy_static;
use std::collections::BTreeSet;

/// One oriented polyomino: a nonempty set of `(row, col)` offsets,
/// normalized so the minimum row and column are both 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<(i32, i32)>,
}

impl Shape {
    fn from_points(points: &BTreeSet<(i32, i32)>) -> Self {
        let min_i = points.iter().map(|&(i, _)| i).min().unwrap();
        let min_j = points.iter().map(|&(_, j)| j).min().unwrap();
        let mut cells: Vec<(i32, i32)> = points.iter().map(|&(i, j)| (i - min_i, j - min_j)).collect();
        cells.sort_unstable();
        Shape { cells }
    }

    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    /// Number of cells the shape covers (same for every orientation of
    /// the same item, per spec §3).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Maximum row offset used (spec §4.F calls this `mh`).
    pub fn max_row(&self) -> i32 {
        self.cells.iter().map(|&(i, _)| i).max().unwrap_or(0)
    }

    /// Maximum column offset used (spec §4.F calls this `mw`).
    pub fn max_col(&self) -> i32 {
        self.cells.iter().map(|&(_, j)| j).max().unwrap_or(0)
    }

    fn rotated_90(&self) -> BTreeSet<(i32, i32)> {
        self.cells.iter().map(|&(i, j)| (-j, i)).collect()
    }
}

/// An ordered list of distinct orientations of the same polyomino
/// (1-4 entries, fixed and immutable per item).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeSet {
    orientations: Vec<Shape>,
}

impl ShapeSet {
    pub fn orientations(&self) -> &[Shape] {
        &self.orientations
    }
}

/// Parse one ASCII-art block (`#` = filled cell, anything else = empty)
/// into its `ShapeSet` of up to four distinct 90-degree rotations.
pub fn parse_shape(ascii_shape: &str) -> ShapeSet {
    let trimmed = ascii_shape.trim_matches('\n');
    let lines: Vec<&str> = trimmed.lines().collect();

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut points = BTreeSet::new();
    for (i, line) in lines.iter().enumerate() {
        let dedented = if line.len() >= indent { &line[indent..] } else { "" };
        for (j, ch) in dedented.chars().enumerate() {
            if ch != ' ' {
                points.insert((i as i32, j as i32));
            }
        }
    }

    let mut shape = Shape::from_points(&points);
    let mut orientations: Vec<Shape> = Vec::new();
    let mut seen: BTreeSet<Vec<(i32, i32)>> = BTreeSet::new();

    for _ in 0..4 {
        if seen.insert(shape.cells.clone()) {
            orientations.push(shape.clone());
        }
        let rotated = shape.rotated_90();
        shape = Shape::from_points(&rotated);
    }

    orientations.sort_by(|a, b| a.cells.cmp(&b.cells));
    ShapeSet { orientations }
}

/// Parse a blank-line-separated blob of ASCII shapes into an ordered
/// list of `ShapeSet`s.
pub fn define_shapes(ascii_shapes: &str) -> Vec<ShapeSet> {
    ascii_shapes
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(parse_shape)
        .collect()
}

lazy_static! {
    /// The seven demo shapes from `original_source/shapes.py`: the two
    /// S/Z tetrominoes, the four L/J/T-family tetrominoes, a 1x4 bar,
    /// and a 2x2 square.
    pub static ref WELL_KNOWN_SHAPES: Vec<ShapeSet> = define_shapes(
        "\
 ##
##

##
 ##

#
###

 #
###

  #
###

####

##
##"
    );
}
